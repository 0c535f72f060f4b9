//! LLM-backed scoring strategy
//!
//! Relevance, grounding and hallucination are judged by a completion backend that
//! must answer with a JSON object `{"score": 0-10, "reason": "..."}`. The reply is
//! decoded with serde only; anything else is a scoring error. Category and PII
//! scores stay lexical.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::keyword::KeywordScoringStrategy;
use crate::domain::DomainError;
use crate::domain::completion::{CompletionRequest, TextCompletion, render_prompt};
use crate::domain::pii::{PiiMatch, PiiPattern};
use crate::domain::scoring::ScoringStrategy;

const SYSTEM_PROMPT: &str = "You are a strict evaluator. Reply with a single JSON object \
{\"score\": <number 0-10>, \"reason\": \"<short reason>\"} and nothing else.";

const RELEVANCE_PROMPT: &str = "Rate from 0 to 10 how relevant the document is to the query.\n\n\
Query: ${query}\n\nDocument: ${text}";

const GROUNDING_PROMPT: &str = "Rate from 0 to 10 how fully every statement of the answer is \
supported by the sources.\n\nAnswer: ${answer}\n\nSources: ${sources}";

const HALLUCINATION_PROMPT: &str = "Rate from 0 to 10 how much the answer relies on absolute, \
overreaching or unsupported claims.\n\nAnswer: ${answer}";

/// Response structure from LLM scoring
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LlmScoreResponse {
    score: f32,
    #[serde(default)]
    reason: Option<String>,
}

/// Extract JSON object from a string (handles markdown code blocks)
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Decode a scoring reply and normalise its 0-10 score to [0, 1]
fn parse_score(response: &str) -> Result<f32, DomainError> {
    let json = extract_json(response)
        .ok_or_else(|| DomainError::scoring("llm", "Response contains no JSON object"))?;

    let parsed: LlmScoreResponse = serde_json::from_str(json).map_err(|e| {
        warn!(error = %e, response, "Failed to parse LLM scoring response");
        DomainError::scoring("llm", format!("Invalid scoring response format: {}", e))
    })?;

    if !parsed.score.is_finite() || !(0.0..=10.0).contains(&parsed.score) {
        return Err(DomainError::scoring(
            "llm",
            format!("Score out of range: {}", parsed.score),
        ));
    }

    if let Some(reason) = parsed.reason {
        debug!(score = parsed.score, %reason, "LLM score");
    }

    Ok(parsed.score / 10.0)
}

#[derive(Debug, Clone)]
pub struct LlmScoringStrategy {
    completion: Arc<dyn TextCompletion>,
    lexical: KeywordScoringStrategy,
    temperature: f32,
}

impl LlmScoringStrategy {
    pub fn new(
        completion: Arc<dyn TextCompletion>,
        lexical: KeywordScoringStrategy,
        temperature: f32,
    ) -> Self {
        Self {
            completion,
            lexical,
            temperature,
        }
    }

    async fn judge(&self, prompt: String) -> Result<f32, DomainError> {
        let request = CompletionRequest::new(prompt)
            .with_system(SYSTEM_PROMPT)
            .with_temperature(self.temperature)
            .with_json_output();

        let response = self.completion.complete(&request).await?;
        parse_score(&response)
    }
}

#[async_trait]
impl ScoringStrategy for LlmScoringStrategy {
    fn is_direct_answerable(&self, input: &str) -> bool {
        self.lexical.is_direct_answerable(input)
    }

    async fn score_relevance(&self, query: &str, text: &str) -> Result<f32, DomainError> {
        self.judge(render_prompt(
            RELEVANCE_PROMPT,
            &[("query", query), ("text", text)],
        ))
        .await
    }

    async fn score_grounding(
        &self,
        candidate: &str,
        evidence_text: &str,
    ) -> Result<f32, DomainError> {
        if candidate.trim().is_empty() {
            return Ok(0.0);
        }

        self.judge(render_prompt(
            GROUNDING_PROMPT,
            &[("answer", candidate), ("sources", evidence_text)],
        ))
        .await
    }

    async fn score_hallucination(&self, candidate: &str) -> Result<f32, DomainError> {
        self.judge(render_prompt(HALLUCINATION_PROMPT, &[("answer", candidate)]))
            .await
    }

    async fn score_category(&self, text: &str, keywords: &[&str]) -> Result<f32, DomainError> {
        self.lexical.score_category(text, keywords).await
    }

    async fn score_pii_pattern(
        &self,
        text: &str,
        pattern: &PiiPattern,
    ) -> Result<Vec<PiiMatch>, DomainError> {
        self.lexical.score_pii_pattern(text, pattern).await
    }

    fn strategy_name(&self) -> &'static str {
        "llm"
    }
}
