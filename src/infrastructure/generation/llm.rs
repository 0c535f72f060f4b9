//! Answer generation through a text completion backend

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::DomainError;
use crate::domain::completion::{CompletionRequest, TextCompletion, render_prompt};
use crate::domain::pipeline::{Evidence, Generate, VariantTag};

const SYSTEM_PROMPT: &str = "Answer strictly from the provided sources. If the sources do not \
contain the answer, say so. Avoid absolute claims the sources do not make.";

const ANSWER_PROMPT: &str = "Sources:\n${sources}\n\nQuestion: ${query}\n\nAnswer:";

/// Extra instruction for each regeneration, cycled by alternative index
const ALTERNATIVE_INSTRUCTIONS: [&str; 3] = [
    "Quote the sources as closely as possible.",
    "Answer in at most two sentences using only words found in the sources.",
    "List the relevant requirements from the sources as short bullet points.",
];

const FALLBACK_ANSWER: &str = "No supporting information was retrieved for: ${query}";

#[derive(Debug, Clone)]
pub struct LlmGenerator {
    completion: Arc<dyn TextCompletion>,
    temperature: f32,
}

impl LlmGenerator {
    pub fn new(completion: Arc<dyn TextCompletion>, temperature: f32) -> Self {
        Self {
            completion,
            temperature,
        }
    }

    fn build_prompt(query: &str, evidence: &[Evidence], variant: &VariantTag) -> String {
        let mut sources: Vec<&Evidence> = evidence.iter().collect();
        if let Some(n) = variant.alternative_index() {
            let len = sources.len().max(1);
            sources.rotate_left(n as usize % len);
        }

        let sources = sources
            .iter()
            .enumerate()
            .map(|(i, e)| format!("[{}] {}", i + 1, e.text))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = render_prompt(
            ANSWER_PROMPT,
            &[("sources", sources.as_str()), ("query", query)],
        );

        match variant.alternative_index() {
            None => prompt,
            Some(n) => format!(
                "{}\n\n{}",
                ALTERNATIVE_INSTRUCTIONS[n as usize % ALTERNATIVE_INSTRUCTIONS.len()],
                prompt
            ),
        }
    }
}

#[async_trait]
impl Generate<String> for LlmGenerator {
    async fn generate(
        &self,
        query: &str,
        evidence: &[Evidence],
        variant: &VariantTag,
    ) -> Result<String, DomainError> {
        if evidence.is_empty() {
            return Ok(self.fallback(query));
        }

        // Only the default path is deterministic
        let temperature = match variant {
            VariantTag::Default => 0.0,
            VariantTag::Alternative(_) => self.temperature,
        };

        let request = CompletionRequest::new(Self::build_prompt(query, evidence, variant))
            .with_system(SYSTEM_PROMPT)
            .with_temperature(temperature);

        debug!(
            provider = self.completion.provider_name(),
            %variant,
            sources = evidence.len(),
            "Generating answer"
        );

        let answer = self.completion.complete(&request).await?;
        Ok(answer.trim().to_string())
    }

    fn fallback(&self, query: &str) -> String {
        render_prompt(FALLBACK_ANSWER, &[("query", query)])
    }
}
