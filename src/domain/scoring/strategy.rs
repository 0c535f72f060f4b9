//! Pluggable scoring strategy

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::pii::{PiiMatch, PiiPattern};
use crate::domain::DomainError;

/// One method per score kind used by the pipelines.
///
/// The orchestration core is agnostic to how scores are computed (keyword overlap,
/// embeddings, LLM prompting). Every float is expected in [0, 1]; consumers clamp.
#[async_trait]
pub trait ScoringStrategy: Send + Sync + Debug {
    /// Whether the input can be answered without evidence. Local and infallible.
    fn is_direct_answerable(&self, input: &str) -> bool;

    /// Relevance of a candidate chunk to the query
    async fn score_relevance(&self, query: &str, text: &str) -> Result<f32, DomainError>;

    /// Fraction of the candidate's vocabulary supported by the evidence text
    async fn score_grounding(&self, candidate: &str, evidence_text: &str)
        -> Result<f32, DomainError>;

    /// Normalised amount of absolute or overreaching language in the candidate
    async fn score_hallucination(&self, candidate: &str) -> Result<f32, DomainError>;

    /// Keyword density of a category's keyword set within the text
    async fn score_category(&self, text: &str, keywords: &[&str]) -> Result<f32, DomainError>;

    /// Matches of a PII pattern within the text
    async fn score_pii_pattern(
        &self,
        text: &str,
        pattern: &PiiPattern,
    ) -> Result<Vec<PiiMatch>, DomainError>;

    fn strategy_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Mock scoring strategy for testing
    #[derive(Debug, Default)]
    pub struct MockScoringStrategy {
        direct: bool,
        relevance: f32,
        grounding: f32,
        hallucination: f32,
        category: Option<f32>,
        error: Option<String>,
        relevance_calls: AtomicUsize,
        validation_calls: AtomicUsize,
    }

    impl MockScoringStrategy {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_direct(mut self, direct: bool) -> Self {
            self.direct = direct;
            self
        }

        pub fn with_relevance(mut self, score: f32) -> Self {
            self.relevance = score;
            self
        }

        pub fn with_grounding(mut self, score: f32) -> Self {
            self.grounding = score;
            self
        }

        pub fn with_hallucination(mut self, score: f32) -> Self {
            self.hallucination = score;
            self
        }

        pub fn with_category(mut self, score: f32) -> Self {
            self.category = Some(score);
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn relevance_calls(&self) -> usize {
            self.relevance_calls.load(Ordering::SeqCst)
        }

        pub fn validation_calls(&self) -> usize {
            self.validation_calls.load(Ordering::SeqCst)
        }

        fn check_error(&self) -> Result<(), DomainError> {
            match &self.error {
                Some(error) => Err(DomainError::scoring("mock", error)),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ScoringStrategy for MockScoringStrategy {
        fn is_direct_answerable(&self, _input: &str) -> bool {
            self.direct
        }

        async fn score_relevance(&self, _query: &str, _text: &str) -> Result<f32, DomainError> {
            self.relevance_calls.fetch_add(1, Ordering::SeqCst);
            self.check_error()?;
            Ok(self.relevance)
        }

        async fn score_grounding(
            &self,
            _candidate: &str,
            _evidence_text: &str,
        ) -> Result<f32, DomainError> {
            self.validation_calls.fetch_add(1, Ordering::SeqCst);
            self.check_error()?;
            Ok(self.grounding)
        }

        async fn score_hallucination(&self, _candidate: &str) -> Result<f32, DomainError> {
            self.check_error()?;
            Ok(self.hallucination)
        }

        async fn score_category(&self, _text: &str, keywords: &[&str]) -> Result<f32, DomainError> {
            self.check_error()?;
            Ok(self.category.unwrap_or(if keywords.is_empty() { 0.0 } else { 0.5 }))
        }

        async fn score_pii_pattern(
            &self,
            text: &str,
            pattern: &PiiPattern,
        ) -> Result<Vec<PiiMatch>, DomainError> {
            self.check_error()?;
            Ok(pattern.find_all(text))
        }

        fn strategy_name(&self) -> &'static str {
            "mock"
        }
    }
}
