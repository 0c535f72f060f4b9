//! Lexical scoring strategy
//!
//! Term-overlap relevance and grounding, marker counting for overreaching
//! language, keyword density for categories and the regex table for PII.

use std::collections::HashSet;

use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::DomainError;
use crate::domain::pii::{PiiMatch, PiiPattern};
use crate::domain::pipeline::{RouterConfig, is_simple_shape};
use crate::domain::scoring::ScoringStrategy;
use crate::domain::scoring::text::{keyword_density, terms};

/// Absolute or overreaching expressions treated as hallucination signals
pub const HALLUCINATION_MARKERS: [&str; 9] = [
    "definitely",
    "certainly",
    "absolutely",
    "always",
    "never",
    "all",
    "none",
    "every",
    "no one",
];

/// Share of `reference` terms found in `text`, capped at 1.0
fn overlap(reference: &HashSet<String>, text: &HashSet<String>) -> f32 {
    if reference.is_empty() || text.is_empty() {
        return 0.0;
    }

    let shared = reference.intersection(text).count();
    (shared as f32 / reference.len() as f32).min(1.0)
}

/// Number of distinct markers present as whole words or phrases
pub fn count_markers(text: &str) -> usize {
    let words: Vec<String> = text.unicode_words().map(|w| w.to_lowercase()).collect();

    HALLUCINATION_MARKERS
        .iter()
        .filter(|marker| {
            let parts: Vec<&str> = marker.split_whitespace().collect();
            words
                .windows(parts.len())
                .any(|window| window.iter().zip(&parts).all(|(w, p)| w == p))
        })
        .count()
}

#[derive(Debug, Clone)]
pub struct KeywordScoringStrategy {
    router: RouterConfig,
    hallucination_normalizer: f32,
}

impl KeywordScoringStrategy {
    pub fn new(router: RouterConfig, hallucination_normalizer: f32) -> Self {
        Self {
            router,
            hallucination_normalizer: hallucination_normalizer.max(1.0),
        }
    }
}

impl Default for KeywordScoringStrategy {
    fn default() -> Self {
        Self::new(RouterConfig::default(), 5.0)
    }
}

#[async_trait]
impl ScoringStrategy for KeywordScoringStrategy {
    fn is_direct_answerable(&self, input: &str) -> bool {
        is_simple_shape(input, &self.router)
    }

    async fn score_relevance(&self, query: &str, text: &str) -> Result<f32, DomainError> {
        Ok(overlap(&terms(query), &terms(text)))
    }

    async fn score_grounding(
        &self,
        candidate: &str,
        evidence_text: &str,
    ) -> Result<f32, DomainError> {
        Ok(overlap(&terms(candidate), &terms(evidence_text)))
    }

    async fn score_hallucination(&self, candidate: &str) -> Result<f32, DomainError> {
        let markers = count_markers(candidate) as f32;
        Ok((markers / self.hallucination_normalizer).min(1.0))
    }

    async fn score_category(&self, text: &str, keywords: &[&str]) -> Result<f32, DomainError> {
        Ok(keyword_density(text, keywords))
    }

    async fn score_pii_pattern(
        &self,
        text: &str,
        pattern: &PiiPattern,
    ) -> Result<Vec<PiiMatch>, DomainError> {
        Ok(pattern.find_all(text))
    }

    fn strategy_name(&self) -> &'static str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> KeywordScoringStrategy {
        KeywordScoringStrategy::default()
    }

    #[test]
    fn test_direct_answerable_shape() {
        assert!(strategy().is_direct_answerable("What is a ration card?"));
        assert!(!strategy().is_direct_answerable(
            "What is the complete list of documents needed for transferring land ownership after inheritance"
        ));
        assert!(!strategy().is_direct_answerable("Ration card documents required"));
    }

    #[tokio::test]
    async fn test_relevance_is_query_term_overlap() {
        let score = strategy()
            .score_relevance("ration card income", "Ration card needs income proof")
            .await
            .unwrap();
        assert!((score - 1.0).abs() < 1e-6);

        let score = strategy()
            .score_relevance("ration card income", "Vehicle registration")
            .await
            .unwrap();
        assert_eq!(score, 0.0);
    }

    #[tokio::test]
    async fn test_grounding_is_candidate_term_overlap() {
        let score = strategy()
            .score_grounding("income proof required", "Requires income proof")
            .await
            .unwrap();
        assert!((score - 2.0 / 3.0).abs() < 1e-6);

        assert_eq!(strategy().score_grounding("", "text").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_hallucination_markers() {
        let score = strategy()
            .score_hallucination("You will definitely always get it")
            .await
            .unwrap();
        assert!((score - 0.4).abs() < 1e-6);

        let score = strategy()
            .score_hallucination("No one can call it small")
            .await
            .unwrap();
        assert!((score - 0.2).abs() < 1e-6);

        let saturated = strategy()
            .score_hallucination("all none every never always definitely certainly")
            .await
            .unwrap();
        assert_eq!(saturated, 1.0);
    }

    #[test]
    fn test_markers_match_whole_words() {
        assert_eq!(count_markers("call the small hall"), 0);
        assert_eq!(count_markers("Everyone knows"), 0);
    }
}
