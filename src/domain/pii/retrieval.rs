//! Pattern scanning as the retrieval step of PII screening

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::config::PiiConfig;
use super::detection::PiiDetection;
use super::patterns::{PiiMatch, PiiType, base_patterns, deep_patterns};
use crate::domain::DomainError;
use crate::domain::pipeline::{
    Evidence, QueryRewriter, RetrievalRequest, Retriever, RewriteContext,
};
use crate::domain::scoring::ScoringStrategy;

/// Scans the document with the pattern table, one candidate per detected type.
///
/// The first attempt uses the base table; retries widen to the deep scan.
#[derive(Debug, Clone)]
pub struct PatternRetriever {
    strategy: Arc<dyn ScoringStrategy>,
    config: PiiConfig,
}

impl PatternRetriever {
    pub fn new(strategy: Arc<dyn ScoringStrategy>, config: PiiConfig) -> Self {
        Self { strategy, config }
    }
}

#[async_trait]
impl Retriever for PatternRetriever {
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<Evidence>, DomainError> {
        let deep = request.attempt > 0;
        let patterns: Vec<_> = if deep {
            deep_patterns().collect()
        } else {
            base_patterns().collect()
        };

        let mut by_type: BTreeMap<PiiType, Vec<PiiMatch>> = BTreeMap::new();
        for pattern in patterns {
            let matches = self
                .strategy
                .score_pii_pattern(&request.query, pattern)
                .await?;
            if !matches.is_empty() {
                by_type.entry(pattern.pii_type()).or_default().extend(matches);
            }
        }

        debug!(deep, types = by_type.len(), "PII pattern scan");

        Ok(by_type
            .into_iter()
            .map(|(pii_type, matches)| {
                PiiDetection::new(pii_type, matches, self.config.max_samples)
                    .to_evidence(self.config.count_normalizer)
            })
            .collect())
    }
}

/// Keeps scanning the whole document; retries differ by scan depth, not text
#[derive(Debug, Clone, Default)]
pub struct DocumentRewriter;

impl QueryRewriter for DocumentRewriter {
    fn rewrite(&self, original: &str, _context: &RewriteContext<'_>) -> String {
        original.to_string()
    }
}
