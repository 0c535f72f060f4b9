//! Router stage for the question answering pipeline

use std::sync::Arc;

use tracing::debug;

use super::config::RouterConfig;
use super::decision::{StagePayload, StageResult};
use super::stage::{PipelineContext, Route};
use crate::domain::scoring::ScoringStrategy;

pub const ROUTE_DIRECT_ANSWER: &str = "direct_answer";
pub const ROUTE_RETRIEVAL_NEEDED: &str = "retrieval_needed";

/// Whether the input has the "simple" shape: short and definitional
pub fn is_simple_shape(input: &str, config: &RouterConfig) -> bool {
    let words = input.split_whitespace().count();
    if words == 0 || words >= config.max_simple_words {
        return false;
    }

    let lowered = input.to_lowercase();
    config
        .simple_patterns
        .iter()
        .any(|pattern| lowered.contains(&pattern.to_lowercase()))
}

/// Decides whether a query can be answered without the retrieval loop
#[derive(Debug, Clone)]
pub struct RouterStage {
    strategy: Arc<dyn ScoringStrategy>,
    config: RouterConfig,
}

impl RouterStage {
    pub fn new(strategy: Arc<dyn ScoringStrategy>, config: RouterConfig) -> Self {
        Self { strategy, config }
    }

    fn proceed(&self, reasoning: &str) -> StageResult {
        StageResult::proceed(self.config.proceed_confidence, reasoning).with_payload(
            StagePayload::Route {
                route: ROUTE_RETRIEVAL_NEEDED.to_string(),
            },
        )
    }
}

impl Route for RouterStage {
    fn route(&self, input: &str, _context: &PipelineContext) -> StageResult {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return self.proceed("Empty input routed to retrieval");
        }

        if self.strategy.is_direct_answerable(trimmed) {
            debug!(strategy = self.strategy.strategy_name(), "Router: direct answer");
            return StageResult::skip(
                self.config.skip_confidence,
                "Query is simple and can be answered directly without retrieval",
            )
            .with_payload(StagePayload::Route {
                route: ROUTE_DIRECT_ANSWER.to_string(),
            });
        }

        self.proceed("Query requires retrieval from knowledge base")
    }
}
