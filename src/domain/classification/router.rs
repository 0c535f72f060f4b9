//! Keyword router for document classification

use tracing::debug;

use super::category::best_category;
use super::config::ClassificationConfig;
use crate::domain::pipeline::{PipelineContext, Route, StagePayload, StageResult};

/// Classifies by keyword density and skips the pipeline when confident
#[derive(Debug, Clone)]
pub struct CategoryRouter {
    skip_threshold: f32,
    boost: f32,
}

impl CategoryRouter {
    pub fn new(config: &ClassificationConfig) -> Self {
        Self {
            skip_threshold: config.skip_threshold,
            boost: config.router_boost,
        }
    }
}

impl Route for CategoryRouter {
    fn route(&self, input: &str, _context: &PipelineContext) -> StageResult {
        let (category, density) = best_category(input);
        let confidence = (density * self.boost).min(1.0);
        let payload = StagePayload::Label {
            label: category.as_str().to_string(),
            score: confidence,
        };

        debug!(%category, confidence, "Category router scored document");

        if confidence > self.skip_threshold {
            StageResult::skip(confidence, format!("Keyword classification as {}", category))
                .with_payload(payload)
        } else {
            StageResult::proceed(confidence, "Keyword classification not conclusive")
                .with_payload(payload)
        }
    }
}
