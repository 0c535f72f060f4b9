//! Quick-scan router for PII screening

use tracing::debug;

use super::config::PiiConfig;
use super::detection::scan;
use super::patterns::base_patterns;
use crate::domain::pipeline::{PipelineContext, Route, StagePayload, StageResult};

/// Answers directly when the quick scan finds many matches of every detected type
#[derive(Debug, Clone)]
pub struct PatternRouter {
    config: PiiConfig,
}

impl PatternRouter {
    pub fn new(config: PiiConfig) -> Self {
        Self { config }
    }
}

impl Route for PatternRouter {
    fn route(&self, input: &str, _context: &PipelineContext) -> StageResult {
        let detections = scan(input, base_patterns(), self.config.max_samples);

        let confidence = if detections.is_empty() {
            0.0
        } else {
            detections
                .iter()
                .map(|d| d.count_confidence(self.config.count_normalizer))
                .sum::<f32>()
                / detections.len() as f32
        };

        debug!(types = detections.len(), confidence, "PII quick scan");

        let items = detections
            .iter()
            .map(|d| d.to_evidence(self.config.count_normalizer))
            .collect();
        let payload = StagePayload::Detections { items };

        if confidence > self.config.skip_threshold {
            StageResult::skip(confidence, "Quick scan is conclusive").with_payload(payload)
        } else {
            StageResult::proceed(confidence, "Quick scan needs validation").with_payload(payload)
        }
    }
}
