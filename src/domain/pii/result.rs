//! PII screening result record

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::detection::PiiDetection;
use super::generator::PiiVerdict;
use super::patterns::PiiType;
use crate::domain::DomainError;
use crate::domain::pipeline::{PipelineOutcome, PipelineState, StagePayload};

pub const UNVALIDATED_WARNING: &str = "PII verdict could not be fully validated";

/// Confidence reported whenever the screener falls back to "has PII"
pub const FAIL_CLOSED_CONFIDENCE: f32 = 0.5;

/// Which path a screening run took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiTag {
    RouterDirect,
    NoPiiDetected,
    AgenticPii,
    AgenticPiiUnvalidated,
    EmptyDocument,
    Error,
}

impl PiiTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RouterDirect => "router_direct",
            Self::NoPiiDetected => "no_pii_detected",
            Self::AgenticPii => "agentic_pii",
            Self::AgenticPiiUnvalidated => "agentic_pii_unvalidated",
            Self::EmptyDocument => "empty_document",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for PiiTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PiiMetadata {
    pub run_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub retrieval_retries: u32,
    pub validation_retries: u32,
    /// Whether the extended pattern table was used
    pub deep_scan: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detections: Vec<PiiDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// Output of `screen_for_pii`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiScreeningResult {
    pub has_pii: bool,
    pub confidence: f32,
    pub pii_types: Vec<PiiType>,
    pub pipeline_tag: PiiTag,
    pub metadata: PiiMetadata,
}

impl PiiScreeningResult {
    pub fn from_outcome(outcome: PipelineOutcome<PiiVerdict>) -> Self {
        let mut metadata = PiiMetadata {
            run_id: Some(outcome.run_id),
            started_at: Some(outcome.started_at),
            retrieval_retries: outcome.retrieval_retries,
            validation_retries: outcome.validation_retries,
            deep_scan: outcome.retrieval_retries > 0,
            detections: outcome
                .evidence
                .iter()
                .filter_map(PiiDetection::from_evidence)
                .collect(),
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            ..Default::default()
        };

        match outcome.state {
            PipelineState::Skipped => {
                if let StagePayload::Detections { items } = &outcome.route.payload {
                    metadata.detections =
                        items.iter().filter_map(PiiDetection::from_evidence).collect();
                }
                let pii_types: Vec<PiiType> =
                    metadata.detections.iter().map(|d| d.pii_type).collect();

                Self {
                    has_pii: !pii_types.is_empty(),
                    confidence: outcome.confidence,
                    pii_types,
                    pipeline_tag: PiiTag::RouterDirect,
                    metadata,
                }
            }
            PipelineState::FailedRetrieval => Self {
                has_pii: false,
                confidence: 0.0,
                pii_types: Vec::new(),
                pipeline_tag: PiiTag::NoPiiDetected,
                metadata,
            },
            PipelineState::Done => {
                let verdict = outcome.candidate.unwrap_or_else(PiiVerdict::clean);
                Self {
                    has_pii: verdict.has_pii,
                    confidence: outcome.confidence,
                    pii_types: verdict.pii_types,
                    pipeline_tag: PiiTag::AgenticPii,
                    metadata,
                }
            }
            PipelineState::DoneUnvalidated => {
                metadata.warning = Some(UNVALIDATED_WARNING.to_string());
                let pii_types = outcome.candidate.map(|v| v.pii_types).unwrap_or_default();
                Self {
                    has_pii: true,
                    confidence: FAIL_CLOSED_CONFIDENCE,
                    pii_types,
                    pipeline_tag: PiiTag::AgenticPiiUnvalidated,
                    metadata,
                }
            }
            state => {
                metadata.error = Some(format!("run ended in non-terminal state {}", state));
                Self::fail_closed(metadata)
            }
        }
    }

    pub fn empty_document() -> Self {
        Self {
            has_pii: false,
            confidence: 0.0,
            pii_types: Vec::new(),
            pipeline_tag: PiiTag::EmptyDocument,
            metadata: PiiMetadata::default(),
        }
    }

    /// Fail-closed result for unexpected internal failure
    pub fn error(error: &DomainError) -> Self {
        Self::fail_closed(PiiMetadata {
            error: Some(error.to_string()),
            ..Default::default()
        })
    }

    fn fail_closed(metadata: PiiMetadata) -> Self {
        Self {
            has_pii: true,
            confidence: FAIL_CLOSED_CONFIDENCE,
            pii_types: Vec::new(),
            pipeline_tag: PiiTag::Error,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use super::*;
    use crate::domain::pipeline::{StageResult, VariantTag};

    fn outcome(state: PipelineState) -> PipelineOutcome<PiiVerdict> {
        PipelineOutcome {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            state,
            route: StageResult::proceed(0.2, "quick scan"),
            evidence: Vec::new(),
            candidate: Some(PiiVerdict::new(BTreeSet::from([PiiType::Email]), false)),
            variant: VariantTag::Default,
            confidence: 0.9,
            validation: None,
            retrieval_retries: 1,
            validation_retries: 3,
            final_query: String::new(),
            history: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_error_is_fail_closed() {
        let result = PiiScreeningResult::error(&DomainError::internal("boom"));

        assert!(result.has_pii);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.pipeline_tag, PiiTag::Error);
        assert_eq!(result.metadata.error.as_deref(), Some("Internal error: boom"));
    }

    #[test]
    fn test_unvalidated_is_fail_closed() {
        let result = PiiScreeningResult::from_outcome(outcome(PipelineState::DoneUnvalidated));

        assert!(result.has_pii);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.pipeline_tag.as_str(), "agentic_pii_unvalidated");
        assert!(result.metadata.warning.is_some());
        assert!(result.metadata.deep_scan);
    }

    #[test]
    fn test_exhausted_retrieval_reports_no_pii() {
        let result = PiiScreeningResult::from_outcome(outcome(PipelineState::FailedRetrieval));

        assert!(!result.has_pii);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.pipeline_tag, PiiTag::NoPiiDetected);
    }

    #[test]
    fn test_done_uses_verdict() {
        let result = PiiScreeningResult::from_outcome(outcome(PipelineState::Done));

        assert!(result.has_pii);
        assert_eq!(result.pii_types, vec![PiiType::Email]);
        assert_eq!(result.confidence, 0.9);
    }
}
