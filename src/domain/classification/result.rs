//! Classification result record

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::{Category, CategoryLabel};
use crate::domain::DomainError;
use crate::domain::pipeline::{PipelineOutcome, PipelineState, StagePayload};

pub const UNVALIDATED_WARNING: &str = "Classification could not be fully validated";

/// Which path a classification run took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationTag {
    RouterDirect,
    FailedRetrieval,
    AgenticClassification,
    AgenticClassificationUnvalidated,
    EmptyDocument,
    Error,
}

impl ClassificationTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RouterDirect => "router_direct",
            Self::FailedRetrieval => "failed_retrieval",
            Self::AgenticClassification => "agentic_classification",
            Self::AgenticClassificationUnvalidated => "agentic_classification_unvalidated",
            Self::EmptyDocument => "empty_document",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ClassificationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetadata {
    pub run_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub retrieval_retries: u32,
    pub validation_retries: u32,
    /// Policy documents that supported the category
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supporting_policies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// Output of `classify_document`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub confidence: f32,
    pub pipeline_tag: ClassificationTag,
    pub metadata: ClassificationMetadata,
}

impl ClassificationResult {
    pub fn from_outcome(outcome: PipelineOutcome<CategoryLabel>) -> Self {
        let mut metadata = ClassificationMetadata {
            run_id: Some(outcome.run_id),
            started_at: Some(outcome.started_at),
            retrieval_retries: outcome.retrieval_retries,
            validation_retries: outcome.validation_retries,
            supporting_policies: outcome.evidence.iter().map(|e| e.id.clone()).collect(),
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            ..Default::default()
        };

        let (category, pipeline_tag) = match outcome.state {
            PipelineState::Skipped => {
                let category = match &outcome.route.payload {
                    StagePayload::Label { label, .. } => {
                        Category::from_str_opt(label).unwrap_or(Category::Other)
                    }
                    _ => Category::Other,
                };
                (category, ClassificationTag::RouterDirect)
            }
            PipelineState::FailedRetrieval => (Category::Other, ClassificationTag::FailedRetrieval),
            PipelineState::Done => {
                metadata.variant = Some(outcome.variant.to_string());
                (
                    outcome.candidate.map_or(Category::Other, |c| c.category),
                    ClassificationTag::AgenticClassification,
                )
            }
            PipelineState::DoneUnvalidated => {
                metadata.variant = Some(outcome.variant.to_string());
                metadata.warning = Some(UNVALIDATED_WARNING.to_string());
                (
                    outcome.candidate.map_or(Category::Other, |c| c.category),
                    ClassificationTag::AgenticClassificationUnvalidated,
                )
            }
            state => {
                metadata.error = Some(format!("run ended in non-terminal state {}", state));
                return Self {
                    category: Category::Other,
                    confidence: 0.0,
                    pipeline_tag: ClassificationTag::Error,
                    metadata,
                };
            }
        };

        Self {
            category,
            confidence: outcome.confidence,
            pipeline_tag,
            metadata,
        }
    }

    /// Text too short to classify
    pub fn empty_document() -> Self {
        Self {
            category: Category::Other,
            confidence: 0.0,
            pipeline_tag: ClassificationTag::EmptyDocument,
            metadata: ClassificationMetadata::default(),
        }
    }

    /// Fail-open result for unexpected internal failure
    pub fn error(error: &DomainError) -> Self {
        Self {
            category: Category::Other,
            confidence: 0.0,
            pipeline_tag: ClassificationTag::Error,
            metadata: ClassificationMetadata {
                error: Some(error.to_string()),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::pipeline::{StageResult, VariantTag};

    fn outcome(state: PipelineState) -> PipelineOutcome<CategoryLabel> {
        PipelineOutcome {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            state,
            route: StageResult::skip(0.96, "keywords").with_payload(StagePayload::Label {
                label: "RATION_CARD".to_string(),
                score: 0.96,
            }),
            evidence: Vec::new(),
            candidate: Some(CategoryLabel::new(Category::LandRecord, 0.8)),
            variant: VariantTag::Default,
            confidence: 0.96,
            validation: None,
            retrieval_retries: 0,
            validation_retries: 0,
            final_query: String::new(),
            history: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_router_direct_uses_route_label() {
        let result = ClassificationResult::from_outcome(outcome(PipelineState::Skipped));

        assert_eq!(result.category, Category::RationCard);
        assert_eq!(result.pipeline_tag, ClassificationTag::RouterDirect);
        assert_eq!(result.confidence, 0.96);
    }

    #[test]
    fn test_done_uses_candidate() {
        let result = ClassificationResult::from_outcome(outcome(PipelineState::Done));

        assert_eq!(result.category, Category::LandRecord);
        assert_eq!(result.pipeline_tag.as_str(), "agentic_classification");
    }

    #[test]
    fn test_error_is_fail_open() {
        let result = ClassificationResult::error(&DomainError::internal("boom"));

        assert_eq!(result.category, Category::Other);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.pipeline_tag, ClassificationTag::Error);
    }
}
