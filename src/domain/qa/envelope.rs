//! Result envelope of the question answering pipeline

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;
use crate::domain::pipeline::{
    Decision, Evidence, PipelineOutcome, PipelineState, StagePayload,
};

pub const FAILED_RETRIEVAL_ANSWER: &str =
    "Unable to find relevant information after multiple attempts.";
pub const FAILED_ANSWER: &str = "Unable to answer the query due to an internal error.";
pub const UNVALIDATED_WARNING: &str = "Answer could not be fully validated";

/// Which path a run took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineTag {
    DirectAnswer,
    FailedRetrieval,
    AgenticRag,
    AgenticRagUnvalidated,
    Failed,
}

impl PipelineTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectAnswer => "direct_answer",
            Self::FailedRetrieval => "failed_retrieval",
            Self::AgenticRag => "agentic_rag",
            Self::AgenticRagUnvalidated => "agentic_rag_unvalidated",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observability data attached to every envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub router_decision: Option<Decision>,
    pub retrieval_retries: u32,
    pub validation_retries: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewritten_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grounding_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hallucination_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// The answer was produced without evidence
    #[serde(default)]
    pub is_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// Externally visible output of `process_query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub answer: String,
    pub confidence: f32,
    /// Decision that ended the run
    pub decision: Decision,
    pub evidence_used: Vec<Evidence>,
    pub pipeline_tag: PipelineTag,
    pub metadata: RunMetadata,
}

impl ResultEnvelope {
    /// Map a finished run onto the envelope. `direct_answer` is used for skipped runs.
    pub fn from_outcome(outcome: PipelineOutcome<String>, direct_answer: String) -> Self {
        let mut metadata = RunMetadata {
            run_id: Some(outcome.run_id),
            started_at: Some(outcome.started_at),
            router_decision: Some(outcome.route.decision),
            retrieval_retries: outcome.retrieval_retries,
            validation_retries: outcome.validation_retries,
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            ..Default::default()
        };

        if outcome.retrieval_retries > 0 {
            metadata.rewritten_query = Some(outcome.final_query.clone());
        }

        if let Some(StagePayload::Validation {
            grounding_score,
            hallucination_score,
            ..
        }) = outcome.validation.as_ref().map(|v| &v.payload)
        {
            metadata.grounding_score = Some(*grounding_score);
            metadata.hallucination_score = Some(*hallucination_score);
        }
        metadata.validation_score = outcome.validation.as_ref().map(|v| v.confidence);

        let (answer, decision, pipeline_tag) = match outcome.state {
            PipelineState::Skipped => {
                metadata.is_fallback = true;
                (direct_answer, Decision::Skip, PipelineTag::DirectAnswer)
            }
            PipelineState::FailedRetrieval => (
                FAILED_RETRIEVAL_ANSWER.to_string(),
                Decision::Retry,
                PipelineTag::FailedRetrieval,
            ),
            PipelineState::Done => {
                metadata.variant = Some(outcome.variant.to_string());
                (
                    outcome.candidate.unwrap_or_default(),
                    Decision::Proceed,
                    PipelineTag::AgenticRag,
                )
            }
            PipelineState::DoneUnvalidated => {
                metadata.variant = Some(outcome.variant.to_string());
                metadata.warning = Some(UNVALIDATED_WARNING.to_string());
                (
                    outcome.candidate.unwrap_or_default(),
                    Decision::Retry,
                    PipelineTag::AgenticRagUnvalidated,
                )
            }
            state => {
                metadata.error = Some(format!("run ended in non-terminal state {}", state));
                (FAILED_ANSWER.to_string(), Decision::Fail, PipelineTag::Failed)
            }
        };

        Self {
            answer,
            confidence: outcome.confidence,
            decision,
            evidence_used: outcome.evidence,
            pipeline_tag,
            metadata,
        }
    }

    /// Fail-safe envelope for unexpected internal failure
    pub fn failed(error: &DomainError) -> Self {
        Self {
            answer: FAILED_ANSWER.to_string(),
            confidence: 0.0,
            decision: Decision::Fail,
            evidence_used: Vec::new(),
            pipeline_tag: PipelineTag::Failed,
            metadata: RunMetadata {
                error: Some(error.to_string()),
                ..Default::default()
            },
        }
    }

    pub fn is_validated(&self) -> bool {
        self.pipeline_tag == PipelineTag::AgenticRag
    }
}
