//! Gate decisions and stage results

use std::fmt;

use serde::{Deserialize, Serialize};

use super::evidence::Evidence;

/// Outcome of any gate in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Continue to the next stage
    Proceed,
    /// Rewrite or regenerate and try again
    Retry,
    /// The remaining stages are not needed
    Skip,
    /// The stage could not produce a usable result
    Fail,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proceed => "proceed",
            Self::Retry => "retry",
            Self::Skip => "skip",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured data attached to a stage result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StagePayload {
    #[default]
    Empty,
    /// Routing hint from a router stage
    Route { route: String },
    /// Candidates retained by a grader
    Grade {
        relevant: Vec<Evidence>,
        avg_relevance: f32,
    },
    /// Answer validation breakdown
    Validation {
        is_valid: bool,
        grounding_score: f32,
        hallucination_score: f32,
    },
    /// A label with the score that selected it
    Label { label: String, score: f32 },
    /// Detected items, each as a piece of evidence
    Detections { items: Vec<Evidence> },
}

impl StagePayload {
    /// Retained candidates, if this is a grading payload
    pub fn relevant(&self) -> &[Evidence] {
        match self {
            Self::Grade { relevant, .. } => relevant,
            _ => &[],
        }
    }

    /// Consume the payload and return the retained candidates
    pub fn into_relevant(self) -> Vec<Evidence> {
        match self {
            Self::Grade { relevant, .. } => relevant,
            _ => Vec::new(),
        }
    }
}

/// Result produced by a single stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub decision: Decision,
    /// Always within [0, 1]
    pub confidence: f32,
    pub reasoning: String,
    #[serde(default)]
    pub payload: StagePayload,
    #[serde(default)]
    pub retry_count: u32,
}

impl StageResult {
    /// Create a new stage result, clamping the confidence to [0, 1]
    pub fn new(decision: Decision, confidence: f32, reasoning: impl Into<String>) -> Self {
        Self {
            decision,
            confidence: clamp_unit(confidence),
            reasoning: reasoning.into(),
            payload: StagePayload::Empty,
            retry_count: 0,
        }
    }

    pub fn proceed(confidence: f32, reasoning: impl Into<String>) -> Self {
        Self::new(Decision::Proceed, confidence, reasoning)
    }

    pub fn retry(confidence: f32, reasoning: impl Into<String>) -> Self {
        Self::new(Decision::Retry, confidence, reasoning)
    }

    pub fn skip(confidence: f32, reasoning: impl Into<String>) -> Self {
        Self::new(Decision::Skip, confidence, reasoning)
    }

    pub fn fail(reasoning: impl Into<String>) -> Self {
        Self::new(Decision::Fail, 0.0, reasoning)
    }

    pub fn with_payload(mut self, payload: StagePayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn is_proceed(&self) -> bool {
        self.decision == Decision::Proceed
    }

    pub fn is_skip(&self) -> bool {
        self.decision == Decision::Skip
    }
}

/// Clamp a score into [0, 1], mapping NaN to 0
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(StageResult::proceed(1.7, "x").confidence, 1.0);
        assert_eq!(StageResult::retry(-0.2, "x").confidence, 0.0);
        assert_eq!(StageResult::retry(f32::NAN, "x").confidence, 0.0);
    }

    #[test]
    fn test_fail_has_zero_confidence() {
        let result = StageResult::fail("scorer unavailable");

        assert_eq!(result.decision, Decision::Fail);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.retry_count, 0);
    }

    #[test]
    fn test_decision_serializes_snake_case() {
        let json = serde_json::to_string(&Decision::Proceed).unwrap();
        assert_eq!(json, "\"proceed\"");
        assert_eq!(Decision::Skip.to_string(), "skip");
    }

    #[test]
    fn test_payload_relevant_accessors() {
        let payload = StagePayload::Grade {
            relevant: vec![Evidence::new("c1", "text", 0.8)],
            avg_relevance: 0.8,
        };

        assert_eq!(payload.relevant().len(), 1);
        assert_eq!(payload.into_relevant()[0].id, "c1");
        assert!(StagePayload::Empty.relevant().is_empty());
    }
}
