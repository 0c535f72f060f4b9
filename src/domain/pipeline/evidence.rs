//! Retrieved evidence chunks

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A retrieved unit of reference text
///
/// `relevance_score` is only set once a grader has accepted the chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    pub text: String,
    /// Score assigned by the retriever (0.0 - 1.0)
    pub base_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Evidence {
    pub fn new(id: impl Into<String>, text: impl Into<String>, base_score: f32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            base_score,
            relevance_score: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Annotate the chunk with the relevance score that let it through grading
    pub fn graded(mut self, relevance_score: f32) -> Self {
        self.relevance_score = Some(relevance_score);
        self
    }

    pub fn is_graded(&self) -> bool {
        self.relevance_score.is_some()
    }

    /// String metadata value
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Join the text of a set of chunks, newline separated
pub fn joined_text(evidence: &[Evidence]) -> String {
    evidence
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
