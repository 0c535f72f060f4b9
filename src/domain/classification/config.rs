//! Classification pipeline configuration

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::clamp_unit;

/// Thresholds and weights of the classification pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Router confidence above which the keyword classification is accepted directly
    #[serde(default = "default_skip_threshold")]
    pub skip_threshold: f32,

    /// Multiplier applied to the best keyword density by the router
    #[serde(default = "default_router_boost")]
    pub router_boost: f32,

    /// Minimum support score for a policy document to be retained
    #[serde(default = "default_grade_threshold")]
    pub grade_threshold: f32,

    /// Added to a category's density when the knowledge graph supports it
    #[serde(default = "default_graph_boost")]
    pub graph_boost: f32,

    /// Validated confidence must exceed this
    #[serde(default = "default_validation_threshold")]
    pub validation_threshold: f32,

    /// Factor applied when the validator's own classification disagrees
    #[serde(default = "default_mismatch_penalty")]
    pub mismatch_penalty: f32,

    /// Characters of document text sent to the knowledge graph per attempt
    #[serde(default = "default_window_chars")]
    pub window_chars: usize,

    #[serde(default = "default_max_hops")]
    pub max_hops: usize,

    /// Documents shorter than this are reported as empty
    #[serde(default = "default_min_document_chars")]
    pub min_document_chars: usize,
}

fn default_skip_threshold() -> f32 {
    0.85
}

fn default_router_boost() -> f32 {
    1.2
}

fn default_grade_threshold() -> f32 {
    0.75
}

fn default_graph_boost() -> f32 {
    0.15
}

fn default_validation_threshold() -> f32 {
    0.6
}

fn default_mismatch_penalty() -> f32 {
    0.7
}

fn default_window_chars() -> usize {
    500
}

fn default_max_hops() -> usize {
    2
}

fn default_min_document_chars() -> usize {
    10
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            skip_threshold: default_skip_threshold(),
            router_boost: default_router_boost(),
            grade_threshold: default_grade_threshold(),
            graph_boost: default_graph_boost(),
            validation_threshold: default_validation_threshold(),
            mismatch_penalty: default_mismatch_penalty(),
            window_chars: default_window_chars(),
            max_hops: default_max_hops(),
            min_document_chars: default_min_document_chars(),
        }
    }
}

impl ClassificationConfig {
    pub fn with_skip_threshold(mut self, threshold: f32) -> Self {
        self.skip_threshold = clamp_unit(threshold);
        self
    }

    pub fn with_grade_threshold(mut self, threshold: f32) -> Self {
        self.grade_threshold = clamp_unit(threshold);
        self
    }

    pub fn with_validation_threshold(mut self, threshold: f32) -> Self {
        self.validation_threshold = clamp_unit(threshold);
        self
    }

    pub fn with_window_chars(mut self, window_chars: usize) -> Self {
        self.window_chars = window_chars.max(1);
        self
    }
}
