//! PII screening configuration

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::clamp_unit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiConfig {
    /// Quick-scan confidence above which the router answers directly
    #[serde(default = "default_skip_threshold")]
    pub skip_threshold: f32,

    /// Match count that saturates a type's quick-scan confidence
    #[serde(default = "default_count_normalizer")]
    pub count_normalizer: f32,

    /// Share of detected types a verdict must cover
    #[serde(default = "default_validation_threshold")]
    pub validation_threshold: f32,

    /// Characters before a match searched for a context cue
    #[serde(default = "default_context_window_chars")]
    pub context_window_chars: usize,

    /// Matches kept per detected type
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

fn default_skip_threshold() -> f32 {
    0.9
}

fn default_count_normalizer() -> f32 {
    5.0
}

fn default_validation_threshold() -> f32 {
    0.85
}

fn default_context_window_chars() -> usize {
    40
}

fn default_max_samples() -> usize {
    3
}

impl Default for PiiConfig {
    fn default() -> Self {
        Self {
            skip_threshold: default_skip_threshold(),
            count_normalizer: default_count_normalizer(),
            validation_threshold: default_validation_threshold(),
            context_window_chars: default_context_window_chars(),
            max_samples: default_max_samples(),
        }
    }
}

impl PiiConfig {
    pub fn with_skip_threshold(mut self, threshold: f32) -> Self {
        self.skip_threshold = clamp_unit(threshold);
        self
    }

    pub fn with_validation_threshold(mut self, threshold: f32) -> Self {
        self.validation_threshold = clamp_unit(threshold);
        self
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples.max(1);
        self
    }
}
