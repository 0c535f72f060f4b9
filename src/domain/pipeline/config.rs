//! Pipeline configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the lexical router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Confidence reported when the router decides to skip retrieval
    #[serde(default = "default_skip_confidence")]
    pub skip_confidence: f32,
    /// Confidence reported when the input needs evidence
    #[serde(default = "default_proceed_confidence")]
    pub proceed_confidence: f32,
    /// Inputs with this many words or more are never "simple"
    #[serde(default = "default_max_simple_words")]
    pub max_simple_words: usize,
    /// Definitional lexical patterns (matched case-insensitively)
    #[serde(default = "default_simple_patterns")]
    pub simple_patterns: Vec<String>,
}

fn default_skip_confidence() -> f32 {
    0.95
}

fn default_proceed_confidence() -> f32 {
    0.85
}

fn default_max_simple_words() -> usize {
    10
}

fn default_simple_patterns() -> Vec<String> {
    ["what is", "define", "explain", "how to"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            skip_confidence: default_skip_confidence(),
            proceed_confidence: default_proceed_confidence(),
            max_simple_words: default_max_simple_words(),
            simple_patterns: default_simple_patterns(),
        }
    }
}

/// Configuration shared by every pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Retry budget of each bounded loop
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Number of candidates requested from the retriever
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Candidates at or above this score survive grading
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,
    /// Answers at or above this score pass validation
    #[serde(default = "default_validation_threshold")]
    pub validation_threshold: f32,
    /// Marker count that saturates the hallucination score
    #[serde(default = "default_hallucination_normalizer")]
    pub hallucination_normalizer: f32,
    /// Confidence reported for answers that exhausted validation
    #[serde(default = "default_unvalidated_confidence")]
    pub unvalidated_confidence: f32,
    /// Upper bound for any single external call
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    #[serde(default)]
    pub router: RouterConfig,
}

fn default_max_retries() -> u32 {
    3
}

fn default_top_k() -> usize {
    5
}

fn default_relevance_threshold() -> f32 {
    0.7
}

fn default_validation_threshold() -> f32 {
    0.8
}

fn default_hallucination_normalizer() -> f32 {
    5.0
}

fn default_unvalidated_confidence() -> f32 {
    0.5
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            top_k: default_top_k(),
            relevance_threshold: default_relevance_threshold(),
            validation_threshold: default_validation_threshold(),
            hallucination_normalizer: default_hallucination_normalizer(),
            unvalidated_confidence: default_unvalidated_confidence(),
            call_timeout_ms: default_call_timeout_ms(),
            router: RouterConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_relevance_threshold(mut self, threshold: f32) -> Self {
        self.relevance_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_validation_threshold(mut self, threshold: f32) -> Self {
        self.validation_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_unvalidated_confidence(mut self, confidence: f32) -> Self {
        self.unvalidated_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_hallucination_normalizer(mut self, normalizer: f32) -> Self {
        self.hallucination_normalizer = normalizer.max(1.0);
        self
    }

    pub fn with_call_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.call_timeout_ms = timeout_ms;
        self
    }

    pub fn with_router(mut self, router: RouterConfig) -> Self {
        self.router = router;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}
