//! Scoring strategy implementations

mod keyword;
mod llm;

pub use keyword::{HALLUCINATION_MARKERS, KeywordScoringStrategy, count_markers};
pub use llm::LlmScoringStrategy;
