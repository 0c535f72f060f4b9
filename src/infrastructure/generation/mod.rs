//! Answer generators

mod extractive;
mod llm;

pub use extractive::{EXCERPT_CHARS, ExtractiveGenerator};
pub use llm::LlmGenerator;
