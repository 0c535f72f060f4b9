//! PII screening specialization
//!
//! A regex pattern table plus per-type context rules. Unexpected failures fail
//! closed: the document is reported as containing PII.

mod config;
mod detection;
mod generator;
mod grader;
mod patterns;
mod result;
mod retrieval;
mod router;
mod rules;
mod validator;

pub use config::PiiConfig;
pub use detection::{PiiDetection, scan};
pub use generator::{PiiGenerator, PiiVerdict};
pub use grader::PatternGrader;
pub use patterns::{PiiMatch, PiiPattern, PiiType, base_patterns, deep_patterns};
pub use result::{FAIL_CLOSED_CONFIDENCE, PiiMetadata, PiiScreeningResult, PiiTag};
pub use retrieval::{DocumentRewriter, PatternRetriever};
pub use router::PatternRouter;
pub use rules::{any_valid, is_valid_match};
pub use validator::PiiValidator;
