//! Pipeline services exposing the three public operations

mod classification_service;
mod pii_screening_service;
mod query_service;

pub use classification_service::{CLASSIFICATION_PIPELINE, ClassificationService};
pub use pii_screening_service::{PII_PIPELINE, PiiScreeningService};
pub use query_service::{QA_PIPELINE, QueryService};
