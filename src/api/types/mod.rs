//! HTTP request, response and error types

pub mod error;
pub mod json;
pub mod pipeline;

pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
pub use pipeline::{DocumentRequest, QueryRequest};
