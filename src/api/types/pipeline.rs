//! Request bodies of the pipeline endpoints

use serde::Deserialize;
use validator::Validate;

use crate::domain::{Document, PipelineContext};

/// Body of `POST /v1/query`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1, max = 4000))]
    pub query: String,
    #[serde(default)]
    pub context: PipelineContext,
}

/// Body of `POST /v1/classify` and `POST /v1/screen`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DocumentRequest {
    #[validate(length(max = 1000000))]
    pub content: String,
    /// Used for format detection when `mime_type` is absent
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub filename: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub mime_type: Option<String>,
}

impl From<DocumentRequest> for Document {
    fn from(request: DocumentRequest) -> Self {
        let mut document = Document::from_text(request.content);
        document.filename = request.filename;
        document.mime_type = request.mime_type;
        document
    }
}
