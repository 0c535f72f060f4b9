//! Documents submitted for classification or screening, and text extraction

use std::fmt::Debug;

use crate::domain::DomainError;

/// Raw document content
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentContent {
    /// Text content (already decoded)
    Text(String),
    /// Binary content (needs decoding)
    Bytes(Vec<u8>),
}

impl DocumentContent {
    /// Get content as text, decoding bytes as UTF-8 if necessary
    pub fn as_text(&self) -> Result<String, DomainError> {
        match self {
            Self::Text(s) => Ok(s.clone()),
            Self::Bytes(b) => String::from_utf8(b.clone())
                .map_err(|e| DomainError::validation(format!("Invalid UTF-8: {}", e))),
        }
    }
}

/// A document handed to `classify_document` or `screen_for_pii`
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub content: DocumentContent,
    /// Optional filename for format detection
    pub filename: Option<String>,
    pub mime_type: Option<String>,
}

impl Document {
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: DocumentContent::Text(content.into()),
            filename: None,
            mime_type: None,
        }
    }

    pub fn from_bytes(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: DocumentContent::Bytes(content.into()),
            filename: None,
            mime_type: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Converts one document format to plain text
pub trait FormatParser: Send + Sync + Debug {
    /// Get supported file extensions (e.g., ["txt", "text"])
    fn supported_extensions(&self) -> &[&str];

    /// Get supported MIME types (e.g., ["text/plain"])
    fn supported_mime_types(&self) -> &[&str];

    fn parse(&self, raw: &str) -> Result<String, DomainError>;

    /// Check if this parser supports a given filename
    fn supports_file(&self, filename: &str) -> bool {
        let ext = filename
            .rsplit('.')
            .next()
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&ext))
    }

    /// Check if this parser supports a given MIME type
    fn supports_mime(&self, mime: &str) -> bool {
        self.supported_mime_types()
            .iter()
            .any(|m| mime.starts_with(*m))
    }
}

/// Extracts plain text from a document.
///
/// Fails soft: any decode or parse problem yields an empty string.
pub trait TextExtractor: Send + Sync + Debug {
    fn extract_text(&self, document: &Document) -> String;
}
