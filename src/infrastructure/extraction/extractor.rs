//! Text extraction that picks a format parser per document

use std::sync::Arc;

use tracing::{debug, warn};

use super::{HtmlParser, MarkdownParser, PlainTextParser};
use crate::domain::document::{Document, FormatParser, TextExtractor};

/// Chooses a parser by MIME type, then file extension, then the MIME type guessed
/// from the filename. Unknown formats are read as plain text.
#[derive(Debug, Clone)]
pub struct ParserTextExtractor {
    parsers: Vec<Arc<dyn FormatParser>>,
    plain: Arc<dyn FormatParser>,
}

impl ParserTextExtractor {
    pub fn new(parsers: Vec<Arc<dyn FormatParser>>) -> Self {
        Self {
            parsers,
            plain: Arc::new(PlainTextParser::new()),
        }
    }

    fn select(&self, document: &Document) -> &Arc<dyn FormatParser> {
        let by_mime = |mime: &str| self.parsers.iter().find(|p| p.supports_mime(mime));

        document
            .mime_type
            .as_deref()
            .and_then(by_mime)
            .or_else(|| {
                let filename = document.filename.as_deref()?;
                self.parsers
                    .iter()
                    .find(|p| p.supports_file(filename))
                    .or_else(|| {
                        let guessed = mime_guess::from_path(filename).first()?;
                        by_mime(guessed.essence_str())
                    })
            })
            .unwrap_or(&self.plain)
    }
}

impl Default for ParserTextExtractor {
    fn default() -> Self {
        Self::new(vec![
            Arc::new(PlainTextParser::new()),
            Arc::new(MarkdownParser::new()),
            Arc::new(HtmlParser::new()),
        ])
    }
}

impl TextExtractor for ParserTextExtractor {
    fn extract_text(&self, document: &Document) -> String {
        let raw = match document.content.as_text() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, filename = ?document.filename, "Document is not valid text");
                return String::new();
            }
        };

        let parser = self.select(document);
        debug!(parser = ?parser, filename = ?document.filename, "Extracting text");

        parser.parse(&raw).unwrap_or_else(|e| {
            warn!(error = %e, filename = ?document.filename, "Text extraction failed");
            String::new()
        })
    }
}
