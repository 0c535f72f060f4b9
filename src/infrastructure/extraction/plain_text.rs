//! Plain text format

use crate::domain::DomainError;
use crate::domain::document::FormatParser;

#[derive(Debug, Clone, Default)]
pub struct PlainTextParser;

impl PlainTextParser {
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for PlainTextParser {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn supported_mime_types(&self) -> &[&str] {
        &["text/plain"]
    }

    fn parse(&self, raw: &str) -> Result<String, DomainError> {
        Ok(raw.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let text = PlainTextParser::new().parse("  Aadhaar 1234 5678 9012 \n").unwrap();
        assert_eq!(text, "Aadhaar 1234 5678 9012");
    }

    #[test]
    fn test_supported_formats() {
        let parser = PlainTextParser::new();
        assert!(parser.supports_file("letter.TXT"));
        assert!(parser.supports_mime("text/plain; charset=utf-8"));
        assert!(!parser.supports_file("letter.md"));
    }
}
