//! HTML format

use scraper::{ElementRef, Html, Selector};

use crate::domain::DomainError;
use crate::domain::document::FormatParser;

const SKIPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "head"];
const BLOCK_TAGS: [&str; 13] = [
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "br", "li", "tr", "td", "th",
];

/// Visible body text, one line per block element
#[derive(Debug, Clone, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    fn element_text(element: &ElementRef, text: &mut String) {
        for node in element.children() {
            if let Some(child) = ElementRef::wrap(node) {
                let tag = child.value().name();
                if SKIPPED_TAGS.contains(&tag) {
                    continue;
                }

                let block = BLOCK_TAGS.contains(&tag);
                if block && !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                Self::element_text(&child, text);
                if block {
                    text.push('\n');
                }
            } else if let Some(fragment) = node.value().as_text() {
                text.push_str(fragment);
            }
        }
    }
}

impl FormatParser for HtmlParser {
    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supported_mime_types(&self) -> &[&str] {
        &["text/html"]
    }

    fn parse(&self, raw: &str) -> Result<String, DomainError> {
        let document = Html::parse_document(raw);
        let body = Selector::parse("body")
            .map_err(|e| DomainError::internal(format!("Invalid selector: {}", e)))?;

        let root = document
            .select(&body)
            .next()
            .unwrap_or_else(|| document.root_element());

        let mut text = String::new();
        Self::element_text(&root, &mut text);

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
