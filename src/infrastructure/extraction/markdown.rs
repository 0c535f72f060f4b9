//! Markdown format

use pulldown_cmark::{Event, Parser, Tag};

use crate::domain::DomainError;
use crate::domain::document::FormatParser;

/// Strips Markdown syntax, keeping headings, paragraphs, list items and code as lines
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    pub fn new() -> Self {
        Self
    }

    fn break_line(text: &mut String) {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
    }
}

impl FormatParser for MarkdownParser {
    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supported_mime_types(&self) -> &[&str] {
        &["text/markdown", "text/x-markdown"]
    }

    fn parse(&self, raw: &str) -> Result<String, DomainError> {
        let mut text = String::new();

        for event in Parser::new(raw) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak => text.push(' '),
                Event::Start(Tag::Item) => {
                    Self::break_line(&mut text);
                    text.push_str("• ");
                }
                Event::Start(
                    Tag::Heading(..) | Tag::Paragraph | Tag::CodeBlock(_),
                ) => Self::break_line(&mut text),
                Event::End(
                    Tag::Heading(..) | Tag::Paragraph | Tag::CodeBlock(_) | Tag::Item,
                ) => Self::break_line(&mut text),
                _ => {}
            }
        }

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
