//! Document text extraction

mod extractor;
mod html;
mod markdown;
mod plain_text;

pub use extractor::ParserTextExtractor;
pub use html::HtmlParser;
pub use markdown::MarkdownParser;
pub use plain_text::PlainTextParser;
