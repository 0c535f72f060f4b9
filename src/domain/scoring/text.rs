//! Lexical helpers shared by the keyword-based scorers

use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

/// Lowercased distinct words of `text`
pub fn terms(text: &str) -> HashSet<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

/// Fraction of `keywords` present as words of `text`; 0 for an empty keyword set
pub fn keyword_density(text: &str, keywords: &[&str]) -> f32 {
    if keywords.is_empty() {
        return 0.0;
    }

    let words = terms(text);
    let matches = keywords
        .iter()
        .filter(|kw| words.contains(&kw.to_lowercase()))
        .count();

    matches as f32 / keywords.len() as f32
}
