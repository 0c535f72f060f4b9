//! Context-window validation rules per PII type

use super::patterns::{PiiMatch, PiiType};

/// Text of at most `max_chars` characters ending at byte offset `end`
fn preceding_window(text: &str, end: usize, max_chars: usize) -> &str {
    let end = end.min(text.len());
    let Some(before) = text.get(..end) else {
        return "";
    };

    match before.char_indices().rev().nth(max_chars.saturating_sub(1)) {
        Some((start, _)) if max_chars > 0 => &before[start..],
        Some(_) => "",
        None => before,
    }
}

/// Whether a pattern match is real PII rather than a look-alike
pub fn is_valid_match(text: &str, found: &PiiMatch, window_chars: usize) -> bool {
    match found.pii_type {
        PiiType::Aadhaar => found.value.chars().filter(|c| c.is_ascii_digit()).count() == 12,
        PiiType::Phone => found.value.starts_with(|c: char| ('6'..='9').contains(&c)),
        PiiType::Email | PiiType::Pan => true,
        pii_type => {
            let window = preceding_window(text, found.start, window_chars).to_lowercase();
            pii_type.context_cues().iter().any(|cue| window.contains(cue))
        }
    }
}

/// Whether any of the matches validates
pub fn any_valid(text: &str, matches: &[PiiMatch], window_chars: usize) -> bool {
    matches.iter().any(|m| is_valid_match(text, m, window_chars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pii::patterns::deep_patterns;

    fn first_match(text: &str, pii_type: PiiType) -> PiiMatch {
        deep_patterns()
            .find(|p| p.pii_type() == pii_type)
            .unwrap()
            .find_all(text)
            .remove(0)
    }

    #[test]
    fn test_phone_must_start_with_mobile_prefix() {
        let valid = first_match("Call 9876543210", PiiType::Phone);
        let invalid = first_match("Ref 1234567890", PiiType::Phone);

        assert!(is_valid_match("Call 9876543210", &valid, 40));
        assert!(!is_valid_match("Ref 1234567890", &invalid, 40));
    }

    #[test]
    fn test_name_needs_cue_in_window() {
        let text = "Applicant Name: Ravi Kumar";
        let found = first_match(text, PiiType::Name);
        // "Applicant Name" itself matches the name pattern; it is preceded by nothing
        assert!(!is_valid_match(text, &found, 40));

        let text = "name: Ravi Kumar";
        let found = first_match(text, PiiType::Name);
        assert!(is_valid_match(text, &found, 40));
    }

    #[test]
    fn test_cue_outside_window_is_ignored() {
        let padding = "x".repeat(60);
        let text = format!("Passport holder {} K1234567", padding);
        let found = first_match(&text, PiiType::Passport);

        assert!(!is_valid_match(&text, &found, 40));

        let text = "Passport no K1234567";
        assert!(is_valid_match(text, &first_match(text, PiiType::Passport), 40));
    }

    #[test]
    fn test_window_respects_char_boundaries() {
        assert_eq!(preceding_window("ééé abc", 9, 4), "é ab");
        assert_eq!(preceding_window("abc", 3, 10), "abc");
        assert_eq!(preceding_window("abc", 3, 0), "");
    }
}
