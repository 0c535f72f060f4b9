//! PII pattern table

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kinds of personally identifiable information the screener looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiType {
    Aadhaar,
    Phone,
    Email,
    Pan,
    Name,
    Address,
    DateOfBirth,
    AccountNumber,
    Passport,
    VoterId,
}

impl PiiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aadhaar => "aadhaar",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Pan => "pan",
            Self::Name => "name",
            Self::Address => "address",
            Self::DateOfBirth => "date_of_birth",
            Self::AccountNumber => "account_number",
            Self::Passport => "passport",
            Self::VoterId => "voter_id",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        ALL_TYPES.iter().copied().find(|t| t.as_str() == value)
    }

    /// Cue words that must precede a match of this type to confirm it.
    /// Empty for types that are validated structurally.
    pub fn context_cues(&self) -> &'static [&'static str] {
        match self {
            Self::Aadhaar | Self::Phone | Self::Email | Self::Pan => &[],
            Self::Name => &["name:", "name :", "applicant:", "applicant", "mr.", "mrs.", "ms."],
            Self::Address => &["address", "resident", "residing", "r/o"],
            Self::DateOfBirth => &["dob", "d.o.b", "birth", "born"],
            Self::AccountNumber => &["account", "a/c", "acct"],
            Self::Passport => &["passport"],
            Self::VoterId => &["voter", "epic"],
        }
    }
}

impl fmt::Display for PiiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ALL_TYPES: [PiiType; 10] = [
    PiiType::Aadhaar,
    PiiType::Phone,
    PiiType::Email,
    PiiType::Pan,
    PiiType::Name,
    PiiType::Address,
    PiiType::DateOfBirth,
    PiiType::AccountNumber,
    PiiType::Passport,
    PiiType::VoterId,
];

/// One regex match of a PII pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiMatch {
    pub pii_type: PiiType,
    pub value: String,
    /// Byte offsets into the scanned text
    pub start: usize,
    pub end: usize,
}

/// A compiled pattern for one PII type
#[derive(Debug)]
pub struct PiiPattern {
    pii_type: PiiType,
    regex: Regex,
}

impl PiiPattern {
    fn new(pii_type: PiiType, pattern: &str) -> Self {
        Self {
            pii_type,
            regex: Regex::new(pattern).expect("PII pattern table must compile"),
        }
    }

    pub fn pii_type(&self) -> PiiType {
        self.pii_type
    }

    /// All non-overlapping matches in `text`
    pub fn find_all(&self, text: &str) -> Vec<PiiMatch> {
        self.regex
            .find_iter(text)
            .map(|m| PiiMatch {
                pii_type: self.pii_type,
                value: m.as_str().to_string(),
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }
}

static BASE_PATTERNS: Lazy<Vec<PiiPattern>> = Lazy::new(|| {
    vec![
        PiiPattern::new(PiiType::Aadhaar, r"\b\d{4}\s?\d{4}\s?\d{4}\b"),
        PiiPattern::new(PiiType::Phone, r"\b\d{10}\b"),
        PiiPattern::new(
            PiiType::Email,
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        ),
        PiiPattern::new(PiiType::Pan, r"\b[A-Z]{5}\d{4}[A-Z]\b"),
        PiiPattern::new(PiiType::Name, r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b"),
        PiiPattern::new(PiiType::Address, r"\b\d+[,\s]+[A-Za-z\s]+[,\s]+\d{6}\b"),
        PiiPattern::new(PiiType::DateOfBirth, r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b"),
    ]
});

static EXTENDED_PATTERNS: Lazy<Vec<PiiPattern>> = Lazy::new(|| {
    vec![
        PiiPattern::new(PiiType::AccountNumber, r"\b\d{9,18}\b"),
        PiiPattern::new(PiiType::Passport, r"\b[A-Z]\d{7}\b"),
        PiiPattern::new(PiiType::VoterId, r"\b[A-Z]{3}\d{7}\b"),
    ]
});

/// Patterns used by the quick scan
pub fn base_patterns() -> impl Iterator<Item = &'static PiiPattern> {
    BASE_PATTERNS.iter()
}

/// Patterns used by the deep scan (base table plus extended types)
pub fn deep_patterns() -> impl Iterator<Item = &'static PiiPattern> {
    BASE_PATTERNS.iter().chain(EXTENDED_PATTERNS.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(pii_type: PiiType) -> &'static PiiPattern {
        deep_patterns().find(|p| p.pii_type() == pii_type).unwrap()
    }

    #[test]
    fn test_aadhaar_pattern() {
        let matches = pattern(PiiType::Aadhaar).find_all("My Aadhaar is 1234 5678 9012");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].value, "1234 5678 9012");
    }

    #[test]
    fn test_phone_pattern() {
        let matches = pattern(PiiType::Phone).find_all("Contact me at 9876543210");
        assert_eq!(matches[0].value, "9876543210");
        assert_eq!(matches[0].start, 14);
    }

    #[test]
    fn test_email_pattern() {
        let matches = pattern(PiiType::Email).find_all("Email me at john.doe@example.com");
        assert_eq!(matches[0].value, "john.doe@example.com");
    }

    #[test]
    fn test_pan_and_voter_patterns() {
        assert_eq!(pattern(PiiType::Pan).find_all("PAN ABCDE1234F").len(), 1);
        assert_eq!(pattern(PiiType::VoterId).find_all("EPIC XYZ1234567").len(), 1);
        assert_eq!(pattern(PiiType::Passport).find_all("Passport K1234567").len(), 1);
    }

    #[test]
    fn test_plain_text_has_no_structured_matches() {
        let text = "this is a general application for certificate";
        for p in deep_patterns() {
            assert!(p.find_all(text).is_empty(), "{} matched", p.pii_type());
        }
    }

    #[test]
    fn test_deep_scan_extends_base() {
        assert_eq!(base_patterns().count(), 7);
        assert_eq!(deep_patterns().count(), 10);
    }

    #[test]
    fn test_type_round_trip_by_name() {
        assert_eq!(PiiType::from_str_opt("date_of_birth"), Some(PiiType::DateOfBirth));
        assert_eq!(PiiType::from_str_opt("unknown"), None);
    }
}
