//! Pattern detections carried through the pipeline as evidence

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::patterns::{PiiMatch, PiiPattern, PiiType};
use crate::domain::pipeline::{Evidence, clamp_unit};

const TYPE_KEY: &str = "pii_type";
const COUNT_KEY: &str = "count";
const SAMPLES_KEY: &str = "samples";

/// Matches of one PII type found by a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiDetection {
    pub pii_type: PiiType,
    pub count: usize,
    /// First matches, in text order
    pub samples: Vec<PiiMatch>,
}

impl PiiDetection {
    pub fn new(pii_type: PiiType, mut matches: Vec<PiiMatch>, max_samples: usize) -> Self {
        let count = matches.len();
        matches.truncate(max_samples);
        Self {
            pii_type,
            count,
            samples: matches,
        }
    }

    /// Quick-scan confidence: `min(count / normalizer, 1.0)`
    pub fn count_confidence(&self, normalizer: f32) -> f32 {
        if normalizer <= 0.0 {
            return 1.0;
        }
        clamp_unit(self.count as f32 / normalizer)
    }

    pub fn to_evidence(&self, normalizer: f32) -> Evidence {
        let text = self
            .samples
            .iter()
            .map(|m| m.value.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Evidence::new(self.pii_type.as_str(), text, self.count_confidence(normalizer))
            .with_metadata(TYPE_KEY, json!(self.pii_type))
            .with_metadata(COUNT_KEY, json!(self.count))
            .with_metadata(SAMPLES_KEY, json!(self.samples))
    }

    /// Rebuild a detection from evidence produced by `to_evidence`
    pub fn from_evidence(evidence: &Evidence) -> Option<Self> {
        let pii_type = evidence
            .metadata_str(TYPE_KEY)
            .and_then(PiiType::from_str_opt)?;
        let count = evidence
            .metadata
            .get(COUNT_KEY)
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize;
        let samples = evidence
            .metadata
            .get(SAMPLES_KEY)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        Some(Self {
            pii_type,
            count,
            samples,
        })
    }
}

/// Scan `text` with each pattern, grouping matches by type
pub fn scan<'a>(
    text: &str,
    patterns: impl Iterator<Item = &'a PiiPattern>,
    max_samples: usize,
) -> Vec<PiiDetection> {
    let mut by_type: BTreeMap<PiiType, Vec<PiiMatch>> = BTreeMap::new();

    for pattern in patterns {
        let matches = pattern.find_all(text);
        if !matches.is_empty() {
            by_type.entry(pattern.pii_type()).or_default().extend(matches);
        }
    }

    by_type
        .into_iter()
        .map(|(pii_type, matches)| PiiDetection::new(pii_type, matches, max_samples))
        .collect()
}
