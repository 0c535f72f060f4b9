//! Coverage validator for PII verdicts

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use super::generator::PiiVerdict;
use super::patterns::{PiiType, base_patterns, deep_patterns};
use super::rules::any_valid;
use crate::domain::DomainError;
use crate::domain::pipeline::{Evidence, StagePayload, StageResult, Validate, clamp_unit};
use crate::domain::scoring::ScoringStrategy;

/// Re-scans the document and checks how much of what it finds the verdict reports.
///
/// Detected types are the base-table detections plus the verdict's own types.
/// A type is covered only when the verdict lists it and a context rule confirms
/// one of its matches. Conservative verdicts get no extra credit.
#[derive(Debug, Clone)]
pub struct PiiValidator {
    strategy: Arc<dyn ScoringStrategy>,
    threshold: f32,
    context_window_chars: usize,
}

impl PiiValidator {
    pub fn new(
        strategy: Arc<dyn ScoringStrategy>,
        threshold: f32,
        context_window_chars: usize,
    ) -> Self {
        Self {
            strategy,
            threshold: clamp_unit(threshold),
            context_window_chars,
        }
    }
}

#[async_trait]
impl Validate<PiiVerdict> for PiiValidator {
    async fn validate(
        &self,
        query: &str,
        candidate: &PiiVerdict,
        evidence: &[Evidence],
    ) -> Result<StageResult, DomainError> {
        if evidence.is_empty() {
            return Ok(StageResult::retry(0.0, "No validated detections to check against"));
        }

        let reported: BTreeSet<PiiType> = candidate.pii_types.iter().copied().collect();
        let mut detected: BTreeSet<PiiType> = reported.clone();
        for pattern in base_patterns() {
            if !self.strategy.score_pii_pattern(query, pattern).await?.is_empty() {
                detected.insert(pattern.pii_type());
            }
        }

        if detected.is_empty() {
            return Ok(StageResult::retry(0.0, "Re-scan found nothing to confirm"));
        }

        let mut covered = Vec::new();
        for pattern in deep_patterns() {
            let pii_type = pattern.pii_type();
            if !detected.contains(&pii_type) || !reported.contains(&pii_type) {
                continue;
            }

            let matches = self.strategy.score_pii_pattern(query, pattern).await?;
            if any_valid(query, &matches, self.context_window_chars) {
                covered.push(Evidence::new(pii_type.as_str(), pii_type.as_str(), 1.0));
            }
        }

        let confidence = covered.len() as f32 / detected.len() as f32;
        let payload = StagePayload::Detections { items: covered };

        let result = if confidence >= self.threshold {
            StageResult::proceed(confidence, "Verdict covers the detected PII")
        } else {
            StageResult::retry(confidence, "Verdict misses detected PII")
        };

        Ok(result.with_payload(payload))
    }
}
