//! PII verdict generation

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::detection::PiiDetection;
use super::patterns::{PiiType, deep_patterns};
use crate::domain::DomainError;
use crate::domain::pipeline::{Evidence, Generate, VariantTag};
use crate::domain::scoring::ScoringStrategy;

/// Screening verdict produced from validated detections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiVerdict {
    pub has_pii: bool,
    /// Sorted and distinct
    pub pii_types: Vec<PiiType>,
    /// Also lists types whose matches were not confirmed by a context rule
    pub conservative: bool,
}

impl PiiVerdict {
    pub fn new(pii_types: BTreeSet<PiiType>, conservative: bool) -> Self {
        Self {
            has_pii: !pii_types.is_empty(),
            pii_types: pii_types.into_iter().collect(),
            conservative,
        }
    }

    pub fn clean() -> Self {
        Self::new(BTreeSet::new(), false)
    }
}

/// Lists validated types by default; alternatives add every deep-scan detection
#[derive(Debug, Clone)]
pub struct PiiGenerator {
    strategy: Arc<dyn ScoringStrategy>,
}

impl PiiGenerator {
    pub fn new(strategy: Arc<dyn ScoringStrategy>) -> Self {
        Self { strategy }
    }
}

#[async_trait]
impl Generate<PiiVerdict> for PiiGenerator {
    async fn generate(
        &self,
        query: &str,
        evidence: &[Evidence],
        variant: &VariantTag,
    ) -> Result<PiiVerdict, DomainError> {
        let mut types: BTreeSet<PiiType> = evidence
            .iter()
            .filter_map(PiiDetection::from_evidence)
            .map(|d| d.pii_type)
            .collect();

        if variant.alternative_index().is_none() {
            return Ok(PiiVerdict::new(types, false));
        }

        for pattern in deep_patterns() {
            if !self.strategy.score_pii_pattern(query, pattern).await?.is_empty() {
                types.insert(pattern.pii_type());
            }
        }

        Ok(PiiVerdict::new(types, true))
    }

    fn fallback(&self, _query: &str) -> PiiVerdict {
        PiiVerdict::clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pii::detection::scan;
    use crate::domain::pii::patterns::base_patterns;
    use crate::domain::scoring::MockScoringStrategy;

    const TEXT: &str = "Mobile 9876543210, Ref 1234567890, Passport K1234567";

    fn validated_phone() -> Vec<Evidence> {
        scan("Mobile 9876543210", base_patterns(), 3)
            .iter()
            .map(|d| d.to_evidence(5.0).graded(1.0))
            .collect()
    }

    #[tokio::test]
    async fn test_default_lists_validated_types() {
        let generator = PiiGenerator::new(Arc::new(MockScoringStrategy::new()));

        let verdict = generator
            .generate(TEXT, &validated_phone(), &VariantTag::Default)
            .await
            .unwrap();

        assert!(verdict.has_pii);
        assert_eq!(verdict.pii_types, vec![PiiType::Phone]);
        assert!(!verdict.conservative);
    }

    #[tokio::test]
    async fn test_alternative_is_conservative() {
        let generator = PiiGenerator::new(Arc::new(MockScoringStrategy::new()));

        let verdict = generator
            .generate(TEXT, &validated_phone(), &VariantTag::Alternative(0))
            .await
            .unwrap();

        assert!(verdict.conservative);
        assert!(verdict.pii_types.contains(&PiiType::Passport));
        assert!(verdict.pii_types.contains(&PiiType::AccountNumber));
    }

    #[test]
    fn test_fallback_is_clean() {
        let generator = PiiGenerator::new(Arc::new(MockScoringStrategy::new()));
        assert_eq!(generator.fallback("x"), PiiVerdict::clean());
    }
}
