//! Classification validator

use std::sync::Arc;

use async_trait::async_trait;

use super::category::{CategoryLabel, best_category};
use super::config::ClassificationConfig;
use crate::domain::DomainError;
use crate::domain::pipeline::{Evidence, StagePayload, StageResult, Validate, clamp_unit};
use crate::domain::scoring::ScoringStrategy;

/// Density credited to a category without keywords
const NEUTRAL_DENSITY: f32 = 0.5;

/// Cross-checks a generated category against an independent keyword classification
#[derive(Debug, Clone)]
pub struct CategoryValidator {
    strategy: Arc<dyn ScoringStrategy>,
    router_boost: f32,
    threshold: f32,
    mismatch_penalty: f32,
}

impl CategoryValidator {
    pub fn new(strategy: Arc<dyn ScoringStrategy>, config: &ClassificationConfig) -> Self {
        Self {
            strategy,
            router_boost: config.router_boost,
            threshold: config.validation_threshold,
            mismatch_penalty: config.mismatch_penalty,
        }
    }
}

#[async_trait]
impl Validate<CategoryLabel> for CategoryValidator {
    async fn validate(
        &self,
        query: &str,
        candidate: &CategoryLabel,
        evidence: &[Evidence],
    ) -> Result<StageResult, DomainError> {
        if query.trim().is_empty() || evidence.is_empty() {
            return Ok(StageResult::retry(0.0, "No document text or supporting policies"));
        }

        let (router_category, density) = best_category(query);
        let router_confidence = (density * self.router_boost).min(1.0);

        let keywords = candidate.category.keywords();
        let candidate_density = if keywords.is_empty() {
            NEUTRAL_DENSITY
        } else {
            clamp_unit(self.strategy.score_category(query, keywords).await?)
        };

        let mut confidence = 0.5 * router_confidence + 0.5 * candidate_density;
        let matches = router_category == candidate.category;
        if !matches {
            confidence *= self.mismatch_penalty;
        }

        let payload = StagePayload::Label {
            label: candidate.category.as_str().to_string(),
            score: confidence,
        };

        if confidence > self.threshold {
            Ok(StageResult::proceed(confidence, "Final validation passed").with_payload(payload))
        } else {
            let reasoning = if matches {
                "Final validation failed: weak keyword support"
            } else {
                "Final validation failed: classifications disagree"
            };
            Ok(StageResult::retry(confidence, reasoning).with_payload(payload))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classification::Category;
    use crate::domain::pipeline::Decision;
    use crate::domain::scoring::MockScoringStrategy;

    const LAND_DOC: &str = "Survey of agricultural land plot with property deed attached";

    fn validator(density: f32) -> CategoryValidator {
        CategoryValidator::new(
            Arc::new(MockScoringStrategy::new().with_category(density)),
            &ClassificationConfig::default(),
        )
    }

    fn evidence() -> Vec<Evidence> {
        vec![Evidence::new("policy_land", "Land Record services", 1.0)]
    }

    #[tokio::test]
    async fn test_agreeing_category_passes() {
        let result = validator(5.0 / 6.0)
            .validate(LAND_DOC, &CategoryLabel::new(Category::LandRecord, 0.9), &evidence())
            .await
            .unwrap();

        assert_eq!(result.decision, Decision::Proceed);
        assert!(result.confidence > 0.6);
    }

    #[tokio::test]
    async fn test_disagreeing_category_is_penalised() {
        let result = validator(0.8)
            .validate(
                LAND_DOC,
                &CategoryLabel::new(Category::VehicleRegistration, 0.9),
                &evidence(),
            )
            .await
            .unwrap();

        // (0.5 * 1.0 + 0.5 * 0.8) * 0.7
        assert!((result.confidence - 0.63).abs() < 1e-6);
        assert_eq!(result.decision, Decision::Proceed);

        let result = validator(0.4)
            .validate(
                LAND_DOC,
                &CategoryLabel::new(Category::VehicleRegistration, 0.9),
                &evidence(),
            )
            .await
            .unwrap();
        assert_eq!(result.decision, Decision::Retry);
    }

    #[tokio::test]
    async fn test_missing_evidence_retries_at_zero() {
        let result = validator(1.0)
            .validate(LAND_DOC, &CategoryLabel::new(Category::LandRecord, 0.9), &[])
            .await
            .unwrap();

        assert_eq!(result.decision, Decision::Retry);
        assert_eq!(result.confidence, 0.0);
    }
}
