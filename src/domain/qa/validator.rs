//! Grounding validator for generated answers

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::pipeline::{
    Evidence, StagePayload, StageResult, Validate, clamp_unit, joined_text,
};
use crate::domain::scoring::ScoringStrategy;

const GROUNDING_WEIGHT: f32 = 0.7;
const RESTRAINT_WEIGHT: f32 = 0.3;

/// `0.7 * grounding + 0.3 * (1 - hallucination)`, both components clamped to [0, 1]
pub fn final_validation_score(grounding: f32, hallucination: f32) -> f32 {
    GROUNDING_WEIGHT * clamp_unit(grounding) + RESTRAINT_WEIGHT * (1.0 - clamp_unit(hallucination))
}

/// Accepts answers grounded in their evidence and free of overreaching language
#[derive(Debug, Clone)]
pub struct GroundingValidator {
    strategy: Arc<dyn ScoringStrategy>,
    threshold: f32,
}

impl GroundingValidator {
    pub fn new(strategy: Arc<dyn ScoringStrategy>, threshold: f32) -> Self {
        Self {
            strategy,
            threshold: clamp_unit(threshold),
        }
    }
}

#[async_trait]
impl Validate<String> for GroundingValidator {
    async fn validate(
        &self,
        _query: &str,
        candidate: &String,
        evidence: &[Evidence],
    ) -> Result<StageResult, DomainError> {
        if candidate.trim().is_empty() || evidence.is_empty() {
            return Ok(
                StageResult::retry(0.0, "Empty answer or no sources provided").with_payload(
                    StagePayload::Validation {
                        is_valid: false,
                        grounding_score: 0.0,
                        hallucination_score: 0.0,
                    },
                ),
            );
        }

        let grounding = clamp_unit(
            self.strategy
                .score_grounding(candidate, &joined_text(evidence))
                .await?,
        );
        let hallucination = clamp_unit(self.strategy.score_hallucination(candidate).await?);
        let final_score = final_validation_score(grounding, hallucination);
        let is_valid = final_score >= self.threshold;

        let result = if is_valid {
            StageResult::proceed(final_score, "Answer is well-grounded in sources")
        } else {
            StageResult::retry(
                final_score,
                "Answer may contain hallucinations or unsupported claims",
            )
        };

        Ok(result.with_payload(StagePayload::Validation {
            is_valid,
            grounding_score: grounding,
            hallucination_score: hallucination,
        }))
    }
}
