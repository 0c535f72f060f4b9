//! Relevance grader for the question answering pipeline

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::DomainError;
use crate::domain::pipeline::{
    Evidence, Grade, GradeRequest, StagePayload, StageResult, clamp_unit, empty_candidates_result,
};
use crate::domain::scoring::ScoringStrategy;

/// Retains candidates whose relevance clears the threshold
#[derive(Debug, Clone)]
pub struct RelevanceGrader {
    strategy: Arc<dyn ScoringStrategy>,
    threshold: f32,
}

impl RelevanceGrader {
    pub fn new(strategy: Arc<dyn ScoringStrategy>, threshold: f32) -> Self {
        Self {
            strategy,
            threshold: clamp_unit(threshold),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

#[async_trait]
impl Grade for RelevanceGrader {
    async fn grade(
        &self,
        request: &GradeRequest<'_>,
        candidates: &[Evidence],
    ) -> Result<StageResult, DomainError> {
        if candidates.is_empty() {
            return Ok(empty_candidates_result().with_payload(StagePayload::Grade {
                relevant: Vec::new(),
                avg_relevance: 0.0,
            }));
        }

        let mut relevant = Vec::new();
        let mut total = 0.0;

        for candidate in candidates {
            let score = self
                .strategy
                .score_relevance(request.query, &candidate.text)
                .await?;
            let score = clamp_unit(score);
            total += score;

            debug!(chunk_id = %candidate.id, score, "Scored chunk relevance");

            if score >= self.threshold {
                relevant.push(candidate.clone().graded(score));
            }
        }

        let avg_relevance = total / candidates.len() as f32;

        let result = if relevant.is_empty() {
            StageResult::retry(avg_relevance, "Retrieved chunks not relevant, rewriting query")
        } else {
            StageResult::proceed(
                avg_relevance,
                format!("Found {} relevant chunks", relevant.len()),
            )
        };

        Ok(result.with_payload(StagePayload::Grade {
            relevant,
            avg_relevance,
        }))
    }
}
