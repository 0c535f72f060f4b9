//! Category support grader

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::category::Category;
use crate::domain::DomainError;
use crate::domain::pipeline::{
    Evidence, Grade, GradeRequest, StagePayload, StageResult, clamp_unit, empty_candidates_result,
};
use crate::domain::scoring::ScoringStrategy;

/// Metadata key holding the category a policy document describes
pub const CATEGORY_METADATA_KEY: &str = "category";

/// Scores each policy document by how well the text matches its category
#[derive(Debug, Clone)]
pub struct CategoryGrader {
    strategy: Arc<dyn ScoringStrategy>,
    threshold: f32,
    graph_boost: f32,
}

impl CategoryGrader {
    pub fn new(strategy: Arc<dyn ScoringStrategy>, threshold: f32, graph_boost: f32) -> Self {
        Self {
            strategy,
            threshold: clamp_unit(threshold),
            graph_boost,
        }
    }
}

#[async_trait]
impl Grade for CategoryGrader {
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
            let Some(category) = candidate
                .metadata_str(CATEGORY_METADATA_KEY)
                .and_then(Category::from_str_opt)
            else {
                continue;
            };

            let density = self
                .strategy
                .score_category(request.original, category.keywords())
                .await?;
            let score = clamp_unit(clamp_unit(density) + self.graph_boost);
            total += score;

            debug!(policy = %candidate.id, %category, score, "Graded policy support");

            if score >= self.threshold {
                relevant.push(candidate.clone().graded(score));
            }
        }

        let avg_relevance = total / candidates.len() as f32;

        let result = if relevant.is_empty() {
            StageResult::retry(avg_relevance, "No policy supports a category strongly enough")
        } else {
            StageResult::proceed(
                avg_relevance,
                format!("{} policies support the classification", relevant.len()),
            )
        };

        Ok(result.with_payload(StagePayload::Grade {
            relevant,
            avg_relevance,
        }))
    }
}
