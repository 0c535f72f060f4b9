//! Category generator

use async_trait::async_trait;

use super::category::{Category, CategoryLabel};
use super::grader::CATEGORY_METADATA_KEY;
use crate::domain::DomainError;
use crate::domain::pipeline::{Evidence, Generate, VariantTag};

/// Supported categories ordered by their best support score, highest first.
///
/// Equal scores keep evidence order.
pub fn ranked_categories(evidence: &[Evidence]) -> Vec<CategoryLabel> {
    let mut ranked: Vec<CategoryLabel> = Vec::new();

    for item in evidence {
        let Some(category) = item
            .metadata_str(CATEGORY_METADATA_KEY)
            .and_then(Category::from_str_opt)
        else {
            continue;
        };
        let score = item.relevance_score.unwrap_or(item.base_score);

        match ranked.iter_mut().find(|label| label.category == category) {
            Some(label) if label.score < score => label.score = score,
            Some(_) => {}
            None => ranked.push(CategoryLabel::new(category, score)),
        }
    }

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Picks the best supported category; alternatives walk down the ranking
#[derive(Debug, Clone, Default)]
pub struct CategoryGenerator;

impl CategoryGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Generate<CategoryLabel> for CategoryGenerator {
    async fn generate(
        &self,
        _query: &str,
        evidence: &[Evidence],
        variant: &VariantTag,
    ) -> Result<CategoryLabel, DomainError> {
        let ranked = ranked_categories(evidence);
        if ranked.is_empty() {
            return Ok(CategoryLabel::other());
        }

        let index = match variant.alternative_index() {
            None => 0,
            Some(n) => (n as usize + 1) % ranked.len(),
        };

        Ok(ranked[index])
    }

    fn fallback(&self, _query: &str) -> CategoryLabel {
        CategoryLabel::other()
    }
}
