//! Template-based answer generation over retrieved evidence

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::pipeline::{Evidence, Generate, VariantTag, joined_text};

/// Characters of joined evidence quoted in an answer
pub const EXCERPT_CHARS: usize = 200;

const DEFAULT_TEMPLATE: &str = "Based on the provided information: ${excerpt}...";

const ALTERNATIVE_TEMPLATES: [&str; 2] = [
    "According to the retrieved sources: ${excerpt}...",
    "The relevant policy text states: ${excerpt}...",
];

const FALLBACK_TEMPLATE: &str = "No supporting information was retrieved for: ${query}";

/// Deterministic extractive generator used by the local backend
///
/// `Alternative(n)` rotates the evidence order by `n` and switches template so
/// each regeneration quotes a different excerpt.
#[derive(Debug, Clone, Default)]
pub struct ExtractiveGenerator;

impl ExtractiveGenerator {
    pub fn new() -> Self {
        Self
    }

    fn excerpt(evidence: &[Evidence]) -> String {
        joined_text(evidence).chars().take(EXCERPT_CHARS).collect()
    }
}

#[async_trait]
impl Generate<String> for ExtractiveGenerator {
    async fn generate(
        &self,
        query: &str,
        evidence: &[Evidence],
        variant: &VariantTag,
    ) -> Result<String, DomainError> {
        if evidence.is_empty() {
            return Ok(self.fallback(query));
        }

        let answer = match variant.alternative_index() {
            None => DEFAULT_TEMPLATE.replace("${excerpt}", &Self::excerpt(evidence)),
            Some(n) => {
                let mut rotated = evidence.to_vec();
                rotated.rotate_left(n as usize % evidence.len());
                let template = ALTERNATIVE_TEMPLATES[n as usize % ALTERNATIVE_TEMPLATES.len()];
                template.replace("${excerpt}", &Self::excerpt(&rotated))
            }
        };

        Ok(answer)
    }

    fn fallback(&self, query: &str) -> String {
        FALLBACK_TEMPLATE.replace("${query}", query)
    }
}
