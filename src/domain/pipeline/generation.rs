//! Generation step

use tracing::debug;

use super::evidence::Evidence;
use super::guard::CallGuard;
use super::stage::{Generate, VariantTag};
use crate::domain::DomainError;

/// A generated candidate and how it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct Generation<C> {
    pub output: C,
    /// True when there was no evidence and the generator's fallback was used
    pub is_fallback: bool,
    pub variant: VariantTag,
}

/// Produces a candidate from accepted evidence, never fabricating without it
#[derive(Debug)]
pub struct GenerationStep<'a, C: Send + Sync> {
    generator: &'a dyn Generate<C>,
}

impl<'a, C: Send + Sync> GenerationStep<'a, C> {
    pub fn new(generator: &'a dyn Generate<C>) -> Self {
        Self { generator }
    }

    pub async fn generate(
        &self,
        query: &str,
        evidence: &[Evidence],
        variant: VariantTag,
        guard: &CallGuard,
    ) -> Result<Generation<C>, DomainError> {
        if evidence.is_empty() {
            debug!(%variant, "No evidence, using fallback output");
            return Ok(Generation {
                output: self.generator.fallback(query),
                is_fallback: true,
                variant,
            });
        }

        let output = guard
            .call("generate", self.generator.generate(query, evidence, &variant))
            .await?;

        Ok(Generation {
            output,
            is_fallback: false,
            variant,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockGenerator;
    use super::*;

    #[tokio::test]
    async fn test_empty_evidence_uses_fallback() {
        let generator = MockGenerator::new("answer");
        let step = GenerationStep::new(&generator);

        let generation = step
            .generate("query", &[], VariantTag::Default, &CallGuard::default())
            .await
            .unwrap();

        assert!(generation.is_fallback);
        assert!(generation.output.contains("No supporting information"));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_generation_is_idempotent() {
        let generator = MockGenerator::new("answer");
        let step = GenerationStep::new(&generator);
        let evidence = vec![Evidence::new("c1", "text", 0.8)];
        let guard = CallGuard::default();

        let first = step
            .generate("query", &evidence, VariantTag::Default, &guard)
            .await
            .unwrap();
        let second = step
            .generate("query", &evidence, VariantTag::Default, &guard)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert!(!first.is_fallback);
    }

    #[tokio::test]
    async fn test_generator_error_propagates() {
        let generator = MockGenerator::new("answer").with_error("model offline");
        let step = GenerationStep::new(&generator);
        let evidence = vec![Evidence::new("c1", "text", 0.8)];

        let result = step
            .generate("query", &evidence, VariantTag::Default, &CallGuard::default())
            .await;

        assert!(result.is_err());
    }
}
