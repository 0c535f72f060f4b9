//! Bounded validate -> regenerate loop

use tracing::debug;

use super::decision::StageResult;
use super::evidence::Evidence;
use super::generation::GenerationStep;
use super::guard::CallGuard;
use super::stage::{Generate, Validate, VariantTag};
use crate::domain::DomainError;

/// Result of the validate loop
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome<C> {
    /// The accepted candidate, or the last one tried
    pub final_output: C,
    /// Validator confidence when accepted, the fixed unvalidated confidence otherwise
    pub confidence: f32,
    pub retries_used: u32,
    pub accepted: bool,
    /// Variant that produced `final_output`
    pub variant: VariantTag,
    pub last_validation: Option<StageResult>,
}

/// Validates a candidate and regenerates along alternative paths until accepted
#[derive(Debug)]
pub struct ValidateLoop<'a, C: Send + Sync> {
    validator: &'a dyn Validate<C>,
    generation: GenerationStep<'a, C>,
    max_retries: u32,
    unvalidated_confidence: f32,
}

impl<'a, C: Send + Sync> ValidateLoop<'a, C> {
    pub fn new(
        validator: &'a dyn Validate<C>,
        generator: &'a dyn Generate<C>,
        max_retries: u32,
        unvalidated_confidence: f32,
    ) -> Self {
        Self {
            validator,
            generation: GenerationStep::new(generator),
            max_retries,
            unvalidated_confidence,
        }
    }

    pub async fn run(
        &self,
        query: &str,
        candidate: C,
        evidence: &[Evidence],
        guard: &CallGuard,
    ) -> Result<ValidationOutcome<C>, DomainError> {
        let mut candidate = candidate;
        let mut variant = VariantTag::Default;
        let mut retries = 0;
        let mut last_validation = None;

        for attempt in 0..self.max_retries {
            let validation = guard
                .call("validate", self.validator.validate(query, &candidate, evidence))
                .await?
                .with_retry_count(retries);

            if validation.is_proceed() {
                debug!(attempt, confidence = validation.confidence, %variant, "Candidate accepted");

                return Ok(ValidationOutcome {
                    final_output: candidate,
                    confidence: validation.confidence,
                    retries_used: retries,
                    accepted: true,
                    variant,
                    last_validation: Some(validation),
                });
            }

            debug!(
                attempt,
                confidence = validation.confidence,
                reasoning = %validation.reasoning,
                "Candidate rejected"
            );

            retries += 1;
            last_validation = Some(validation);

            if attempt + 1 < self.max_retries {
                variant = VariantTag::Alternative(attempt);
                candidate = self
                    .generation
                    .generate(query, evidence, variant, guard)
                    .await?
                    .output;
            }
        }

        Ok(ValidationOutcome {
            final_output: candidate,
            confidence: self.unvalidated_confidence,
            retries_used: retries,
            accepted: false,
            variant,
            last_validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::pipeline::generation::mock::MockGenerator;

    /// Accepts exactly one expected answer
    #[derive(Debug)]
    struct ExactValidator {
        accept: String,
        calls: AtomicUsize,
    }

    impl ExactValidator {
        fn new(accept: &str) -> Self {
            Self {
                accept: accept.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Validate<String> for ExactValidator {
        async fn validate(
            &self,
            _query: &str,
            candidate: &String,
            _evidence: &[Evidence],
        ) -> Result<StageResult, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *candidate == self.accept {
                Ok(StageResult::proceed(0.92, "grounded"))
            } else {
                Ok(StageResult::retry(0.3, "ungrounded"))
            }
        }
    }

    fn evidence() -> Vec<Evidence> {
        vec![Evidence::new("c1", "text", 0.8)]
    }

    #[tokio::test]
    async fn test_accepts_initial_candidate() {
        let validator = ExactValidator::new("good");
        let generator = MockGenerator::new("good");
        let loop_ = ValidateLoop::new(&validator, &generator, 3, 0.5);

        let outcome = loop_
            .run("q", "good".to_string(), &evidence(), &CallGuard::default())
            .await
            .unwrap();

        assert!(outcome.accepted);
        assert_eq!(outcome.confidence, 0.92);
        assert_eq!(outcome.retries_used, 0);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_regenerates_with_alternative_variant() {
        let validator = ExactValidator::new("better");
        let generator = MockGenerator::new("bad").with_alternative("better");
        let loop_ = ValidateLoop::new(&validator, &generator, 3, 0.5);

        let outcome = loop_
            .run("q", "bad".to_string(), &evidence(), &CallGuard::default())
            .await
            .unwrap();

        assert!(outcome.accepted);
        assert_eq!(outcome.final_output, "better");
        assert_eq!(outcome.retries_used, 1);
        assert_eq!(outcome.variant, VariantTag::Alternative(0));
    }

    #[tokio::test]
    async fn test_exhaustion_keeps_last_candidate() {
        let validator = ExactValidator::new("never");
        let generator = MockGenerator::new("bad").with_alternative("still bad");
        let loop_ = ValidateLoop::new(&validator, &generator, 3, 0.5);

        let outcome = loop_
            .run("q", "bad".to_string(), &evidence(), &CallGuard::default())
            .await
            .unwrap();

        assert!(!outcome.accepted);
        assert_eq!(outcome.confidence, 0.5);
        assert_eq!(outcome.retries_used, 3);
        assert_eq!(outcome.final_output, "still bad");
        assert_eq!(validator.calls.load(Ordering::SeqCst), 3);
        assert_eq!(generator.calls(), 2);
    }
}
