//! Context-rule grader for PII detections

use async_trait::async_trait;
use tracing::debug;

use super::detection::PiiDetection;
use super::rules::is_valid_match;
use crate::domain::DomainError;
use crate::domain::pipeline::{
    Evidence, Grade, GradeRequest, StagePayload, StageResult, empty_candidates_result,
};

/// Retains detections with at least one sample confirmed by its type's rule
#[derive(Debug, Clone)]
pub struct PatternGrader {
    context_window_chars: usize,
}

impl PatternGrader {
    pub fn new(context_window_chars: usize) -> Self {
        Self {
            context_window_chars,
        }
    }
}

#[async_trait]
impl Grade for PatternGrader {
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

        for candidate in candidates {
            let Some(detection) = PiiDetection::from_evidence(candidate) else {
                continue;
            };
            if detection.samples.is_empty() {
                continue;
            }

            let valid = detection
                .samples
                .iter()
                .filter(|m| is_valid_match(request.original, m, self.context_window_chars))
                .count();

            debug!(
                pii_type = %detection.pii_type,
                valid,
                samples = detection.samples.len(),
                "Graded detection"
            );

            if valid > 0 {
                let score = valid as f32 / detection.samples.len() as f32;
                relevant.push(candidate.clone().graded(score));
            }
        }

        let validation_rate = relevant.len() as f32 / candidates.len() as f32;
        let filtered = candidates.len() - relevant.len();

        let result = if relevant.is_empty() {
            StageResult::retry(validation_rate, "No detection passed its context rule")
        } else {
            StageResult::proceed(
                validation_rate,
                format!("{} detections validated, {} filtered", relevant.len(), filtered),
            )
        };

        Ok(result.with_payload(StagePayload::Grade {
            relevant,
            avg_relevance: validation_rate,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pii::detection::scan;
    use crate::domain::pii::patterns::base_patterns;
    use crate::domain::pipeline::Decision;

    fn candidates(text: &str) -> Vec<Evidence> {
        scan(text, base_patterns(), 3)
            .iter()
            .map(|d| d.to_evidence(5.0))
            .collect()
    }

    #[tokio::test]
    async fn test_valid_phone_retained() {
        let text = "Mobile 9876543210";
        let result = PatternGrader::new(40).grade(&GradeRequest::initial(text), &candidates(text)).await.unwrap();

        assert_eq!(result.decision, Decision::Proceed);
        assert_eq!(result.payload.relevant()[0].id, "phone");
    }

    #[tokio::test]
    async fn test_look_alikes_filtered() {
        let text = "Order 1234567890 for Ration Card";
        let candidates = candidates(text);
        assert_eq!(candidates.len(), 2);

        let result = PatternGrader::new(40).grade(&GradeRequest::initial(text), &candidates).await.unwrap();

        assert_eq!(result.decision, Decision::Retry);
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_empty_candidates_retry() {
        let result = PatternGrader::new(40).grade(&GradeRequest::initial("text"), &[]).await.unwrap();

        assert_eq!(result.decision, Decision::Retry);
        assert_eq!(result.confidence, 0.0);
    }
}
