//! Question answering service

use std::sync::Arc;
use std::time::Instant;

use tracing::{instrument, warn};

use crate::domain::pipeline::{
    CallGuard, Generate, PipelineComponents, PipelineConfig, PipelineContext,
    PipelineOrchestrator, RouterStage,
};
use crate::domain::qa::{
    GroundingValidator, PipelineTag, RelevanceGrader, ResultEnvelope, TemplateRewriter,
};
use crate::infrastructure::backend::PipelineBackend;
use crate::infrastructure::observability::{PipelineRunMetric, record_pipeline_run};

pub const QA_PIPELINE: &str = "qa";

/// Answers questions through the self-correcting pipeline
#[derive(Debug, Clone)]
pub struct QueryService {
    orchestrator: PipelineOrchestrator<String>,
    generator: Arc<dyn Generate<String>>,
}

impl QueryService {
    pub fn new(orchestrator: PipelineOrchestrator<String>, generator: Arc<dyn Generate<String>>) -> Self {
        Self {
            orchestrator,
            generator,
        }
    }

    /// Wire the QA stages over a backend
    pub fn from_backend(backend: &PipelineBackend, config: PipelineConfig) -> Self {
        let strategy = backend.strategy.clone();
        let components = PipelineComponents {
            router: Arc::new(RouterStage::new(strategy.clone(), config.router.clone())),
            retriever: backend.retriever.clone(),
            grader: Arc::new(RelevanceGrader::new(strategy.clone(), config.relevance_threshold)),
            rewriter: Arc::new(TemplateRewriter::default()),
            generator: backend.generator.clone(),
            validator: Arc::new(GroundingValidator::new(strategy, config.validation_threshold)),
        };

        Self::new(
            PipelineOrchestrator::new(QA_PIPELINE, components, config),
            backend.generator.clone(),
        )
    }

    pub async fn process_query(&self, query: &str, context: &PipelineContext) -> ResultEnvelope {
        let guard = self.orchestrator.guard();
        self.process_query_with_guard(query, context, &guard).await
    }

    /// Like `process_query`, with a caller-supplied guard for cancellation
    #[instrument(skip(self, context, guard), fields(pipeline = QA_PIPELINE))]
    pub async fn process_query_with_guard(
        &self,
        query: &str,
        context: &PipelineContext,
        guard: &CallGuard,
    ) -> ResultEnvelope {
        let started = Instant::now();

        let envelope = match self.orchestrator.run(query, context, guard).await {
            Ok(outcome) => {
                let direct_answer = self.generator.fallback(query);
                ResultEnvelope::from_outcome(outcome, direct_answer)
            }
            Err(e) => {
                warn!(error = %e, "Question answering failed, returning failure envelope");
                let mut envelope = ResultEnvelope::failed(&e);
                envelope.metadata.elapsed_ms = started.elapsed().as_millis() as u64;
                envelope
            }
        };

        record_pipeline_run(PipelineRunMetric {
            pipeline: QA_PIPELINE,
            tag: envelope.pipeline_tag.as_str(),
            retrieval_retries: envelope.metadata.retrieval_retries,
            validation_retries: envelope.metadata.validation_retries,
            duration: started.elapsed(),
        });

        if envelope.pipeline_tag == PipelineTag::AgenticRagUnvalidated {
            warn!(
                validation_retries = envelope.metadata.validation_retries,
                "Answer returned unvalidated"
            );
        }

        envelope
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::pipeline::{
        CancellationToken, Decision, Evidence, MockGenerator, MockRetriever,
    };
    use crate::infrastructure::backend::{BackendConfig, BackendFactory};
    use crate::infrastructure::retrieval::builtin_policies;
    use crate::infrastructure::scoring::KeywordScoringStrategy;

    fn local_backend() -> PipelineBackend {
        BackendFactory::create(
            &BackendConfig::default(),
            &PipelineConfig::default(),
            builtin_policies(),
        )
        .unwrap()
    }

    fn service_with(retriever: MockRetriever, generator: Arc<dyn Generate<String>>) -> QueryService {
        let mut backend = local_backend();
        backend.strategy = Arc::new(KeywordScoringStrategy::default());
        backend.retriever = Arc::new(retriever);
        backend.generator = generator;
        QueryService::from_backend(&backend, PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_simple_question_is_answered_directly() {
        let service = QueryService::from_backend(&local_backend(), PipelineConfig::default());

        let envelope = service
            .process_query("What is a ration card?", &PipelineContext::new())
            .await;

        assert_eq!(envelope.pipeline_tag, PipelineTag::DirectAnswer);
        assert_eq!(envelope.decision, Decision::Skip);
        assert!(envelope.confidence >= 0.9);
        assert!(envelope.metadata.is_fallback);
        assert!(envelope.evidence_used.is_empty());
    }

    #[tokio::test]
    async fn test_irrelevant_candidates_exhaust_retrieval() {
        let mut retriever = MockRetriever::new();
        retriever.expect_retrieve().times(3).returning(|_| {
            Ok(vec![
                Evidence::new("x", "Municipal tender notice", 0.4),
                Evidence::new("y", "Holiday calendar", 0.3),
            ])
        });
        let service = service_with(retriever, Arc::new(MockGenerator::new("unused")));

        let envelope = service
            .process_query(
                "Which documents are needed for transferring agricultural land after inheritance",
                &PipelineContext::new(),
            )
            .await;

        assert_eq!(envelope.pipeline_tag, PipelineTag::FailedRetrieval);
        assert_eq!(envelope.confidence, 0.0);
        assert!(envelope.evidence_used.is_empty());
        assert_eq!(envelope.metadata.retrieval_retries, 3);
    }

    #[tokio::test]
    async fn test_overreaching_answer_ends_unvalidated() {
        let mut retriever = MockRetriever::new();
        retriever.expect_retrieve().returning(|_| {
            Ok(vec![Evidence::new(
                "policy_ration",
                "Applicants for a ration card must submit documents which require income proof",
                0.9,
            )])
        });
        let generator = Arc::new(MockGenerator::new(
            "You will definitely always receive benefits immediately",
        ));
        let service = service_with(retriever, generator.clone());

        let envelope = service
            .process_query(
                "Which ration card documents require income proof for applicants",
                &PipelineContext::new(),
            )
            .await;

        assert_eq!(envelope.pipeline_tag, PipelineTag::AgenticRagUnvalidated);
        assert_eq!(envelope.confidence, 0.5);
        assert!(envelope.metadata.hallucination_score.unwrap() >= 0.4);
        assert!(envelope.metadata.validation_score.unwrap() < 0.8);
        assert_eq!(envelope.metadata.validation_retries, 3);
        assert_eq!(generator.calls(), 3);
        assert!(envelope.metadata.warning.is_some());
    }

    #[tokio::test]
    async fn test_grounded_answer_is_accepted() {
        let service = QueryService::from_backend(&local_backend(), PipelineConfig::default());

        let envelope = service
            .process_query(
                "Ration Card food subsidy Public Distribution System requires income proof address proof family details",
                &PipelineContext::new(),
            )
            .await;

        assert_eq!(envelope.pipeline_tag, PipelineTag::AgenticRag);
        assert_eq!(envelope.decision, Decision::Proceed);
        assert!(envelope.answer.starts_with("Based on the provided information: Ration Card"));
        assert!(envelope.confidence >= 0.8);
    }

    #[tokio::test]
    async fn test_retriever_failure_returns_failed_envelope() {
        let mut retriever = MockRetriever::new();
        retriever
            .expect_retrieve()
            .returning(|_| Err(crate::domain::DomainError::retrieval("index offline")));
        let service = service_with(retriever, Arc::new(MockGenerator::new("unused")));

        let envelope = service
            .process_query(
                "Which documents are needed for transferring agricultural land after inheritance",
                &PipelineContext::new(),
            )
            .await;

        assert_eq!(envelope.pipeline_tag, PipelineTag::Failed);
        assert_eq!(envelope.decision, Decision::Fail);
        assert_eq!(envelope.confidence, 0.0);
        assert!(envelope.metadata.error.unwrap().contains("index offline"));
    }

    #[tokio::test]
    async fn test_cancelled_run_fails_safe() {
        let service = QueryService::from_backend(&local_backend(), PipelineConfig::default());
        let token = CancellationToken::new();
        token.cancel();
        let guard = CallGuard::new(Duration::from_secs(1)).with_token(token);

        let envelope = service
            .process_query_with_guard(
                "Which documents are needed for transferring agricultural land after inheritance",
                &PipelineContext::new(),
                &guard,
            )
            .await;

        assert_eq!(envelope.pipeline_tag, PipelineTag::Failed);
        assert!(envelope.metadata.error.unwrap().contains("Cancelled"));
    }
}
