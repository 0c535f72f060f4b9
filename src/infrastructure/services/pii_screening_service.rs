//! PII screening service (fails closed)

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::domain::document::{Document, TextExtractor};
use crate::domain::pii::{
    DocumentRewriter, PatternGrader, PatternRetriever, PatternRouter, PiiConfig, PiiGenerator,
    PiiScreeningResult, PiiValidator, PiiVerdict,
};
use crate::domain::pipeline::{
    CallGuard, PipelineComponents, PipelineConfig, PipelineContext, PipelineOrchestrator,
};
use crate::infrastructure::backend::PipelineBackend;
use crate::infrastructure::observability::{PipelineRunMetric, record_pipeline_run};

pub const PII_PIPELINE: &str = "pii";

#[derive(Debug, Clone)]
pub struct PiiScreeningService {
    orchestrator: PipelineOrchestrator<PiiVerdict>,
    extractor: Arc<dyn TextExtractor>,
}

impl PiiScreeningService {
    pub fn new(orchestrator: PipelineOrchestrator<PiiVerdict>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            orchestrator,
            extractor,
        }
    }

    /// Wire the PII stages over a backend
    pub fn from_backend(backend: &PipelineBackend, pipeline: PipelineConfig, config: &PiiConfig) -> Self {
        let strategy = backend.strategy.clone();
        let components = PipelineComponents {
            router: Arc::new(PatternRouter::new(config.clone())),
            retriever: Arc::new(PatternRetriever::new(strategy.clone(), config.clone())),
            grader: Arc::new(PatternGrader::new(config.context_window_chars)),
            rewriter: Arc::new(DocumentRewriter),
            generator: Arc::new(PiiGenerator::new(strategy.clone())),
            validator: Arc::new(PiiValidator::new(
                strategy,
                config.validation_threshold,
                config.context_window_chars,
            )),
        };

        Self::new(
            PipelineOrchestrator::new(PII_PIPELINE, components, pipeline),
            backend.extractor.clone(),
        )
    }

    pub async fn screen_for_pii(&self, document: &Document) -> PiiScreeningResult {
        let text = self.extractor.extract_text(document);
        self.screen_text(&text).await
    }

    pub async fn screen_text(&self, text: &str) -> PiiScreeningResult {
        let guard = self.orchestrator.guard();
        self.screen_text_with_guard(text, &guard).await
    }

    #[instrument(skip(self, text, guard), fields(pipeline = PII_PIPELINE, chars = text.len()))]
    pub async fn screen_text_with_guard(&self, text: &str, guard: &CallGuard) -> PiiScreeningResult {
        let started = Instant::now();

        let result = if text.trim().is_empty() {
            debug!("Empty document, nothing to screen");
            PiiScreeningResult::empty_document()
        } else {
            match self.orchestrator.run(text, &PipelineContext::new(), guard).await {
                Ok(outcome) => PiiScreeningResult::from_outcome(outcome),
                Err(e) => {
                    warn!(error = %e, "PII screening failed, failing closed");
                    let mut result = PiiScreeningResult::error(&e);
                    result.metadata.elapsed_ms = started.elapsed().as_millis() as u64;
                    result
                }
            }
        };

        record_pipeline_run(PipelineRunMetric {
            pipeline: PII_PIPELINE,
            tag: result.pipeline_tag.as_str(),
            retrieval_retries: result.metadata.retrieval_retries,
            validation_retries: result.metadata.validation_retries,
            duration: started.elapsed(),
        });

        result
    }
}
