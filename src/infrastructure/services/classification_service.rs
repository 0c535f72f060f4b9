//! Document classification service (fails open)

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::domain::classification::{
    CategoryGenerator, CategoryGrader, CategoryLabel, CategoryRouter, CategoryValidator,
    ClassificationConfig, ClassificationResult, GraphRetriever, WindowRewriter,
};
use crate::domain::document::{Document, TextExtractor};
use crate::domain::pipeline::{
    CallGuard, PipelineComponents, PipelineConfig, PipelineContext, PipelineOrchestrator,
};
use crate::infrastructure::backend::PipelineBackend;
use crate::infrastructure::observability::{PipelineRunMetric, record_pipeline_run};

pub const CLASSIFICATION_PIPELINE: &str = "classification";

#[derive(Debug, Clone)]
pub struct ClassificationService {
    orchestrator: PipelineOrchestrator<CategoryLabel>,
    extractor: Arc<dyn TextExtractor>,
    min_document_chars: usize,
}

impl ClassificationService {
    pub fn new(
        orchestrator: PipelineOrchestrator<CategoryLabel>,
        extractor: Arc<dyn TextExtractor>,
        min_document_chars: usize,
    ) -> Self {
        Self {
            orchestrator,
            extractor,
            min_document_chars,
        }
    }

    /// Wire the classification stages over a backend
    pub fn from_backend(
        backend: &PipelineBackend,
        pipeline: PipelineConfig,
        config: &ClassificationConfig,
    ) -> Self {
        let strategy = backend.strategy.clone();
        let components = PipelineComponents {
            router: Arc::new(CategoryRouter::new(config)),
            retriever: Arc::new(GraphRetriever::new(
                backend.knowledge_graph.clone(),
                config.window_chars,
                config.max_hops,
            )),
            grader: Arc::new(CategoryGrader::new(
                strategy.clone(),
                config.grade_threshold,
                config.graph_boost,
            )),
            rewriter: Arc::new(WindowRewriter::new(config.window_chars)),
            generator: Arc::new(CategoryGenerator::new()),
            validator: Arc::new(CategoryValidator::new(strategy, config)),
        };

        Self::new(
            PipelineOrchestrator::new(CLASSIFICATION_PIPELINE, components, pipeline),
            backend.extractor.clone(),
            config.min_document_chars,
        )
    }

    pub async fn classify_document(&self, document: &Document) -> ClassificationResult {
        let text = self.extractor.extract_text(document);
        self.classify_text(&text).await
    }

    pub async fn classify_text(&self, text: &str) -> ClassificationResult {
        let guard = self.orchestrator.guard();
        self.classify_text_with_guard(text, &guard).await
    }

    #[instrument(skip(self, text, guard), fields(pipeline = CLASSIFICATION_PIPELINE, chars = text.len()))]
    pub async fn classify_text_with_guard(
        &self,
        text: &str,
        guard: &CallGuard,
    ) -> ClassificationResult {
        let started = Instant::now();
        let text = text.trim();

        let result = if text.chars().count() < self.min_document_chars {
            debug!("Document too short to classify");
            ClassificationResult::empty_document()
        } else {
            match self.orchestrator.run(text, &PipelineContext::new(), guard).await {
                Ok(outcome) => ClassificationResult::from_outcome(outcome),
                Err(e) => {
                    warn!(error = %e, "Classification failed, failing open to OTHER");
                    let mut result = ClassificationResult::error(&e);
                    result.metadata.elapsed_ms = started.elapsed().as_millis() as u64;
                    result
                }
            }
        };

        record_pipeline_run(PipelineRunMetric {
            pipeline: CLASSIFICATION_PIPELINE,
            tag: result.pipeline_tag.as_str(),
            retrieval_retries: result.metadata.retrieval_retries,
            validation_retries: result.metadata.validation_retries,
            duration: started.elapsed(),
        });

        result
    }
}
