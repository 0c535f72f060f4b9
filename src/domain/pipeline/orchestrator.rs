//! Pipeline orchestrator
//!
//! Sequences router, retrieve/grade loop, generation and validate loop into one
//! request-scoped run:
//!
//! ```text
//! Routing -> Skipped
//!         -> Retrieving -> Grading -> FailedRetrieval
//!                                  -> Generating -> Validating -> Done | DoneUnvalidated
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use super::config::PipelineConfig;
use super::decision::StageResult;
use super::evidence::Evidence;
use super::generation::GenerationStep;
use super::guard::CallGuard;
use super::retrieve_grade::RetrieveGradeLoop;
use super::stage::{
    Generate, Grade, PipelineContext, QueryRewriter, Retriever, Route, Validate, VariantTag,
};
use super::state::{PipelineRun, PipelineState};
use super::validate::ValidateLoop;
use crate::domain::DomainError;

/// Concrete stage implementations plugged into the orchestrator
pub struct PipelineComponents<C: Send + Sync> {
    pub router: Arc<dyn Route>,
    pub retriever: Arc<dyn Retriever>,
    pub grader: Arc<dyn Grade>,
    pub rewriter: Arc<dyn QueryRewriter>,
    pub generator: Arc<dyn Generate<C>>,
    pub validator: Arc<dyn Validate<C>>,
}

impl<C: Send + Sync> Clone for PipelineComponents<C> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            retriever: self.retriever.clone(),
            grader: self.grader.clone(),
            rewriter: self.rewriter.clone(),
            generator: self.generator.clone(),
            validator: self.validator.clone(),
        }
    }
}

impl<C: Send + Sync> std::fmt::Debug for PipelineComponents<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineComponents")
            .field("router", &self.router)
            .field("grader", &self.grader)
            .field("rewriter", &self.rewriter)
            .field("generator", &self.generator)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

/// Everything a specialization needs to build its result record
#[derive(Debug, Clone)]
pub struct PipelineOutcome<C> {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub state: PipelineState,
    pub route: StageResult,
    /// Accepted evidence; empty for `Skipped` and `FailedRetrieval`
    pub evidence: Vec<Evidence>,
    /// Final candidate; `None` unless generation ran
    pub candidate: Option<C>,
    /// Variant that produced the final candidate
    pub variant: VariantTag,
    /// Terminal confidence as defined by the state
    pub confidence: f32,
    pub validation: Option<StageResult>,
    pub retrieval_retries: u32,
    pub validation_retries: u32,
    /// Query used by the last retrieval attempt
    pub final_query: String,
    pub history: Vec<PipelineState>,
    pub elapsed: Duration,
}

impl<C> PipelineOutcome<C> {
    pub fn is_validated(&self) -> bool {
        self.state == PipelineState::Done
    }
}

/// One orchestration core shared by every pipeline specialization
#[derive(Debug, Clone)]
pub struct PipelineOrchestrator<C: Send + Sync> {
    name: &'static str,
    components: PipelineComponents<C>,
    config: PipelineConfig,
}

impl<C: Send + Sync> PipelineOrchestrator<C> {
    pub fn new(name: &'static str, components: PipelineComponents<C>, config: PipelineConfig) -> Self {
        Self {
            name,
            components,
            config,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build a guard for a new run from the configured per-call timeout
    pub fn guard(&self) -> CallGuard {
        CallGuard::new(self.config.call_timeout())
    }

    /// Execute one run end to end.
    ///
    /// Empty inputs and exhausted budgets are terminal states, not errors. `Err`
    /// means a collaborator failed, timed out or was cancelled.
    pub async fn run(
        &self,
        input: &str,
        context: &PipelineContext,
        guard: &CallGuard,
    ) -> Result<PipelineOutcome<C>, DomainError> {
        let run: PipelineRun<C> = PipelineRun::new(input);
        let span = info_span!("pipeline_run", pipeline = self.name, run_id = %run.run_id());

        self.execute(run, context, guard).instrument(span).await
    }

    async fn execute(
        &self,
        mut run: PipelineRun<C>,
        context: &PipelineContext,
        guard: &CallGuard,
    ) -> Result<PipelineOutcome<C>, DomainError> {
        let route = self.components.router.route(run.original_input(), context);
        debug!(decision = %route.decision, confidence = route.confidence, "Router decided");

        if route.is_skip() {
            let confidence = route.confidence;
            run.advance(PipelineState::Skipped)?;
            return Ok(self.finish(run, route, VariantTag::Default, confidence, None));
        }

        run.advance(PipelineState::Retrieving)?;
        let retrieval = RetrieveGradeLoop::new(
            self.components.grader.as_ref(),
            self.components.rewriter.as_ref(),
            self.config.max_retries,
            self.config.top_k,
        );
        run.advance(PipelineState::Grading)?;
        let retrieved = retrieval
            .run(run.original_input(), self.components.retriever.as_ref(), guard)
            .await?;

        run.set_retrieval_retries(retrieved.retries_used);
        run.set_current_query(retrieved.final_query.clone());

        if !retrieved.succeeded {
            run.advance(PipelineState::FailedRetrieval)?;
            return Ok(self.finish(run, route, VariantTag::Default, 0.0, None));
        }

        run.set_evidence(retrieved.evidence);

        run.advance(PipelineState::Generating)?;
        let generation = GenerationStep::new(self.components.generator.as_ref())
            .generate(run.original_input(), run.evidence(), VariantTag::Default, guard)
            .await?;

        run.advance(PipelineState::Validating)?;
        let validation = ValidateLoop::new(
            self.components.validator.as_ref(),
            self.components.generator.as_ref(),
            self.config.max_retries,
            self.config.unvalidated_confidence,
        )
        .run(run.original_input(), generation.output, run.evidence(), guard)
        .await?;

        run.set_validation_retries(validation.retries_used);
        run.set_candidate(validation.final_output);
        run.advance(if validation.accepted {
            PipelineState::Done
        } else {
            PipelineState::DoneUnvalidated
        })?;

        Ok(self.finish(
            run,
            route,
            validation.variant,
            validation.confidence,
            validation.last_validation,
        ))
    }

    fn finish(
        &self,
        run: PipelineRun<C>,
        route: StageResult,
        variant: VariantTag,
        confidence: f32,
        validation: Option<StageResult>,
    ) -> PipelineOutcome<C> {
        let run_id = run.run_id();
        let started_at = run.started_at();
        let state = run.state();
        let retrieval_retries = run.retrieval_retries();
        let validation_retries = run.validation_retries();
        let final_query = run.current_query().to_string();
        let elapsed = run.elapsed();
        let (evidence, candidate, history) = run.into_parts();

        info!(
            state = %state,
            confidence,
            retrieval_retries,
            validation_retries,
            elapsed_ms = elapsed.as_millis() as u64,
            "Pipeline run finished"
        );

        PipelineOutcome {
            run_id,
            started_at,
            state,
            route,
            evidence,
            candidate,
            variant,
            confidence,
            validation,
            retrieval_retries,
            validation_retries,
            final_query,
            history,
            elapsed,
        }
    }
}
