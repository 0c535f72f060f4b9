//! Self-correcting pipeline core: router, retrieve/grade loop, generation and
//! validate loop, sequenced by a request-scoped orchestrator

mod config;
mod decision;
mod evidence;
mod generation;
mod guard;
mod orchestrator;
mod retrieve_grade;
mod router;
mod stage;
mod state;
mod validate;

pub use config::{PipelineConfig, RouterConfig};
pub use decision::{Decision, StagePayload, StageResult, clamp_unit};
pub use evidence::{Evidence, joined_text};
pub use generation::{Generation, GenerationStep};
pub use guard::{CallGuard, CancellationToken};
pub use orchestrator::{PipelineComponents, PipelineOrchestrator, PipelineOutcome};
pub use retrieve_grade::{RetrievalOutcome, RetrieveGradeLoop, empty_candidates_result};
pub use router::{ROUTE_DIRECT_ANSWER, ROUTE_RETRIEVAL_NEEDED, RouterStage, is_simple_shape};
pub use stage::{
    Generate, Grade, GradeRequest, PipelineContext, QueryRewriter, RetrievalRequest, Retriever, RewriteContext,
    Route, Validate, VariantTag,
};
pub use state::{PipelineRun, PipelineState};
pub use validate::{ValidateLoop, ValidationOutcome};

#[cfg(test)]
pub use generation::mock::MockGenerator;
#[cfg(test)]
pub use stage::MockRetriever;
