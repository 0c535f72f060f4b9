//! Question answering specialization of the pipeline

mod envelope;
mod grader;
mod rewriter;
mod validator;

pub use envelope::{
    FAILED_ANSWER, FAILED_RETRIEVAL_ANSWER, PipelineTag, ResultEnvelope, RunMetadata,
    UNVALIDATED_WARNING,
};
pub use grader::RelevanceGrader;
pub use rewriter::TemplateRewriter;
pub use validator::{GroundingValidator, final_validation_score};
