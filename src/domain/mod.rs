//! Domain layer - Pipeline core, specializations and collaborator traits

pub mod classification;
pub mod completion;
pub mod document;
pub mod error;
pub mod knowledge;
pub mod pii;
pub mod pipeline;
pub mod qa;
pub mod scoring;

pub use classification::{Category, ClassificationResult, ClassificationTag};
pub use completion::{CompletionRequest, TextCompletion};
pub use document::{Document, DocumentContent, FormatParser, TextExtractor};
pub use error::DomainError;
pub use knowledge::KnowledgeGraph;
pub use pii::{PiiScreeningResult, PiiTag, PiiType};
pub use pipeline::{
    CallGuard, CancellationToken, Decision, Evidence, PipelineConfig, PipelineContext,
    PipelineOrchestrator, PipelineOutcome, PipelineState, StageResult,
};
pub use qa::{PipelineTag, ResultEnvelope};
pub use scoring::ScoringStrategy;
