//! Stage contracts consumed by the orchestration core
//!
//! Every pipeline (question answering, classification, PII screening) plugs its
//! own implementations of these traits into the same loops.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::decision::StageResult;
use super::evidence::Evidence;
use crate::domain::DomainError;

/// Free-form request context handed to the router
pub type PipelineContext = HashMap<String, serde_json::Value>;

/// Single-shot gate deciding whether an input needs the retrieval loop.
///
/// Routers are local and cheap: they never retrieve, never generate and never fail.
pub trait Route: Send + Sync + fmt::Debug {
    fn route(&self, input: &str, context: &PipelineContext) -> StageResult;
}

/// Parameters of one retrieval attempt
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalRequest {
    pub query: String,
    pub top_k: usize,
    /// Zero-based attempt index within the retrieve/grade loop
    pub attempt: u32,
}

impl RetrievalRequest {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            attempt: 0,
        }
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }
}

/// Source of candidate evidence.
///
/// An empty result is a normal outcome, not an error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<Evidence>, DomainError>;
}

/// What the grader knows about the current attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeRequest<'a> {
    /// Pipeline input as received
    pub original: &'a str,
    /// Query the retriever was given on this attempt
    pub query: &'a str,
}

impl<'a> GradeRequest<'a> {
    pub fn new(original: &'a str, query: &'a str) -> Self {
        Self { original, query }
    }

    /// First attempt, where the query is the input itself
    pub fn initial(input: &'a str) -> Self {
        Self::new(input, input)
    }
}

/// Scores candidates and decides `Proceed` (at least one retained) or `Retry`
#[async_trait]
pub trait Grade: Send + Sync + fmt::Debug {
    async fn grade(
        &self,
        request: &GradeRequest<'_>,
        candidates: &[Evidence],
    ) -> Result<StageResult, DomainError>;
}

/// What the rewriter knows about the failed attempt
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub attempt: u32,
    pub candidates: &'a [Evidence],
}

/// Produces the next query after a failed grading attempt
pub trait QueryRewriter: Send + Sync + fmt::Debug {
    fn rewrite(&self, original: &str, context: &RewriteContext<'_>) -> String;
}

/// Selects the generation path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariantTag {
    #[default]
    Default,
    /// Structurally different path requested by the validate loop
    Alternative(u32),
}

impl VariantTag {
    /// Index of the alternative path, if any
    pub fn alternative_index(&self) -> Option<u32> {
        match self {
            Self::Default => None,
            Self::Alternative(n) => Some(*n),
        }
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Alternative(n) => write!(f, "alternative_{}", n),
        }
    }
}

/// Produces a candidate output from accepted evidence.
///
/// Must be deterministic for identical (query, evidence, variant).
#[async_trait]
pub trait Generate<C: Send + Sync>: Send + Sync + fmt::Debug {
    async fn generate(
        &self,
        query: &str,
        evidence: &[Evidence],
        variant: &VariantTag,
    ) -> Result<C, DomainError>;

    /// Clearly flagged output used when there is no evidence to ground on
    fn fallback(&self, query: &str) -> C;
}

/// Checks a candidate against its evidence and decides `Proceed` or `Retry`
#[async_trait]
pub trait Validate<C: Send + Sync>: Send + Sync + fmt::Debug {
    async fn validate(
        &self,
        query: &str,
        candidate: &C,
        evidence: &[Evidence],
    ) -> Result<StageResult, DomainError>;
}
