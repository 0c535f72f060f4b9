//! Bounded retrieve -> grade -> rewrite loop

use tracing::debug;

use super::decision::StageResult;
use super::evidence::Evidence;
use super::guard::CallGuard;
use super::stage::{
    Grade, GradeRequest, QueryRewriter, RetrievalRequest, Retriever, RewriteContext,
};
use crate::domain::DomainError;

/// Result of the retrieve/grade loop
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalOutcome {
    /// Graded evidence; empty unless `succeeded`
    pub evidence: Vec<Evidence>,
    /// Never exceeds the configured retry budget
    pub retries_used: u32,
    pub succeeded: bool,
    /// Query used by the last attempt
    pub final_query: String,
    /// Grading result of the last attempt
    pub last_grade: Option<StageResult>,
}

/// Grading result for an empty candidate list. The scorer is never consulted.
pub fn empty_candidates_result() -> StageResult {
    StageResult::retry(0.0, "No chunks retrieved, need to rewrite query")
}

/// Runs retrieval attempts until a grader accepts evidence or the budget runs out
#[derive(Debug)]
pub struct RetrieveGradeLoop<'a> {
    grader: &'a dyn Grade,
    rewriter: &'a dyn QueryRewriter,
    max_retries: u32,
    top_k: usize,
}

impl<'a> RetrieveGradeLoop<'a> {
    pub fn new(
        grader: &'a dyn Grade,
        rewriter: &'a dyn QueryRewriter,
        max_retries: u32,
        top_k: usize,
    ) -> Self {
        Self {
            grader,
            rewriter,
            max_retries,
            top_k,
        }
    }

    pub async fn run(
        &self,
        query: &str,
        retriever: &dyn Retriever,
        guard: &CallGuard,
    ) -> Result<RetrievalOutcome, DomainError> {
        let mut current_query = query.to_string();
        let mut retries = 0;
        let mut last_grade = None;

        for attempt in 0..self.max_retries {
            let request = RetrievalRequest::new(current_query.clone(), self.top_k)
                .with_attempt(attempt);
            let candidates = guard.call("retrieve", retriever.retrieve(&request)).await?;

            debug!(attempt, candidates = candidates.len(), "Retrieved candidates");

            let grade = if candidates.is_empty() {
                empty_candidates_result()
            } else {
                let grade_request = GradeRequest::new(query, &current_query);
                guard
                    .call("grade", self.grader.grade(&grade_request, &candidates))
                    .await?
            };
            let grade = grade.with_retry_count(retries);

            if grade.is_proceed() && !grade.payload.relevant().is_empty() {
                debug!(
                    attempt,
                    retained = grade.payload.relevant().len(),
                    confidence = grade.confidence,
                    "Grader accepted evidence"
                );

                return Ok(RetrievalOutcome {
                    evidence: grade.payload.clone().into_relevant(),
                    retries_used: retries,
                    succeeded: true,
                    final_query: current_query,
                    last_grade: Some(grade),
                });
            }

            debug!(
                attempt,
                confidence = grade.confidence,
                reasoning = %grade.reasoning,
                "Grader rejected candidates"
            );

            retries += 1;
            last_grade = Some(grade);

            if attempt + 1 < self.max_retries {
                let context = RewriteContext {
                    attempt,
                    candidates: &candidates,
                };
                current_query = self.rewriter.rewrite(query, &context);
            }
        }

        Ok(RetrievalOutcome {
            evidence: Vec::new(),
            retries_used: retries,
            succeeded: false,
            final_query: current_query,
            last_grade,
        })
    }
}
