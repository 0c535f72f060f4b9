//! Outer state machine of a single pipeline run

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::evidence::Evidence;
use crate::domain::DomainError;

/// States of the outer pipeline state machine
///
/// The retrieve/grade and validate retry sub-loops run inside `Grading` and
/// `Validating` and are not transitions of this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Routing,
    Skipped,
    Retrieving,
    Grading,
    FailedRetrieval,
    Generating,
    Validating,
    Done,
    DoneUnvalidated,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Skipped | Self::FailedRetrieval | Self::Done | Self::DoneUnvalidated
        )
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;

        matches!(
            (self, next),
            (Routing, Skipped)
                | (Routing, Retrieving)
                | (Retrieving, Grading)
                | (Grading, Generating)
                | (Grading, FailedRetrieval)
                | (Generating, Validating)
                | (Validating, Done)
                | (Validating, DoneUnvalidated)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Routing => "routing",
            Self::Skipped => "skipped",
            Self::Retrieving => "retrieving",
            Self::Grading => "grading",
            Self::FailedRetrieval => "failed_retrieval",
            Self::Generating => "generating",
            Self::Validating => "validating",
            Self::Done => "done",
            Self::DoneUnvalidated => "done_unvalidated",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-scoped state of one pipeline run
///
/// Created at request start and dropped at request end; never shared.
#[derive(Debug)]
pub struct PipelineRun<C> {
    run_id: Uuid,
    original_input: String,
    current_query: String,
    evidence: Vec<Evidence>,
    candidate: Option<C>,
    retrieval_retries: u32,
    validation_retries: u32,
    state: PipelineState,
    history: Vec<PipelineState>,
    started_at: Instant,
    started_wall: DateTime<Utc>,
}

impl<C> PipelineRun<C> {
    pub fn new(input: impl Into<String>) -> Self {
        let input = input.into();

        Self {
            run_id: Uuid::new_v4(),
            current_query: input.clone(),
            original_input: input,
            evidence: Vec::new(),
            candidate: None,
            retrieval_retries: 0,
            validation_retries: 0,
            state: PipelineState::Routing,
            history: vec![PipelineState::Routing],
            started_at: Instant::now(),
            started_wall: Utc::now(),
        }
    }

    /// Move to the next state, rejecting illegal transitions
    pub fn advance(&mut self, next: PipelineState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::internal(format!(
                "illegal pipeline transition {} -> {}",
                self.state, next
            )));
        }

        self.state = next;
        self.history.push(next);
        Ok(())
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Wall-clock start of the run
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_wall
    }

    pub fn original_input(&self) -> &str {
        &self.original_input
    }

    pub fn current_query(&self) -> &str {
        &self.current_query
    }

    pub fn set_current_query(&mut self, query: impl Into<String>) {
        self.current_query = query.into();
    }

    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }

    pub fn set_evidence(&mut self, evidence: Vec<Evidence>) {
        self.evidence = evidence;
    }

    pub fn candidate(&self) -> Option<&C> {
        self.candidate.as_ref()
    }

    pub fn set_candidate(&mut self, candidate: C) {
        self.candidate = Some(candidate);
    }

    pub fn retrieval_retries(&self) -> u32 {
        self.retrieval_retries
    }

    pub fn set_retrieval_retries(&mut self, retries: u32) {
        self.retrieval_retries = retries;
    }

    pub fn validation_retries(&self) -> u32 {
        self.validation_retries
    }

    pub fn set_validation_retries(&mut self, retries: u32) {
        self.validation_retries = retries;
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Consume the run, returning its accumulated evidence, candidate and history
    pub fn into_parts(self) -> (Vec<Evidence>, Option<C>, Vec<PipelineState>) {
        (self.evidence, self.candidate, self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path_transitions() {
        let mut run: PipelineRun<String> = PipelineRun::new("query");

        run.advance(PipelineState::Retrieving).unwrap();
        run.advance(PipelineState::Grading).unwrap();
        run.advance(PipelineState::Generating).unwrap();
        run.advance(PipelineState::Validating).unwrap();
        run.advance(PipelineState::Done).unwrap();

        assert!(run.state().is_terminal());
        assert_eq!(run.history().len(), 6);
    }

    #[test]
    fn test_new_run_identity() {
        let before = Utc::now();
        let first: PipelineRun<String> = PipelineRun::new("query");
        let second: PipelineRun<String> = PipelineRun::new("query");

        assert_ne!(first.run_id(), second.run_id());
        assert!(first.started_at() >= before);
        assert_eq!(first.state(), PipelineState::Routing);
    }

    #[test]
    fn test_illegal_transition_rejected() {
        let mut run: PipelineRun<String> = PipelineRun::new("query");

        let result = run.advance(PipelineState::Validating);

        assert!(result.is_err());
        assert_eq!(run.state(), PipelineState::Routing);
    }

    #[test]
    fn test_terminal_states_have_no_successor() {
        for terminal in [
            PipelineState::Skipped,
            PipelineState::FailedRetrieval,
            PipelineState::Done,
            PipelineState::DoneUnvalidated,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(PipelineState::Routing));
            assert!(!terminal.can_transition_to(PipelineState::Retrieving));
        }
    }

    #[test]
    fn test_states_are_not_revisited() {
        assert!(!PipelineState::Grading.can_transition_to(PipelineState::Retrieving));
        assert!(!PipelineState::Validating.can_transition_to(PipelineState::Generating));
    }

    #[test]
    fn test_every_terminal_state_is_reachable_from_routing() {
        use PipelineState::*;

        let paths = [
            vec![Skipped],
            vec![Retrieving, Grading, FailedRetrieval],
            vec![Retrieving, Grading, Generating, Validating, Done],
            vec![Retrieving, Grading, Generating, Validating, DoneUnvalidated],
        ];

        for path in paths {
            let mut run: PipelineRun<String> = PipelineRun::new("query");
            for state in &path {
                run.advance(*state).unwrap();
            }
            assert!(run.state().is_terminal());
        }
    }

    #[test]
    fn test_run_starts_with_original_query() {
        let mut run: PipelineRun<String> = PipelineRun::new("original");
        assert_eq!(run.current_query(), "original");

        run.set_current_query("rewritten");
        assert_eq!(run.current_query(), "rewritten");
        assert_eq!(run.original_input(), "original");
    }
}
