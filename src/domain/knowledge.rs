//! Knowledge graph collaborator

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::pipeline::Evidence;

/// Graph of reference documents connected by shared entities
#[async_trait]
pub trait KnowledgeGraph: Send + Sync + Debug {
    /// Documents reachable from the entities of `text` within `max_hops` edges.
    ///
    /// Nothing found is an empty list, not an error.
    async fn query(&self, text: &str, max_hops: usize) -> Result<Vec<Evidence>, DomainError>;

    /// Number of distinct entities indexed
    fn entity_count(&self) -> usize;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Returns a fixed document list for every query
    #[derive(Debug, Default)]
    pub struct MockKnowledgeGraph {
        documents: Vec<Evidence>,
        error: Option<String>,
    }

    impl MockKnowledgeGraph {
        pub fn new(documents: Vec<Evidence>) -> Self {
            Self {
                documents,
                error: None,
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }
    }

    #[async_trait]
    impl KnowledgeGraph for MockKnowledgeGraph {
        async fn query(&self, _text: &str, _max_hops: usize) -> Result<Vec<Evidence>, DomainError> {
            if let Some(ref error) = self.error {
                return Err(DomainError::retrieval(error.clone()));
            }
            Ok(self.documents.clone())
        }

        fn entity_count(&self) -> usize {
            0
        }
    }
}
