//! Application state for shared services

use std::fmt;
use std::sync::Arc;

use crate::infrastructure::services::{ClassificationService, PiiScreeningService, QueryService};

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub query_service: Arc<QueryService>,
    pub classification_service: Arc<ClassificationService>,
    pub pii_service: Arc<PiiScreeningService>,
    /// Name of the scoring strategy backing every pipeline
    pub strategy_name: String,
    /// Reference documents available to retrieval
    pub corpus_size: usize,
    /// Entities indexed by the knowledge graph
    pub graph_entities: usize,
}

impl AppState {
    pub fn new(
        query_service: Arc<QueryService>,
        classification_service: Arc<ClassificationService>,
        pii_service: Arc<PiiScreeningService>,
    ) -> Self {
        Self {
            query_service,
            classification_service,
            pii_service,
            strategy_name: String::new(),
            corpus_size: 0,
            graph_entities: 0,
        }
    }

    pub fn with_strategy_name(mut self, name: impl Into<String>) -> Self {
        self.strategy_name = name.into();
        self
    }

    pub fn with_corpus_size(mut self, corpus_size: usize) -> Self {
        self.corpus_size = corpus_size;
        self
    }

    pub fn with_graph_entities(mut self, graph_entities: usize) -> Self {
        self.graph_entities = graph_entities;
        self
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("strategy_name", &self.strategy_name)
            .field("corpus_size", &self.corpus_size)
            .field("graph_entities", &self.graph_entities)
            .finish_non_exhaustive()
    }
}
