//! PMP Agentic RAG
//!
//! A self-correcting retrieval-augmented pipeline with three specializations:
//! - Question answering over a policy corpus
//! - Document classification into administrative categories
//! - PII screening with fail-closed errors
//!
//! Every run goes through a router, a bounded retrieve/grade loop, generation
//! and a bounded validate loop.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use api::state::AppState;
use infrastructure::{
    backend::BackendFactory,
    retrieval::{CorpusDocument, builtin_policies, load_corpus},
    services::{ClassificationService, PiiScreeningService, QueryService},
};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let corpus = build_corpus(config)?;
    let corpus_size = corpus.len();

    let backend = BackendFactory::create(&config.backend, &config.pipeline, corpus)
        .context("failed to create pipeline backend")?;

    let query_service = QueryService::from_backend(&backend, config.pipeline.clone());
    let classification_service = ClassificationService::from_backend(
        &backend,
        config.pipeline.clone(),
        &config.classification,
    );
    let pii_service =
        PiiScreeningService::from_backend(&backend, config.pipeline.clone(), &config.pii);

    info!(
        strategy = backend.strategy.strategy_name(),
        documents = corpus_size,
        "Application state created"
    );

    Ok(AppState::new(
        Arc::new(query_service),
        Arc::new(classification_service),
        Arc::new(pii_service),
    )
    .with_strategy_name(backend.strategy.strategy_name())
    .with_corpus_size(corpus_size)
    .with_graph_entities(backend.knowledge_graph.entity_count()))
}

/// Built-in policies plus the documents of the configured corpus file
fn build_corpus(config: &AppConfig) -> anyhow::Result<Vec<CorpusDocument>> {
    let mut corpus = builtin_policies();

    if let Some(path) = &config.retrieval.corpus_path {
        let extra = load_corpus(path)
            .with_context(|| format!("failed to load corpus from {}", path.display()))?;
        corpus.extend(extra);
    }

    Ok(corpus)
}
