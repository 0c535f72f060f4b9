//! Assembly of the concrete collaborators behind the pipeline traits

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::completion::{DEFAULT_OLLAMA_BASE_URL, HttpClient, OllamaClient};
use super::extraction::ParserTextExtractor;
use super::generation::{ExtractiveGenerator, LlmGenerator};
use super::knowledge::PolicyGraph;
use super::retrieval::{CorpusDocument, InMemoryRetriever};
use super::scoring::{KeywordScoringStrategy, LlmScoringStrategy};
use crate::domain::DomainError;
use crate::domain::completion::TextCompletion;
use crate::domain::document::TextExtractor;
use crate::domain::knowledge::KnowledgeGraph;
use crate::domain::pipeline::{Generate, PipelineConfig, Retriever};
use crate::domain::scoring::ScoringStrategy;

/// Which scoring and generation backend to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Keyword scoring and extractive generation, no external calls
    #[default]
    Local,
    /// Ollama completions for scoring and generation
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature for regenerated answers
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_BASE_URL.to_string()
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            ollama_url: default_ollama_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Collaborators shared by the three services
#[derive(Clone)]
pub struct PipelineBackend {
    pub strategy: Arc<dyn ScoringStrategy>,
    pub generator: Arc<dyn Generate<String>>,
    pub retriever: Arc<dyn Retriever>,
    pub knowledge_graph: Arc<dyn KnowledgeGraph>,
    pub extractor: Arc<dyn TextExtractor>,
}

impl fmt::Debug for PipelineBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBackend")
            .field("strategy", &self.strategy.strategy_name())
            .field("generator", &self.generator)
            .field("knowledge_graph", &self.knowledge_graph)
            .finish_non_exhaustive()
    }
}

/// Factory for the configured backend
#[derive(Debug, Default)]
pub struct BackendFactory;

impl BackendFactory {
    /// Build the backend. `corpus` feeds both the retriever and the knowledge graph.
    pub fn create(
        config: &BackendConfig,
        pipeline: &PipelineConfig,
        corpus: Vec<CorpusDocument>,
    ) -> Result<PipelineBackend, DomainError> {
        let lexical =
            KeywordScoringStrategy::new(pipeline.router.clone(), pipeline.hallucination_normalizer);

        let (strategy, generator): (Arc<dyn ScoringStrategy>, Arc<dyn Generate<String>>) =
            match config.kind {
                BackendKind::Local => (Arc::new(lexical), Arc::new(ExtractiveGenerator::new())),
                BackendKind::Ollama => {
                    let http = HttpClient::with_timeout(Duration::from_millis(config.timeout_ms))?;
                    let completion: Arc<dyn TextCompletion> = Arc::new(
                        OllamaClient::with_base_url(http, &config.model, &config.ollama_url),
                    );

                    (
                        Arc::new(LlmScoringStrategy::new(completion.clone(), lexical, 0.0)),
                        Arc::new(LlmGenerator::new(completion, config.temperature)),
                    )
                }
            };

        info!(
            backend = ?config.kind,
            documents = corpus.len(),
            "Pipeline backend created"
        );

        Ok(PipelineBackend {
            strategy,
            generator,
            retriever: Arc::new(InMemoryRetriever::new(corpus.clone())),
            knowledge_graph: Arc::new(PolicyGraph::new(corpus)),
            extractor: Arc::new(ParserTextExtractor::default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::retrieval::builtin_policies;

    #[test]
    fn test_default_backend_config() {
        let config = BackendConfig::default();

        assert_eq!(config.kind, BackendKind::Local);
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn test_backend_kind_deserialization() {
        let config: BackendConfig = serde_json::from_str(r#"{"kind": "ollama"}"#).unwrap();
        assert_eq!(config.kind, BackendKind::Ollama);
        assert_eq!(config.model, "llama3");
    }

    #[test]
    fn test_create_local_backend() {
        let backend = BackendFactory::create(
            &BackendConfig::default(),
            &PipelineConfig::default(),
            builtin_policies(),
        )
        .unwrap();

        assert_eq!(backend.strategy.strategy_name(), "keyword");
        assert!(backend.knowledge_graph.entity_count() > 0);
    }

    #[test]
    fn test_create_ollama_backend() {
        let config = BackendConfig {
            kind: BackendKind::Ollama,
            ..Default::default()
        };

        let backend =
            BackendFactory::create(&config, &PipelineConfig::default(), builtin_policies())
                .unwrap();

        assert_eq!(backend.strategy.strategy_name(), "llm");
    }
}
