use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::classification::ClassificationConfig;
use crate::domain::pii::PiiConfig;
use crate::domain::pipeline::PipelineConfig;
use crate::infrastructure::backend::BackendConfig;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub pii: PiiConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrievalConfig {
    /// JSON array of `{id, text, category?}` appended to the built-in policies
    #[serde(default)]
    pub corpus_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>().map(Self::normalized)
    }

    /// Route file and env values through the clamping builders
    pub fn normalized(mut self) -> Self {
        let pipeline = self.pipeline.clone();
        self.pipeline = pipeline
            .clone()
            .with_relevance_threshold(pipeline.relevance_threshold)
            .with_validation_threshold(pipeline.validation_threshold)
            .with_unvalidated_confidence(pipeline.unvalidated_confidence)
            .with_hallucination_normalizer(pipeline.hallucination_normalizer);
        self.backend.temperature = self.backend.temperature.clamp(0.0, 2.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::backend::BackendKind;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.pipeline.max_retries, 3);
        assert_eq!(config.backend.kind, BackendKind::Local);
        assert!(config.retrieval.corpus_path.is_none());
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"pipeline": {"max_retries": 2}, "backend": {"kind": "ollama"}, "logging": {"level": "debug", "format": "json"}}"#,
        )
        .unwrap();

        assert_eq!(config.pipeline.max_retries, 2);
        assert_eq!(config.pipeline.top_k, 5);
        assert_eq!(config.backend.kind, BackendKind::Ollama);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_normalized_clamps_thresholds() {
        let config: AppConfig = serde_json::from_str(
            r#"{"pipeline": {"relevance_threshold": 1.7, "validation_threshold": -0.2}, "backend": {"temperature": 9.0}}"#,
        )
        .unwrap();

        let config = config.normalized();

        assert_eq!(config.pipeline.relevance_threshold, 1.0);
        assert_eq!(config.pipeline.validation_threshold, 0.0);
        assert_eq!(config.backend.temperature, 2.0);
    }
}
