//! One-shot pipeline commands

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::domain::{Document, PipelineContext};
use crate::infrastructure::logging::init_logging;

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Question to answer
    pub query: String,

    /// Router context entry, repeatable
    #[arg(long = "context", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub context: Vec<(String, String)>,
}

impl QueryArgs {
    fn pipeline_context(&self) -> PipelineContext {
        self.context
            .iter()
            .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
            .collect()
    }
}

#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Document file (plain text, Markdown or HTML)
    #[arg(required_unless_present = "text", conflicts_with = "text")]
    pub path: Option<PathBuf>,

    /// Inline document text
    #[arg(long)]
    pub text: Option<String>,

    /// Override format detection
    #[arg(long)]
    pub mime_type: Option<String>,
}

impl DocumentArgs {
    async fn load(&self) -> anyhow::Result<Document> {
        let document = match (&self.path, &self.text) {
            (Some(path), _) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Document::from_bytes(bytes).with_filename(path.to_string_lossy())
            }
            (None, Some(text)) => Document::from_text(text.clone()),
            (None, None) => anyhow::bail!("either a path or --text is required"),
        };

        Ok(match &self.mime_type {
            Some(mime_type) => document.with_mime_type(mime_type.clone()),
            None => document,
        })
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

async fn init_state() -> anyhow::Result<AppState> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config.logging);

    crate::create_app_state_with_config(&config).await
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Answer one question and print the result envelope
pub async fn query(args: QueryArgs) -> anyhow::Result<()> {
    let state = init_state().await?;
    let envelope = state
        .query_service
        .process_query(&args.query, &args.pipeline_context())
        .await;

    print_json(&envelope)
}

/// Classify one document and print the classification result
pub async fn classify(args: DocumentArgs) -> anyhow::Result<()> {
    let document = args.load().await?;
    let state = init_state().await?;
    let result = state.classification_service.classify_document(&document).await;

    print_json(&result)
}

/// Screen one document and print the screening result
pub async fn screen(args: DocumentArgs) -> anyhow::Result<()> {
    let document = args.load().await?;
    let state = init_state().await?;
    let result = state.pii_service.screen_for_pii(&document).await;

    print_json(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentContent;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("channel=web").unwrap(),
            ("channel".to_string(), "web".to_string())
        );
        assert_eq!(
            parse_key_value("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("no-separator").is_err());
        assert!(parse_key_value("=value").is_err());
    }

    #[test]
    fn test_pipeline_context() {
        let args = QueryArgs {
            query: "ration card".to_string(),
            context: vec![("channel".to_string(), "web".to_string())],
        };

        let context = args.pipeline_context();
        assert_eq!(context["channel"], serde_json::json!("web"));
    }

    #[tokio::test]
    async fn test_load_inline_text_with_mime_type() {
        let args = DocumentArgs {
            path: None,
            text: Some("# Deed".to_string()),
            mime_type: Some("text/markdown".to_string()),
        };

        let document = args.load().await.unwrap();

        assert_eq!(document.content, DocumentContent::Text("# Deed".to_string()));
        assert_eq!(document.mime_type.as_deref(), Some("text/markdown"));
    }

    #[tokio::test]
    async fn test_load_file_keeps_filename() {
        let path = std::env::temp_dir().join(format!("doc-{}.html", uuid::Uuid::new_v4()));
        std::fs::write(&path, "<p>permit</p>").unwrap();

        let args = DocumentArgs {
            path: Some(path.clone()),
            text: None,
            mime_type: None,
        };
        let document = args.load().await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(document.content, DocumentContent::Bytes(b"<p>permit</p>".to_vec()));
        assert!(document.filename.unwrap().ends_with(".html"));
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let args = DocumentArgs {
            path: Some(PathBuf::from("/nonexistent/doc.txt")),
            text: None,
            mime_type: None,
        };

        let err = args.load().await.unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
