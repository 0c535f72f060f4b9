use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::DomainError;
use crate::domain::completion::{CompletionRequest, TextCompletion};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Ollama `/api/generate` backend, non-streaming
#[derive(Debug)]
pub struct OllamaClient<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OllamaClient<C> {
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self::with_base_url(client, model, DEFAULT_OLLAMA_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn build_request(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "prompt": request.prompt,
            "stream": false,
        });

        if let Some(ref system) = request.system {
            body["system"] = serde_json::json!(system);
        }

        if let Some(temperature) = request.temperature {
            body["options"] = serde_json::json!({ "temperature": temperature });
        }

        if request.json_output {
            body["format"] = serde_json::json!("json");
        }

        body
    }
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

#[async_trait]
impl<C: HttpClientTrait> TextCompletion for OllamaClient<C> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
        let body = self.build_request(request);
        let json = self
            .client
            .post_json(
                &self.generate_url(),
                vec![("Content-Type", "application/json")],
                &body,
            )
            .await?;

        let response: OllamaGenerateResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("ollama", format!("Failed to parse response: {}", e))
        })?;

        if !response.done {
            return Err(DomainError::provider("ollama", "Incomplete generation"));
        }

        debug!(model = %self.model, chars = response.response.len(), "Ollama completion");
        Ok(response.response)
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}
