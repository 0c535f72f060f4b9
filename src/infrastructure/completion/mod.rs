//! Text completion backends

mod http_client;
mod ollama;

pub use http_client::{HttpClient, HttpClientTrait};
pub use ollama::{DEFAULT_OLLAMA_BASE_URL, OllamaClient};
