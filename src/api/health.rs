//! Health check endpoints for Kubernetes probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Individual component health check
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: Some(message.into()),
        }
    }
}

/// Simple health check, 200 while the process is up
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check over the loaded pipeline components.
///
/// An empty corpus or graph still accepts requests: every run degrades to the
/// failed-retrieval path.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let checks = vec![
        HealthCheck::new(
            "scoring_strategy",
            HealthStatus::Healthy,
            state.strategy_name.clone(),
        ),
        component_check("corpus", state.corpus_size, "documents"),
        component_check("knowledge_graph", state.graph_entities, "entities"),
    ];

    let overall_status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    (StatusCode::OK, Json(response))
}

/// Liveness check
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

fn component_check(name: &str, count: usize, unit: &str) -> HealthCheck {
    let status = if count == 0 {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    HealthCheck::new(name, status, format!("{} {}", count, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_check() {
        let check = component_check("corpus", 5, "documents");
        assert_eq!(check.status, HealthStatus::Healthy);
        assert_eq!(check.message.as_deref(), Some("5 documents"));

        let check = component_check("knowledge_graph", 0, "entities");
        assert_eq!(check.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::Degraded).unwrap();
        assert_eq!(json, r#""degraded""#);
    }
}
