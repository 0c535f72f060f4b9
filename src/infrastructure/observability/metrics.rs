//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("agentic_rag_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Outcome of one pipeline run, as recorded in metrics
#[derive(Debug, Clone, Copy)]
pub struct PipelineRunMetric<'a> {
    pub pipeline: &'static str,
    pub tag: &'a str,
    pub retrieval_retries: u32,
    pub validation_retries: u32,
    pub duration: Duration,
}

/// Record a finished pipeline run
pub fn record_pipeline_run(metric: PipelineRunMetric<'_>) {
    counter!(
        "pipeline_runs_total",
        "pipeline" => metric.pipeline,
        "tag" => metric.tag.to_string()
    )
    .increment(1);

    if metric.retrieval_retries > 0 {
        counter!("pipeline_retries_total", "pipeline" => metric.pipeline, "loop" => "retrieval")
            .increment(u64::from(metric.retrieval_retries));
    }

    if metric.validation_retries > 0 {
        counter!("pipeline_retries_total", "pipeline" => metric.pipeline, "loop" => "validation")
            .increment(u64::from(metric.validation_retries));
    }

    histogram!("pipeline_run_duration_seconds", "pipeline" => metric.pipeline)
        .record(metric.duration.as_secs_f64());
}
