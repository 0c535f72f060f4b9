//! Observability infrastructure - Metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    PipelineRunMetric, PrometheusMetrics, create_metrics_router, init_metrics,
    record_pipeline_run,
};
