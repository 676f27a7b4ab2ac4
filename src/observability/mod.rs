// src/observability/mod.rs
//! Tracing and metrics setup
//!
//! Metric names are shared here so the emitter, the filters and the CLI agree
//! on them.

use crate::utils::config::LoggingConfig;
use crate::utils::errors::{RecorderError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

/// Events handed to the sink, labelled by `kind`
pub const EVENTS_EMITTED: &str = "recorder_events_emitted_total";

/// Events the sink refused, labelled by `reason`
pub const EVENTS_DROPPED: &str = "recorder_events_dropped_total";

/// Clicks rejected by the actionability filter
pub const CLICKS_FILTERED: &str = "recorder_clicks_filtered_total";

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| RecorderError::ConfigError(format!("Invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| RecorderError::ConfigError(format!("Tracing init failed: {}", e)))
}

/// Install the Prometheus metrics recorder
pub fn init_metrics() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| RecorderError::ConfigError(format!("Metrics init failed: {}", e)))
}
