//! Observability module for logging, tracing spans and metrics.
//!
//! This module provides:
//! - Structured logging with configurable levels (pretty or JSON, on stderr)
//! - Span helpers for extraction and nutrition lookups
//! - Metrics recording through the `metrics` facade, with an optional
//!   Prometheus text renderer for the CLI

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;

/// Initialize structured logging with tracing and configuration
///
/// Logs go to stderr so that stdout stays reserved for the diary report.
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("food_diary={}", config.log_level.to_lowercase()).parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("hyper=warn".parse()?);

    if config.use_pretty_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::debug!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Install the Prometheus recorder when metrics export is enabled
pub fn init_metrics_with_config(config: &ObservabilityConfig) -> Result<Option<PrometheusHandle>> {
    if !config.enable_metrics_export {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::debug!("Prometheus metrics recorder installed");
    Ok(Some(handle))
}

/// Initialize logging and metrics in one call
pub fn init_observability(config: &ObservabilityConfig) -> Result<Option<PrometheusHandle>> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;
    init_tracing_with_config(config)?;
    init_metrics_with_config(config)
}

/// Create a tracing span for an extraction call
pub fn extraction_span(text_length: usize) -> tracing::Span {
    tracing::info_span!("extraction", text_length = text_length)
}

/// Create a tracing span for a nutrition lookup
pub fn nutrition_span(source: &str, ingredient_count: usize) -> tracing::Span {
    tracing::info_span!(
        "nutrition_lookup",
        source = %source,
        ingredient_count = ingredient_count
    )
}

/// Record extraction performance metrics
pub fn record_extraction_metrics(
    duration: std::time::Duration,
    token_count: usize,
    candidates: usize,
    records: usize,
    rejected: usize,
) {
    metrics::counter!("extraction_operations_total").increment(1);
    metrics::histogram!("extraction_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("extraction_token_count").record(token_count as f64);
    metrics::counter!("extraction_candidates_total").increment(candidates as u64);
    metrics::counter!("extraction_records_total").increment(records as u64);
    metrics::counter!("extraction_rejected_total").increment(rejected as u64);

    if records == 0 {
        metrics::counter!("extraction_empty_results_total").increment(1);
    }
}

/// Record nutrition lookup metrics
pub fn record_nutrition_lookup_metrics(
    source: &str,
    success: bool,
    duration: std::time::Duration,
    ingredient_count: usize,
) {
    let source = source.to_string();
    let status = if success { "success" } else { "failure" };
    metrics::counter!(
        "nutrition_lookups_total",
        "source" => source.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!("nutrition_lookup_duration_seconds", "source" => source.clone())
        .record(duration.as_secs_f64());
    metrics::histogram!("nutrition_lookup_ingredient_count", "source" => source)
        .record(ingredient_count as f64);
}

/// Record a retry of the nutrition API
pub fn record_retry(operation: &str, attempt: u32) {
    metrics::counter!("nutrition_api_retries_total", "operation" => operation.to_string())
        .increment(1);
    tracing::trace!(operation = %operation, attempt = attempt, "Recorded retry");
}

/// Update circuit breaker state metric
pub fn update_circuit_breaker_state(is_open: bool) {
    metrics::gauge!("nutrition_api_circuit_breaker_open").set(if is_open { 1.0 } else { 0.0 });
}

/// Record error metrics by type and component
pub fn record_error_metrics(error_type: &str, component: &str) {
    metrics::counter!(
        "errors_total",
        "type" => error_type.to_string(),
        "component" => component.to_string()
    )
    .increment(1);
}
