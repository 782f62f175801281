//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the translation worker:
//! - HTTP request metrics (latency, counts)
//! - Task control requests and running tasks
//! - Core metrics (dispatcher, pipeline, job service), registered from `doctrans_core`

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "doctrans_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("doctrans_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "doctrans_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Task Metrics
// =============================================================================

/// Task control requests by action and result.
pub static TASK_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("doctrans_task_requests_total", "Task start/stop requests"),
        &["action", "result"], // action: "start", "stop"
    )
    .unwrap()
});

/// Tasks currently running (collected dynamically).
pub static TASKS_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("doctrans_tasks_running", "Number of running translation tasks").unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Tasks
    registry.register(Box::new(TASK_REQUESTS.clone())).unwrap();
    registry.register(Box::new(TASKS_RUNNING.clone())).unwrap();

    // Core metrics (dispatcher, pipeline, job service)
    for metric in doctrans_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Update gauges from the current application state before encoding.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let running = state.runner().active_tasks().await.len();
    TASKS_RUNNING.set(running as i64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_includes_core_metrics() {
        doctrans_core::metrics::BREAKER_TRIPS.inc();
        HTTP_REQUESTS_IN_FLIGHT.set(0);

        let text = encode_metrics().unwrap();
        assert!(text.contains("doctrans_http_requests_in_flight"));
        assert!(text.contains("doctrans_breaker_trips_total"));
    }
}
