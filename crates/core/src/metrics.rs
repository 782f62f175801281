//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Dispatcher (translation requests, batch latency, circuit breaker)
//! - Pipeline (segments translated, jobs by outcome)
//! - Job service (requests by operation)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Dispatcher Metrics
// =============================================================================

/// Translation requests total by result.
pub static TRANSLATION_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "doctrans_translation_requests_total",
            "Total translation endpoint requests",
        ),
        &["result"], // "success", "timeout", "error"
    )
    .unwrap()
});

/// Latency of single translation requests in seconds.
pub static BATCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "doctrans_batch_duration_seconds",
            "Duration of translation requests per batch",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["result"],
    )
    .unwrap()
});

/// Retried batch attempts total by reason.
pub static BATCH_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("doctrans_batch_retries_total", "Total batch retries"),
        &["reason"], // "timeout", "error"
    )
    .unwrap()
});

/// Circuit breaker trips total.
pub static BREAKER_TRIPS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "doctrans_breaker_trips_total",
        "Total jobs aborted by the consecutive failure limit",
    )
    .unwrap()
});

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Segments translated total.
pub static SEGMENTS_TRANSLATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "doctrans_segments_translated_total",
        "Total segments translated",
    )
    .unwrap()
});

/// Jobs finished total by outcome.
pub static JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("doctrans_jobs_total", "Total translation jobs finished"),
        &["outcome"], // "completed", "failed", "halted"
    )
    .unwrap()
});

/// Job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("doctrans_job_duration_seconds", "Duration of translation jobs")
            .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["outcome"],
    )
    .unwrap()
});

// =============================================================================
// Job Service Metrics
// =============================================================================

/// Job service requests total by operation and result.
pub static JOB_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "doctrans_job_service_requests_total",
            "Total requests to the file translation service",
        ),
        &["operation", "result"],
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Dispatcher
        Box::new(TRANSLATION_REQUESTS.clone()),
        Box::new(BATCH_DURATION.clone()),
        Box::new(BATCH_RETRIES.clone()),
        Box::new(BREAKER_TRIPS.clone()),
        // Pipeline
        Box::new(SEGMENTS_TRANSLATED.clone()),
        Box::new(JOBS_TOTAL.clone()),
        Box::new(JOB_DURATION.clone()),
        // Job service
        Box::new(JOB_SERVICE_REQUESTS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_once() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        TRANSLATION_REQUESTS.with_label_values(&["success"]).inc();
        assert!(registry
            .gather()
            .iter()
            .any(|f| f.get_name() == "doctrans_translation_requests_total"));
    }
}
