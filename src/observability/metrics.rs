//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define service metrics (requests, latency, shedding, queue state)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `shortener_requests_total` (counter): finished requests by method, status
//! - `shortener_request_duration_seconds` (histogram): latency distribution
//! - `shortener_shed_total` (counter): requests rejected by admission control
//! - `shortener_queue_full_total` (counter): submits rejected by a full worker queue
//! - `shortener_jobs_total` (counter): jobs processed by payload kind
//! - `shortener_job_duration_seconds` (histogram): per-job handler time
//! - `shortener_handler_faults_total` (counter): handler panics caught at the dispatch boundary
//! - `shortener_backend_calls_total` (counter): adapter calls by operation, outcome
//!
//! # Design Decisions
//! - The `metrics` facade keeps call sites cheap; the exporter is
//!   installed once at startup and only when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
///
/// Must be called from within a Tokio runtime; the exporter spawns its
/// own listener task.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

fn describe_metrics() {
    describe_counter!("shortener_requests_total", "Finished requests");
    describe_histogram!(
        "shortener_request_duration_seconds",
        "End-to-end request latency"
    );
    describe_counter!(
        "shortener_shed_total",
        "Requests rejected by admission control"
    );
    describe_counter!(
        "shortener_queue_full_total",
        "Submits rejected by a saturated worker queue"
    );
    describe_counter!("shortener_jobs_total", "Jobs processed by the pool");
    describe_histogram!("shortener_job_duration_seconds", "Per-job handler time");
    describe_counter!(
        "shortener_handler_faults_total",
        "Handler panics caught at the dispatch boundary"
    );
    describe_counter!("shortener_backend_calls_total", "Data service calls");
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "shortener_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("shortener_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record an admission-control rejection.
pub fn record_shed() {
    counter!("shortener_shed_total").increment(1);
}

/// Record a submit rejected by a full worker queue.
pub fn record_queue_full() {
    counter!("shortener_queue_full_total").increment(1);
}

/// Record a processed job.
pub fn record_job(kind: &'static str, start: Instant) {
    counter!("shortener_jobs_total", "kind" => kind).increment(1);
    histogram!("shortener_job_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

/// Record a handler panic caught by the worker loop.
pub fn record_handler_fault() {
    counter!("shortener_handler_faults_total").increment(1);
}

/// Record a data service call outcome.
pub fn record_backend_call(operation: &'static str, outcome: &'static str) {
    counter!(
        "shortener_backend_calls_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
