//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (decisions, requests, latency)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `locale_router_decisions_total` (counter): routing outcomes by action, source
//! - `locale_router_requests_total` (counter): responses by status
//! - `locale_router_request_duration_seconds` (histogram): latency distribution
//! - `locale_router_reloads_total` (counter): routing reloads by result
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Recording is a no-op until an exporter is installed, so tests and the
//!   CLI need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::Outcome;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one routing outcome.
pub fn record_decision(outcome: &Outcome) {
    metrics::counter!(
        "locale_router_decisions_total",
        "action" => outcome.action.kind(),
        "source" => outcome.source.as_str(),
    )
    .increment(1);
}

/// Count one response and its latency.
pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("locale_router_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("locale_router_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Count one routing reload attempt.
pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("locale_router_reloads_total", "result" => result).increment(1);
}
