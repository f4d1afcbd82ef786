//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `proxy_requests_rejected_total` (counter): admission denials by algorithm
//! - `proxy_tracked_clients` (gauge): registry size after each sweep
//!
//! # Design Decisions
//! - Recording is cheap and unconditional; without an installed exporter
//!   the macros are no-ops, so tests pay nothing
//! - The Prometheus endpoint runs on its own listener, separate from the
//!   proxy port

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record one proxied (or rejected) request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record an admission denial.
pub fn record_rejected(algorithm: &str) {
    counter!(
        "proxy_requests_rejected_total",
        "algorithm" => algorithm.to_string(),
    )
    .increment(1);
}

/// Record the registry size after a sweep.
pub fn record_tracked_clients(count: usize) {
    gauge!("proxy_tracked_clients").set(count as f64);
}
