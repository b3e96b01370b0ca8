//! Metrics collection and exposition.
//!
//! # Metrics
//! - `regproxy_requests_total` (counter): proxied requests by method, status
//! - `regproxy_request_duration_seconds` (histogram): end-to-end latency
//! - `regproxy_fanout_targets` (histogram): snapshot size per dispatch
//! - `regproxy_registrations_total` (counter): registrations by kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record one proxied request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "regproxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("regproxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record the fan-out width of one dispatch.
pub fn record_fanout(targets: usize) {
    histogram!("regproxy_fanout_targets").record(targets as f64);
}

/// Record one registration call.
pub fn record_registration(replaced: bool) {
    let kind = if replaced { "replaced" } else { "new" };
    counter!("regproxy_registrations_total", "kind" => kind).increment(1);
}
