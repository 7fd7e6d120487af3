//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by request type, status
//! - `dispatch_request_duration_seconds` (histogram): latency distribution
//! - `dispatch_static_requests_total` (counter): static assets by status

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_request(request_type: &'static str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        "dispatch_requests_total",
        "request_type" => request_type,
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "dispatch_request_duration_seconds",
        "request_type" => request_type,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one static asset request.
pub fn record_static(status: u16) {
    metrics::counter!("dispatch_static_requests_total", "status" => status.to_string()).increment(1);
}
