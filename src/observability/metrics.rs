//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): dispatches by method, status
//! - `dispatch_duration_seconds` (histogram): dispatch latency
//! - `dispatch_errors_reported_total` (counter): failures forwarded to
//!   telemetry by the error reporter, by status

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address. Failure to bind is
/// logged and leaves metrics as no-ops.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

/// Record one completed dispatch.
pub fn record_dispatch(method: &str, status: u16, started: Instant) {
    metrics::counter!(
        "dispatch_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("dispatch_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Record a failure the reporter decided to forward to telemetry.
pub fn record_reported_error(status: u16) {
    metrics::counter!(
        "dispatch_errors_reported_total",
        "status" => status.to_string()
    )
    .increment(1);
}
