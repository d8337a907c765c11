//! Metrics collection and exposition.
//!
//! # Metrics
//! - `courier_requests_total` (counter): requests by method and status
//! - `courier_request_duration_seconds` (histogram): latency distribution
//! - `courier_route_cache_total` (counter): route cache lookups by result
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Serve Prometheus metrics on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    counter!("courier_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    histogram!("courier_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_route_cache(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("courier_route_cache_total", "result" => result).increment(1);
}
