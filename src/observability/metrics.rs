//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): relayed and failed requests by method, status
//! - `proxy_request_duration_seconds` (histogram): end-to-end forwarding latency
//! - `proxy_upstream_failures_total` (counter): dispatch failures by kind
//! - `proxy_preflight_total` (counter): preflight requests answered locally
//!
//! Recording is a no-op until a recorder is installed, so the core can call
//! these unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &Method, status: StatusCode, start: Instant) {
    ::metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    ::metrics::histogram!("proxy_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_failure(kind: &'static str) {
    ::metrics::counter!("proxy_upstream_failures_total", "kind" => kind).increment(1);
}

pub fn record_preflight() {
    ::metrics::counter!("proxy_preflight_total").increment(1);
}
