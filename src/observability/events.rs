//! Event sink for the forwarding pipeline.
//!
//! The handler reports what happened here; nothing in this module feeds
//! back into request handling.

use std::time::Instant;

use axum::http::{Method, StatusCode};

use crate::observability::metrics;
use crate::proxy::dispatch::DispatchError;

pub fn preflight_answered(path: &str) {
    tracing::debug!(path = %path, "Answered preflight locally");
    metrics::record_preflight();
}

pub fn forwarding(method: &Method, url: &str) {
    tracing::debug!(method = %method, url = %url, "Forwarding request");
}

pub fn relayed(method: &Method, status: StatusCode, body_len: usize, start: Instant) {
    tracing::info!(
        method = %method,
        status = status.as_u16(),
        bytes = body_len,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Relayed upstream response"
    );
    metrics::record_request(method, status, start);
}

pub fn dispatch_failed(method: &Method, origin: &str, error: &DispatchError, start: Instant) {
    tracing::warn!(
        method = %method,
        origin = %origin,
        kind = error.kind(),
        error = %error,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Upstream dispatch failed"
    );
    metrics::record_upstream_failure(error.kind());
    metrics::record_request(method, StatusCode::BAD_GATEWAY, start);
}
