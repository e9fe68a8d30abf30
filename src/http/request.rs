//! Request tracing.
//!
//! # Responsibilities
//! - Generate a unique request ID per inbound request
//! - Open a span carrying ID, method and URI for everything logged downstream
//!
//! # Design Decisions
//! - The ID lives in the span only; inbound headers are forwarded untouched
//! - Request ID assigned as early as possible (outermost layer)

use std::fmt;

use axum::http::Request;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{MakeSpan, TraceLayer};
use tracing::Span;
use uuid::Uuid;

/// Unique identifier for one proxied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Makes the per-request span.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = RequestId::new();
        tracing::info_span!(
            "request",
            request_id = %request_id,
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}

pub type RequestTraceLayer = TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan>;

pub fn trace_layer() -> RequestTraceLayer {
    TraceLayer::new_for_http().make_span_with(RequestSpan)
}
