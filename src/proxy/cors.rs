//! Cross-origin headers attached to every outbound response.

use axum::http::{header, HeaderMap, HeaderValue};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS, PATCH, HEAD";
pub const DEFAULT_ALLOW_HEADERS: &str = "Content-Type";

/// The `Access-Control-Allow-Headers` value for a request: the browser's
/// `Access-Control-Request-Headers` echoed back, or `Content-Type`.
pub fn allow_headers_for(inbound: &HeaderMap) -> HeaderValue {
    inbound
        .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_ALLOW_HEADERS))
}

/// Set the three CORS headers, replacing whatever was there.
pub fn apply(headers: &mut HeaderMap, allow_headers: HeaderValue) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
}
