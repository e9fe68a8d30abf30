//! Preflight short-circuit: OPTIONS never reaches the upstream.

use axum::body::Body;
use axum::http::{HeaderValue, Method, Response, StatusCode};

use crate::proxy::cors;

pub fn is_preflight(method: &Method) -> bool {
    method == Method::OPTIONS
}

/// 200, empty body, CORS headers.
pub fn respond(allow_headers: HeaderValue) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    cors::apply(response.headers_mut(), allow_headers);
    response
}
