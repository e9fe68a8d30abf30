//! Request-scoped messages flowing through the forwarding pipeline.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};

/// A request as received from the client, fully buffered.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Raw path without the leading slash (may itself contain slashes).
    pub path: String,
    /// Raw query string, `None` when absent or empty.
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InboundRequest {
    pub fn new(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        let path = uri.path();
        let path = path.strip_prefix('/').unwrap_or(path).to_string();
        let query = uri
            .query()
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        Self {
            method,
            path,
            query,
            headers,
            body,
        }
    }
}

/// A request addressed to the upstream origin.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamRequest {
    /// Convert into an `http::Request` for a hyper-based client.
    pub fn into_http(self) -> Result<Request<Body>, axum::http::Error> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(headers) = builder.headers_mut() {
            *headers = self.headers;
        }
        builder.body(Body::from(self.body))
    }
}

/// A complete upstream response with its body read into memory.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// The upstream's declared content type, if any.
    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.headers.get(header::CONTENT_TYPE)
    }
}
