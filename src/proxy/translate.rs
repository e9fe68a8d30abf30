//! Inbound → upstream request translation.
//!
//! The body is never inspected or re-encoded; bytes in are bytes out.

use axum::http::{header, Uri};

use crate::proxy::dispatch::DispatchError;
use crate::proxy::types::{InboundRequest, UpstreamRequest};

/// Rewrites inbound requests to target the fixed origin.
#[derive(Debug, Clone)]
pub struct Translator {
    /// Origin without a trailing slash.
    base: String,
}

impl Translator {
    pub fn new(origin: &str) -> Self {
        Self {
            base: origin.trim_end_matches('/').to_string(),
        }
    }

    /// `<origin>/<path>` plus `?<query>` when there is one.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}/{}?{}", self.base, path, q),
            _ => format!("{}/{}", self.base, path),
        }
    }

    pub fn translate(&self, inbound: InboundRequest) -> Result<UpstreamRequest, DispatchError> {
        let url = self.target_url(&inbound.path, inbound.query.as_deref());
        let uri: Uri = url.parse().map_err(|e: axum::http::uri::InvalidUri| {
            DispatchError::InvalidUrl {
                url: url.clone(),
                reason: e.to_string(),
            }
        })?;

        // The client fills in Host from the target URI.
        let mut headers = inbound.headers;
        headers.remove(header::HOST);

        Ok(UpstreamRequest {
            method: inbound.method,
            uri,
            headers,
            body: inbound.body,
        })
    }
}
