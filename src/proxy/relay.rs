//! Response relay.
//!
//! # Responsibilities
//! - Copy upstream status, headers and body to the client response
//! - Drop framing headers that no longer describe the buffered body
//! - Default the content type and stamp CORS headers
//! - Render dispatch failures as 502 responses
//!
//! # Design Decisions
//! - Bodies are relayed as one buffered payload, so `Transfer-Encoding` and
//!   `Content-Encoding` never leave the proxy
//! - gzip and deflate bodies are decoded so they stay readable without their
//!   `Content-Encoding`; other codings are relayed as received
//! - Decoding runs on the blocking pool and stops at a size cap; a body that
//!   inflates past it is relayed as received

use std::io::{self, Read};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;
use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};

use crate::proxy::cors;
use crate::proxy::dispatch::DispatchError;
use crate::proxy::types::UpstreamResponse;

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Largest decoded body produced from a compressed upstream body (64 MiB).
pub const DEFAULT_DECODE_LIMIT: usize = 64 * 1024 * 1024;

/// Build the client response for a successful upstream exchange.
///
/// `decode_limit` caps the size of a decoded gzip/deflate body.
pub async fn relay(
    upstream: UpstreamResponse,
    allow_headers: HeaderValue,
    decode_limit: usize,
) -> Response<Body> {
    let UpstreamResponse {
        status,
        mut headers,
        body,
    } = upstream;

    let body = match decode_content(&headers, body, decode_limit).await {
        Decoded::Identity(body) => body,
        Decoded::Decoded(body) => {
            // Length referred to the encoded bytes.
            headers.remove(header::CONTENT_LENGTH);
            body
        }
        Decoded::Opaque { coding, body } => {
            tracing::warn!(
                content_encoding = %coding,
                "Relaying encoded body as received"
            );
            body
        }
    };

    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::CONTENT_ENCODING);

    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(FALLBACK_CONTENT_TYPE),
        );
    }

    cors::apply(&mut headers, allow_headers);

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// 502 with a plain-text explanation naming the origin and the cause.
pub fn dispatch_failure(
    origin: &str,
    error: &DispatchError,
    allow_headers: HeaderValue,
) -> Response<Body> {
    let mut response = (
        StatusCode::BAD_GATEWAY,
        format!("Error contacting {}: {}", origin, error),
    )
        .into_response();
    cors::apply(response.headers_mut(), allow_headers);
    response
}

enum Decoded {
    /// No coding, or an empty body: relayed as is.
    Identity(Bytes),
    /// Successfully decoded.
    Decoded(Bytes),
    /// A coding we cannot undo, or a body that failed to decode within the cap.
    Opaque { coding: String, body: Bytes },
}

#[derive(Debug, thiserror::Error)]
enum InflateError {
    #[error("decoded body exceeds {0} bytes")]
    TooLarge(usize),
    #[error(transparent)]
    Corrupt(#[from] io::Error),
}

async fn decode_content(headers: &HeaderMap, body: Bytes, limit: usize) -> Decoded {
    let coding = match headers
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase())
    {
        Some(coding) if !coding.is_empty() && coding != "identity" => coding,
        _ => return Decoded::Identity(body),
    };

    // HEAD and 204/304 replies carry the header without a body.
    if body.is_empty() {
        return Decoded::Identity(body);
    }

    if !matches!(coding.as_str(), "gzip" | "x-gzip" | "deflate") {
        return Decoded::Opaque { coding, body };
    }

    let input = body.clone();
    let task_coding = coding.clone();
    let decoded = tokio::task::spawn_blocking(move || inflate(&task_coding, &input, limit)).await;

    match decoded {
        Ok(Ok(bytes)) => Decoded::Decoded(Bytes::from(bytes)),
        Ok(Err(e)) => {
            tracing::warn!(content_encoding = %coding, error = %e, "Failed to decode upstream body");
            Decoded::Opaque { coding, body }
        }
        Err(e) => {
            tracing::error!(content_encoding = %coding, error = %e, "Decoder task did not complete");
            Decoded::Opaque { coding, body }
        }
    }
}

fn inflate(coding: &str, body: &[u8], limit: usize) -> Result<Vec<u8>, InflateError> {
    if coding == "deflate" {
        // "deflate" is zlib-wrapped per RFC 9110, but raw streams are common.
        return match read_capped(ZlibDecoder::new(body), limit) {
            Err(InflateError::Corrupt(_)) => read_capped(DeflateDecoder::new(body), limit),
            other => other,
        };
    }
    read_capped(MultiGzDecoder::new(body), limit)
}

fn read_capped<R: Read>(reader: R, limit: usize) -> Result<Vec<u8>, InflateError> {
    let mut out = Vec::new();
    reader
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut out)?;
    if out.len() > limit {
        return Err(InflateError::TooLarge(limit));
    }
    Ok(out)
}
