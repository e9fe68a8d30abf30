//! Upstream dispatch with a hard deadline.
//!
//! # Responsibilities
//! - Send the translated request through the injected [`Transport`]
//! - Bound the whole exchange (headers and body) by the configured timeout
//! - Turn every network-level problem into a [`DispatchError`] value
//!
//! # Design Decisions
//! - No retries: one attempt, one outcome
//! - Redirects are not followed; a 3xx is an ordinary response
//! - An HTTP error status from the upstream is a success here

use std::error::Error as StdError;
use std::time::Duration;

use crate::proxy::transport::Transport;
use crate::proxy::types::{UpstreamRequest, UpstreamResponse};

/// Why the upstream could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid upstream URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl DispatchError {
    /// Wrap a client error, keeping its whole source chain in the message.
    pub fn transport(err: &(dyn StdError + 'static)) -> Self {
        Self::Transport(error_chain(err))
    }

    pub fn body(err: &(dyn StdError + 'static)) -> Self {
        Self::Body(error_chain(err))
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::Timeout(_) => "timeout",
            Self::Transport(_) => "transport",
            Self::Body(_) => "body",
        }
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // hyper repeats the inner message in some wrappers
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// Sends requests to the upstream under a fixed deadline.
#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    transport: T,
    timeout: Duration,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform exactly one upstream exchange.
    pub async fn dispatch(
        &self,
        request: UpstreamRequest,
    ) -> Result<UpstreamResponse, DispatchError> {
        match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout(self.timeout)),
        }
    }
}
