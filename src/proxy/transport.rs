//! HTTP client capability used to reach the upstream.

use std::future::Future;

use axum::body::Body;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioTimer},
};

use crate::config::UpstreamConfig;
use crate::proxy::dispatch::DispatchError;
use crate::proxy::types::{UpstreamRequest, UpstreamResponse};

/// Sends one request and returns the fully buffered response.
///
/// Implementations report network-level failures as `Err`; any HTTP status
/// the upstream produces is an `Ok`. Deadlines are applied by the caller.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: UpstreamRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, DispatchError>> + Send;
}

/// Pooled hyper client over plain TCP. Never follows redirects.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
}

impl HyperTransport {
    pub fn new(config: &UpstreamConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout())
            .pool_timer(TokioTimer::new())
            .build(connector);

        Self { client }
    }
}

impl Transport for HyperTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, DispatchError> {
        let url = request.uri.to_string();
        let request = request.into_http().map_err(|e| DispatchError::InvalidUrl {
            url,
            reason: e.to_string(),
        })?;

        let response: hyper::Response<hyper::body::Incoming> = self
            .client
            .request(request)
            .await
            .map_err(|e| DispatchError::transport(&e))?;

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), usize::MAX)
            .await
            .map_err(|e| DispatchError::body(&e))?;

        Ok(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Canned transport that records what it was asked to send.
    #[derive(Clone)]
    pub struct StubTransport {
        outcome: Result<UpstreamResponse, DispatchError>,
        delay: Option<Duration>,
        seen: Arc<Mutex<Vec<UpstreamRequest>>>,
    }

    impl StubTransport {
        pub fn respond(status: StatusCode, body: &'static str) -> Self {
            Self::respond_with(UpstreamResponse {
                status,
                headers: HeaderMap::new(),
                body: Bytes::from_static(body.as_bytes()),
            })
        }

        pub fn respond_with(response: UpstreamResponse) -> Self {
            Self {
                outcome: Ok(response),
                delay: None,
                seen: Arc::default(),
            }
        }

        pub fn fail(error: DispatchError) -> Self {
            Self {
                outcome: Err(error),
                delay: None,
                seen: Arc::default(),
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        pub fn last_request(&self) -> Option<UpstreamRequest> {
            self.seen.lock().unwrap().last().cloned()
        }
    }

    impl Transport for StubTransport {
        async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, DispatchError> {
            self.seen.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.clone()
        }
    }
}
