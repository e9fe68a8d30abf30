//! The forwarding handler: one inbound request in, one response out.

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::Response;

use crate::config::UpstreamConfig;
use crate::observability::events;
use crate::proxy::cors;
use crate::proxy::dispatch::Dispatcher;
use crate::proxy::preflight;
use crate::proxy::relay;
use crate::proxy::translate::Translator;
use crate::proxy::transport::{HyperTransport, Transport};
use crate::proxy::types::InboundRequest;

/// Stateless request forwarder bound to a single upstream origin.
#[derive(Debug, Clone)]
pub struct ForwardingHandler<T> {
    origin: String,
    translator: Translator,
    dispatcher: Dispatcher<T>,
    decode_limit: usize,
}

impl ForwardingHandler<HyperTransport> {
    /// Handler backed by the pooled hyper client.
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(&config.origin, config.timeout(), HyperTransport::new(config))
            .with_decode_limit(config.max_decoded_body_bytes)
    }
}

impl<T: Transport> ForwardingHandler<T> {
    pub fn new(origin: &str, timeout: Duration, transport: T) -> Self {
        Self {
            origin: origin.to_string(),
            translator: Translator::new(origin),
            dispatcher: Dispatcher::new(transport, timeout),
            decode_limit: relay::DEFAULT_DECODE_LIMIT,
        }
    }

    /// Cap on the size of a decoded compressed upstream body.
    pub fn with_decode_limit(mut self, limit: usize) -> Self {
        self.decode_limit = limit;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn timeout(&self) -> Duration {
        self.dispatcher.timeout()
    }

    /// Preflight, translate, dispatch, relay. Always yields a response.
    pub async fn handle(&self, inbound: InboundRequest) -> Response<Body> {
        let allow_headers = cors::allow_headers_for(&inbound.headers);

        if preflight::is_preflight(&inbound.method) {
            events::preflight_answered(&inbound.path);
            return preflight::respond(allow_headers);
        }

        let start = Instant::now();
        let method = inbound.method.clone();

        let outcome = match self.translator.translate(inbound) {
            Ok(request) => {
                events::forwarding(&request.method, &request.uri.to_string());
                self.dispatcher.dispatch(request).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(upstream) => {
                events::relayed(&method, upstream.status, upstream.body.len(), start);
                relay::relay(upstream, allow_headers, self.decode_limit).await
            }
            Err(error) => {
                events::dispatch_failed(&method, &self.origin, &error, start);
                relay::dispatch_failure(&self.origin, &error, allow_headers)
            }
        }
    }
}
