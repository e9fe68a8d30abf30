//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router routing every path and method to the forwarder
//! - Wire up middleware (tracing span with request ID, body limit)
//! - Buffer the inbound request and hand it to the forwarding handler
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Uri},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;

use crate::config::ProxyConfig;
use crate::http::request;
use crate::proxy::{ForwardingHandler, HyperTransport, InboundRequest, Transport};

/// HTTP server for the relay.
pub struct HttpServer<T = HyperTransport> {
    router: Router,
    handler: Arc<ForwardingHandler<T>>,
}

impl HttpServer<HyperTransport> {
    /// Create a new HTTP server forwarding through the pooled hyper client.
    pub fn new(config: ProxyConfig) -> Self {
        let handler = ForwardingHandler::from_config(&config.upstream);
        Self::with_handler(config, handler)
    }
}

impl<T: Transport> HttpServer<T> {
    /// Create a server around an already-built forwarding handler.
    pub fn with_handler(config: ProxyConfig, handler: ForwardingHandler<T>) -> Self {
        let handler = Arc::new(handler);
        let router = Self::build_router(&config, handler.clone());
        Self { router, handler }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, handler: Arc<ForwardingHandler<T>>) -> Router {
        let body_limit = match config.listener.body_limit_bytes {
            Some(limit) => DefaultBodyLimit::max(limit),
            None => DefaultBodyLimit::disable(),
        };

        Router::new()
            .route("/{*path}", any(proxy_handler::<T>))
            .route("/", any(proxy_handler::<T>))
            .with_state(handler)
            .layer(
                ServiceBuilder::new()
                    .layer(request::trace_layer())
                    .layer(body_limit),
            )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.handler.origin(),
            timeout_secs = self.handler.timeout().as_secs(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Every path, every method.
async fn proxy_handler<T: Transport>(
    State(handler): State<Arc<ForwardingHandler<T>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    handler
        .handle(InboundRequest::new(method, &uri, headers, body))
        .await
}
