//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use cors_relay::config::ProxyConfig;
use cors_relay::http::HttpServer;
use cors_relay::lifecycle::Shutdown;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A relay running in-process; stops when dropped.
pub struct RunningProxy {
    pub addr: SocketAddr,
    pub origin: String,
    shutdown: Shutdown,
}

impl RunningProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Relay config for `origin` on an ephemeral loopback port.
pub fn proxy_config(origin: &str, timeout_secs: u64) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.upstream.origin = origin.to_string();
    config.upstream.timeout_secs = timeout_secs;
    config
}

/// Start the relay in front of `origin`.
pub async fn start_proxy(origin: &str, timeout_secs: u64) -> RunningProxy {
    start_proxy_with(proxy_config(origin, timeout_secs)).await
}

/// Start the relay with a custom config.
pub async fn start_proxy_with(config: ProxyConfig) -> RunningProxy {
    let origin = config.upstream.origin.clone();
    let listener = TcpListener::bind(config.listener.bind_address()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningProxy {
        addr,
        origin,
        shutdown,
    }
}

/// Serve an axum app on an ephemeral port; returns its origin URL.
pub async fn start_upstream(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

/// An origin nothing listens on.
pub async fn refused_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// A raw TCP upstream: reads the request head, writes `response` verbatim,
/// optionally stalls, then closes.
pub async fn start_raw_upstream(response: Vec<u8>, stall: Option<Duration>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let response = response.clone();
                    tokio::spawn(async move {
                        read_request_head(&mut socket).await;
                        let _ = socket.write_all(&response).await;
                        if let Some(stall) = stall {
                            tokio::time::sleep(stall).await;
                        }
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    format!("http://{}", addr)
}

/// A keep-alive upstream answering `200 ok` to every request; the counter
/// tracks how many of its connections are currently open.
pub async fn start_keepalive_upstream() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let open = Arc::new(AtomicUsize::new(0));

    let counter = open.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let counter = counter.clone();
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                while read_request_head(&mut socket).await {
                    let reply = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nContent-Type: text/plain\r\n\r\nok";
                    if socket.write_all(reply).await.is_err() {
                        break;
                    }
                }
                counter.fetch_sub(1, Ordering::SeqCst);
            });
        }
    });

    (format!("http://{}", addr), open)
}

/// Reads one request head; false once the peer has gone away.
async fn read_request_head(socket: &mut tokio::net::TcpStream) -> bool {
    let mut seen = Vec::new();
    let mut buf = [0u8; 1024];
    while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return false,
            Ok(n) => seen.extend_from_slice(&buf[..n]),
        }
    }
    true
}

/// Upstream used by most tests:
/// - `/echo` returns the request body with the request content type
/// - `/status/{code}` answers with that status
/// - `/slow/{ms}` sleeps before answering
/// - `/redirect` answers 302
/// - `/cors` sets its own CORS headers
/// - anything else describes the request it received as JSON
pub fn echo_upstream() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/slow/{ms}", get(slow))
        .route("/redirect", get(redirect))
        .route("/cors", get(own_cors))
        .fallback(inspect)
}

async fn echo(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| header::HeaderValue::from_static("application/octet-stream"));
    ([(header::CONTENT_TYPE, content_type)], body)
}

async fn status(axum::extract::Path(code): axum::extract::Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("upstream said {}", code))
}

async fn slow(axum::extract::Path(ms): axum::extract::Path<u64>) -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    format!("slept {}", ms)
}

async fn redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/somewhere-else")], "moved")
}

async fn own_cors() -> impl IntoResponse {
    (
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "https://only-this.example"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "x-nothing"),
        ],
        "restricted",
    )
}

async fn inspect(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let mut header_map = Map::new();
    for (name, value) in headers.iter() {
        header_map.insert(
            name.to_string(),
            Value::String(value.to_str().unwrap_or("<binary>").to_string()),
        );
    }
    Json(json!({
        "method": method.as_str(),
        "uri": uri.to_string(),
        "headers": header_map,
        "body_len": body.len(),
    }))
}

/// Test client: no system proxy, no redirect following, no decompression.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
