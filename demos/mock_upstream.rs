//! Echo upstream for trying the relay by hand.
//!
//! ```text
//! cargo run --example mock_upstream            # listens on 127.0.0.1:7001
//! cargo run -- --upstream http://127.0.0.1:7001
//! curl -i -X POST --data-binary @file http://127.0.0.1:8081/anything?x=1
//! ```

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, Uri},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;

async fn describe(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let headers: serde_json::Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect();

    Json(json!({
        "method": method.as_str(),
        "uri": uri.to_string(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/status", get(|| async { "Upstream is healthy" }))
        .fallback(describe);

    let addr = SocketAddr::from(([127, 0, 0, 1], 7001));
    println!("Mock upstream listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
