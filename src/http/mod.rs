//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all route, body buffering)
//!     → request.rs (request ID span)
//!     → proxy::ForwardingHandler (preflight / forward / relay)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{trace_layer, RequestId, RequestSpan};
pub use server::HttpServer;
