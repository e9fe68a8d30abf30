//! Forwarding core.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → preflight.rs (OPTIONS answered locally, stop)
//!     → translate.rs (target URL, header hygiene, raw body)
//!     → dispatch.rs (one attempt through transport.rs, bounded by timeout)
//!     → relay.rs (status/body/headers copied, CORS added, or 502)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - No shared mutable state; the handler is a function of its input
//! - Dispatch failure is a value, rendered by the relay
//! - The HTTP client sits behind the `Transport` trait so tests can stub it

pub mod cors;
pub mod dispatch;
pub mod handler;
pub mod preflight;
pub mod relay;
pub mod translate;
pub mod transport;
pub mod types;

pub use dispatch::{DispatchError, Dispatcher};
pub use handler::ForwardingHandler;
pub use transport::{HyperTransport, Transport};
pub use types::{InboundRequest, UpstreamRequest, UpstreamResponse};
