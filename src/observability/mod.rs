//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarding handler produces:
//!     → events.rs (one call per outcome: preflight, relayed, dispatch failure)
//!         → tracing events (logging.rs installs the subscriber)
//!         → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout, pretty or JSON
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Each request runs inside a span carrying its request ID
//! - Events never influence the response

pub mod events;
pub mod logging;
pub mod metrics;
