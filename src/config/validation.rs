//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream origin is a usable base URL
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("upstream.origin {origin:?} is not a valid URL: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("upstream.origin {origin:?} must use the http scheme, got {scheme:?}")]
    UnsupportedScheme { origin: String, scheme: String },

    #[error("upstream.origin {0:?} must not carry a query or fragment")]
    OriginHasQuery(String),

    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("listener.host must not be empty")]
    EmptyHost,

    #[error("observability.log_level {level:?} is not a valid filter: {reason}")]
    InvalidLogLevel { level: String, reason: String },

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_origin(&config.upstream.origin) {
        errors.push(e);
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    if let Err(e) = EnvFilter::try_new(&config.observability.log_level) {
        errors.push(ValidationError::InvalidLogLevel {
            level: config.observability.log_level.clone(),
            reason: e.to_string(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_origin(origin: &str) -> Result<(), ValidationError> {
    let url = Url::parse(origin).map_err(|e| ValidationError::InvalidOrigin {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;

    // The pooled connector speaks plain HTTP only.
    if url.scheme() != "http" {
        return Err(ValidationError::UnsupportedScheme {
            origin: origin.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    if url.host_str().is_none() {
        return Err(ValidationError::InvalidOrigin {
            origin: origin.to_string(),
            reason: "missing host".to_string(),
        });
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::OriginHasQuery(origin.to_string()));
    }

    Ok(())
}
