//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BouncerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::BouncerConfig;
use crate::observability::logging::LOG_LEVELS;

/// Shortest push interval the Local API accepts.
pub const MIN_PUSH_INTERVAL_SECS: u64 = 60;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &BouncerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.crowdsec.api_key.trim().is_empty() {
        errors.push(ValidationError::new("crowdsec.api_key", "must not be empty"));
    }

    match Url::parse(&config.crowdsec.agent_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "crowdsec.agent_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("crowdsec.agent_url", e.to_string())),
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.usage_metrics.enabled
        && config.usage_metrics.push_interval_secs < MIN_PUSH_INTERVAL_SECS
    {
        errors.push(ValidationError::new(
            "usage_metrics.push_interval_secs",
            format!("must be at least {}", MIN_PUSH_INTERVAL_SECS),
        ));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if config.observability.prometheus_enabled
        && config.observability.prometheus_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.prometheus_address",
            format!("'{}' is not a socket address", config.observability.prometheus_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
