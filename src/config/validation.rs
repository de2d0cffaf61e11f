//! Configuration validation.
//!
//! Serde handles syntax; this module checks meaning. All problems are
//! collected and returned together, not just the first one.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
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

/// Validate a loaded configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be > 0"));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be > 0"));
    }

    let base_path = &config.gateway.base_path;
    if !base_path.starts_with('/') || base_path.len() < 2 {
        errors.push(ValidationError::new(
            "gateway.base_path",
            "must start with '/' and name at least one segment",
        ));
    } else if base_path.ends_with('/') {
        errors.push(ValidationError::new("gateway.base_path", "must not end with '/'"));
    }
    if config.gateway.env_prefix.is_empty() {
        errors.push(ValidationError::new("gateway.env_prefix", "must not be empty"));
    }
    if config.gateway.claim_name.is_empty() {
        errors.push(ValidationError::new("gateway.claim_name", "must not be empty"));
    }

    match url::Url::parse(&config.upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("'{}': {}", config.upstream.base_url, e),
        )),
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be > 0"));
    }

    let local = &config.local_dev;
    if local.enabled {
        if local.repo.as_deref().unwrap_or("").is_empty() {
            errors.push(ValidationError::new("local_dev.repo", "required when local_dev is enabled"));
        }
        if local.branch.as_deref().unwrap_or("").is_empty() {
            errors.push(ValidationError::new("local_dev.branch", "required when local_dev is enabled"));
        }
        if local.access_key.as_deref().unwrap_or("").is_empty() {
            errors.push(ValidationError::new(
                "local_dev.access_key",
                "required when local_dev is enabled",
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
