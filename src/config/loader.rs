//! Configuration loading.
//!
//! Defaults, then an optional TOML file, then environment overrides. The
//! result is validated before it is handed to the rest of the gateway.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::env::Environment;
use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_UPSTREAM_URL: &str = "BITBUCKET_BASE_URL";
pub const ENV_CLAIM_NAME: &str = "USER_ID_CLAIM";
pub const ENV_LOCAL_DEV: &str = "LOCAL_DEV";
pub const ENV_LOCAL_REPO: &str = "LOCAL_REPO";
pub const ENV_LOCAL_BRANCH: &str = "LOCAL_BRANCH";
pub const ENV_LOCAL_ACCESS_KEY: &str = "LOCAL_ACCESS_KEY";
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override and validate the configuration.
pub fn load_config(path: Option<&Path>, env: &Environment) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the deployment's environment variables on top of `config`.
pub fn apply_env_overrides(config: &mut GatewayConfig, env: &Environment) {
    if let Some(url) = env.get(ENV_UPSTREAM_URL) {
        config.upstream.base_url = url.to_string();
    }
    if let Some(claim) = env.get(ENV_CLAIM_NAME) {
        config.gateway.claim_name = claim.to_string();
    }
    if let Some(addr) = env.get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr.to_string();
    }
    if env.flag(ENV_LOCAL_DEV) {
        config.local_dev.enabled = true;
    }
    if let Some(repo) = env.get(ENV_LOCAL_REPO) {
        config.local_dev.repo = Some(repo.to_string());
    }
    if let Some(branch) = env.get(ENV_LOCAL_BRANCH) {
        config.local_dev.branch = Some(branch.to_string());
    }
    if let Some(key) = env.get(ENV_LOCAL_ACCESS_KEY) {
        config.local_dev.access_key = Some(key.to_string());
    }
}
