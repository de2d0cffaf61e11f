//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default upstream API root. Repository ids are appended to this.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.bitbucket.org/2.0/repositories";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Local HTTP listener settings.
    pub listener: ListenerConfig,

    /// Mount point and identity lookup conventions.
    pub gateway: MountConfig,

    /// Upstream source-control API.
    pub upstream: UpstreamConfig,

    /// Single global scope used when per-user lookup fails.
    pub local_dev: LocalDevConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Total time allowed per request, in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body, in bytes.
    pub max_body_bytes: usize,

    /// Header carrying pre-verified identity claims as a JSON object.
    /// Only set this when a trusted component in front of the gateway
    /// writes (and strips client copies of) the header.
    pub claims_header: Option<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 6 * 1024 * 1024,
            claims_header: None,
        }
    }
}

/// Where the gateway is mounted and how callers map to credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MountConfig {
    /// Path prefix every proxied request must start with (no trailing slash).
    pub base_path: String,

    /// Prefix of the per-user environment variables, e.g. `BB_USER_`.
    pub env_prefix: String,

    /// Identity claim holding the user id.
    pub claim_name: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            base_path: "/git-gateway/bitbucket".to_string(),
            env_prefix: "BB_USER_".to_string(),
            claim_name: "username".to_string(),
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL; `/{repo}{path}` is appended per request.
    pub base_url: String,

    /// Timeout for a single upstream call, in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Global test scope, only for local development.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LocalDevConfig {
    pub enabled: bool,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub access_key: Option<String>,
}

impl std::fmt::Debug for LocalDevConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalDevConfig")
            .field("enabled", &self.enabled)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
