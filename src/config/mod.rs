//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (snapshot, read once)
//!
//! config file (TOML, optional)
//!     → loader.rs (parse, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc with the dispatcher and HTTP harness
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Per-user credentials stay in the environment snapshot, not the config

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::Environment;
pub use loader::{load_config, ConfigError};
pub use schema::{
    GatewayConfig, ListenerConfig, LocalDevConfig, LogFormat, MountConfig, ObservabilityConfig,
    UpstreamConfig,
};
