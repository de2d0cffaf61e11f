//! Credential resolution subsystem.
//!
//! # Data Flow
//! ```text
//! identity claims (pre-verified by an authorizer)
//!     → identity.rs (select claim, normalize to env-safe token)
//!     → resolver.rs (look up REPO / BRANCH / ACCESS_KEY in the env snapshot)
//!     → ScopedConfig, or the local-dev scope, or nothing
//! ```

pub mod identity;
pub mod resolver;

pub use resolver::{CredentialResolver, ResolveError, ScopedConfig};
