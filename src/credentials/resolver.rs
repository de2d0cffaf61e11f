//! Per-user scope resolution.
//!
//! # Responsibilities
//! - Map a caller's claims to a normalized identity
//! - Look up `{prefix}{identity}_{REPO|BRANCH|ACCESS_KEY}` in the environment
//! - Fall back to the local-development scope when that is enabled
//!
//! # Design Decisions
//! - All three variables or nothing: a partial scope is never returned
//! - A fresh `ScopedConfig` per request; nothing is cached
//! - The access token never appears in `Debug` output or logs

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{Environment, LocalDevConfig, MountConfig};
use crate::credentials::identity::identity_token;
use crate::http::event::Claims;

const REPO_SUFFIX: &str = "REPO";
const BRANCH_SUFFIX: &str = "BRANCH";
const ACCESS_KEY_SUFFIX: &str = "ACCESS_KEY";

/// What a single caller may touch upstream.
#[derive(Clone, PartialEq, Eq)]
pub struct ScopedConfig {
    pub repo: String,
    pub branch: String,
    pub access_token: String,
    pub base_path: String,
}

impl fmt::Debug for ScopedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedConfig")
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("access_token", &"<redacted>")
            .field("base_path", &self.base_path)
            .finish()
    }
}

/// Why no scope could be produced. Both are ordinary outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no '{claim}' claim on request")]
    NoIdentity { claim: String },

    #[error("no credentials for user {user} (missing {})", .missing.join(", "))]
    MissingCredentials { user: String, missing: Vec<String> },
}

/// Resolves claims to a [`ScopedConfig`] using the environment snapshot.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    env: Arc<Environment>,
    env_prefix: String,
    claim_name: String,
    base_path: String,
    local_dev: Option<LocalScope>,
}

#[derive(Debug, Clone)]
struct LocalScope {
    repo: String,
    branch: String,
    access_token: String,
}

impl CredentialResolver {
    pub fn new(mount: &MountConfig, local_dev: &LocalDevConfig, env: Arc<Environment>) -> Self {
        let local_dev = match (local_dev.enabled, &local_dev.repo, &local_dev.branch, &local_dev.access_key) {
            (true, Some(repo), Some(branch), Some(key)) => Some(LocalScope {
                repo: repo.clone(),
                branch: branch.clone(),
                access_token: key.clone(),
            }),
            _ => None,
        };
        Self {
            env,
            env_prefix: mount.env_prefix.clone(),
            claim_name: mount.claim_name.clone(),
            base_path: mount.base_path.clone(),
            local_dev,
        }
    }

    /// Per-identity lookup only.
    pub fn resolve(&self, claims: &Claims) -> Result<ScopedConfig, ResolveError> {
        let user = identity_token(claims, &self.claim_name).ok_or_else(|| ResolveError::NoIdentity {
            claim: self.claim_name.clone(),
        })?;

        let mut missing = Vec::new();
        let mut lookup = |suffix: &str| {
            let key = format!("{}{}_{}", self.env_prefix, user, suffix);
            match self.env.get(&key) {
                Some(value) => value.to_string(),
                None => {
                    missing.push(key);
                    String::new()
                }
            }
        };
        let repo = lookup(REPO_SUFFIX);
        let branch = lookup(BRANCH_SUFFIX);
        let access_token = lookup(ACCESS_KEY_SUFFIX);

        if !missing.is_empty() {
            return Err(ResolveError::MissingCredentials { user, missing });
        }

        Ok(ScopedConfig {
            repo,
            branch,
            access_token,
            base_path: self.base_path.clone(),
        })
    }

    /// Per-identity lookup, then the local-development scope if enabled.
    pub fn resolve_or_local(&self, claims: &Claims) -> Option<ScopedConfig> {
        match self.resolve(claims) {
            Ok(scope) => Some(scope),
            Err(e) => {
                tracing::warn!(reason = %e, "Scope not resolved");
                self.local_scope()
            }
        }
    }

    fn local_scope(&self) -> Option<ScopedConfig> {
        let local = self.local_dev.as_ref()?;
        tracing::debug!(repo = %local.repo, "Using local development scope");
        Some(ScopedConfig {
            repo: local.repo.clone(),
            branch: local.branch.clone(),
            access_token: local.access_token.clone(),
            base_path: self.base_path.clone(),
        })
    }
}
