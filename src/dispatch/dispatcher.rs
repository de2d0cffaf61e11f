//! Top-level request dispatch.
//!
//! # Responsibilities
//! - Short-circuit the status probe
//! - Strip the base path; answer pre-flight requests from the CORS table
//! - Resolve the caller's scope, match a route, proxy, decorate with CORS
//!
//! # Design Decisions
//! - Missing scope and missing route produce the same 404
//! - Upstream and transport failures produce a 500 envelope
//! - No state survives a request; concurrent calls need no coordination

use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;
use thiserror::Error;

use crate::config::{Environment, GatewayConfig};
use crate::credentials::CredentialResolver;
use crate::dispatch::status::status_probe;
use crate::error::GatewayError;
use crate::http::event::GatewayEvent;
use crate::http::response::GatewayResponse;
use crate::observability::metrics;
use crate::proxy::UpstreamClient;
use crate::routing::RouteTable;
use crate::security::CorsPolicy;

/// Failure to assemble a dispatcher at startup.
#[derive(Debug, Error)]
pub enum DispatcherError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid route pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// The gateway's request handler.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    base_path: String,
    resolver: CredentialResolver,
    routes: RouteTable,
    cors: CorsPolicy,
    upstream: UpstreamClient,
}

impl Dispatcher {
    /// Dispatcher for the source-control upstream.
    pub fn new(config: &GatewayConfig, env: Arc<Environment>) -> Result<Self, DispatcherError> {
        Ok(Self::from_parts(
            config.gateway.base_path.clone(),
            CredentialResolver::new(&config.gateway, &config.local_dev, env),
            RouteTable::source_control()?,
            CorsPolicy::source_control()?,
            UpstreamClient::new(&config.upstream)?,
        ))
    }

    pub fn from_parts(
        base_path: String,
        resolver: CredentialResolver,
        routes: RouteTable,
        cors: CorsPolicy,
        upstream: UpstreamClient,
    ) -> Self {
        Self {
            base_path,
            resolver,
            routes,
            cors,
            upstream,
        }
    }

    /// Handle one event and produce its response.
    pub async fn handle(&self, event: &GatewayEvent) -> GatewayResponse {
        let start_time = Instant::now();
        let (response, outcome) = self.dispatch(event).await;
        metrics::record_request(
            event.method.as_str(),
            response.status.as_u16(),
            outcome,
            start_time,
        );
        response
    }

    async fn dispatch(&self, event: &GatewayEvent) -> (GatewayResponse, &'static str) {
        if let Some(response) = status_probe(event) {
            return (response, "status_probe");
        }

        let Some(rel_path) = self.strip_base_path(&event.path) else {
            tracing::info!(method = %event.method, path = %event.path, "No handler for URL");
            return not_found();
        };

        if has_dot_segment(rel_path) {
            tracing::warn!(method = %event.method, path = %rel_path, "Rejecting dot segment in path");
            return not_found();
        }

        if event.method == Method::OPTIONS {
            return match self.cors.preflight(rel_path) {
                Some(response) => (response, "preflight"),
                None => {
                    tracing::info!(path = %rel_path, "No CORS rule for pre-flight");
                    not_found()
                }
            };
        }

        let Some(scope) = self.resolver.resolve_or_local(&event.claims) else {
            return not_found();
        };

        let Some(matched) = self.routes.route(&scope, event, rel_path) else {
            tracing::info!(method = %event.method, path = %rel_path, "No route for URL");
            return not_found();
        };

        tracing::info!(
            method = %event.method,
            path = %rel_path,
            query = %event.raw_query,
            captures = matched.captures.len(),
            "Proxying"
        );
        let result = self.upstream.forward(rel_path, event, &scope).await;
        let outcome = match &result {
            Ok(_) => "proxied",
            Err(e) => e.outcome(),
        };
        let mut response = result.unwrap_or_else(GatewayResponse::from);
        self.cors.decorate(rel_path, &mut response);
        (response, outcome)
    }

    /// Path relative to the base path, keeping its leading `/`.
    fn strip_base_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.base_path.as_str())?;
        rest.starts_with('/').then_some(rest)
    }
}

/// True if any segment is `.` or `..`, literally or percent-encoded.
///
/// The upstream URL parser resolves dot segments (and treats `\` as `/`),
/// so the forwarded path must be free of them to match what was routed.
fn has_dot_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

fn not_found() -> (GatewayResponse, &'static str) {
    let err = GatewayError::NotFound;
    let outcome = err.outcome();
    (err.into(), outcome)
}
