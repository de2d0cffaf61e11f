//! Route lookup.
//!
//! # Responsibilities
//! - Store ordered route definitions per HTTP method
//! - Find the first structural match for a stripped path
//! - Evaluate that definition's guard (and only that one)
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - O(n) scan per method; tables are tiny
//! - A guard rejection ends matching: there is no fallthrough to later
//!   definitions for the same path

use std::collections::HashMap;

use axum::http::Method;

use crate::credentials::ScopedConfig;
use crate::http::event::GatewayEvent;
use crate::routing::matcher::{Captures, Guard, PathMatcher, RouteDef};

/// A structurally matched route.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDef,
    pub captures: Captures,
}

/// Per-method ordered route tables.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<Method, Vec<RouteDef>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a definition to `method`'s table. Returns `self` for chaining.
    pub fn on(mut self, method: Method, route: RouteDef) -> Self {
        self.routes.entry(method).or_default().push(route);
        self
    }

    /// Routes exposed for the source-control upstream.
    pub fn source_control() -> Result<Self, regex::Error> {
        Ok(Self::new()
            .on(
                Method::GET,
                RouteDef::guarded(
                    PathMatcher::pattern(r"/refs/branches/([^/]+)")?,
                    Guard::CapturedBranch { group: 0 },
                ),
            )
            .on(
                Method::GET,
                RouteDef::guarded(
                    PathMatcher::exact("/commits"),
                    Guard::QueryBranch { param: "include".into() },
                ),
            )
            .on(Method::GET, RouteDef::pattern(r"/src/[a-zA-Z0-9]+/.*")?)
            .on(
                Method::POST,
                RouteDef::guarded(
                    PathMatcher::exact("/src"),
                    Guard::FormBranch { field: "branch".into() },
                ),
            ))
    }

    /// First definition whose path structurally matches.
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.get(method)?.iter().find_map(|route| {
            route
                .structural_match(path)
                .map(|captures| RouteMatch { route, captures })
        })
    }

    /// Structural match followed by guard evaluation.
    pub fn route(&self, scope: &ScopedConfig, event: &GatewayEvent, path: &str) -> Option<RouteMatch<'_>> {
        let matched = self.find(&event.method, path)?;
        if let Some(guard) = matched.route.guard() {
            if !guard.admits(scope, event, &matched.captures) {
                tracing::debug!(
                    method = %event.method,
                    path = %path,
                    guard = ?guard,
                    "Route guard rejected request"
                );
                return None;
            }
        }
        Some(matched)
    }
}
