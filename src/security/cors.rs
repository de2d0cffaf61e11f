//! Cross-origin negotiation.
//!
//! # Responsibilities
//! - Answer pre-flight requests from a table of path rules
//! - Decorate proxied responses with the matching rule's headers
//!
//! # Design Decisions
//! - Rules are independent of the route table
//! - First matching rule wins; patterns use search semantics
//! - Upstream headers win on collision, compared case-insensitively

use axum::http::StatusCode;
use regex::Regex;

use crate::http::response::GatewayResponse;

pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";

const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// The CORS headers advertised for a set of methods.
pub fn cors_headers(methods: &str) -> [(&'static str, String); 3] {
    [
        (ALLOW_ORIGIN, "*".to_string()),
        (ALLOW_METHODS, methods.to_string()),
        (ALLOW_HEADERS, ALLOWED_HEADERS.to_string()),
    ]
}

/// One path pattern and the methods advertised for it.
#[derive(Debug, Clone)]
pub struct CorsRule {
    pattern: Regex,
    methods: String,
}

impl CorsRule {
    pub fn new(pattern: &str, methods: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            methods: methods.to_string(),
        })
    }

    pub fn methods(&self) -> &str {
        &self.methods
    }

    pub fn headers(&self) -> [(&'static str, String); 3] {
        cors_headers(&self.methods)
    }
}

/// Ordered CORS rule table.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    rules: Vec<CorsRule>,
}

impl CorsPolicy {
    pub fn new(rules: Vec<CorsRule>) -> Self {
        Self { rules }
    }

    /// Rules for the source-control upstream.
    pub fn source_control() -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            CorsRule::new(r"^/refs/branches/[^/]+$", "GET, OPTIONS")?,
            CorsRule::new(r"^/src/[a-zA-Z0-9]+/", "GET, OPTIONS")?,
            CorsRule::new(r"^/commits$", "GET, OPTIONS")?,
            CorsRule::new(r"^/src$", "POST, OPTIONS")?,
        ]))
    }

    /// First rule matching the stripped path.
    pub fn find(&self, path: &str) -> Option<&CorsRule> {
        self.rules.iter().find(|rule| rule.pattern.is_match(path))
    }

    /// Answer a pre-flight request: 200 with `{}` if a rule matches, else `None`.
    pub fn preflight(&self, path: &str) -> Option<GatewayResponse> {
        let rule = self.find(path)?;
        let mut response = GatewayResponse::text(StatusCode::OK, "{}");
        response.merge_missing_headers(rule.headers());
        Some(response)
    }

    /// Merge the matching rule's headers into a proxied response.
    pub fn decorate(&self, path: &str, response: &mut GatewayResponse) {
        if let Some(rule) = self.find(path) {
            response.merge_missing_headers(rule.headers());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CorsPolicy {
        CorsPolicy::source_control().unwrap()
    }

    #[test]
    fn test_preflight_known_path() {
        let response = policy().preflight("/commits").unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_text(), Some("{}"));
        assert_eq!(response.header(ALLOW_ORIGIN), Some("*"));
        assert_eq!(response.header(ALLOW_METHODS), Some("GET, OPTIONS"));
        assert_eq!(response.header(ALLOW_HEADERS), Some("Content-Type, Authorization"));
    }

    #[test]
    fn test_preflight_unknown_path() {
        assert!(policy().preflight("/unknown").is_none());
        assert!(policy().preflight("/commits/extra").is_none());
    }

    #[test]
    fn test_first_rule_wins() {
        let p = policy();
        assert_eq!(p.find("/src").unwrap().methods(), "POST, OPTIONS");
        assert_eq!(p.find("/src/abc123/README.md").unwrap().methods(), "GET, OPTIONS");
        assert_eq!(p.find("/refs/branches/main").unwrap().methods(), "GET, OPTIONS");
        assert!(p.find("/refs/branches/main/extra").is_none());
    }

    #[test]
    fn test_decorate_keeps_upstream_content_type() {
        let mut response = GatewayResponse::text(StatusCode::OK, "[]")
            .with_header("Content-Type", "application/json");
        policy().decorate("/commits", &mut response);

        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header(ALLOW_METHODS), Some("GET, OPTIONS"));
        assert_eq!(response.headers.len(), 4);
    }

    #[test]
    fn test_decorate_without_rule_is_noop() {
        let mut response = GatewayResponse::text(StatusCode::OK, "");
        policy().decorate("/elsewhere", &mut response);
        assert!(response.headers.is_empty());
    }
}
