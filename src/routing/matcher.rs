//! Route definitions and guard predicates.
//!
//! # Responsibilities
//! - Match a stripped path exactly or against a whole-path pattern
//! - Capture pattern groups for guards
//! - Evaluate guards against the caller's scope and request
//!
//! # Design Decisions
//! - Route definitions are data (a tagged enum), not closures
//! - Patterns are anchored at both ends when compiled
//! - Guards run only after a structural match, so the body is decoded at
//!   most once and only for the route that asks for it

use regex::Regex;

use crate::credentials::ScopedConfig;
use crate::http::event::GatewayEvent;
use crate::http::form::form_fields;

/// Groups captured by a pattern. Index 0 is the first group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(Vec<Option<String>>);

impl Captures {
    /// A captured group, if it participated in the match.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index)?.as_deref()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Compile a pattern so it must match the whole path.
fn whole_path(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

fn capture(regex: &Regex, path: &str) -> Option<Captures> {
    let caps = regex.captures(path)?;
    Some(Captures(
        caps.iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect(),
    ))
}

/// Path half of a guarded route.
#[derive(Debug, Clone)]
pub enum PathMatcher {
    Exact(String),
    Pattern(Regex),
}

impl PathMatcher {
    pub fn exact(path: impl Into<String>) -> Self {
        PathMatcher::Exact(path.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        whole_path(pattern).map(PathMatcher::Pattern)
    }

    pub fn matches(&self, path: &str) -> Option<Captures> {
        match self {
            PathMatcher::Exact(expected) => (expected == path).then(Captures::default),
            PathMatcher::Pattern(regex) => capture(regex, path),
        }
    }
}

/// A predicate deciding whether a structurally matched request is served.
///
/// Every guard compares something from the request against the caller's
/// scoped branch; a missing value always rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Captured group `group` equals the scoped branch.
    CapturedBranch { group: usize },
    /// Query parameter `param` equals the scoped branch.
    QueryBranch { param: String },
    /// Multipart text field `field` equals the scoped branch.
    FormBranch { field: String },
}

impl Guard {
    pub fn admits(&self, scope: &ScopedConfig, event: &GatewayEvent, captures: &Captures) -> bool {
        match self {
            Guard::CapturedBranch { group } => captures.get(*group) == Some(scope.branch.as_str()),
            Guard::QueryBranch { param } => {
                event.query_param(param).as_deref() == Some(scope.branch.as_str())
            }
            Guard::FormBranch { field } => {
                form_fields(event).get(field).map(String::as_str) == Some(scope.branch.as_str())
            }
        }
    }
}

/// One entry in a per-method route table.
#[derive(Debug, Clone)]
pub enum RouteDef {
    ExactPath(String),
    Pattern(Regex),
    Guarded { path: PathMatcher, guard: Guard },
}

impl RouteDef {
    pub fn exact(path: impl Into<String>) -> Self {
        RouteDef::ExactPath(path.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        whole_path(pattern).map(RouteDef::Pattern)
    }

    pub fn guarded(path: PathMatcher, guard: Guard) -> Self {
        RouteDef::Guarded { path, guard }
    }

    /// Structural match: path only, guards are not consulted.
    pub fn structural_match(&self, path: &str) -> Option<Captures> {
        match self {
            RouteDef::ExactPath(expected) => (expected == path).then(Captures::default),
            RouteDef::Pattern(regex) => capture(regex, path),
            RouteDef::Guarded { path: matcher, .. } => matcher.matches(path),
        }
    }

    pub fn guard(&self) -> Option<&Guard> {
        match self {
            RouteDef::Guarded { guard, .. } => Some(guard),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use crate::http::event::EventBody;

    fn scope(branch: &str) -> ScopedConfig {
        ScopedConfig {
            repo: "team/site".into(),
            branch: branch.into(),
            access_token: "tok".into(),
            base_path: "/git-gateway/bitbucket".into(),
        }
    }

    #[test]
    fn test_exact_match() {
        let route = RouteDef::exact("/commits");
        assert_eq!(route.structural_match("/commits"), Some(Captures::default()));
        assert_eq!(route.structural_match("/commits/"), None);
        assert_eq!(route.structural_match("/Commits"), None);
    }

    #[test]
    fn test_pattern_must_cover_whole_path() {
        let route = RouteDef::pattern(r"/refs/branches/([^/]+)").unwrap();
        let captures = route.structural_match("/refs/branches/main").unwrap();
        assert_eq!(captures.get(0), Some("main"));
        assert_eq!(captures.len(), 1);

        assert!(route.structural_match("/refs/branches/main/x").is_none());
        assert!(route.structural_match("/v2/refs/branches/main").is_none());
    }

    #[test]
    fn test_optional_group_not_participating() {
        let route = RouteDef::pattern(r"/src(/(\w+))?").unwrap();
        let captures = route.structural_match("/src").unwrap();
        assert_eq!(captures.len(), 2);
        assert_eq!(captures.get(1), None);
    }

    #[test]
    fn test_captured_branch_guard() {
        let guard = Guard::CapturedBranch { group: 0 };
        let event = GatewayEvent::new(Method::GET, "/refs/branches/main");
        let captures = PathMatcher::pattern(r"/refs/branches/([^/]+)")
            .unwrap()
            .matches("/refs/branches/main")
            .unwrap();

        assert!(guard.admits(&scope("main"), &event, &captures));
        assert!(!guard.admits(&scope("dev"), &event, &captures));
        assert!(!guard.admits(&scope("main"), &event, &Captures::default()));
    }

    #[test]
    fn test_query_branch_guard() {
        let guard = Guard::QueryBranch { param: "include".into() };
        let event = GatewayEvent::new(Method::GET, "/commits").with_query("include=main");
        assert!(guard.admits(&scope("main"), &event, &Captures::default()));
        assert!(!guard.admits(&scope("dev"), &event, &Captures::default()));

        let bare = GatewayEvent::new(Method::GET, "/commits");
        assert!(!guard.admits(&scope("main"), &bare, &Captures::default()));
    }

    #[test]
    fn test_form_branch_guard() {
        let guard = Guard::FormBranch { field: "branch".into() };
        let body = "--b\r\nContent-Disposition: form-data; name=\"branch\"\r\n\r\nmain\r\n--b--";
        let event = GatewayEvent::new(Method::POST, "/src")
            .with_header("content-type", "multipart/form-data; boundary=b")
            .with_body(EventBody::Text(body.into()));

        assert!(guard.admits(&scope("main"), &event, &Captures::default()));
        assert!(!guard.admits(&scope("dev"), &event, &Captures::default()));
    }
}
