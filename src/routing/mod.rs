//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! method + stripped path
//!     → router.rs (select the method's table, first structural match)
//!     → matcher.rs (exact / pattern match, captured groups)
//!     → guard (captures, query, or multipart body vs scoped branch)
//!     → RouteMatch or no match (404)
//! ```
//!
//! # Design Decisions
//! - Tables compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First structural match wins; its guard has the final say

pub mod matcher;
pub mod router;

pub use matcher::{Captures, Guard, PathMatcher, RouteDef};
pub use router::{RouteMatch, RouteTable};
