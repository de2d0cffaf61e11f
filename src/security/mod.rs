//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! OPTIONS request:
//!     → cors.rs (find rule for stripped path)
//!     → 200 with advertised methods, or 404
//!
//! Proxied response:
//!     → cors.rs (merge rule headers, upstream headers win)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a path without a rule gets no CORS headers
//! - Caller authentication happens before the gateway; scoping happens in
//!   `credentials` and `routing`

pub mod cors;

pub use cors::{CorsPolicy, CorsRule};
