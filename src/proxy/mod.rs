//! Upstream proxy subsystem.
//!
//! # Data Flow
//! ```text
//! matched relative path + event + scope
//!     → upstream.rs (build URL, inject bearer token, decode body)
//!     → source-control API
//!     → upstream.rs (text or base64 body, original status + content type)
//!     → GatewayResponse, or GatewayError (500)
//! ```

pub mod upstream;

pub use upstream::{is_textual, UpstreamClient};
