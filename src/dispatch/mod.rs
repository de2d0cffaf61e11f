//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayEvent
//!     → status.rs (status probe? canned 200)
//!     → dispatcher.rs
//!         → strip base path (else 404)
//!         → OPTIONS? security::cors pre-flight (200 / 404)
//!         → credentials (scope? else 404)
//!         → routing (route + guard? else 404)
//!         → proxy (upstream call; failures 500)
//!         → security::cors (decorate)
//!     → GatewayResponse
//! ```

pub mod dispatcher;
pub mod status;

pub use dispatcher::{Dispatcher, DispatcherError};
pub use status::{status_probe, STATUS_PROBE_PATH};
