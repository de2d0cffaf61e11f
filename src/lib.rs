//! Scoped HTTP gateway to a source-control hosting API.
//!
//! Each caller is mapped to one repository, one branch and one access token;
//! the gateway forwards only the operations its route table allows for that
//! scope and answers everything else with an indistinguishable 404.

pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;

pub use config::{Environment, GatewayConfig};
pub use dispatch::Dispatcher;
pub use error::GatewayError;
pub use http::{GatewayEvent, GatewayResponse, HttpServer};
pub use lifecycle::Shutdown;
