//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (local harness)          API Gateway v2 JSON event
//!     → server.rs (Axum, request ID)           │
//!     → event.rs (GatewayEvent) ◀──────────────┘
//!     → [dispatcher decides: probe / pre-flight / proxy / 404]
//!     → form.rs (multipart fields, only when a guard asks)
//!     → response.rs (GatewayResponse → axum response or wire JSON)
//! ```

pub mod event;
pub mod form;
pub mod request;
pub mod response;
pub mod server;

pub use event::{Claims, EventBody, GatewayEvent};
pub use request::X_REQUEST_ID;
pub use response::{GatewayResponse, ResponseBody};
pub use server::HttpServer;
