//! Request-level error taxonomy.
//!
//! Every failure the gateway itself reports to a caller goes through
//! [`GatewayError`] and is rendered as the fixed `{"error": ...}` envelope.
//! Proxied upstream bodies never pass through here.

use axum::http::StatusCode;
use thiserror::Error;

use crate::http::response::GatewayResponse;

/// Errors surfaced to the caller.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No base-path match, no scope, no route, or a guard rejected the request.
    /// These are deliberately indistinguishable to the caller.
    #[error("Not Found")]
    NotFound,

    /// Upstream answered with a non-success status.
    #[error("Proxy error: {body}")]
    UpstreamRejected { status: u16, body: String },

    /// The upstream could not be reached or its body could not be read.
    #[error("{0}")]
    Transport(String),

    /// The inbound body could not be decoded for forwarding.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl GatewayError {
    /// HTTP status reported for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::UpstreamRejected { .. }
            | GatewayError::Transport(_)
            | GatewayError::InvalidBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            GatewayError::NotFound => "not_found",
            GatewayError::UpstreamRejected { .. } => "upstream_rejected",
            GatewayError::Transport(_) => "transport_failure",
            GatewayError::InvalidBody(_) => "invalid_body",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Transport(e.to_string())
    }
}

impl From<GatewayError> for GatewayResponse {
    fn from(e: GatewayError) -> Self {
        GatewayResponse::error(e.status_code(), &e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_envelope() {
        let response = GatewayResponse::from(GatewayError::NotFound);
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body.as_text(), Some(r#"{"error":"Not Found"}"#));
    }

    #[test]
    fn test_upstream_rejection_is_500_with_text() {
        let err = GatewayError::UpstreamRejected {
            status: 404,
            body: "missing".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = GatewayResponse::from(err);
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.body.as_text(),
            Some(r#"{"error":"Proxy error: missing"}"#)
        );
    }
}
