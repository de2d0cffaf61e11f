//! Canned status-page endpoint.
//!
//! Mimics the component listing a hosted status page integration polls.
//! It has no scoping logic and ignores all configuration.

use axum::http::{Method, StatusCode};

use crate::http::event::GatewayEvent;
use crate::http::response::GatewayResponse;
use crate::security::cors::cors_headers;

pub const STATUS_PROBE_PATH: &str = "/api/v2/components.json";

/// Answer the status probe, or `None` if this is not one.
pub fn status_probe(event: &GatewayEvent) -> Option<GatewayResponse> {
    if event.path != STATUS_PROBE_PATH {
        return None;
    }
    if event.method != Method::GET && event.method != Method::OPTIONS {
        return None;
    }

    let body = serde_json::json!({
        "components": {
            "name": "Git Gateway",
            "status": "operational",
        }
    });
    let mut response = GatewayResponse::text(StatusCode::OK, body.to_string());
    response.merge_missing_headers(cors_headers("GET, OPTIONS"));
    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_answers_get_and_options() {
        for method in [Method::GET, Method::OPTIONS] {
            let response = status_probe(&GatewayEvent::new(method, STATUS_PROBE_PATH)).unwrap();
            assert_eq!(response.status, StatusCode::OK);
            assert_eq!(
                response.body.as_text(),
                Some(r#"{"components":{"name":"Git Gateway","status":"operational"}}"#)
            );
            assert_eq!(response.header("access-control-allow-methods"), Some("GET, OPTIONS"));
        }
    }

    #[test]
    fn test_probe_ignores_other_requests() {
        assert!(status_probe(&GatewayEvent::new(Method::POST, STATUS_PROBE_PATH)).is_none());
        assert!(status_probe(&GatewayEvent::new(Method::GET, "/api/v2/components.json/x")).is_none());
        assert!(status_probe(&GatewayEvent::new(Method::GET, "/api/v2/status.json")).is_none());
    }
}
