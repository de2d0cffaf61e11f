//! Gateway responses.
//!
//! # Responsibilities
//! - Carry status, headers and a text-or-binary body
//! - Build the fixed JSON error envelope
//! - Merge extra headers case-insensitively (existing keys win)
//! - Serialize to the Lambda wire shape and convert to an axum response
//!
//! # Design Decisions
//! - Headers live in a `BTreeMap` so output is byte-identical across runs
//! - Only serialization cares whether a body is binary

use std::borrow::Cow;
use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use serde::{Serialize, Serializer};

const BASE64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Text(String),
    Binary(Vec<u8>),
}

impl ResponseBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ResponseBody::Text(text) => text.as_bytes(),
            ResponseBody::Binary(bytes) => bytes,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, ResponseBody::Binary(_))
    }
}

/// A response produced by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub headers: BTreeMap<String, String>,
    pub body: ResponseBody,
}

impl GatewayResponse {
    pub fn new(status: StatusCode, body: ResponseBody) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
        }
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, ResponseBody::Text(body.into()))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// The fixed `{"error": message}` envelope.
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::text(status, body).with_header("content-type", "application/json")
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Add headers whose names are not already present, ignoring case.
    pub fn merge_missing_headers<I, K, V>(&mut self, extra: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in extra {
            let name = name.into();
            if self.header(&name).is_none() {
                self.headers.insert(name, value.into());
            }
        }
    }

    pub fn is_base64_encoded(&self) -> bool {
        self.body.is_binary()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse<'a> {
    status_code: u16,
    headers: &'a BTreeMap<String, String>,
    body: Cow<'a, str>,
    is_base64_encoded: bool,
}

impl Serialize for GatewayResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match &self.body {
            ResponseBody::Text(text) => Cow::Borrowed(text.as_str()),
            ResponseBody::Binary(bytes) => Cow::Owned(BASE64.encode(bytes)),
        };
        WireResponse {
            status_code: self.status.as_u16(),
            headers: &self.headers,
            body,
            is_base64_encoded: self.is_base64_encoded(),
        }
        .serialize(serializer)
    }
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let body = match self.body {
            ResponseBody::Text(text) => Body::from(text),
            ResponseBody::Binary(bytes) => Body::from(bytes),
        };
        let mut response = Response::new(body);
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping unrepresentable response header"),
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_existing_regardless_of_case() {
        let mut response = GatewayResponse::text(StatusCode::OK, "{}")
            .with_header("Content-type", "text/plain");
        response.merge_missing_headers([
            ("content-type", "application/json"),
            ("Access-Control-Allow-Origin", "*"),
        ]);

        assert_eq!(response.headers.len(), 2);
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    }

    #[test]
    fn test_wire_shape_for_binary_body() {
        let response = GatewayResponse::new(StatusCode::OK, ResponseBody::Binary(vec![0, 1, 2]))
            .with_header("Content-Type", "image/png");
        let wire = serde_json::to_value(&response).unwrap();

        assert_eq!(wire["statusCode"], 200);
        assert_eq!(wire["body"], "AAEC");
        assert_eq!(wire["isBase64Encoded"], true);
        assert_eq!(wire["headers"]["Content-Type"], "image/png");
    }

    #[test]
    fn test_wire_shape_for_text_body() {
        let response = GatewayResponse::error(StatusCode::NOT_FOUND, "Not Found");
        let wire = serde_json::to_value(&response).unwrap();

        assert_eq!(wire["statusCode"], 404);
        assert_eq!(wire["body"], r#"{"error":"Not Found"}"#);
        assert_eq!(wire["isBase64Encoded"], false);
    }

    #[test]
    fn test_into_axum_response() {
        let response = GatewayResponse::new(StatusCode::CREATED, ResponseBody::Binary(vec![9, 9]))
            .with_header("Content-Type", "application/octet-stream")
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/octet-stream"
        );
    }
}
