//! Inbound request events.
//!
//! A [`GatewayEvent`] is what the dispatcher sees, regardless of whether the
//! request arrived through the local HTTP harness or as an API Gateway HTTP
//! v2 (Lambda) JSON event.
//!
//! # Design Decisions
//! - Header names are lower-cased on the way in; lookups lower-case too
//! - Bodies keep their wire form (text or base64) until someone needs bytes
//! - Claims are opaque; only the resolver interprets them

use std::collections::HashMap;

use axum::http::method::InvalidMethod;
use axum::http::Method;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

const BASE64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Request body as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventBody {
    Text(String),
    Base64(String),
}

impl EventBody {
    /// Build from raw bytes, keeping valid UTF-8 as text.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => EventBody::Text(text),
            Err(e) => EventBody::Base64(BASE64.encode(e.into_bytes())),
        }
    }

    pub fn is_base64(&self) -> bool {
        matches!(self, EventBody::Base64(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            EventBody::Text(s) | EventBody::Base64(s) => s.is_empty(),
        }
    }

    /// Raw bytes of the body.
    pub fn to_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        match self {
            EventBody::Text(text) => Ok(text.as_bytes().to_vec()),
            EventBody::Base64(encoded) => BASE64.decode(encoded.trim()),
        }
    }
}

/// Identity claims supplied by an upstream authorizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims(HashMap<String, serde_json::Value>);

impl Claims {
    /// String form of a claim. Numbers and booleans are stringified;
    /// null, arrays and objects are treated as absent.
    pub fn get_str(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, serde_json::Value>> for Claims {
    fn from(map: HashMap<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Claims {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), serde_json::Value::String(v.into())))
                .collect(),
        )
    }
}

/// A single inbound request.
#[derive(Debug, Clone)]
pub struct GatewayEvent {
    pub method: Method,
    pub path: String,
    /// Query string without the leading `?`; empty if none.
    pub raw_query: String,
    headers: HashMap<String, String>,
    pub body: Option<EventBody>,
    pub claims: Claims,
}

impl GatewayEvent {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            raw_query: String::new(),
            headers: HashMap::new(),
            body: None,
            claims: Claims::default(),
        }
    }

    pub fn with_query(mut self, raw_query: impl Into<String>) -> Self {
        self.raw_query = raw_query.into();
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Add a header value, joining repeated names with `, `.
    pub fn append_header(&mut self, name: &str, value: &str) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn with_body(mut self, body: EventBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_claims(mut self, claims: Claims) -> Self {
        self.claims = claims;
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// First value of a query parameter, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(self.raw_query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Parse an API Gateway HTTP v2 JSON event.
    pub fn from_lambda_json(json: &str) -> Result<Self, EventError> {
        let event: LambdaHttpEvent = serde_json::from_str(json)?;
        Self::try_from(event)
    }
}

/// Failure to interpret a wire event.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid HTTP method: {0}")]
    Method(#[from] InvalidMethod),
}

/// API Gateway HTTP v2 event, reduced to what the gateway reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaHttpEvent {
    pub raw_path: String,
    #[serde(default)]
    pub raw_query_string: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub request_context: LambdaRequestContext,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<HashMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
pub struct LambdaRequestContext {
    #[serde(default)]
    pub http: Option<LambdaHttpDescription>,
    #[serde(default)]
    pub authorizer: Option<LambdaAuthorizer>,
}

#[derive(Debug, Deserialize)]
pub struct LambdaHttpDescription {
    pub method: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LambdaAuthorizer {
    #[serde(default)]
    pub jwt: Option<LambdaJwt>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LambdaJwt {
    #[serde(default)]
    pub claims: HashMap<String, serde_json::Value>,
}

impl TryFrom<LambdaHttpEvent> for GatewayEvent {
    type Error = EventError;

    fn try_from(event: LambdaHttpEvent) -> Result<Self, Self::Error> {
        let method = match &event.request_context.http {
            Some(http) => Method::from_bytes(http.method.to_ascii_uppercase().as_bytes())?,
            None => Method::GET,
        };
        let claims = event
            .request_context
            .authorizer
            .and_then(|a| a.jwt)
            .map(|jwt| Claims::from(jwt.claims))
            .unwrap_or_default();
        let body = event.body.map(|body| {
            if event.is_base64_encoded {
                EventBody::Base64(body)
            } else {
                EventBody::Text(body)
            }
        });

        let mut gateway_event = GatewayEvent::new(method, event.raw_path)
            .with_query(event.raw_query_string)
            .with_claims(claims);
        for (name, value) in event.headers {
            gateway_event = gateway_event.with_header(&name, value);
        }
        gateway_event.body = body;
        Ok(gateway_event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": "2.0",
        "rawPath": "/git-gateway/bitbucket/commits",
        "rawQueryString": "include=main&page=2",
        "headers": { "Content-Type": "application/json", "accept": "*/*" },
        "body": "eyJhIjoxfQ==",
        "isBase64Encoded": true,
        "requestContext": {
            "http": { "method": "post", "path": "/git-gateway/bitbucket/commits" },
            "authorizer": { "jwt": { "claims": { "username": "jdoe", "level": 3 }, "scopes": null } }
        }
    }"#;

    #[test]
    fn test_lambda_event_conversion() {
        let event = GatewayEvent::from_lambda_json(SAMPLE).unwrap();
        assert_eq!(event.method, Method::POST);
        assert_eq!(event.path, "/git-gateway/bitbucket/commits");
        assert_eq!(event.query_param("include").as_deref(), Some("main"));
        assert_eq!(event.content_type(), Some("application/json"));
        assert_eq!(event.header("ACCEPT"), Some("*/*"));
        assert_eq!(event.claims.get_str("username").as_deref(), Some("jdoe"));
        assert_eq!(event.claims.get_str("level").as_deref(), Some("3"));

        let body = event.body.unwrap();
        assert!(body.is_base64());
        assert_eq!(body.to_bytes().unwrap(), br#"{"a":1}"#);
    }

    #[test]
    fn test_minimal_lambda_event_defaults_to_get() {
        let event = GatewayEvent::from_lambda_json(r#"{"rawPath": "/x"}"#).unwrap();
        assert_eq!(event.method, Method::GET);
        assert!(event.body.is_none());
        assert!(event.claims.is_empty());
        assert_eq!(event.raw_query, "");
    }

    #[test]
    fn test_null_headers_and_body() {
        let json = r#"{"rawPath": "/x", "headers": null, "body": null, "rawQueryString": ""}"#;
        let event = GatewayEvent::from_lambda_json(json).unwrap();
        assert_eq!(event.content_type(), None);
        assert!(event.body.is_none());
    }

    #[test]
    fn test_bad_method_is_rejected() {
        let json = r#"{"rawPath": "/x", "requestContext": {"http": {"method": "GE T"}}}"#;
        assert!(matches!(
            GatewayEvent::from_lambda_json(json),
            Err(EventError::Method(_))
        ));
    }

    #[test]
    fn test_query_param_is_decoded() {
        let event = GatewayEvent::new(Method::GET, "/").with_query("include=feature%2Fone&include=x");
        assert_eq!(event.query_param("include").as_deref(), Some("feature/one"));
        assert_eq!(event.query_param("missing"), None);
    }

    #[test]
    fn test_repeated_headers_are_joined() {
        let mut event = GatewayEvent::new(Method::GET, "/");
        event.append_header("Accept", "text/html");
        event.append_header("accept", "application/json");
        assert_eq!(event.header("accept"), Some("text/html, application/json"));
    }

    #[test]
    fn test_binary_body_is_kept_as_base64() {
        let body = EventBody::from_bytes(vec![0xff, 0x00, 0x10]);
        assert!(body.is_base64());
        assert_eq!(body.to_bytes().unwrap(), vec![0xff, 0x00, 0x10]);

        let text = EventBody::from_bytes(b"plain".to_vec());
        assert_eq!(text, EventBody::Text("plain".into()));
    }

    #[test]
    fn test_claims_ignore_structured_values() {
        let mut map = HashMap::new();
        map.insert("groups".to_string(), serde_json::json!(["a", "b"]));
        map.insert("admin".to_string(), serde_json::json!(true));
        let claims = Claims::from(map);
        assert_eq!(claims.get_str("groups"), None);
        assert_eq!(claims.get_str("admin").as_deref(), Some("true"));
    }
}
