//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;

use git_gateway::config::{Environment, GatewayConfig};
use git_gateway::http::{Claims, GatewayEvent};
use git_gateway::Dispatcher;

pub const BASE_PATH: &str = "/git-gateway/bitbucket";

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query, e.g. `/team/site/commits?include=main`.
    pub uri: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Canned answer the mock upstream gives to every request.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl CannedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn bytes(content_type: Option<&'static str>, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }
}

#[derive(Clone)]
struct MockState {
    response: CannedResponse,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A running mock upstream.
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    /// Base URL to configure the gateway with.
    pub fn base_url(&self) -> String {
        format!("http://{}/repositories", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock upstream on an ephemeral port that records every request.
pub async fn start_mock_upstream(response: CannedResponse) -> MockUpstream {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        response,
        requests: requests.clone(),
    };
    let app = Router::new().fallback(record).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, requests }
}

async fn record(State(state): State<MockState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let uri = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let headers = parts
        .headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();

    state.requests.lock().unwrap().push(RecordedRequest {
        method: parts.method.to_string(),
        uri,
        headers,
        body: body.to_vec(),
    });

    let canned = state.response;
    let status = StatusCode::from_u16(canned.status).unwrap();
    let mut response = (status, canned.body).into_response();
    // Vec<u8> bodies default to octet-stream; replace or drop as requested.
    response.headers_mut().remove(header::CONTENT_TYPE);
    if let Some(content_type) = canned.content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type.parse().unwrap());
    }
    response
}

/// Environment with a complete scope for `user`.
pub fn user_env(user: &str, repo: &str, branch: &str, token: &str) -> Vec<(String, String)> {
    vec![
        (format!("BB_USER_{user}_REPO"), repo.to_string()),
        (format!("BB_USER_{user}_BRANCH"), branch.to_string()),
        (format!("BB_USER_{user}_ACCESS_KEY"), token.to_string()),
    ]
}

pub fn dispatcher(upstream_url: &str, vars: Vec<(String, String)>) -> Dispatcher {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = upstream_url.to_string();
    let env: Environment = vars.into_iter().collect();
    Dispatcher::new(&config, Arc::new(env)).unwrap()
}

pub fn claims(user: &str) -> Claims {
    [("username", user)].into_iter().collect()
}

/// Event under the gateway's base path for `user`.
pub fn event(method: axum::http::Method, rel_path: &str, user: &str) -> GatewayEvent {
    GatewayEvent::new(method, format!("{BASE_PATH}{rel_path}")).with_claims(claims(user))
}
