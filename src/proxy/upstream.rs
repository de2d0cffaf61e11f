//! Upstream forwarding and response translation.
//!
//! # Responsibilities
//! - Build `{base}/{repo}{path}[?query]` for the caller's scope
//! - Inject `Authorization: Bearer {token}` and `Accept: application/json`
//! - Forward the caller's content type (JSON if absent) and decoded body
//! - Translate the upstream response: text for JSON/text types, bytes otherwise
//!
//! # Design Decisions
//! - Exactly one upstream call per request, no retries
//! - Non-success upstream statuses become gateway errors (500), they are
//!   not passed through
//! - The only timeout is the client's own

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::config::UpstreamConfig;
use crate::credentials::ScopedConfig;
use crate::error::GatewayError;
use crate::http::event::GatewayEvent;
use crate::http::response::{GatewayResponse, ResponseBody};
use crate::observability::metrics;

const DEFAULT_REQUEST_CONTENT_TYPE: &str = "application/json";
const DEFAULT_RESPONSE_CONTENT_TYPE: &str = "application/octet-stream";

/// True for content types passed through as text.
pub fn is_textual(content_type: &str) -> bool {
    let content_type = content_type.trim_start().to_ascii_lowercase();
    content_type.starts_with("application/json") || content_type.starts_with("text/")
}

/// HTTP client for the source-control API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute upstream URL for a relative gateway path.
    pub fn target_url(&self, repo: &str, rel_path: &str, raw_query: &str) -> String {
        let mut url = format!("{}/{}{}", self.base_url, repo, rel_path);
        if !raw_query.is_empty() {
            url.push('?');
            url.push_str(raw_query);
        }
        url
    }

    /// Forward `event` on behalf of `scope`.
    pub async fn forward(
        &self,
        rel_path: &str,
        event: &GatewayEvent,
        scope: &ScopedConfig,
    ) -> Result<GatewayResponse, GatewayError> {
        let start_time = Instant::now();
        let url = self.target_url(&scope.repo, rel_path, &event.raw_query);

        let body = match &event.body {
            Some(body) if !body.is_empty() => Some(
                body.to_bytes()
                    .map_err(|e| GatewayError::InvalidBody(e.to_string()))?,
            ),
            _ => None,
        };

        let mut request = self
            .client
            .request(event.method.clone(), &url)
            .bearer_auth(&scope.access_token)
            .header(ACCEPT, "application/json")
            .header(
                CONTENT_TYPE,
                event.content_type().unwrap_or(DEFAULT_REQUEST_CONTENT_TYPE),
            );
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    method = %event.method,
                    path = %rel_path,
                    error = %e,
                    "Upstream request failed"
                );
                metrics::record_upstream(event.method.as_str(), None, start_time);
                return Err(e.into());
            }
        };

        let status = response.status();
        metrics::record_upstream(event.method.as_str(), Some(status.as_u16()), start_time);

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                method = %event.method,
                path = %rel_path,
                "Bad upstream response"
            );
            let text = response.text().await?;
            return Err(GatewayError::UpstreamRejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_RESPONSE_CONTENT_TYPE)
            .to_string();

        let body = if is_textual(&content_type) {
            ResponseBody::Text(response.text().await?)
        } else {
            ResponseBody::Binary(response.bytes().await?.to_vec())
        };

        Ok(GatewayResponse::new(status, body).with_header("Content-Type", content_type))
    }
}
