//! Local HTTP server wrapping the dispatcher.
//!
//! # Responsibilities
//! - Create the Axum Router with a single catch-all handler
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Convert inbound requests into `GatewayEvent`s and responses back
//! - Serve until the shutdown signal fires

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{request::Parts, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ListenerConfig;
use crate::dispatch::Dispatcher;
use crate::http::event::{Claims, EventBody, GatewayEvent};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::GatewayResponse;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub claims_header: Option<String>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around `dispatcher`.
    pub fn new(config: &ListenerConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let state = AppState {
            dispatcher,
            claims_header: config.claims_header.as_ref().map(|h| h.to_ascii_lowercase()),
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ListenerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every request goes through the dispatcher.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(request.headers()).to_string();
    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            return GatewayResponse::error(StatusCode::BAD_REQUEST, "Invalid request body")
                .into_response();
        }
    };

    let event = build_event(&parts, bytes, state.claims_header.as_deref());
    tracing::debug!(
        request_id = %request_id,
        method = %event.method,
        path = %event.path,
        "Dispatching request"
    );

    state.dispatcher.handle(&event).await.into_response()
}

/// Translate an HTTP request into a gateway event.
pub fn build_event(parts: &Parts, body: Bytes, claims_header: Option<&str>) -> GatewayEvent {
    let mut event = GatewayEvent::new(parts.method.clone(), parts.uri.path())
        .with_query(parts.uri.query().unwrap_or_default());

    for (name, value) in parts.headers.iter() {
        match value.to_str() {
            Ok(value) => event.append_header(name.as_str(), value),
            Err(_) => tracing::debug!(header = %name, "Ignoring non-text header"),
        }
    }

    if let Some(header) = claims_header {
        let claims = parse_claims(event.header(header));
        event = event.with_claims(claims);
    }

    if !body.is_empty() {
        event = event.with_body(EventBody::from_bytes(body.to_vec()));
    }
    event
}

fn parse_claims(raw: Option<&str>) -> Claims {
    let Some(raw) = raw else {
        return Claims::default();
    };
    match serde_json::from_str::<HashMap<String, serde_json::Value>>(raw) {
        Ok(map) => Claims::from(map),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed claims header");
            Claims::default()
        }
    }
}
