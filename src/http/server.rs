//! HTTP server setup and request routing.
//!
//! # Responsibilities
//! - Create the Axum router: registration endpoint + catch-all proxy
//! - Wire up middleware (request ID, tracing)
//! - Buffer inbound bodies so they can be copied per branch
//! - Translate dispatch outcomes into wire responses
//!
//! # Design Decisions
//! - `PUT /register` is the only reserved route; every other method/path
//!   combination — including other methods on `/register` — fans out
//! - The registry is injected, not ambient; handlers reach it via state
//! - A fresh snapshot is taken per proxied request, before dispatch

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, put};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::dispatch::Dispatcher;
use crate::http::register::register_handler;
use crate::http::request::{request_id, RequestIdLayer};
use crate::http::response::{failure_response, success_response};
use crate::observability::metrics;
use crate::registry::Registry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub dispatcher: Arc<Dispatcher>,
    pub max_body_bytes: usize,
}

/// The externally visible HTTP server.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server around an injected registry.
    pub fn new(config: ProxyConfig, registry: Arc<Registry>) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(&config.timeouts));

        let state = AppState {
            registry,
            dispatcher,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/register", put(register_handler))
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .method_not_allowed_fallback(proxy_handler)
            .with_state(state)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections until the shutdown channel
    /// fires.
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
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Catch-all handler: snapshot the registry, fan the request out, return
/// the aggregate outcome.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = request_id(request.headers()).to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    let targets = state.registry.snapshot();
    metrics::record_fanout(targets.len());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        targets = targets.len(),
        "Proxying request"
    );

    let response = match state.dispatcher.dispatch(&parts, body, targets).await {
        Ok(upstream_response) => success_response(upstream_response),
        Err(error) => {
            tracing::warn!(request_id = %request_id, %error, "Fan-out job failed");
            failure_response(&error)
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
