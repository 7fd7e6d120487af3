//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all dispatch handler
//! - Wire up middleware (request ID, tracing, timeout, concurrency limit)
//! - Bind server to listener and shut down gracefully
//!
//! Dispatch depends on the request URL alone; the body is never read.

use axum::{
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::dispatch::Dispatcher;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::signals::shutdown_signal;

/// HTTP front end of the dispatcher.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &AppConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            router: Self::build_router(config, dispatcher),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &AppConfig, dispatcher: Arc<Dispatcher>) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(dispatcher)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(ConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// Serve on `listener` until Ctrl+C or a shutdown broadcast.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let request_id = request_id(&headers);
    let raw_url = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    tracing::debug!(request_id = %request_id, method = %method, url = %raw_url, "Dispatching request");
    dispatcher.run(raw_url, &request_id).await.into_response()
}
