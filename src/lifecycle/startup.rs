//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order: metrics, dispatcher, listener
//! - Listener binds last (traffic only when ready)

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::dispatch::{Dispatcher, ModelRegistry};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Fatal startup failure.
#[derive(Debug)]
pub enum StartupError {
    Bind(String, std::io::Error),
    Serve(std::io::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Bind(addr, e) => write!(f, "Failed to bind {}: {}", addr, e),
            StartupError::Serve(e) => write!(f, "Server error: {}", e),
        }
    }
}

impl std::error::Error for StartupError {}

/// Start every subsystem and serve until shutdown.
pub async fn run(config: AppConfig, models: ModelRegistry, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    tracing::info!(
        application = %config.paths.application.display(),
        public = %config.paths.public.display(),
        models = models.len(),
        reuse_form_data = config.cache.reuse_form_data,
        "Building dispatcher"
    );
    let dispatcher = Arc::new(Dispatcher::from_config(&config, models));

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|e| StartupError::Bind(config.listener.bind_address.clone(), e))?;

    HttpServer::new(&config, dispatcher)
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
