//! Aspect dispatch server.
//!
//! ```text
//! --config site.toml
//!     → load & validate config
//!     → logging, metrics
//!     → Dispatcher (stores, models, form cache, error log)
//!     → HttpServer (catch-all route) until Ctrl+C
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use aspect_dispatch::config::{load_config, AppConfig};
use aspect_dispatch::lifecycle::{startup, Shutdown};
use aspect_dispatch::observability::{logging, ErrorLog};

#[derive(Parser)]
#[command(name = "aspect-dispatch")]
#[command(about = "Aspect-oriented web request dispatcher", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path),
        None => Ok(AppConfig::default()),
    };
    let mut config = match config {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            tracing::error!(error = %e, "Failed to load configuration");
            ErrorLog::new(&AppConfig::default().paths.log).append_blocking(&format!("startup {}", e));
            return ExitCode::FAILURE;
        }
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        site = %config.site.name,
        request_timeout_secs = config.timeouts.request_secs,
        "aspect-dispatch starting"
    );

    let error_log = ErrorLog::new(&config.paths.log);
    match startup::run(config, aspect_dispatch::models::registry(), Shutdown::new()).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            error_log.append(&format!("startup {}", e)).await;
            ExitCode::FAILURE
        }
    }
}
