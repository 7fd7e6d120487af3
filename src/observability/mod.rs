//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and HTTP layer produce:
//!     → logging.rs (structured tracing events, request-id spans)
//!     → metrics.rs (request counters and latency histograms)
//!     → error_log.rs (daily error files for unexpected failures)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every span
//! - Metrics are cheap (atomic increments), exporter is optional
//! - Writing the error log never fails a request

pub mod error_log;
pub mod logging;
pub mod metrics;

pub use error_log::ErrorLog;
