//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Metrics → Dispatcher → Bind listener → Serve
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Ctrl+C or Shutdown::trigger → stop accepting → drain in-flight → exit
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
