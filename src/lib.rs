//! Aspect-oriented request dispatcher.
//!
//! URLs resolve to a resource, a model and a request type
//! (`page | event | dialog | ws`). Per-resource aspect lists run model
//! actions and dispatcher operations in order; form definitions validate
//! request parameters; views render through Tera into full pages,
//! fragments, JSON or XML.

pub mod config;
pub mod dispatch;
pub mod exception;
pub mod forms;
pub mod http;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod render;
pub mod routing;
pub mod store;

pub use config::AppConfig;
pub use dispatch::Dispatcher;
pub use exception::{AppResult, Exception, ExceptionKind};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use render::Rendered;
