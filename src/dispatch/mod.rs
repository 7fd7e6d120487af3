//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! ResolvedRoute
//!     → assets.rs (uri with an extension: static file, done)
//!     → dispatcher.rs load phase (form data, aspect list, raw view; concurrent)
//!     → aspect.rs (resolve method references against the model's action table)
//!     → model.rs (fresh instance per request)
//!     → aspects run in order against the RequestContext (context.rs)
//!     → render success, or recover: log, normalize, render error
//! ```
//!
//! # Design Decisions
//! - The dispatcher is the only recovery boundary; everything below returns
//!   `AppResult`
//! - Aspects are typed values, never evaluated strings
//! - Only the form cache is shared mutable state

pub mod aspect;
pub mod assets;
pub mod context;
pub mod dispatcher;
pub mod model;

pub use aspect::{Aspect, AspectDescriptor, AspectTarget, DispatcherOp};
pub use context::{RequestContext, View};
pub use dispatcher::Dispatcher;
pub use model::{ActionFn, ModelBuilder, ModelDefinition, ModelInstance, ModelRegistry};
