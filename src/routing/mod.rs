//! URL resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Raw URL "/blog/my-post,event?x=1"
//!     → resolver.rs (split request type, segments, query string)
//!     → case.rs (PascalCase model name, camelCase action name)
//!     → ResolvedRoute (immutable)
//! ```
//!
//! # Design Decisions
//! - Resolution is pure and total: malformed input degrades to the index route
//! - No I/O: whether the resource exists is decided later by the dispatcher
//! - Same input always yields the same route

pub mod case;
pub mod resolver;

pub use case::{to_camel_case, to_pascal_case};
pub use resolver::{resolve, Parameters, RequestType, ResolvedRoute};
