//! Form validation subsystem.
//!
//! # Data Flow
//! ```text
//! form manifest (field names for one uri + request type)
//!     → loader.rs (resolve each name from the shared field store, concurrently)
//!     → FormData (ordered, immutable)
//!     → cache.rs (process-wide, keyed by (uri, request type))
//!     → validator.rs (check request parameters, first violation wins)
//! ```
//!
//! # Design Decisions
//! - Field order is the manifest order and drives violation order
//! - Violations are `FormData` exceptions carrying a JSON message
//! - The cache entry is dropped before every lookup unless reuse is enabled

pub mod cache;
pub mod field;
pub mod loader;
pub mod validator;

pub use cache::FormCache;
pub use field::{Constraint, FieldDefinition, FieldType, FormData, Pattern};
pub use loader::load_form_data;
pub use validator::validate;
