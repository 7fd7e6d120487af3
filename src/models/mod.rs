//! Models of the bundled sample site.

pub mod index;

use crate::dispatch::ModelRegistry;

/// Registry holding every bundled model.
pub fn registry() -> ModelRegistry {
    ModelRegistry::new()
        .with_model("/", index::index_page())
        .with_model("/", index::index_event())
}
