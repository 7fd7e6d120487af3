//! Definition and view storage.
//!
//! # Responsibilities
//! - Read form manifests, field definitions, aspect lists, metadata and views
//! - Read static assets from the public root
//! - Tell "not found" (`Ok(None)`) apart from "found but empty"
//!
//! # Design Decisions
//! - One trait for every store so tests swap the filesystem for memory
//! - Paths are relative to the store root; parent components never escape it
//! - File naming conventions live in `layout.rs`

pub mod layout;

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::exception::{AppResult, Exception};

/// Read-only access to files under a root.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Read raw bytes; `Ok(None)` when the file does not exist.
    async fn read_bytes(&self, path: &str) -> AppResult<Option<Vec<u8>>>;

    /// Read UTF-8 text; `Ok(None)` when the file does not exist.
    async fn read_text(&self, path: &str) -> AppResult<Option<String>> {
        match self.read_bytes(path).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| Exception::unknown(format!("{} is not valid UTF-8: {}", path, e))),
            None => Ok(None),
        }
    }
}

/// Store backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes {
            None
        } else {
            Some(self.root.join(relative))
        }
    }
}

#[async_trait]
impl ResourceStore for FsStore {
    async fn read_bytes(&self, path: &str) -> AppResult<Option<Vec<u8>>> {
        let Some(full) = self.resolve(path) else {
            tracing::warn!(path = %path, "Rejected path outside store root");
            return Ok(None);
        };

        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if full.is_dir() => {
                tracing::debug!(path = %full.display(), error = %e, "Directory read as file");
                Ok(None)
            }
            Err(e) => Err(Exception::unknown(format!("Failed to read {}: {}", full.display(), e))),
        }
    }
}

/// Store holding its files in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, content: impl Into<Vec<u8>>) {
        self.files.insert(normalize(path), content.into());
    }

    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn read_bytes(&self, path: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(self.files.get(&normalize(path)).cloned())
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}
