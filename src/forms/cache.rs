//! Process-wide form data cache.
//!
//! # Design Decisions
//! - Keyed by `(resource key, request type)`
//! - Concurrent misses on one key share a single load (per-key `OnceCell`)
//! - Without `reuse`, the entry is dropped right before each lookup, so every
//!   request reloads its definitions while the miss path still writes the cache
//! - Resources without a manifest are not cached

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::exception::AppResult;
use crate::routing::RequestType;

use super::field::FormData;

type CacheKey = (String, RequestType);
type Entry = Arc<OnceCell<Option<Arc<FormData>>>>;

/// Cache of loaded form data.
#[derive(Debug, Default)]
pub struct FormCache {
    entries: DashMap<CacheKey, Entry>,
    reuse: bool,
}

impl FormCache {
    /// Create a cache; `reuse = false` invalidates every entry before it is read.
    pub fn new(reuse: bool) -> Self {
        Self {
            entries: DashMap::new(),
            reuse,
        }
    }

    /// Return the cached form data for `key`, loading it on miss.
    pub async fn get_or_load<F, Fut>(
        &self,
        resource_key: &str,
        request_type: RequestType,
        load: F,
    ) -> AppResult<Option<Arc<FormData>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Option<FormData>>>,
    {
        let key = (resource_key.to_string(), request_type);
        if !self.reuse {
            self.invalidate(&key.0, request_type);
        }

        let cell = self.entries.entry(key.clone()).or_default().clone();
        let form = cell
            .get_or_try_init(|| async move { load().await.map(|form| form.map(Arc::new)) })
            .await?
            .clone();

        if form.is_none() {
            self.entries.remove(&key);
        }
        Ok(form)
    }

    pub fn invalidate(&self, resource_key: &str, request_type: RequestType) {
        self.entries.remove(&(resource_key.to_string(), request_type));
    }

    pub fn contains(&self, resource_key: &str, request_type: RequestType) -> bool {
        self.entries
            .get(&(resource_key.to_string(), request_type))
            .map(|entry| entry.initialized())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
