//! Simple in-memory test backend implementation using DashMap.

use dashmap::DashMap;
use memobox_backend::{Backend, BackendResult, CacheBackend, CacheInfo, DeleteStatus};
use memobox_core::{CacheKey, CacheValue, Raw};
use std::sync::Arc;
use std::time::Duration;

/// Simple in-memory backend for testing using DashMap.
///
/// This backend is thread-safe and can be cloned cheaply (Arc internally).
#[derive(Clone, Default)]
pub struct TestBackend {
    store: Arc<DashMap<CacheKey, CacheValue<Raw>>>,
    default_ttl: Option<Duration>,
}

impl TestBackend {
    /// Create a new empty test backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend with a default TTL.
    pub fn with_default_ttl(ttl: Duration) -> Self {
        Self {
            default_ttl: Some(ttl),
            ..Self::default()
        }
    }

    /// Check if a key exists in the backend.
    pub fn has(&self, key: &CacheKey) -> bool {
        self.store.contains_key(key)
    }

    /// Get raw cache value with metadata for inspection.
    pub fn get_raw(&self, key: &CacheKey) -> Option<CacheValue<Raw>> {
        self.store.get(key).map(|v| v.clone())
    }

    /// Overwrite the raw bytes stored under a key.
    pub fn put_raw(&self, key: &CacheKey, value: CacheValue<Raw>) {
        self.store.insert(key.clone(), value);
    }
}

impl Backend for TestBackend {
    fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        Ok(self.store.get(key).map(|v| v.clone()))
    }

    fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        self.store.insert(key.clone(), value);
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        Ok(match self.store.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    fn clear(&self) -> BackendResult<()> {
        self.store.clear();
        Ok(())
    }

    fn info(&self, _limited: bool) -> BackendResult<CacheInfo> {
        Ok(CacheInfo {
            entries: self.store.len() as u64,
            ..CacheInfo::default()
        })
    }

    fn label(&self) -> &str {
        "test"
    }

    fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }
}

impl CacheBackend for TestBackend {}
