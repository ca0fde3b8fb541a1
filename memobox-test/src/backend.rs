//! Store wrappers for failure injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use memobox_backend::{
    Backend, BackendError, BackendResult, CacheBackend, CacheInfo, DeleteStatus, Format,
};
use memobox_core::{CacheKey, CacheValue, Raw};

/// Wraps a store and fails every operation while switched off.
#[derive(Debug)]
pub struct FlakyBackend<B> {
    inner: B,
    offline: AtomicBool,
    failures: AtomicUsize,
}

impl<B: Backend> FlakyBackend<B> {
    /// Wraps `inner`, initially online.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            offline: AtomicBool::new(false),
            failures: AtomicUsize::new(0),
        }
    }

    /// Makes every following operation fail, or succeed again.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of operations that failed so far.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    /// The wrapped store.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    fn check(&self) -> BackendResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(BackendError::ConnectionError("store offline".into()));
        }
        Ok(())
    }
}

impl<B: Backend> Backend for FlakyBackend<B> {
    fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        self.check()?;
        self.inner.read(key)
    }

    fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        self.check()?;
        self.inner.write(key, value)
    }

    fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        self.check()?;
        self.inner.remove(key)
    }

    fn clear(&self) -> BackendResult<()> {
        self.check()?;
        self.inner.clear()
    }

    fn info(&self, limited: bool) -> BackendResult<CacheInfo> {
        self.check()?;
        self.inner.info(limited)
    }

    fn label(&self) -> &str {
        self.inner.label()
    }

    fn value_format(&self) -> &dyn Format {
        self.inner.value_format()
    }

    fn default_ttl(&self) -> Option<Duration> {
        self.inner.default_ttl()
    }

    fn record_lookup(&self, hit: bool) {
        self.inner.record_lookup(hit)
    }
}

impl<B: Backend> CacheBackend for FlakyBackend<B> {}
