use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use memobox_core::{CacheKey, CacheState, CacheValue, Raw, Value};

use crate::{
    BackendError, CacheInfo, DeleteStatus,
    format::{BincodeFormat, Format},
    metrics::{self, ReadOutcome},
};

pub type BackendResult<T> = Result<T, BackendError>;

/// Raw store contract.
///
/// Calls are synchronous: the interceptor runs inline on the thread that is
/// executing the intercepted call and never yields. Implementations must be
/// safe to share between threads; each individual call must be atomic.
pub trait Backend: Sync + Send {
    fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>>;

    fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()>;

    fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus>;

    /// Drops every entry.
    fn clear(&self) -> BackendResult<()>;

    /// Store statistics; see [`CacheInfo`].
    fn info(&self, limited: bool) -> BackendResult<CacheInfo>;

    /// Label used in logs, metrics and introspection.
    fn label(&self) -> &str {
        "backend"
    }

    fn value_format(&self) -> &dyn Format {
        &BincodeFormat
    }

    /// TTL applied when a store call passes none.
    fn default_ttl(&self) -> Option<Duration> {
        None
    }

    /// Called once per typed fetch with its final outcome, after expiry and
    /// decoding have been judged. Stores that keep hit/miss counters hook in
    /// here.
    fn record_lookup(&self, _hit: bool) {}
}

impl Backend for &dyn Backend {
    fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        (*self).read(key)
    }

    fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        (*self).write(key, value)
    }

    fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (*self).remove(key)
    }

    fn clear(&self) -> BackendResult<()> {
        (*self).clear()
    }

    fn info(&self, limited: bool) -> BackendResult<CacheInfo> {
        (*self).info(limited)
    }

    fn label(&self) -> &str {
        (*self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (*self).value_format()
    }

    fn default_ttl(&self) -> Option<Duration> {
        (*self).default_ttl()
    }

    fn record_lookup(&self, hit: bool) {
        (*self).record_lookup(hit)
    }
}

impl Backend for Box<dyn Backend> {
    fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key)
    }

    fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key)
    }

    fn clear(&self) -> BackendResult<()> {
        (**self).clear()
    }

    fn info(&self, limited: bool) -> BackendResult<CacheInfo> {
        (**self).info(limited)
    }

    fn label(&self) -> &str {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }

    fn default_ttl(&self) -> Option<Duration> {
        (**self).default_ttl()
    }

    fn record_lookup(&self, hit: bool) {
        (**self).record_lookup(hit)
    }
}

impl Backend for Arc<dyn Backend + Send + 'static> {
    fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key)
    }

    fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key)
    }

    fn clear(&self) -> BackendResult<()> {
        (**self).clear()
    }

    fn info(&self, limited: bool) -> BackendResult<CacheInfo> {
        (**self).info(limited)
    }

    fn label(&self) -> &str {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }

    fn default_ttl(&self) -> Option<Duration> {
        (**self).default_ttl()
    }

    fn record_lookup(&self, hit: bool) {
        (**self).record_lookup(hit)
    }
}

/// Typed cache client used by the interceptor.
///
/// Adds value encoding and expiry evaluation on top of [`Backend`]. Expiry is
/// judged against the caller's `now`, so an entry the store has not evicted
/// yet is still reported as a miss once it is past its deadline.
pub trait CacheBackend: Backend {
    /// Looks up a live value.
    ///
    /// Expired entries are removed on sight and reported as `None`. An entry
    /// that fails to decode is removed and reported as an error.
    fn fetch(&self, key: &CacheKey, now: DateTime<Utc>) -> BackendResult<Option<Value>> {
        let value = match self.read(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                metrics::record_read(self.label(), ReadOutcome::Miss);
                self.record_lookup(false);
                return Ok(None);
            }
            Err(err) => {
                metrics::record_read(self.label(), ReadOutcome::Error);
                self.record_lookup(false);
                return Err(err);
            }
        };

        let value = match value.cache_state(now) {
            CacheState::Actual(value) => value,
            CacheState::Expired(_) => {
                metrics::record_read(self.label(), ReadOutcome::Expired);
                self.record_lookup(false);
                let _ = self.remove(key);
                return Ok(None);
            }
        };

        match self.value_format().deserialize_value(value.data()) {
            Ok(decoded) => {
                metrics::record_read(self.label(), ReadOutcome::Hit);
                self.record_lookup(true);
                Ok(Some(decoded))
            }
            Err(err) => {
                metrics::record_read(self.label(), ReadOutcome::Error);
                self.record_lookup(false);
                tracing::warn!(key = %key, error = %err, "dropping undecodable cache entry");
                let _ = self.remove(key);
                Err(err.into())
            }
        }
    }

    /// Stores a value written at `now`.
    ///
    /// `ttl` of `None` falls back to [`Backend::default_ttl`]; if that is
    /// also `None` the entry never expires on its own.
    fn store(
        &self,
        key: &CacheKey,
        value: &Value,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> BackendResult<()> {
        let serialized = self.value_format().serialize_value(value)?;
        let bytes = serialized.len() as u64;
        let ttl = ttl.or_else(|| self.default_ttl());
        let result = self.write(key, CacheValue::with_ttl(serialized, now, ttl));
        metrics::record_write(self.label(), bytes, result.is_ok());
        result
    }
}

impl CacheBackend for &dyn Backend {}

impl CacheBackend for Box<dyn Backend> {}

impl CacheBackend for Arc<dyn Backend + Send + 'static> {}
