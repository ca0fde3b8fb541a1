//! Cached entry type with expiration metadata.
//!
//! [`CacheValue`] wraps stored data with the time it was written and the
//! time it stops being valid. Expiry is always evaluated against a caller
//! supplied `now`, which is the execution context's clock, never an implicit
//! wall-clock read. That keeps "is this entry still good" a pure function and
//! lets tests move time explicitly.
//!
//! ```
//! use memobox_core::{CacheState, CacheValue};
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! let value = CacheValue::new("data", now, Some(now + Duration::seconds(1)));
//!
//! assert!(matches!(value.clone().cache_state(now), CacheState::Actual(_)));
//! assert!(matches!(
//!     value.cache_state(now + Duration::seconds(2)),
//!     CacheState::Expired(_)
//! ));
//! ```

use chrono::{DateTime, Utc};
use std::mem::size_of;
use std::time::Duration;

use crate::Raw;

/// Freshness of a cached entry at a given instant.
#[derive(Debug)]
pub enum CacheState<T> {
    /// Entry is valid.
    Actual(T),
    /// Entry has expired and must be treated as a miss.
    Expired(T),
}

/// A cached value with creation and expiration timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheValue<T> {
    data: T,
    created: DateTime<Utc>,
    expire: Option<DateTime<Utc>>,
}

impl<T> CacheValue<T> {
    /// Creates a new cache value.
    ///
    /// `expire` of `None` means the entry never expires on its own.
    pub fn new(data: T, created: DateTime<Utc>, expire: Option<DateTime<Utc>>) -> Self {
        CacheValue {
            data,
            created,
            expire,
        }
    }

    /// Creates a cache value written at `now` that lives for `ttl`.
    pub fn with_ttl(data: T, now: DateTime<Utc>, ttl: Option<Duration>) -> Self {
        let expire = ttl.and_then(|ttl| {
            chrono::Duration::from_std(ttl)
                .ok()
                .and_then(|ttl| now.checked_add_signed(ttl))
        });
        CacheValue::new(data, now, expire)
    }

    /// Returns a reference to the cached data.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns when the entry was written.
    #[inline]
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Returns when the entry expires.
    #[inline]
    pub fn expire(&self) -> Option<DateTime<Utc>> {
        self.expire
    }

    /// Consumes the cache value and returns the inner data.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Replaces the data while keeping the timestamps.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheValue<U> {
        CacheValue {
            data: f(self.data),
            created: self.created,
            expire: self.expire,
        }
    }

    /// Remaining lifetime at `now`.
    ///
    /// Returns `None` when there is no expiry or the entry is already expired.
    pub fn ttl_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expire
            .and_then(|expire| expire.signed_duration_since(now).to_std().ok())
            .filter(|remaining| !remaining.is_zero())
    }

    /// Evaluates freshness at `now`. An entry expiring exactly at `now` is
    /// expired.
    pub fn cache_state(self, now: DateTime<Utc>) -> CacheState<Self> {
        match self.expire {
            Some(expire) if expire <= now => CacheState::Expired(self),
            _ => CacheState::Actual(self),
        }
    }
}

impl CacheValue<Raw> {
    /// Returns the estimated memory usage of this cache value in bytes.
    pub fn memory_size(&self) -> usize {
        size_of::<Self>() + self.data.len()
    }
}
