//! Builder for configuring [`MokaBackend`].

use std::collections::hash_map::RandomState;
use std::sync::Arc;
use std::time::{Duration, Instant};

use memobox_backend::format::{BincodeFormat, Format};
use memobox_core::{CacheKey, CacheValue, Raw};
use moka::Expiry;
use moka::policy::EvictionPolicy;
use moka::sync::{Cache, CacheBuilder};
use smol_str::SmolStr;

use crate::backend::{MokaBackend, Stats};

/// Per-entry expiration.
///
/// Entries with an explicit expiry live exactly until it. Entries without one
/// either live until evicted for space or, when an idle window is set, until
/// they have gone unread for that long.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Expiration {
    idle: Option<Duration>,
}

impl Expiry<CacheKey, CacheValue<Raw>> for Expiration {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &CacheValue<Raw>,
        _created_at: Instant,
    ) -> Option<Duration> {
        self.lifetime(value)
    }

    fn expire_after_read(
        &self,
        _key: &CacheKey,
        value: &CacheValue<Raw>,
        _read_at: Instant,
        duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        // Explicit expiries are never extended by reads.
        match value.expire() {
            Some(_) => duration_until_expiry,
            None => self.idle,
        }
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &CacheValue<Raw>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // The new value's lifetime replaces the old one.
        self.lifetime(value)
    }
}

impl Expiration {
    fn lifetime(&self, value: &CacheValue<Raw>) -> Option<Duration> {
        match value.expire() {
            Some(expiration) => {
                // Both stamps come from the writer's clock, which may differ from ours.
                let millis = (expiration - value.created()).num_milliseconds();
                if millis <= 0 {
                    Some(Duration::ZERO)
                } else {
                    Some(Duration::from_millis(millis as u64))
                }
            }
            None => self.idle,
        }
    }
}

/// Marker type: capacity has not been configured yet.
///
/// Call [`max_bytes()`](MokaBackendBuilder::max_bytes) or
/// [`max_entries()`](MokaBackendBuilder::max_entries) before `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: the store holds at most this many entries in total.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: the store uses at most this many bytes in total (approximate).
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Builder for [`MokaBackend`].
///
/// Capacity is required and uses the typestate pattern: `build()` only exists
/// once exactly one of [`max_bytes`](Self::max_bytes) or
/// [`max_entries`](Self::max_entries) has been chosen. Whatever the mode, the
/// total is divided evenly between [`segments`](Self::segments).
///
/// ```
/// use std::time::Duration;
/// use memobox_moka::MokaBackend;
///
/// let backend = MokaBackend::builder()
///     .label("memoize")
///     .max_bytes(32 * 1024 * 1024)
///     .segments(2)
///     .entries_hint(4093)
///     .idle_ttl(Some(Duration::from_secs(3600)))
///     .build();
/// ```
pub struct MokaBackendBuilder<Cap, S = BincodeFormat>
where
    S: Format,
{
    capacity: Cap,
    serializer: S,
    label: SmolStr,
    eviction_policy: Option<EvictionPolicy>,
    segments: u32,
    entries_hint: Option<usize>,
    default_ttl: Option<Duration>,
    idle_ttl: Option<Duration>,
}

impl MokaBackendBuilder<NoCapacity, BincodeFormat> {
    /// Creates a builder with one segment, no TTLs and no capacity.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            serializer: BincodeFormat,
            label: SmolStr::new_static("moka"),
            eviction_policy: None,
            segments: 1,
            entries_hint: None,
            default_ttl: None,
            idle_ttl: None,
        }
    }
}

impl Default for MokaBackendBuilder<NoCapacity, BincodeFormat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Format> MokaBackendBuilder<NoCapacity, S> {
    /// Limits the store to `capacity` entries in total.
    pub fn max_entries(self, capacity: u64) -> MokaBackendBuilder<EntryCapacity, S> {
        self.with_capacity(EntryCapacity(capacity))
    }

    /// Limits the store to roughly `bytes` bytes in total.
    ///
    /// Each entry weighs its key plus its encoded value, including struct
    /// overhead (see `CacheKey::memory_size` and `CacheValue::memory_size`).
    pub fn max_bytes(self, bytes: u64) -> MokaBackendBuilder<ByteCapacity, S> {
        self.with_capacity(ByteCapacity(bytes))
    }

    fn with_capacity<Cap>(self, capacity: Cap) -> MokaBackendBuilder<Cap, S> {
        MokaBackendBuilder {
            capacity,
            serializer: self.serializer,
            label: self.label,
            eviction_policy: self.eviction_policy,
            segments: self.segments,
            entries_hint: self.entries_hint,
            default_ttl: self.default_ttl,
            idle_ttl: self.idle_ttl,
        }
    }
}

impl<Cap, S: Format> MokaBackendBuilder<Cap, S> {
    /// Label shown in logs, metrics and `info`.
    ///
    /// # Default
    ///
    /// `"moka"`
    pub fn label(mut self, label: impl Into<SmolStr>) -> Self {
        self.label = label.into();
        self
    }

    /// Number of independent shards. Values below 1 are raised to 1.
    pub fn segments(mut self, segments: u32) -> Self {
        self.segments = segments.max(1);
        self
    }

    /// Expected number of entries, used to pre-size the hash tables.
    ///
    /// This is a sizing hint only and never limits the store.
    pub fn entries_hint(mut self, entries: usize) -> Self {
        self.entries_hint = Some(entries);
        self
    }

    /// TTL applied when a store call passes none. `None` means unlimited.
    pub fn default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl.filter(|ttl| !ttl.is_zero());
        self
    }

    /// Idle window for entries without an explicit expiry.
    ///
    /// Such an entry is evicted once it has not been read for `idle`; every
    /// read restarts the window. `None` keeps them until evicted for space.
    pub fn idle_ttl(mut self, idle: Option<Duration>) -> Self {
        self.idle_ttl = idle.filter(|idle| !idle.is_zero());
        self
    }

    /// Eviction policy used by every segment.
    ///
    /// # Default
    ///
    /// [`EvictionPolicy::tiny_lfu()`] for entry capacity and
    /// [`EvictionPolicy::lru()`] for byte capacity, where TinyLFU admission
    /// could reject a new entry even though evicting would make room.
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }

    /// Value format used to encode stored results.
    ///
    /// # Default
    ///
    /// [`BincodeFormat`]
    pub fn value_format<NewS: Format>(self, serializer: NewS) -> MokaBackendBuilder<Cap, NewS> {
        MokaBackendBuilder {
            capacity: self.capacity,
            serializer,
            label: self.label,
            eviction_policy: self.eviction_policy,
            segments: self.segments,
            entries_hint: self.entries_hint,
            default_ttl: self.default_ttl,
            idle_ttl: self.idle_ttl,
        }
    }

    fn shard_builder(
        &self,
        per_shard: u64,
    ) -> CacheBuilder<CacheKey, CacheValue<Raw>, Cache<CacheKey, CacheValue<Raw>>> {
        let builder = CacheBuilder::new(per_shard.max(1)).expire_after(Expiration {
            idle: self.idle_ttl,
        });
        match self.entries_hint {
            Some(hint) => builder.initial_capacity(hint.div_ceil(self.segments as usize)),
            None => builder,
        }
    }

    fn assemble(self, shards: Vec<Cache<CacheKey, CacheValue<Raw>>>) -> MokaBackend<S> {
        tracing::debug!(
            label = %self.label,
            segments = self.segments,
            default_ttl = ?self.default_ttl,
            idle_ttl = ?self.idle_ttl,
            "moka store created"
        );
        MokaBackend {
            shards: Arc::new(shards),
            hasher: RandomState::new(),
            stats: Arc::new(Stats::default()),
            serializer: self.serializer,
            label: self.label,
            default_ttl: self.default_ttl,
        }
    }
}

impl<S: Format> MokaBackendBuilder<EntryCapacity, S> {
    /// Builds the store with entry-count capacity.
    pub fn build(self) -> MokaBackend<S> {
        let per_shard = self.capacity.0.div_ceil(u64::from(self.segments));
        let policy = self.eviction_policy.clone().unwrap_or_else(EvictionPolicy::tiny_lfu);
        let shards = (0..self.segments)
            .map(|_| {
                self.shard_builder(per_shard)
                    .eviction_policy(policy.clone())
                    .build()
            })
            .collect();
        self.assemble(shards)
    }
}

impl<S: Format> MokaBackendBuilder<ByteCapacity, S> {
    /// Builds the store with byte capacity, split evenly between segments.
    pub fn build(self) -> MokaBackend<S> {
        let per_shard = self.capacity.0 / u64::from(self.segments);
        let policy = self.eviction_policy.clone().unwrap_or_else(EvictionPolicy::lru);
        let shards = (0..self.segments)
            .map(|_| {
                self.shard_builder(per_shard)
                    .weigher(byte_weigher)
                    .eviction_policy(policy.clone())
                    .build()
            })
            .collect();
        self.assemble(shards)
    }
}

fn byte_weigher(key: &CacheKey, value: &CacheValue<Raw>) -> u32 {
    (key.memory_size() + value.memory_size()).min(u32::MAX as usize) as u32
}
