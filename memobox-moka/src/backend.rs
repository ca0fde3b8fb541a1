//! Moka store implementation.

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use memobox_backend::format::{BincodeFormat, Format};
use memobox_backend::{
    Backend, BackendResult, CacheBackend, CacheInfo, DeleteStatus, EntryInfo,
};
use memobox_core::{CacheKey, CacheValue, Raw};
use moka::sync::Cache;
use smol_str::SmolStr;

use crate::builder::{MokaBackendBuilder, NoCapacity};
use crate::metrics;

#[derive(Debug, Default)]
pub(crate) struct Stats {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
}

/// In-process shared cache store powered by Moka.
///
/// Safe to share between any number of threads; clones share the same
/// entries and counters. Each key lives in exactly one segment, chosen by
/// hashing the key, and every read or write touches only that segment.
///
/// # Caveats
///
/// - Data is **not persisted**; the store is lost when the process exits.
/// - Physical eviction is best-effort. Logical expiry is decided by
///   [`CacheBackend::fetch`] against the caller's clock, so an entry past its
///   deadline is never served even if Moka has not dropped it yet.
#[derive(Clone)]
pub struct MokaBackend<S = BincodeFormat>
where
    S: Format,
{
    pub(crate) shards: Arc<Vec<Cache<CacheKey, CacheValue<Raw>>>>,
    pub(crate) hasher: RandomState,
    pub(crate) stats: Arc<Stats>,
    pub(crate) serializer: S,
    pub(crate) label: SmolStr,
    pub(crate) default_ttl: Option<Duration>,
}

impl<S: Format> std::fmt::Debug for MokaBackend<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("label", &self.label)
            .field("segments", &self.shards.len())
            .field("default_ttl", &self.default_ttl)
            .field("serializer", &self.serializer)
            .finish()
    }
}

impl MokaBackend<BincodeFormat> {
    /// Creates a new builder. Capacity must be set before `build()`.
    pub fn builder() -> MokaBackendBuilder<NoCapacity, BincodeFormat> {
        MokaBackendBuilder::new()
    }
}

impl<S: Format> MokaBackend<S> {
    fn shard(&self, key: &CacheKey) -> &Cache<CacheKey, CacheValue<Raw>> {
        let index = self.hasher.hash_one(key) as usize % self.shards.len();
        &self.shards[index]
    }

    /// Number of segments the store is split into.
    pub fn segments(&self) -> usize {
        self.shards.len()
    }

    /// Applies pending evictions and expirations in every segment.
    ///
    /// Moka defers this housekeeping; tests call it before inspecting sizes.
    pub fn run_pending_tasks(&self) {
        for shard in self.shards.iter() {
            shard.run_pending_tasks();
        }
    }

    /// Entry count summed over segments. Approximate until
    /// [`run_pending_tasks`](Self::run_pending_tasks) has been called.
    pub fn entry_count(&self) -> u64 {
        self.shards.iter().map(|shard| shard.entry_count()).sum()
    }

    /// Weighted size summed over segments, in bytes for byte-capacity stores.
    pub fn weighted_size(&self) -> u64 {
        self.shards.iter().map(|shard| shard.weighted_size()).sum()
    }
}

impl<S: Format> Backend for MokaBackend<S> {
    fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        Ok(self.shard(key).get(key))
    }

    fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        self.shard(key).insert(key.clone(), value);
        self.stats.inserts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        match self.shard(key).remove(key) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    fn clear(&self) -> BackendResult<()> {
        for shard in self.shards.iter() {
            shard.invalidate_all();
        }
        self.run_pending_tasks();
        tracing::debug!(label = %self.label, "moka store cleared");
        Ok(())
    }

    fn info(&self, limited: bool) -> BackendResult<CacheInfo> {
        self.run_pending_tasks();
        let entries = self.entry_count();
        let weighted = self.weighted_size();
        metrics::record_capacity(&self.label, entries, weighted);

        let entry_list = (!limited).then(|| {
            let mut list: Vec<EntryInfo> = self
                .shards
                .iter()
                .flat_map(|shard| shard.iter())
                .map(|(key, value)| EntryInfo {
                    key: key.to_string(),
                    size: (key.memory_size() + value.memory_size()) as u64,
                    created: value.created(),
                    expire: value.expire(),
                })
                .collect();
            list.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.key.cmp(&b.key)));
            list
        });
        let memory_size = match &entry_list {
            Some(list) => list.iter().map(|entry| entry.size).sum(),
            None if weighted > 0 => weighted,
            None => self
                .shards
                .iter()
                .flat_map(|shard| shard.iter())
                .map(|(key, value)| (key.memory_size() + value.memory_size()) as u64)
                .sum(),
        };

        Ok(CacheInfo {
            enabled: true,
            label: self.label.clone(),
            segments: self.shards.len() as u32,
            entries,
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            inserts: self.stats.inserts.load(Ordering::Relaxed),
            memory_size,
            default_ttl: self.default_ttl,
            entry_list,
        })
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn value_format(&self) -> &dyn Format {
        &self.serializer
    }

    fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    fn record_lookup(&self, hit: bool) {
        let counter = if hit {
            &self.stats.hits
        } else {
            &self.stats.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

impl<S: Format> CacheBackend for MokaBackend<S> {}
