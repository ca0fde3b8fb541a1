//! Introspection records.
//!
//! [`CacheInfo`] is what `info(limited)` returns: store-wide counters and,
//! unless `limited` is set, one [`EntryInfo`] per live entry. Both are plain
//! serde records so they can be rendered as JSON, YAML, or a status page.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use smol_str::SmolStr;

/// Store statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    /// Whether memoization is switched on for the process.
    pub enabled: bool,
    /// Label of the store.
    pub label: SmolStr,
    /// Number of independent segments the store is split into.
    pub segments: u32,
    /// Number of entries currently held.
    pub entries: u64,
    /// Successful fetches.
    pub hits: u64,
    /// Fetches that found nothing usable.
    pub misses: u64,
    /// Successful stores.
    pub inserts: u64,
    /// Approximate memory held by keys and values, in bytes.
    pub memory_size: u64,
    /// TTL applied when a function declares none.
    #[serde(with = "optional_secs")]
    pub default_ttl: Option<Duration>,
    /// Per-entry listing; `None` for limited queries.
    pub entry_list: Option<Vec<EntryInfo>>,
}

/// Metadata of one cached entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    /// Human-readable key (`Scope::name#args`).
    pub key: String,
    /// Approximate size of key and value, in bytes.
    pub size: u64,
    /// When the entry was written.
    pub created: DateTime<Utc>,
    /// When the entry expires, if ever.
    pub expire: Option<DateTime<Utc>>,
}

mod optional_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ttl) => serializer.serialize_some(&ttl.as_secs()),
            None => serializer.serialize_none(),
        }
    }
}
