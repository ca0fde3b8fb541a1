//! Runtime configuration.
//!
//! [`MemoizeConfig`] is resolved once at startup and never changes while
//! calls are being intercepted. Every field has a default, so an empty
//! document deserializes into a working configuration:
//!
//! | Field | Default | Meaning |
//! |-------|---------|---------|
//! | `enabled` | `true` | master switch for interception |
//! | `segments` | `1` | independent store shards |
//! | `size` | `32 MiB` | total store budget |
//! | `max_entries` | `4093` | hash table sizing hint |
//! | `default_ttl` | unlimited | TTL for functions marked without one |
//! | `adaptive_ttl` | `true` | evict idle unbounded entries |

use std::time::Duration;

use bounded_integer::bounded_integer;
use bytesize::ByteSize;
use serde::{Deserialize, Serialize};

bounded_integer! {
    /// Number of store segments (1-255).
    #[repr(u8)]
    pub struct SegmentCount { 1..=255 }
}

/// Memoization settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MemoizeConfig {
    /// Whether calls are intercepted at all.
    pub enabled: bool,
    /// Number of independent store segments.
    pub segments: SegmentCount,
    /// Total store size across all segments.
    pub size: ByteSize,
    /// Expected number of entries; sizes hash tables, never limits them.
    pub max_entries: u32,
    /// TTL used when a function is marked without one (e.g. `"10m"`).
    /// Absent or zero means entries never expire on their own.
    #[serde(with = "humantime_serde")]
    pub default_ttl: Option<Duration>,
    /// Evict entries without a TTL once they go unread for a while.
    pub adaptive_ttl: bool,
}

impl Default for MemoizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            segments: SegmentCount::MIN,
            size: ByteSize::mib(32),
            max_entries: 4093,
            default_ttl: None,
            adaptive_ttl: true,
        }
    }
}

impl MemoizeConfig {
    /// Creates a new [`MemoizeConfigBuilder`].
    pub fn builder() -> MemoizeConfigBuilder {
        MemoizeConfigBuilder::default()
    }

    /// Default TTL with zero normalized to unlimited.
    pub fn fallback_ttl(&self) -> Option<Duration> {
        self.default_ttl.filter(|ttl| !ttl.is_zero())
    }
}

/// Builder for [`MemoizeConfig`].
#[derive(Debug, Clone, Default)]
pub struct MemoizeConfigBuilder {
    config: MemoizeConfig,
}

impl MemoizeConfigBuilder {
    /// Switches interception on or off.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Sets the number of store segments.
    pub fn segments(mut self, segments: SegmentCount) -> Self {
        self.config.segments = segments;
        self
    }

    /// Sets the total store size.
    pub fn size(mut self, size: ByteSize) -> Self {
        self.config.size = size;
        self
    }

    /// Sets the expected number of entries.
    pub fn max_entries(mut self, max_entries: u32) -> Self {
        self.config.max_entries = max_entries;
        self
    }

    /// Sets the default TTL. `Duration::ZERO` means unlimited.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.config.default_ttl = Some(ttl).filter(|ttl| !ttl.is_zero());
        self
    }

    /// Switches idle eviction of unbounded entries on or off.
    pub fn adaptive_ttl(mut self, adaptive: bool) -> Self {
        self.config.adaptive_ttl = adaptive;
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> MemoizeConfig {
        self.config
    }
}
