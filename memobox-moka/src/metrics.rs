//! Store occupancy gauges.
//!
//! Refreshed whenever [`info`](memobox_backend::Backend::info) is called on a
//! [`MokaBackend`](crate::MokaBackend). Without the `metrics` feature the
//! recorder compiles to nothing.
//!
//! | Gauge | Value |
//! |-------|-------|
//! | `memobox_moka_entries` | live entries summed over segments |
//! | `memobox_moka_size_bytes` | weighted size summed over segments |
//!
//! The `backend` label carries the store label.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    static ref ENTRIES: &'static str = {
        metrics::describe_gauge!("memobox_moka_entries", "Entries held by a memobox Moka store.");
        "memobox_moka_entries"
    };
    static ref SIZE_BYTES: &'static str = {
        metrics::describe_gauge!(
            "memobox_moka_size_bytes",
            metrics::Unit::Bytes,
            "Weighted size of a memobox Moka store."
        );
        "memobox_moka_size_bytes"
    };
}

/// Publishes the current occupancy of one store.
#[cfg(feature = "metrics")]
pub fn record_capacity(backend: &str, entries: u64, size_bytes: u64) {
    let label = backend.to_owned();
    metrics::gauge!(*ENTRIES, "backend" => label.clone()).set(entries as f64);
    metrics::gauge!(*SIZE_BYTES, "backend" => label).set(size_bytes as f64);
}

/// Publishes the current occupancy of one store.
#[cfg(not(feature = "metrics"))]
pub fn record_capacity(_backend: &str, _entries: u64, _size_bytes: u64) {}
