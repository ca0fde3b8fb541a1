//! Backend metrics.
//!
//! Enable the `metrics` feature to record these; without it every function
//! here is an inlined no-op.
//!
//! - `memobox_backend_reads_total` - reads per backend, labelled by `result`
//!   (`hit`, `miss`, `expired`, `error`)
//! - `memobox_backend_writes_total` - writes per backend, labelled by `result`
//! - `memobox_backend_bytes_written_total` - bytes handed to the store

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track backend reads.
    pub static ref BACKEND_READS: &'static str = {
        metrics::describe_counter!(
            "memobox_backend_reads_total",
            "Total number of cache reads per backend."
        );
        "memobox_backend_reads_total"
    };
    /// Track backend writes.
    pub static ref BACKEND_WRITES: &'static str = {
        metrics::describe_counter!(
            "memobox_backend_writes_total",
            "Total number of cache writes per backend."
        );
        "memobox_backend_writes_total"
    };
    /// Track bytes written per backend.
    pub static ref BACKEND_BYTES_WRITTEN: &'static str = {
        metrics::describe_counter!(
            "memobox_backend_bytes_written_total",
            "Total bytes written to cache per backend."
        );
        "memobox_backend_bytes_written_total"
    };
}

/// Outcome of a single read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Fresh entry found.
    Hit,
    /// Nothing stored under the key.
    Miss,
    /// Entry found but past its expiry.
    Expired,
    /// Store or decoding failure.
    Error,
}

impl ReadOutcome {
    /// Returns the outcome as a metric label value.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReadOutcome::Hit => "hit",
            ReadOutcome::Miss => "miss",
            ReadOutcome::Expired => "expired",
            ReadOutcome::Error => "error",
        }
    }
}

/// Record one read.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_read(backend: &str, outcome: ReadOutcome) {
    metrics::counter!(
        *BACKEND_READS,
        "backend" => backend.to_string(),
        "result" => outcome.as_str()
    )
    .increment(1);
}

/// Record one read (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_read(_backend: &str, _outcome: ReadOutcome) {}

/// Record one write.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_write(backend: &str, bytes: u64, success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!(*BACKEND_WRITES, "backend" => backend.to_string(), "result" => result)
        .increment(1);
    if success {
        metrics::counter!(*BACKEND_BYTES_WRITTEN, "backend" => backend.to_string())
            .increment(bytes);
    }
}

/// Record one write (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_write(_backend: &str, _bytes: u64, _success: bool) {}
