//! Cache store contract for memobox.
//!
//! If you want to put memoized results somewhere other than the bundled
//! Moka store, you are in the right place: implement [`Backend`] (raw bytes
//! in, raw bytes out) and get the typed [`CacheBackend`] layer for free.
//!
//! The interceptor only ever needs two operations from a store:
//!
//! - `fetch(key, now) -> value?`
//! - `store(key, value, ttl)`
//!
//! Both are individually atomic in every bundled implementation. Nothing
//! here promises atomicity *across* a fetch and the following store.
mod backend;
mod error;
pub mod format;
pub mod info;
pub mod metrics;

pub use backend::{Backend, BackendResult, CacheBackend};
pub use error::BackendError;
pub use format::{BincodeFormat, BitcodeFormat, Format, FormatError, JsonFormat};
pub use info::{CacheInfo, EntryInfo};

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
