#![warn(missing_docs)]
//! # memobox-moka
//!
//! In-process shared cache store for memobox, built on
//! [Moka](https://github.com/moka-rs/moka)'s synchronous cache.
//!
//! The store is split into `segments` independent shards. Each key is routed
//! to one shard by hash and every shard receives an equal slice of the byte
//! budget, so contention on one hot shard does not stall the others.
//!
//! ```
//! use memobox_moka::MokaBackend;
//!
//! let backend = MokaBackend::builder()
//!     .max_bytes(32 * 1024 * 1024)
//!     .segments(4)
//!     .build();
//! ```

mod backend;
mod builder;
pub mod metrics;

pub use backend::MokaBackend;
pub use builder::{ByteCapacity, EntryCapacity, MokaBackendBuilder, NoCapacity};
pub use moka::policy::EvictionPolicy;
