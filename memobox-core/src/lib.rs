#![warn(missing_docs)]
//! # memobox-core
//!
//! Core types shared by every memobox crate.
//!
//! memobox sits between an interpreter's call dispatch and a shared cache
//! store. This crate holds the vocabulary both sides agree on and nothing
//! else:
//!
//! - **Who** is being called ([`FunctionIdentity`])
//! - **With what** ([`Value`], the host value model)
//! - **Under which key** the result lives ([`CacheKey`])
//! - **Whether and for how long** to memoize ([`MemoizationPolicy`],
//!   [`MemoizeAttribute`])
//! - **How** a stored entry ages ([`CacheValue`])

pub mod attribute;
pub mod data;
pub mod identity;
pub mod key;
pub mod policy;
pub mod value;

pub use attribute::MemoizeAttribute;
pub use data::{ContinuationHandle, ResourceHandle, Value};
pub use identity::FunctionIdentity;
pub use key::CacheKey;
pub use policy::MemoizationPolicy;
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use value::{CacheState, CacheValue};

/// Raw byte data type used for serialized arguments and cached values.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
