//! Cache key type.
//!
//! A [`CacheKey`] combines a [`FunctionIdentity`] with the serialized
//! argument tuple of one invocation. Keys compare structurally, so two keys
//! are equal exactly when the identities are equal and the argument bytes are
//! byte-identical.
//!
//! ## Byte layout
//!
//! Stores that need a flat byte key use [`CacheKey::to_bytes`], which writes
//! each textual component as a netstring (`<len>:<bytes>,`) and marks an
//! absent scope with a lone `-,`:
//!
//! ```text
//! [scope netstring | "-,"] name-netstring argument-bytes
//! ```
//!
//! Every component is length-prefixed and terminated, so no pair of
//! `(scope, name)` values can run into each other:
//!
//! ```
//! use memobox_core::{CacheKey, FunctionIdentity, Raw};
//!
//! let args = Raw::from_static(b"x");
//! let ab_c = CacheKey::new(FunctionIdentity::method("AB", "C"), args.clone());
//! let a_bc = CacheKey::new(FunctionIdentity::method("A", "BC"), args);
//!
//! assert_ne!(ab_c, a_bc);
//! assert_ne!(ab_c.to_bytes(), a_bc.to_bytes());
//! assert_eq!(&ab_c.to_bytes()[..], b"2:AB,1:C,x");
//! ```
//!
//! ## Performance
//!
//! [`CacheKey`] uses `Arc` internally for cheap cloning; the interceptor
//! hands the same key to the cache on both fetch and store.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::sync::Arc;

use crate::Raw;
use crate::identity::FunctionIdentity;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct CacheKeyInner {
    identity: FunctionIdentity,
    args: Raw,
}

/// Key of one memoized invocation.
#[derive(Clone, Debug)]
pub struct CacheKey {
    inner: Arc<CacheKeyInner>,
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl CacheKey {
    /// Creates a key from a function identity and serialized arguments.
    pub fn new(identity: FunctionIdentity, args: Raw) -> Self {
        CacheKey {
            inner: Arc::new(CacheKeyInner { identity, args }),
        }
    }

    /// Returns the function identity part of the key.
    pub fn identity(&self) -> &FunctionIdentity {
        &self.inner.identity
    }

    /// Returns the serialized argument bytes.
    pub fn args(&self) -> &Raw {
        &self.inner.args
    }

    /// Flattens the key into its delimited byte form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let identity = &self.inner.identity;
        let mut out = Vec::with_capacity(self.inner.args.len() + identity.name().len() + 16);
        match identity.scope() {
            Some(scope) => write_netstring(&mut out, scope.as_bytes()),
            None => out.extend_from_slice(b"-,"),
        }
        write_netstring(&mut out, identity.name().as_bytes());
        out.extend_from_slice(&self.inner.args);
        out
    }

    /// Returns the estimated memory usage of this cache key in bytes.
    pub fn memory_size(&self) -> usize {
        use std::mem::size_of;

        // strong + weak counters, then the inner struct itself
        let arc_overhead = 2 * size_of::<usize>() + size_of::<CacheKeyInner>();
        let identity = &self.inner.identity;
        // SmolStr keeps up to 23 bytes inline
        let heap = |len: usize| len.saturating_sub(23);
        let strings = heap(identity.name().len()) + identity.scope().map_or(0, |s| heap(s.len()));

        arc_overhead + strings + self.inner.args.len()
    }
}

fn write_netstring(out: &mut Vec<u8>, bytes: &[u8]) {
    // Writing into a Vec cannot fail.
    let _ = write!(out, "{}:", bytes.len());
    out.extend_from_slice(bytes);
    out.push(b',');
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#", self.inner.identity)?;
        for byte in self.inner.args.iter().take(16) {
            write!(f, "{:02x}", byte)?;
        }
        if self.inner.args.len() > 16 {
            f.write_str("..")?;
        }
        Ok(())
    }
}
