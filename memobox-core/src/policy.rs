//! Resolved memoization policy.
//!
//! [`MemoizationPolicy`] is the outcome of eligibility resolution for one
//! call. It is recomputed on every call and never cached: the lookup behind
//! it is a walk over a short, precomputed list of metadata records.

use std::time::Duration;

/// Result of an eligibility decision.
///
/// # Example
///
/// ```
/// use memobox_core::MemoizationPolicy;
/// use std::time::Duration;
///
/// let policy = MemoizationPolicy::Memoize { ttl: Some(Duration::from_secs(5)) };
/// assert!(policy.is_eligible());
/// assert_eq!(policy.ttl(), Some(Duration::from_secs(5)));
///
/// assert!(!MemoizationPolicy::Bypass.is_eligible());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoizationPolicy {
    /// Memoize the call. `ttl` is the per-function override; `None` means
    /// the store's default TTL applies.
    Memoize {
        /// Per-function TTL override.
        ttl: Option<Duration>,
    },
    /// Execute normally and do not touch the cache.
    #[default]
    Bypass,
}

impl MemoizationPolicy {
    /// Whether the call is eligible for memoization.
    #[inline]
    pub fn is_eligible(&self) -> bool {
        matches!(self, MemoizationPolicy::Memoize { .. })
    }

    /// The per-function TTL override, if eligible and one was declared.
    #[inline]
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            MemoizationPolicy::Memoize { ttl } => *ttl,
            MemoizationPolicy::Bypass => None,
        }
    }

    /// Resolves the effective TTL, falling back to `default` when the
    /// function did not declare one.
    #[inline]
    pub fn effective_ttl(&self, default: Option<Duration>) -> Option<Duration> {
        self.ttl().or(default)
    }
}
