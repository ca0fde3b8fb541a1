//! The `@memoize` declaration marker.
//!
//! Functions opt into memoization with a marker in their documentation:
//!
//! - `@memoize` - eligible, default TTL
//! - `@memoize(<seconds>)` - eligible, TTL override for this function only
//!
//! The marker may appear anywhere in the text; the first occurrence wins.
//! A TTL of `0` means "use the default". Parsing happens once, when the
//! program's function table is loaded, not on every call.

use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    static ref MARKER: Regex = Regex::new(r"@memoize(?:\(\s*(\d+)\s*\))?")
        .unwrap_or_else(|err| panic!("invalid @memoize pattern: {err}"));
}

/// Structured form of an `@memoize` marker.
///
/// # Example
///
/// ```
/// use memobox_core::MemoizeAttribute;
/// use std::time::Duration;
///
/// let attr = MemoizeAttribute::parse("/** Slow lookup. @memoize(30) */").unwrap();
/// assert_eq!(attr.ttl, Some(Duration::from_secs(30)));
///
/// assert_eq!(MemoizeAttribute::parse("@memoize").unwrap().ttl, None);
/// assert!(MemoizeAttribute::parse("no marker here").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoizeAttribute {
    /// TTL override; `None` defers to the configured default.
    pub ttl: Option<Duration>,
}

impl MemoizeAttribute {
    /// Extracts the first `@memoize` marker from documentation text.
    pub fn parse(doc: &str) -> Option<Self> {
        let captures = MARKER.captures(doc)?;
        let ttl = captures
            .get(1)
            .and_then(|secs| secs.as_str().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Some(MemoizeAttribute { ttl })
    }
}
