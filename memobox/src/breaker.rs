//! Per-context circuit breaker.

use std::collections::HashSet;

use memobox_core::FunctionIdentity;

/// Functions whose memoization is switched off for the rest of one
/// execution context.
///
/// Starts empty, only ever grows, and is dropped with its context.
#[derive(Debug, Clone, Default)]
pub struct DisabledSet {
    disabled: HashSet<FunctionIdentity>,
}

impl DisabledSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether memoization of `identity` has been switched off.
    pub fn is_disabled(&self, identity: &FunctionIdentity) -> bool {
        self.disabled.contains(identity)
    }

    /// Switches memoization of `identity` off. Returns `false` if it already was.
    pub fn disable(&mut self, identity: FunctionIdentity) -> bool {
        self.disabled.insert(identity)
    }

    /// Number of disabled functions.
    pub fn len(&self) -> usize {
        self.disabled.len()
    }

    /// `true` while nothing has been disabled.
    pub fn is_empty(&self) -> bool {
        self.disabled.is_empty()
    }

    /// Disabled identities in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionIdentity> {
        self.disabled.iter()
    }
}
