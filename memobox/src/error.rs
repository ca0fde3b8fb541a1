//! Error types raised by memobox itself.
//!
//! None of these ever reach the intercepted program. Key failures are
//! swallowed by the interceptor, load and hook errors belong to whoever
//! embeds memobox.

use memobox_backend::FormatError;
use memobox_core::FunctionIdentity;
use thiserror::Error;

use crate::hook::HookHandle;

/// The argument tuple of a call could not be turned into a cache key.
#[derive(Debug, Error)]
#[error("arguments of {function} cannot be serialized")]
pub struct KeyError {
    /// Function whose arguments were rejected.
    pub function: FunctionIdentity,
    /// Underlying format failure.
    #[source]
    pub source: FormatError,
}

/// Loading program metadata into a [`FunctionTable`](crate::FunctionTable) failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// Two declarations share one identity.
    #[error("function {0} is declared more than once")]
    Duplicate(FunctionIdentity),

    /// A declaration overrides a function that was never declared.
    #[error("function {function} overrides undeclared {target}")]
    UnknownOverride {
        /// Overriding declaration.
        function: FunctionIdentity,
        /// Missing target.
        target: FunctionIdentity,
    },

    /// Following override links from a declaration leads back to it.
    #[error("override chain of {0} forms a cycle")]
    OverrideCycle(FunctionIdentity),
}

/// Misuse of a [`HandlerChain`](crate::HandlerChain).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HookError {
    /// Handlers must be removed in reverse installation order.
    #[error("handler {handle:?} is not the most recently installed one ({top:?} is)")]
    OutOfOrder {
        /// Handle that was passed in.
        handle: HookHandle,
        /// Handle that must be removed first.
        top: HookHandle,
    },

    /// The handle does not belong to an installed handler.
    #[error("handler {0:?} is not installed")]
    NotInstalled(HookHandle),
}
