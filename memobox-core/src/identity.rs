//! Function identity.
//!
//! A [`FunctionIdentity`] names a callable the way the loaded program does:
//! an optional enclosing scope (a class, a module) plus a local name.

use smol_str::SmolStr;
use std::fmt;

/// Immutable identifier of a callable.
///
/// Two identities are equal iff both the scope and the local name match
/// exactly. A free function has no scope, which is distinct from a scope
/// that happens to be the empty string.
///
/// # Example
///
/// ```
/// use memobox_core::FunctionIdentity;
///
/// let method = FunctionIdentity::method("Geometry", "area");
/// let free = FunctionIdentity::function("area");
///
/// assert_ne!(method, free);
/// assert_eq!(method.to_string(), "Geometry::area");
/// assert_eq!(free.to_string(), "area");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct FunctionIdentity {
    scope: Option<SmolStr>,
    name: SmolStr,
}

impl FunctionIdentity {
    /// Creates an identity from an optional scope and a local name.
    pub fn new(scope: Option<impl Into<SmolStr>>, name: impl Into<SmolStr>) -> Self {
        FunctionIdentity {
            scope: scope.map(Into::into),
            name: name.into(),
        }
    }

    /// Identity of a free function.
    pub fn function(name: impl Into<SmolStr>) -> Self {
        FunctionIdentity {
            scope: None,
            name: name.into(),
        }
    }

    /// Identity of a function declared inside `scope`.
    pub fn method(scope: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        FunctionIdentity {
            scope: Some(scope.into()),
            name: name.into(),
        }
    }

    /// Returns the enclosing scope name, if any.
    #[inline]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Returns the local name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FunctionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}::{}", scope, self.name),
            None => f.write_str(&self.name),
        }
    }
}
