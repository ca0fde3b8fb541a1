//! Error types for backend operations.

use crate::format::FormatError;
use thiserror::Error;

/// Error type for backend operations.
///
/// None of these ever reach the intercepted program: the interceptor treats
/// every variant as "no caching for this call". They surface only through
/// operator-facing calls such as `info`.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal store error: capacity, state or computation failure.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// The store could not be reached.
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// Value could not be encoded for storage or decoded from it.
    #[error(transparent)]
    FormatError(#[from] FormatError),
}

impl BackendError {
    /// `true` when the failure is the value itself refusing to serialize,
    /// as opposed to the store misbehaving.
    pub fn is_unserializable_value(&self) -> bool {
        matches!(self, BackendError::FormatError(FormatError::Serialize(_)))
    }
}
