//! Cache key construction.

use memobox_backend::Format;
use memobox_core::{CacheKey, FunctionIdentity, Value};

use crate::error::KeyError;

/// Builds the cache key for calling `identity` with `args`.
///
/// The argument tuple is serialized as a whole with `format`. Any value that
/// cannot be represented, at any nesting depth, fails the whole key; no
/// placeholder is ever substituted. Identity and argument bytes are combined
/// with length-prefixed fields, see [`CacheKey::to_bytes`].
pub fn build_key(
    format: &dyn Format,
    identity: &FunctionIdentity,
    args: &[Value],
) -> Result<CacheKey, KeyError> {
    let raw = format.serialize_args(args).map_err(|source| KeyError {
        function: identity.clone(),
        source,
    })?;
    Ok(CacheKey::new(identity.clone(), raw))
}
