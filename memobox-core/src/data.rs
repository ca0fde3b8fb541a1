//! Host value model.
//!
//! [`Value`] is what the interpreter passes as arguments and gets back as
//! return values. Most variants are plain data and serialize
//! deterministically. Two variants are live runtime objects that cannot be
//! represented as bytes:
//!
//! - [`Value::Resource`] - an open handle (file, socket, connection)
//! - [`Value::Continuation`] - a suspended generator or fiber
//!
//! Both are skipped by serde, so any attempt to serialize them, however
//! deeply nested, fails with a serializer error instead of producing a
//! placeholder.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Opaque handle to a live host resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    /// Host-assigned resource id.
    pub id: u64,
    /// Resource kind, e.g. `"stream"`.
    pub kind: SmolStr,
}

/// Opaque handle to a suspended continuation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationHandle {
    /// Host-assigned continuation id.
    pub id: u64,
}

/// A value as seen by the interpreter.
///
/// `Map` keeps insertion order; two maps with the same pairs in a different
/// order serialize differently and therefore produce different cache keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    Str(SmolStr),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Ordered list.
    List(Vec<Value>),
    /// Insertion-ordered associative array.
    Map(Vec<(Value, Value)>),
    /// Live resource handle. Never serializable.
    #[serde(skip)]
    Resource(ResourceHandle),
    /// Suspended continuation. Never serializable.
    #[serde(skip)]
    Continuation(ContinuationHandle),
}

impl Value {
    /// Convenience constructor for string values.
    pub fn str(s: impl Into<SmolStr>) -> Self {
        Value::Str(s.into())
    }

    /// Returns `true` if this value, or anything nested in it, is a live
    /// runtime object that cannot be serialized.
    pub fn contains_live_object(&self) -> bool {
        match self {
            Value::Resource(_) | Value::Continuation(_) => true,
            Value::List(items) => items.iter().any(Value::contains_live_object),
            Value::Map(pairs) => pairs
                .iter()
                .any(|(k, v)| k.contains_live_object() || v.contains_live_object()),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(SmolStr::new(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}
