//! Value formats.
//!
//! A [`Format`] turns host values into bytes and back. It is used twice per
//! memoized call: once to serialize the argument tuple for the cache key, and
//! once to serialize the return value for storage.
//!
//! Every format must be **deterministic** (same value, same bytes) and must
//! **fail** on values that cannot be represented, never substitute a
//! placeholder. Live resources and continuations are rejected by the value
//! model itself, so all serde-backed formats inherit that behavior.
//!
//! | Format | Speed | Size | Human-readable |
//! |--------|-------|------|----------------|
//! | [`BincodeFormat`] (default) | Fast | Compact | No |
//! | [`BitcodeFormat`] | Fast | Smallest | No |
//! | [`JsonFormat`] | Slow | Large | Yes |

use std::sync::Arc;

use memobox_core::{Raw, Value};
use thiserror::Error;

mod bincode;
mod bitcode;
mod json;

pub use self::bincode::BincodeFormat;
pub use self::bitcode::BitcodeFormat;
pub use self::json::JsonFormat;

/// Encoding or decoding failure.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The value could not be represented in this format.
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send + Sync>),

    /// The bytes are not a valid encoding of a value.
    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send + Sync>),
}

/// Unique identifier for format types, used to compare format equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTypeId {
    /// [`JsonFormat`].
    Json,
    /// [`BincodeFormat`].
    Bincode,
    /// [`BitcodeFormat`].
    Bitcode,
    /// For user-defined formats. The string should be a unique identifier.
    Custom(&'static str),
}

/// Object-safe value codec.
pub trait Format: std::fmt::Debug + Send + Sync {
    /// Serializes an ordered argument tuple.
    fn serialize_args(&self, args: &[Value]) -> Result<Raw, FormatError>;

    /// Serializes a single return value.
    fn serialize_value(&self, value: &Value) -> Result<Raw, FormatError>;

    /// Decodes a value previously produced by [`Format::serialize_value`].
    fn deserialize_value(&self, data: &[u8]) -> Result<Value, FormatError>;

    /// Clone this format into a box (for object safety).
    fn clone_box(&self) -> Box<dyn Format>;

    /// Identifier used to tell formats apart at runtime.
    fn format_type_id(&self) -> FormatTypeId;
}

impl Format for Arc<dyn Format> {
    fn serialize_args(&self, args: &[Value]) -> Result<Raw, FormatError> {
        (**self).serialize_args(args)
    }

    fn serialize_value(&self, value: &Value) -> Result<Raw, FormatError> {
        (**self).serialize_value(value)
    }

    fn deserialize_value(&self, data: &[u8]) -> Result<Value, FormatError> {
        (**self).deserialize_value(data)
    }

    fn clone_box(&self) -> Box<dyn Format> {
        (**self).clone_box()
    }

    fn format_type_id(&self) -> FormatTypeId {
        (**self).format_type_id()
    }
}

impl Format for Box<dyn Format> {
    fn serialize_args(&self, args: &[Value]) -> Result<Raw, FormatError> {
        (**self).serialize_args(args)
    }

    fn serialize_value(&self, value: &Value) -> Result<Raw, FormatError> {
        (**self).serialize_value(value)
    }

    fn deserialize_value(&self, data: &[u8]) -> Result<Value, FormatError> {
        (**self).deserialize_value(data)
    }

    fn clone_box(&self) -> Box<dyn Format> {
        (**self).clone_box()
    }

    fn format_type_id(&self) -> FormatTypeId {
        (**self).format_type_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memobox_core::{ResourceHandle, SmolStr};

    fn formats() -> Vec<Box<dyn Format>> {
        vec![
            Box::new(JsonFormat),
            Box::new(BincodeFormat),
            Box::new(BitcodeFormat),
        ]
    }

    #[test]
    fn every_format_rejects_nested_resources() {
        let args = vec![
            Value::Int(1),
            Value::Map(vec![(
                Value::str("fh"),
                Value::Resource(ResourceHandle {
                    id: 3,
                    kind: SmolStr::new("stream"),
                }),
            )]),
        ];
        for format in formats() {
            let err = format.serialize_args(&args).unwrap_err();
            assert!(
                matches!(err, FormatError::Serialize(_)),
                "{:?} should fail with Serialize",
                format.format_type_id()
            );
        }
    }

    #[test]
    fn every_format_is_deterministic_and_order_sensitive() {
        let a = vec![Value::Int(1), Value::str("x")];
        let b = vec![Value::str("x"), Value::Int(1)];
        for format in formats() {
            assert_eq!(
                format.serialize_args(&a).unwrap(),
                format.serialize_args(&a).unwrap()
            );
            assert_ne!(
                format.serialize_args(&a).unwrap(),
                format.serialize_args(&b).unwrap()
            );
        }
    }

    #[test]
    fn every_format_restores_return_values() {
        let value = Value::List(vec![Value::Int(-4), Value::Bytes(vec![0, 255]), Value::Null]);
        for format in formats() {
            let raw = format.serialize_value(&value).unwrap();
            assert_eq!(format.deserialize_value(&raw).unwrap(), value);
        }
    }

    #[test]
    fn json_rejects_non_finite_floats() {
        for float in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let nested = Value::Map(vec![(Value::str("x"), Value::List(vec![Value::Float(float)]))]);
            assert!(matches!(
                JsonFormat.serialize_args(&[Value::Float(float)]),
                Err(FormatError::Serialize(_))
            ));
            assert!(matches!(
                JsonFormat.serialize_value(&nested),
                Err(FormatError::Serialize(_))
            ));
        }
        assert!(JsonFormat.serialize_args(&[Value::Float(1.5)]).is_ok());
    }

    #[test]
    fn binary_formats_keep_infinities_apart() {
        for format in [Box::new(BincodeFormat) as Box<dyn Format>, Box::new(BitcodeFormat)] {
            assert_ne!(
                format.serialize_args(&[Value::Float(f64::INFINITY)]).unwrap(),
                format.serialize_args(&[Value::Float(f64::NEG_INFINITY)]).unwrap()
            );
        }
    }

    #[test]
    fn garbage_fails_to_deserialize() {
        let formats: [Box<dyn Format>; 2] = [Box::new(JsonFormat), Box::new(BincodeFormat)];
        for format in formats {
            assert!(matches!(
                format.deserialize_value(&[0xff, 0xfe, 0xfd]),
                Err(FormatError::Deserialize(_))
            ));
        }
    }
}
