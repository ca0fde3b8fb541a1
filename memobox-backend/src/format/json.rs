use bytes::Bytes;
use memobox_core::{Raw, Value};
use thiserror::Error;

use super::{Format, FormatError, FormatTypeId};

/// A float JSON cannot carry. serde_json would write it as `null`.
#[derive(Debug, Error)]
#[error("non-finite float {0} has no JSON representation")]
struct NonFiniteFloat(f64);

fn ensure_finite(value: &Value) -> Result<(), FormatError> {
    match value {
        Value::Float(f) if !f.is_finite() => Err(FormatError::Serialize(Box::new(NonFiniteFloat(*f)))),
        Value::List(items) => items.iter().try_for_each(ensure_finite),
        Value::Map(pairs) => pairs.iter().try_for_each(|(k, v)| {
            ensure_finite(k)?;
            ensure_finite(v)
        }),
        _ => Ok(()),
    }
}

/// JSON format.
///
/// Human-readable and handy when inspecting a store by hand. Values holding
/// NaN or an infinity are rejected like any other unserializable value.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn serialize_args(&self, args: &[Value]) -> Result<Raw, FormatError> {
        args.iter().try_for_each(ensure_finite)?;
        serde_json::to_vec(args)
            .map(Bytes::from)
            .map_err(|err| FormatError::Serialize(Box::new(err)))
    }

    fn serialize_value(&self, value: &Value) -> Result<Raw, FormatError> {
        ensure_finite(value)?;
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|err| FormatError::Serialize(Box::new(err)))
    }

    fn deserialize_value(&self, data: &[u8]) -> Result<Value, FormatError> {
        serde_json::from_slice(data).map_err(|err| FormatError::Deserialize(Box::new(err)))
    }

    fn clone_box(&self) -> Box<dyn Format> {
        Box::new(*self)
    }

    fn format_type_id(&self) -> FormatTypeId {
        FormatTypeId::Json
    }
}
