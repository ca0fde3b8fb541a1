use ::bincode::config::{Configuration, standard};
use bytes::Bytes;
use memobox_core::{Raw, Value};

use super::{Format, FormatError, FormatTypeId};

const CONFIG: Configuration = standard();

/// Bincode format (default).
///
/// Compact, fast and exact for every serializable [`Value`], including
/// non-finite floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeFormat;

impl Format for BincodeFormat {
    fn serialize_args(&self, args: &[Value]) -> Result<Raw, FormatError> {
        ::bincode::serde::encode_to_vec(args, CONFIG)
            .map(Bytes::from)
            .map_err(|err| FormatError::Serialize(Box::new(err)))
    }

    fn serialize_value(&self, value: &Value) -> Result<Raw, FormatError> {
        ::bincode::serde::encode_to_vec(value, CONFIG)
            .map(Bytes::from)
            .map_err(|err| FormatError::Serialize(Box::new(err)))
    }

    fn deserialize_value(&self, data: &[u8]) -> Result<Value, FormatError> {
        ::bincode::serde::decode_from_slice(data, CONFIG)
            .map(|(value, _)| value)
            .map_err(|err| FormatError::Deserialize(Box::new(err)))
    }

    fn clone_box(&self) -> Box<dyn Format> {
        Box::new(*self)
    }

    fn format_type_id(&self) -> FormatTypeId {
        FormatTypeId::Bincode
    }
}
