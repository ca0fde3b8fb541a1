use bytes::Bytes;
use memobox_core::{Raw, Value};

use super::{Format, FormatError, FormatTypeId};

/// Bitcode format.
///
/// Smallest encoding of the bundled formats, at a similar speed to bincode.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitcodeFormat;

impl Format for BitcodeFormat {
    fn serialize_args(&self, args: &[Value]) -> Result<Raw, FormatError> {
        ::bitcode::serialize(args)
            .map(Bytes::from)
            .map_err(|err| FormatError::Serialize(Box::new(err)))
    }

    fn serialize_value(&self, value: &Value) -> Result<Raw, FormatError> {
        ::bitcode::serialize(value)
            .map(Bytes::from)
            .map_err(|err| FormatError::Serialize(Box::new(err)))
    }

    fn deserialize_value(&self, data: &[u8]) -> Result<Value, FormatError> {
        ::bitcode::deserialize(data).map_err(|err| FormatError::Deserialize(Box::new(err)))
    }

    fn clone_box(&self) -> Box<dyn Format> {
        Box::new(*self)
    }

    fn format_type_id(&self) -> FormatTypeId {
        FormatTypeId::Bitcode
    }
}
