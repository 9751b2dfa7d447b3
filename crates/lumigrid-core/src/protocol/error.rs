use thiserror::Error;

use super::message::MessageKind;

/// Errors returned by LumiGrid frame encoding and decoding.
///
/// # Examples
/// ```
/// use lumigrid_core::protocol::{CodecError, decode};
///
/// let err = decode(&[0x04]).unwrap_err();
/// assert!(matches!(err, CodecError::TruncatedMessage { .. }));
/// assert!(err.to_string().contains("truncated message"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("value out of range: {field} = {value} (max {max})")]
    ValueOutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },
    #[error("truncated message: need {needed} bytes, got {actual}")]
    TruncatedMessage { needed: usize, actual: usize },
    #[error("unknown message type: 0x{tag:02x}")]
    UnknownMessageType { tag: u8 },
    #[error("length mismatch: header declares {declared} payload bytes, frame carries {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("invalid {kind} payload length: expected {expected}, got {actual}")]
    InvalidPayloadLength {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },
}

impl CodecError {
    pub(crate) fn out_of_range(field: &'static str, value: u64, max: u64) -> Self {
        CodecError::ValueOutOfRange { field, value, max }
    }
}
