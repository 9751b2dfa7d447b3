use std::fmt;

use serde::Serialize;

use super::error::CodecError;
use super::layout;
use crate::color::Color;

/// Message type tag carried in the first header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    SetPixel,
    SetRange,
    SetAll,
    Show,
    Clear,
}

impl MessageKind {
    pub const fn tag(self) -> u8 {
        match self {
            MessageKind::SetPixel => layout::TAG_SET_PIXEL,
            MessageKind::SetRange => layout::TAG_SET_RANGE,
            MessageKind::SetAll => layout::TAG_SET_ALL,
            MessageKind::Show => layout::TAG_SHOW,
            MessageKind::Clear => layout::TAG_CLEAR,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            MessageKind::SetPixel => "set_pixel",
            MessageKind::SetRange => "set_range",
            MessageKind::SetAll => "set_all",
            MessageKind::Show => "show",
            MessageKind::Clear => "clear",
        }
    }
}

impl TryFrom<u8> for MessageKind {
    type Error = CodecError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            layout::TAG_SET_PIXEL => Ok(MessageKind::SetPixel),
            layout::TAG_SET_RANGE => Ok(MessageKind::SetRange),
            layout::TAG_SET_ALL => Ok(MessageKind::SetAll),
            layout::TAG_SHOW => Ok(MessageKind::Show),
            layout::TAG_CLEAR => Ok(MessageKind::Clear),
            tag => Err(CodecError::UnknownMessageType { tag }),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lighting intent, one frame on the wire.
///
/// Fields are plain wire-width integers, so a constructed message is always
/// encodable except for an oversized `SetRange`. Use the checked
/// constructors when starting from wider integers.
///
/// # Examples
/// ```
/// use lumigrid_core::protocol::{CodecError, Message};
///
/// let msg = Message::set_pixel(7, 0, 255, 0)?;
/// assert_eq!(msg.kind().tag(), 0x01);
///
/// let err = Message::set_pixel(70_000, 0, 0, 0).unwrap_err();
/// assert!(matches!(err, CodecError::ValueOutOfRange { field: "index", .. }));
/// # Ok::<(), CodecError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    SetPixel { index: u16, color: Color },
    SetRange { start: u16, colors: Vec<Color> },
    SetAll { color: Color },
    Show,
    Clear,
}

impl Message {
    pub fn set_pixel(index: u32, r: u32, g: u32, b: u32) -> Result<Self, CodecError> {
        Ok(Message::SetPixel {
            index: checked_index(index)?,
            color: Color::try_from_channels(r, g, b)?,
        })
    }

    pub fn set_all(r: u32, g: u32, b: u32) -> Result<Self, CodecError> {
        Ok(Message::SetAll {
            color: Color::try_from_channels(r, g, b)?,
        })
    }

    /// Contiguous run of colors starting at `start`.
    ///
    /// The run must fit in both the 16-bit index space and a single frame.
    pub fn set_range(start: u32, colors: Vec<Color>) -> Result<Self, CodecError> {
        let start = checked_index(start)?;
        check_range(start, colors.len())?;
        Ok(Message::SetRange { start, colors })
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::SetPixel { .. } => MessageKind::SetPixel,
            Message::SetRange { .. } => MessageKind::SetRange,
            Message::SetAll { .. } => MessageKind::SetAll,
            Message::Show => MessageKind::Show,
            Message::Clear => MessageKind::Clear,
        }
    }
}

pub(crate) fn checked_index(index: u32) -> Result<u16, CodecError> {
    u16::try_from(index)
        .map_err(|_| CodecError::out_of_range("index", index.into(), layout::MAX_INDEX.into()))
}

pub(crate) fn check_range(start: u16, count: usize) -> Result<(), CodecError> {
    if count > layout::SET_RANGE_MAX_COUNT {
        return Err(CodecError::out_of_range(
            "range count",
            count as u64,
            layout::SET_RANGE_MAX_COUNT as u64,
        ));
    }
    let end = start as usize + count;
    if end > layout::INDEX_SPACE {
        return Err(CodecError::out_of_range(
            "range end",
            end as u64,
            layout::INDEX_SPACE as u64,
        ));
    }
    Ok(())
}
