use super::error::CodecError;
use super::layout;
use super::message::{Message, MessageKind, check_range};
use super::reader::FrameReader;

/// Fixed three-byte frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: u8,
    pub length: u16,
}

pub fn parse_header(frame: &[u8]) -> Result<Header, CodecError> {
    let reader = FrameReader::new(frame);
    reader.require_len(layout::HEADER_LEN)?;
    Ok(Header {
        tag: reader.read_u8(layout::TYPE_OFFSET)?,
        length: reader.read_u16_le(layout::LENGTH_RANGE.clone())?,
    })
}

/// Decode exactly one frame.
///
/// The payload size is taken from the header's length field only and must
/// match the bytes that follow the header.
pub fn decode(frame: &[u8]) -> Result<Message, CodecError> {
    let header = parse_header(frame)?;
    let reader = FrameReader::new(frame);
    let payload = reader.remaining_payload()?;

    let declared = header.length as usize;
    if declared > payload.len() {
        return Err(CodecError::TruncatedMessage {
            needed: layout::HEADER_LEN + declared,
            actual: frame.len(),
        });
    }
    if declared < payload.len() {
        return Err(CodecError::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }

    let kind = MessageKind::try_from(header.tag)?;
    let payload = FrameReader::new(payload);
    match kind {
        MessageKind::SetPixel => {
            require_payload_len(kind, declared, layout::SET_PIXEL_LEN)?;
            Ok(Message::SetPixel {
                index: payload.read_u16_le(layout::SET_PIXEL_INDEX_RANGE.clone())?,
                color: payload.read_color(layout::SET_PIXEL_COLOR_OFFSET)?,
            })
        }
        MessageKind::SetAll => {
            require_payload_len(kind, declared, layout::SET_ALL_LEN)?;
            Ok(Message::SetAll {
                color: payload.read_color(layout::SET_ALL_COLOR_OFFSET)?,
            })
        }
        MessageKind::Show => {
            require_payload_len(kind, declared, 0)?;
            Ok(Message::Show)
        }
        MessageKind::Clear => {
            require_payload_len(kind, declared, 0)?;
            Ok(Message::Clear)
        }
        MessageKind::SetRange => decode_set_range(&payload),
    }
}

fn decode_set_range(payload: &FrameReader<'_>) -> Result<Message, CodecError> {
    if payload.len() < layout::SET_RANGE_FIXED_LEN {
        return Err(CodecError::InvalidPayloadLength {
            kind: MessageKind::SetRange,
            expected: layout::SET_RANGE_FIXED_LEN,
            actual: payload.len(),
        });
    }
    let start = payload.read_u16_le(layout::SET_RANGE_START_RANGE.clone())?;
    let count = payload.read_u16_le(layout::SET_RANGE_COUNT_RANGE.clone())? as usize;
    require_payload_len(
        MessageKind::SetRange,
        payload.len(),
        layout::set_range_len(count),
    )?;
    check_range(start, count)?;

    let colors = (0..count)
        .map(|i| payload.read_color(layout::SET_RANGE_COLORS_OFFSET + i * layout::COLOR_LEN))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Message::SetRange { start, colors })
}

fn require_payload_len(
    kind: MessageKind,
    actual: usize,
    expected: usize,
) -> Result<(), CodecError> {
    if actual != expected {
        return Err(CodecError::InvalidPayloadLength {
            kind,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Header, decode, parse_header};
    use crate::color::Color;
    use crate::protocol::{CodecError, Message, MessageKind};

    #[test]
    fn parse_header_fields() {
        let header = parse_header(&[0x01, 0x05, 0x00, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(
            header,
            Header {
                tag: 0x01,
                length: 5
            }
        );
    }

    #[test]
    fn decode_set_pixel() {
        let frame = [0x01, 0x05, 0x00, 0x2a, 0x01, 10, 20, 30];
        let msg = decode(&frame).unwrap();
        assert_eq!(
            msg,
            Message::SetPixel {
                index: 0x012a,
                color: Color::new(10, 20, 30)
            }
        );
    }

    #[test]
    fn decode_show_and_clear() {
        assert_eq!(decode(&[0x04, 0x00, 0x00]).unwrap(), Message::Show);
        assert_eq!(decode(&[0x05, 0x00, 0x00]).unwrap(), Message::Clear);
    }

    #[test]
    fn decode_short_header() {
        let err = decode(&[0x01, 0x05]).unwrap_err();
        assert_eq!(
            err,
            CodecError::TruncatedMessage {
                needed: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn decode_truncated_payload() {
        let err = decode(&[0x01, 0x05, 0x00, 1, 0, 255]).unwrap_err();
        assert_eq!(
            err,
            CodecError::TruncatedMessage {
                needed: 8,
                actual: 6
            }
        );
    }

    #[test]
    fn decode_trailing_bytes() {
        let err = decode(&[0x04, 0x00, 0x00, 0xff]).unwrap_err();
        assert_eq!(
            err,
            CodecError::LengthMismatch {
                declared: 0,
                actual: 1
            }
        );
    }

    #[test]
    fn decode_unknown_type() {
        let err = decode(&[0x06, 0x00, 0x00]).unwrap_err();
        assert_eq!(err, CodecError::UnknownMessageType { tag: 0x06 });
        assert!(err.to_string().contains("0x06"));
    }

    #[test]
    fn decode_wrong_arity() {
        let err = decode(&[0x03, 0x02, 0x00, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidPayloadLength {
                kind: MessageKind::SetAll,
                expected: 3,
                actual: 2
            }
        );
        let err = decode(&[0x04, 0x01, 0x00, 0]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidPayloadLength { kind: MessageKind::Show, .. }
        ));
    }

    #[test]
    fn decode_set_range() {
        let frame = [0x02, 0x0a, 0x00, 0x03, 0x00, 0x02, 0x00, 1, 2, 3, 4, 5, 6];
        let msg = decode(&frame).unwrap();
        assert_eq!(
            msg,
            Message::SetRange {
                start: 3,
                colors: vec![Color::new(1, 2, 3), Color::new(4, 5, 6)]
            }
        );
    }

    #[test]
    fn decode_set_range_count_disagrees_with_length() {
        // count says 3 colors, payload carries 2
        let frame = [0x02, 0x0a, 0x00, 0x00, 0x00, 0x03, 0x00, 1, 2, 3, 4, 5, 6];
        let err = decode(&frame).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidPayloadLength {
                kind: MessageKind::SetRange,
                expected: 13,
                actual: 10
            }
        );
    }

    #[test]
    fn decode_set_range_without_fixed_fields() {
        let err = decode(&[0x02, 0x02, 0x00, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidPayloadLength { expected: 4, actual: 2, .. }
        ));
    }

    #[test]
    fn decode_set_range_past_index_space() {
        let frame = [0x02, 0x0a, 0x00, 0xff, 0xff, 0x02, 0x00, 1, 2, 3, 4, 5, 6];
        let err = decode(&frame).unwrap_err();
        assert_eq!(
            err,
            CodecError::ValueOutOfRange {
                field: "range end",
                value: 65537,
                max: 65536
            }
        );
    }

    #[test]
    fn decode_set_range_ending_at_last_index() {
        let frame = [0x02, 0x07, 0x00, 0xff, 0xff, 0x01, 0x00, 7, 8, 9];
        let msg = decode(&frame).unwrap();
        assert_eq!(crate::protocol::encode(&msg).unwrap(), frame);
    }
}
