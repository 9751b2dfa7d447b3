use super::error::CodecError;
use super::layout;
use super::message::{Message, check_range};
use crate::color::Color;

/// Encode one message into a fresh frame.
///
/// # Examples
/// ```
/// use lumigrid_core::protocol::{Message, encode};
///
/// let frame = encode(&Message::set_all(255, 0, 0)?)?;
/// assert_eq!(frame, vec![0x03, 0x03, 0x00, 0xff, 0x00, 0x00]);
/// # Ok::<(), lumigrid_core::protocol::CodecError>(())
/// ```
pub fn encode(message: &Message) -> Result<Vec<u8>, CodecError> {
    let mut frame = Vec::new();
    encode_into(message, &mut frame)?;
    Ok(frame)
}

/// Append one encoded frame to `out`.
///
/// On error nothing is written to `out`.
pub fn encode_into(message: &Message, out: &mut Vec<u8>) -> Result<(), CodecError> {
    let payload = encode_payload(message)?;
    let length = u16::try_from(payload.len()).map_err(|_| {
        CodecError::out_of_range(
            "payload length",
            payload.len() as u64,
            layout::MAX_PAYLOAD_LEN as u64,
        )
    })?;

    out.reserve(layout::HEADER_LEN + payload.len());
    out.push(message.kind().tag());
    out.extend_from_slice(&length.to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(())
}

fn encode_payload(message: &Message) -> Result<Vec<u8>, CodecError> {
    let mut payload = Vec::new();
    match message {
        Message::SetPixel { index, color } => {
            payload.extend_from_slice(&index.to_le_bytes());
            push_color(&mut payload, *color);
        }
        Message::SetRange { start, colors } => {
            check_range(*start, colors.len())?;
            let count = colors.len() as u16;
            payload.reserve(layout::set_range_len(colors.len()));
            payload.extend_from_slice(&start.to_le_bytes());
            payload.extend_from_slice(&count.to_le_bytes());
            for color in colors {
                push_color(&mut payload, *color);
            }
        }
        Message::SetAll { color } => push_color(&mut payload, *color),
        Message::Show | Message::Clear => {}
    }
    Ok(payload)
}

fn push_color(payload: &mut Vec<u8>, color: Color) {
    payload.extend_from_slice(&[color.r, color.g, color.b]);
}
