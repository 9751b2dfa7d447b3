use std::io::{self, Write};

use lumigrid_core::{FrameSink, Message, MessageKind, TransportError, decode};
use serde::Serialize;

/// One frame as printed by `play --dry-run` and `decode`.
#[derive(Debug, Serialize)]
pub struct FrameRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    pub bytes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FrameRecord {
    pub fn new(seq: Option<u64>, frame: &[u8]) -> Self {
        let (message, error) = match decode(frame) {
            Ok(message) => (Some(message), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            seq,
            kind: message.as_ref().map(Message::kind),
            bytes: to_hex(frame),
            message,
            error,
        }
    }
}

/// One datagram as printed by `listen --json`.
#[derive(Debug, Serialize)]
pub struct ReceivedRecord<'a> {
    pub received_at: String,
    pub from: String,
    pub bytes: String,
    pub message: &'a Message,
    pub shows: u64,
}

/// Frame sink that prints every frame as a JSON line instead of sending it.
pub struct JsonLinesSink<W> {
    out: W,
    seq: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, seq: 0 }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, frame: &[u8]) -> io::Result<()> {
        let record = FrameRecord::new(Some(self.seq), frame);
        serde_json::to_writer(&mut self.out, &record)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> FrameSink for JsonLinesSink<W> {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.write_record(frame)
            .map_err(|source| TransportError::Send {
                destination: "stdout".to_string(),
                source,
            })?;
        self.seq += 1;
        Ok(())
    }
}

/// Short human-readable form of a message for `listen` output.
pub fn describe(message: &Message) -> String {
    match message {
        Message::SetPixel { index, color } => format!("set_pixel index={index} color={color}"),
        Message::SetRange { start, colors } => {
            format!("set_range start={start} count={}", colors.len())
        }
        Message::SetAll { color } => format!("set_all color={color}"),
        Message::Show => "show".to_string(),
        Message::Clear => "clear".to_string(),
    }
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Parse a hex string, ignoring whitespace and an optional `0x` prefix.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, String> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);
    if digits.is_empty() {
        return Err("empty hex input".to_string());
    }
    if !digits.is_ascii() || digits.len() % 2 != 0 {
        return Err(format!("invalid hex input '{}'", input.trim()));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| format!("invalid hex byte '{}'", &digits[i..i + 2]))
        })
        .collect()
}
