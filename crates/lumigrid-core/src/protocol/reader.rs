use super::error::CodecError;
use super::layout;
use crate::color::Color;

pub struct FrameReader<'a> {
    bytes: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn require_len(&self, needed: usize) -> Result<(), CodecError> {
        if self.bytes.len() < needed {
            return Err(CodecError::TruncatedMessage {
                needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, CodecError> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(CodecError::TruncatedMessage {
                needed: offset + 1,
                actual: self.bytes.len(),
            })
    }

    pub fn read_u16_le(&self, range: std::ops::Range<usize>) -> Result<u16, CodecError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 2 {
            return Err(CodecError::TruncatedMessage {
                needed: 2,
                actual: bytes.len(),
            });
        }
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], CodecError> {
        self.bytes
            .get(range.clone())
            .ok_or(CodecError::TruncatedMessage {
                needed: range.end,
                actual: self.bytes.len(),
            })
    }

    pub fn read_color(&self, offset: usize) -> Result<Color, CodecError> {
        let bytes = self.read_slice(offset..offset + layout::COLOR_LEN)?;
        Ok(Color::new(bytes[0], bytes[1], bytes[2]))
    }

    /// Payload bytes following the header, regardless of the declared length.
    pub fn remaining_payload(&self) -> Result<&'a [u8], CodecError> {
        self.require_len(layout::HEADER_LEN)?;
        self.read_slice(layout::PAYLOAD_OFFSET..self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::FrameReader;
    use crate::color::Color;
    use crate::protocol::CodecError;

    #[test]
    fn read_u16_is_little_endian() {
        let bytes = [0x34, 0x12];
        let reader = FrameReader::new(&bytes);
        assert_eq!(reader.read_u16_le(0..2).unwrap(), 0x1234);
    }

    #[test]
    fn read_color_past_end() {
        let bytes = [1, 2];
        let reader = FrameReader::new(&bytes);
        let err = reader.read_color(0).unwrap_err();
        assert_eq!(
            err,
            CodecError::TruncatedMessage {
                needed: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn read_color_ok() {
        let bytes = [0, 9, 8, 7];
        let reader = FrameReader::new(&bytes);
        assert_eq!(reader.read_color(1).unwrap(), Color::new(9, 8, 7));
    }

    #[test]
    fn remaining_payload_requires_header() {
        let bytes = [0x04, 0x00];
        let reader = FrameReader::new(&bytes);
        assert!(matches!(
            reader.remaining_payload(),
            Err(CodecError::TruncatedMessage { needed: 3, .. })
        ));
    }
}
