//! Frame content of each pattern, independent of pacing and transport.

use crate::color::Color;
use crate::protocol::{CodecError, Message};

/// Rainbow hue quantized to the 0..=255 hue byte, `(index * 255) / count`.
pub fn hue_byte(index: u32, count: u32) -> u32 {
    (u64::from(index) * 255 / u64::from(count.max(1))) as u32
}

/// Hue fraction fed to the HSV conversion for pixel `index`.
pub fn hue_fraction(index: u32, count: u32) -> f64 {
    f64::from(hue_byte(index, count)) / 255.0
}

pub fn rainbow_color(index: u32, count: u32) -> Color {
    Color::from_hsv(hue_fraction(index, count), 1.0, 1.0)
}

pub fn rainbow_pixel(index: u32, count: u32) -> Result<Message, CodecError> {
    let color = rainbow_color(index, count);
    Message::set_pixel(index, color.r.into(), color.g.into(), color.b.into())
}

/// Position of the moving pixel at `step`, wrapping around the strip.
pub fn chase_position(step: u32, count: u32) -> u32 {
    step % count.max(1)
}

pub fn chase_step(position: u32, color: Color) -> Result<[Message; 3], CodecError> {
    Ok([
        Message::Clear,
        Message::set_pixel(position, color.r.into(), color.g.into(), color.b.into())?,
        Message::Show,
    ])
}

pub fn solid_fill(color: Color) -> [Message; 2] {
    [Message::SetAll { color }, Message::Show]
}

/// Frames sent when a sequence stops early.
pub fn safe_state() -> [Message; 2] {
    [Message::Clear, Message::Show]
}
