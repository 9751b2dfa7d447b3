//! RGB colors and the HSV helper used by the rainbow pattern.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::protocol::CodecError;
use crate::protocol::layout;

/// 8-bit RGB triple, no alpha, no gamma correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from wider integers, rejecting channels above 255.
    pub fn try_from_channels(r: u32, g: u32, b: u32) -> Result<Self, CodecError> {
        Ok(Self {
            r: checked_channel("red", r)?,
            g: checked_channel("green", g)?,
            b: checked_channel("blue", b)?,
        })
    }

    /// Scale unit-interval channels to 0..=255, truncating toward zero.
    pub fn from_unit_rgb((r, g, b): (f64, f64, f64)) -> Self {
        Self {
            r: scale_unit(r),
            g: scale_unit(g),
            b: scale_unit(b),
        }
    }

    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        Self::from_unit_rgb(hsv_to_rgb(hue, saturation, value))
    }
}

fn checked_channel(field: &'static str, value: u32) -> Result<u8, CodecError> {
    u8::try_from(value)
        .map_err(|_| CodecError::out_of_range(field, value.into(), layout::MAX_CHANNEL.into()))
}

fn scale_unit(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0) as u8
}

/// Convert HSV to RGB, all components in `[0, 1]`.
///
/// Six-sector piecewise definition: the sector is `floor(hue * 6) mod 6` and
/// the fractional remainder interpolates between neighbouring primaries.
/// A saturation of zero yields a grey of the given value.
///
/// # Examples
/// ```
/// use lumigrid_core::hsv_to_rgb;
///
/// assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (1.0, 0.0, 0.0));
/// assert_eq!(hsv_to_rgb(0.0, 0.0, 0.5), (0.5, 0.5, 0.5));
/// ```
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (f64, f64, f64) {
    if saturation == 0.0 {
        return (value, value, value);
    }

    let scaled = hue * 6.0;
    let sector = scaled.floor();
    let fraction = scaled - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * fraction);
    let t = value * (1.0 - saturation * (1.0 - fraction));

    match (sector as i64).rem_euclid(6) {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("invalid color '{input}': expected R,G,B or #RRGGBB")]
    Format { input: String },
    #[error("invalid color '{input}': {source}")]
    Channel {
        input: String,
        #[source]
        source: CodecError,
    },
}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts `R,G,B` (decimal) or `#RRGGBB` (hex).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let format_err = || ParseColorError::Format {
            input: input.to_string(),
        };

        if let Some(hex) = input.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(format_err());
            }
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&hex[range], 16).map_err(|_| format_err())
            };
            return Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?));
        }

        let parts = input
            .split(',')
            .map(|part| part.trim().parse::<u32>().map_err(|_| format_err()))
            .collect::<Result<Vec<_>, _>>()?;
        let [r, g, b] = parts.as_slice() else {
            return Err(format_err());
        };
        Color::try_from_channels(*r, *g, *b).map_err(|source| ParseColorError::Channel {
            input: input.to_string(),
            source,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}
