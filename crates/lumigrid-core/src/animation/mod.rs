//! Animation patterns and the driver that paces them onto a frame sink.
//!
//! A pattern is a fixed, ordered frame sequence. The driver builds each
//! frame immediately before sending it, checks the cancel token before every
//! send, and leaves the display in a safe state (`Clear`, `Show`) whenever a
//! sequence stops early.

mod driver;
pub mod patterns;

pub use driver::{AnimationDriver, RunSummary};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::color::Color;
use crate::protocol::CodecError;
use crate::protocol::layout;

pub const DEFAULT_PIXEL_COUNT: u32 = 100;
pub const DEFAULT_CHASE_STEPS: u32 = 50;
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(50);
/// Largest strip the 16-bit index space can address.
pub const MAX_PIXEL_COUNT: u32 = layout::INDEX_SPACE as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    #[default]
    Rainbow,
    Chase,
    Solid,
}

impl Pattern {
    pub const ALL: [Pattern; 3] = [Pattern::Rainbow, Pattern::Chase, Pattern::Solid];

    pub const fn as_str(self) -> &'static str {
        match self {
            Pattern::Rainbow => "rainbow",
            Pattern::Chase => "chase",
            Pattern::Solid => "solid",
        }
    }

    /// Color used when the configuration does not override it.
    pub const fn default_color(self) -> Color {
        match self {
            Pattern::Chase => Color::GREEN,
            Pattern::Rainbow | Pattern::Solid => Color::RED,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::ALL
            .into_iter()
            .find(|pattern| pattern.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownPattern {
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown pattern '{name}' (expected rainbow, chase or solid)")]
    UnknownPattern { name: String },
    #[error("invalid pixel count {count} (expected 1..={max})", max = MAX_PIXEL_COUNT)]
    InvalidPixelCount { count: u32 },
}

/// Accept strip lengths that fit the 16-bit index space.
pub fn validate_pixel_count(count: u32) -> Result<(), ConfigError> {
    if count == 0 || count > MAX_PIXEL_COUNT {
        return Err(ConfigError::InvalidPixelCount { count });
    }
    Ok(())
}

/// Parameters of one driver run. Read-only while the run is in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    pub pattern: Pattern,
    /// Number of addressable pixels (rainbow, chase).
    pub count: u32,
    /// Chase step budget.
    pub steps: u32,
    /// Pause after each chase step.
    pub step_delay: Duration,
    /// Overrides the pattern's default color (solid, chase).
    pub color: Option<Color>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            pattern: Pattern::default(),
            count: DEFAULT_PIXEL_COUNT,
            steps: DEFAULT_CHASE_STEPS,
            step_delay: DEFAULT_STEP_DELAY,
            color: None,
        }
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pixel_count(self.count)
    }

    pub fn color(&self) -> Color {
        self.color.unwrap_or(self.pattern.default_color())
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("frame encoding failed: {0}")]
    Codec(#[from] CodecError),
}
