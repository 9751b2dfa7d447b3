//! LumiGrid control client library.
//!
//! Encodes lighting intents into the LumiGrid binary wire protocol, sends
//! them to a controller over UDP, and drives timed animation patterns
//! (solid, chase, rainbow). The transport is unordered and unacknowledged:
//! every frame is self-contained and the controller only materializes its
//! buffered pixels on `Show`.
//!
//! Layers, leaves first:
//! - `protocol`: frame layout, encoder and decoder
//! - `transport`: one datagram per frame, no retries
//! - `animation`: patterns and the pacing driver
//! - `cancel`: cancellation shared with an interrupt handler
//! - `receiver`: controller-side frame buffer, for listeners and tests
//!
//! Invariants:
//! - A frame's length field always equals its encoded payload size.
//! - Values that do not fit their wire width are rejected, never truncated.
//! - A sequence that stops early ends with exactly `Clear`, `Show`.
//!
//! Version française (résumé):
//! Client de contrôle LumiGrid : encodage binaire des commandes, envoi UDP
//! sans accusé de réception, animations cadencées. Une séquence interrompue
//! se termine toujours par `Clear` puis `Show`.
//!
//! # Examples
//! ```no_run
//! use lumigrid_core::{
//!     AnimationDriver, CancelToken, Destination, DriverConfig, Pattern, SocketMode, UdpSender,
//! };
//!
//! let sender = UdpSender::new(Destination::new("192.168.4.1", 4210), SocketMode::OneShot);
//! let config = DriverConfig {
//!     pattern: Pattern::Chase,
//!     ..DriverConfig::default()
//! };
//! let summary = AnimationDriver::new(config, sender).run(&CancelToken::new())?;
//! println!("{} frames sent", summary.frames_sent);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod animation;
pub mod cancel;
pub mod color;
pub mod protocol;
pub mod receiver;
pub mod transport;

pub use animation::{
    AnimationDriver, ConfigError, DriverConfig, DriverError, MAX_PIXEL_COUNT, Pattern, RunSummary,
};
pub use cancel::CancelToken;
pub use color::{Color, ParseColorError, hsv_to_rgb};
pub use protocol::{CodecError, Message, MessageKind, decode, encode};
pub use receiver::{Applied, FrameBuffer};
pub use transport::{
    DEFAULT_HOST, DEFAULT_PORT, Destination, FrameSink, MemorySink, SocketMode, TransportError,
    UdpSender, send,
};
