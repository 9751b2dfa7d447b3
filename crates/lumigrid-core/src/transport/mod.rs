//! Datagram transport for encoded frames.
//!
//! The channel is connectionless, unordered and unacknowledged: a send is a
//! single best-effort transmission that never retries and never waits for a
//! reply. Frames are opaque bytes at this layer.

mod udp;

pub use udp::{SocketMode, UdpSender, send};

use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use thiserror::Error;

use crate::protocol::{CodecError, Message, decode};

/// Controller address used when none is configured (access-point mode).
pub const DEFAULT_HOST: &str = "192.168.4.1";
pub const DEFAULT_PORT: u16 = 4210;

/// Controller endpoint, fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub host: String,
    pub port: u16,
}

impl Destination {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Resolve to the first socket address the host maps to.
    pub fn resolve(&self) -> Result<SocketAddr, TransportError> {
        let mut addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|err| TransportError::Resolve {
                destination: self.to_string(),
                reason: err.to_string(),
            })?;
        addrs.next().ok_or_else(|| TransportError::Resolve {
            destination: self.to_string(),
            reason: "no addresses found".to_string(),
        })
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot resolve {destination}: {reason}")]
    Resolve { destination: String, reason: String },
    #[error("permission denied sending to {destination}")]
    PermissionDenied { destination: String },
    #[error("cannot open socket for {destination}: {source}")]
    Bind {
        destination: String,
        #[source]
        source: io::Error,
    },
    #[error("send to {destination} failed: {source}")]
    Send {
        destination: String,
        #[source]
        source: io::Error,
    },
}

/// Anything that accepts encoded frames one at a time.
pub trait FrameSink {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), TransportError>;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        (**self).send_frame(frame)
    }
}

/// Records frames in send order instead of transmitting them.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Vec<Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Vec<u8>> {
        self.frames
    }

    /// Decode every recorded frame, in order.
    pub fn messages(&self) -> Result<Vec<Message>, CodecError> {
        self.frames.iter().map(|frame| decode(frame)).collect()
    }
}

impl FrameSink for MemorySink {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.frames.push(frame.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Destination, FrameSink, MemorySink, TransportError};
    use crate::protocol::Message;

    #[test]
    fn destination_display() {
        assert_eq!(Destination::new("192.168.4.1", 4210).to_string(), "192.168.4.1:4210");
        assert_eq!(Destination::new("::1", 4210).to_string(), "[::1]:4210");
    }

    #[test]
    fn resolve_literal_address() {
        let addr = Destination::new("127.0.0.1", 4210).resolve().unwrap();
        assert_eq!(addr.port(), 4210);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn resolve_failure_names_destination() {
        let err = Destination::new("not a host name", 1).resolve().unwrap_err();
        assert!(matches!(err, TransportError::Resolve { .. }));
        assert!(err.to_string().contains("not a host name:1"));
    }

    #[test]
    fn memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.send_frame(&[0x05, 0x00, 0x00]).unwrap();
        sink.send_frame(&[0x04, 0x00, 0x00]).unwrap();
        assert_eq!(sink.frames().len(), 2);
        assert_eq!(sink.messages().unwrap(), vec![Message::Clear, Message::Show]);
    }

    #[test]
    fn boxed_sink_forwards() {
        let mut sink: Box<dyn FrameSink> = Box::new(MemorySink::new());
        assert!(sink.send_frame(&[0x04, 0x00, 0x00]).is_ok());
    }
}
