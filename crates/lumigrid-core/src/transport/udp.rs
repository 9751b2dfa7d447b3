use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use log::trace;

use super::{Destination, FrameSink, TransportError};

/// Send one datagram to `destination` on a transient socket.
///
/// The socket is bound to an ephemeral port, used for a single best-effort
/// `send_to`, and released on return whatever the outcome.
pub fn send(destination: &Destination, bytes: &[u8]) -> Result<(), TransportError> {
    let open = OpenSocket::open(destination)?;
    open.transmit(destination, bytes)
}

/// Socket lifetime policy for [`UdpSender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SocketMode {
    /// Open and release a socket for every frame.
    #[default]
    OneShot,
    /// Open one socket on first use and keep it for later frames.
    Persistent,
}

/// UDP frame sink bound to one destination.
///
/// Both modes have the same per-frame semantics: one datagram, no retry,
/// no response awaited.
#[derive(Debug)]
pub struct UdpSender {
    destination: Destination,
    mode: SocketMode,
    socket: Option<OpenSocket>,
}

impl UdpSender {
    pub fn new(destination: Destination, mode: SocketMode) -> Self {
        Self {
            destination,
            mode,
            socket: None,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn mode(&self) -> SocketMode {
        self.mode
    }
}

impl FrameSink for UdpSender {
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        match self.mode {
            SocketMode::OneShot => send(&self.destination, frame),
            SocketMode::Persistent => {
                let open = match self.socket.take() {
                    Some(open) => open,
                    None => OpenSocket::open(&self.destination)?,
                };
                let result = open.transmit(&self.destination, frame);
                self.socket = Some(open);
                result
            }
        }
    }
}

#[derive(Debug)]
struct OpenSocket {
    socket: UdpSocket,
    target: SocketAddr,
}

impl OpenSocket {
    fn open(destination: &Destination) -> Result<Self, TransportError> {
        let target = destination.resolve()?;
        let local: SocketAddr = match target {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).map_err(|err| match err.kind() {
            io::ErrorKind::PermissionDenied => TransportError::PermissionDenied {
                destination: destination.to_string(),
            },
            _ => TransportError::Bind {
                destination: destination.to_string(),
                source: err,
            },
        })?;
        Ok(Self { socket, target })
    }

    fn transmit(&self, destination: &Destination, bytes: &[u8]) -> Result<(), TransportError> {
        let written = self
            .socket
            .send_to(bytes, self.target)
            .map_err(|err| match err.kind() {
                io::ErrorKind::PermissionDenied => TransportError::PermissionDenied {
                    destination: destination.to_string(),
                },
                _ => TransportError::Send {
                    destination: destination.to_string(),
                    source: err,
                },
            })?;
        if written != bytes.len() {
            return Err(TransportError::Send {
                destination: destination.to_string(),
                source: io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("short datagram: {written} of {} bytes", bytes.len()),
                ),
            });
        }
        trace!("sent {written} bytes to {}", self.target);
        Ok(())
    }
}
