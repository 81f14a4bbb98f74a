//! Frame transports: an open serial port or a one-shot UDP datagram.

use std::io::Write;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Mutex;
use std::time::Duration;

use serialport::SerialPort;
use tracing::trace;

use crate::error::{GlowError, Result};

/// Baud rate WLED uses for Adalight over USB.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Write timeout for a single serial frame.
pub const SERIAL_WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Sends encoded frames to a physical device.
pub trait Transport: Send + Sync {
    /// Sends one frame. Failures are reported, never retried.
    fn send(&self, frame: &[u8]) -> Result<()>;

    /// Human-readable destination for logs.
    fn target(&self) -> String;
}

/// Serial connection opened once per session.
pub struct SerialTransport {
    port: Mutex<Box<dyn SerialPort>>,
    path: String,
}

impl SerialTransport {
    /// Opens `path` at `baud_rate`.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(SERIAL_WRITE_TIMEOUT)
            .open()
            .map_err(|e| GlowError::DeviceOpenFailed {
                address: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::from_port(port, path))
    }

    /// Wraps an already-open port.
    pub fn from_port(port: Box<dyn SerialPort>, path: &str) -> Self {
        Self {
            port: Mutex::new(port),
            path: path.to_string(),
        }
    }
}

impl Transport for SerialTransport {
    fn send(&self, frame: &[u8]) -> Result<()> {
        let mut port = self
            .port
            .lock()
            .map_err(|_| GlowError::SerialWrite("serial port lock poisoned".to_string()))?;
        port.write_all(frame)
            .and_then(|()| port.flush())
            .map_err(|e| GlowError::SerialWrite(format!("{}: {e}", self.path)))?;
        trace!(bytes = frame.len(), port = %self.path, "Serial frame written");
        Ok(())
    }

    fn target(&self) -> String {
        self.path.clone()
    }
}

/// Connectionless UDP sender; a fresh socket is bound for every frame.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    target: SocketAddr,
}

impl UdpTransport {
    pub const fn new(target: SocketAddr) -> Self {
        Self { target }
    }

    /// Resolves `host` and targets it on `port`.
    pub fn resolve(host: &str, port: u16) -> Result<Self> {
        let target = (host, port)
            .to_socket_addrs()
            .map_err(|e| GlowError::DeviceUnreachable {
                address: format!("{host}: {e}"),
            })?
            .find(SocketAddr::is_ipv4)
            .ok_or_else(|| GlowError::DeviceUnreachable {
                address: host.to_string(),
            })?;
        Ok(Self::new(target))
    }

    pub const fn addr(&self) -> SocketAddr {
        self.target
    }
}

impl Transport for UdpTransport {
    fn send(&self, frame: &[u8]) -> Result<()> {
        let err = |e: std::io::Error| GlowError::UdpSend {
            target: self.target.to_string(),
            reason: e.to_string(),
        };
        let socket = UdpSocket::bind(("0.0.0.0", 0)).map_err(err)?;
        socket.send_to(frame, self.target).map_err(err)?;
        trace!(bytes = frame.len(), target = %self.target, "UDP frame sent");
        Ok(())
    }

    fn target(&self) -> String {
        self.target.to_string()
    }
}
