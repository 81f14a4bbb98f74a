//! Local UDP receiver for frame tests.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

pub struct FrameReceiver {
    socket: UdpSocket,
}

impl FrameReceiver {
    pub fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("bind receiver");
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("set read timeout");
        Self { socket }
    }

    pub fn addr(&self) -> SocketAddr {
        self.socket.local_addr().expect("receiver address")
    }

    /// Blocks until one datagram arrives.
    pub fn recv(&self) -> Vec<u8> {
        let mut buf = [0u8; 2048];
        let (len, _) = self.socket.recv_from(&mut buf).expect("frame within timeout");
        buf[..len].to_vec()
    }
}
