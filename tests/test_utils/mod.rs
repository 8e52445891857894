//! Collector fixtures shared by the integration tests.

use std::{net::UdpSocket, time::Duration};

use rstest::fixture;

/// A UDP syslog collector bound to an ephemeral loopback port.
pub struct UdpCollector {
    socket: UdpSocket,
}

impl UdpCollector {
    pub fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("bind collector");
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("set read timeout");
        Self { socket }
    }

    pub fn address(&self) -> String {
        self.socket
            .local_addr()
            .expect("collector address")
            .to_string()
    }

    #[allow(dead_code)]
    pub fn port(&self) -> u16 {
        self.socket.local_addr().expect("collector address").port()
    }

    /// Receive one datagram, panicking if none arrives in time.
    pub fn recv(&self) -> String {
        self.try_recv().expect("datagram received")
    }

    pub fn try_recv(&self) -> Option<String> {
        let mut buf = [0u8; 4096];
        let n = self.socket.recv(&mut buf).ok()?;
        Some(String::from_utf8_lossy(&buf[..n]).into_owned())
    }

    /// Wait briefly and report whether anything else arrived.
    #[allow(dead_code)]
    pub fn is_quiet(&self) -> bool {
        self.socket
            .set_read_timeout(Some(Duration::from_millis(100)))
            .expect("set read timeout");
        self.try_recv().is_none()
    }
}

#[fixture]
pub fn collector() -> UdpCollector {
    UdpCollector::bind()
}
