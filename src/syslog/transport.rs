//! Transport primitives for the syslog writer.

use std::{
    fmt,
    io::{self, Write},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

#[cfg(unix)]
use std::os::unix::net::{UnixDatagram, UnixStream};

use log::debug;

use super::error::ConnectError;

/// Unix socket paths probed when no transport is configured.
pub const LOCAL_SOCKET_PATHS: &[&str] = &["/dev/log", "/var/run/syslog", "/var/run/log"];
/// Address used when none of [`LOCAL_SOCKET_PATHS`] accepts a connection.
pub const LOOPBACK_FALLBACK: &str = "127.0.0.1:514";

/// Transport used to reach the collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transport {
    Tcp,
    Udp,
    UnixStream,
    UnixDatagram,
    /// Local daemon discovery: the well-known Unix socket paths, then
    /// UDP on [`LOOPBACK_FALLBACK`].
    Loopback,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Tcp => "tcp",
            Transport::Udp => "udp",
            Transport::UnixStream => "unix",
            Transport::UnixDatagram => "unixgram",
            Transport::Loopback => "",
        }
    }
}

impl FromStr for Transport {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" | "tcp4" | "tcp6" => Ok(Self::Tcp),
            "udp" | "udp4" | "udp6" => Ok(Self::Udp),
            "unix" => Ok(Self::UnixStream),
            "unixgram" => Ok(Self::UnixDatagram),
            "" => Ok(Self::Loopback),
            _ => Err(ConnectError::UnknownTransport(s.to_owned())),
        }
    }
}

/// Where the writer (re)connects to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub transport: Transport,
    pub address: String,
}

impl Endpoint {
    pub fn new(transport: Transport, address: impl Into<String>) -> Self {
        Self {
            transport,
            address: address.into(),
        }
    }

    /// Parse a network name such as `"udp"` or `"unixgram"`; the empty
    /// string selects local discovery and ignores `address`.
    pub fn parse(network: &str, address: &str) -> Result<Self, ConnectError> {
        let transport: Transport = network.parse()?;
        let address = match transport {
            Transport::Loopback => String::new(),
            _ => address.to_owned(),
        };
        Ok(Self { transport, address })
    }

    pub fn local() -> Self {
        Self::new(Transport::Loopback, "")
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transport {
            Transport::Loopback => f.write_str("local syslog"),
            transport => write!(f, "{}://{}", transport.as_str(), self.address),
        }
    }
}

/// Capability shared by every open collector connection.
pub trait FrameSink: Send {
    /// Write one encoded frame, returning the number of bytes sent.
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<usize>;

    /// Tear the connection down.
    fn close(self) -> io::Result<()>
    where
        Self: Sized;

    /// Whether the peer is reached over a Unix domain socket.
    fn is_unix(&self) -> bool;
}

/// Opens connections for a writer.
pub trait Dialer: Send + Sync {
    type Conn: FrameSink;

    fn dial(&self, endpoint: &Endpoint) -> Result<Self::Conn, ConnectError>;
}

/// An open socket to the collector.
#[derive(Debug)]
pub enum Connection {
    Tcp(TcpStream),
    Udp(UdpSocket),
    #[cfg(unix)]
    UnixStream(UnixStream),
    #[cfg(unix)]
    UnixDatagram(UnixDatagram),
}

impl Connection {
    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            Connection::Tcp(stream) => stream.set_write_timeout(timeout),
            Connection::Udp(socket) => socket.set_write_timeout(timeout),
            #[cfg(unix)]
            Connection::UnixStream(stream) => stream.set_write_timeout(timeout),
            #[cfg(unix)]
            Connection::UnixDatagram(socket) => socket.set_write_timeout(timeout),
        }
    }
}

impl FrameSink for Connection {
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<usize> {
        match self {
            Connection::Tcp(stream) => stream.write_all(frame).map(|()| frame.len()),
            Connection::Udp(socket) => socket.send(frame),
            #[cfg(unix)]
            Connection::UnixStream(stream) => stream.write_all(frame).map(|()| frame.len()),
            #[cfg(unix)]
            Connection::UnixDatagram(socket) => socket.send(frame),
        }
    }

    fn close(self) -> io::Result<()> {
        let result = match &self {
            Connection::Tcp(stream) => stream.shutdown(Shutdown::Both),
            #[cfg(unix)]
            Connection::UnixStream(stream) => stream.shutdown(Shutdown::Both),
            _ => Ok(()),
        };
        match result {
            // The peer already went away; the socket is released on drop either way.
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }

    fn is_unix(&self) -> bool {
        match self {
            Connection::Tcp(_) | Connection::Udp(_) => false,
            #[cfg(unix)]
            Connection::UnixStream(_) | Connection::UnixDatagram(_) => true,
        }
    }
}

/// Dialer backed by real sockets.
#[derive(Clone, Debug)]
pub struct NetDialer {
    connect_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    local_paths: Vec<PathBuf>,
    loopback_fallback: String,
}

impl Default for NetDialer {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            write_timeout: None,
            local_paths: LOCAL_SOCKET_PATHS.iter().map(PathBuf::from).collect(),
            loopback_fallback: LOOPBACK_FALLBACK.to_owned(),
        }
    }
}

impl NetDialer {
    pub fn new(connect_timeout: Option<Duration>, write_timeout: Option<Duration>) -> Self {
        Self {
            connect_timeout,
            write_timeout,
            ..Self::default()
        }
    }

    /// Replace the Unix socket paths probed during local discovery.
    pub fn with_local_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.local_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the UDP address tried after every local path fails.
    pub fn with_loopback_fallback(mut self, address: impl Into<String>) -> Self {
        self.loopback_fallback = address.into();
        self
    }

    fn connect(&self, transport: Transport, address: &str) -> io::Result<Connection> {
        let conn = match transport {
            Transport::Tcp => Connection::Tcp(connect_tcp(address, self.connect_timeout)?),
            Transport::Udp => Connection::Udp(connect_udp(address)?),
            Transport::UnixStream => unix_stream(address)?,
            Transport::UnixDatagram => unix_datagram(address)?,
            Transport::Loopback => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "local discovery has no single address",
                ));
            }
        };
        conn.set_write_timeout(self.write_timeout)?;
        Ok(conn)
    }

    fn connect_local(&self) -> Result<Connection, ConnectError> {
        for transport in [Transport::UnixDatagram, Transport::UnixStream] {
            for path in &self.local_paths {
                let address = path.to_string_lossy();
                match self.connect(transport, &address) {
                    Ok(conn) => {
                        debug!("syslog: using local {} socket {address}", transport.as_str());
                        return Ok(conn);
                    }
                    Err(err) => debug!("syslog: {} {address} unavailable: {err}", transport.as_str()),
                }
            }
        }
        self.connect(Transport::Udp, &self.loopback_fallback)
            .map_err(ConnectError::NoLocalDaemon)
    }
}

impl Dialer for NetDialer {
    type Conn = Connection;

    fn dial(&self, endpoint: &Endpoint) -> Result<Connection, ConnectError> {
        match endpoint.transport {
            Transport::Loopback => self.connect_local(),
            transport => self
                .connect(transport, &endpoint.address)
                .map_err(|source| ConnectError::Io {
                    endpoint: endpoint.clone(),
                    source,
                }),
        }
    }
}

fn resolve(address: &str) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = address.to_socket_addrs()?.collect();
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{address} did not resolve to any address"),
        ));
    }
    Ok(addrs)
}

fn connect_tcp(address: &str, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in resolve(address)? {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotConnected, format!("unable to connect to {address}"))
    }))
}

fn connect_udp(address: &str) -> io::Result<UdpSocket> {
    let mut last_err = None;
    for addr in resolve(address)? {
        let local: SocketAddr = if addr.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let attempt = UdpSocket::bind(local).and_then(|socket| {
            socket.connect(addr)?;
            Ok(socket)
        });
        match attempt {
            Ok(socket) => return Ok(socket),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotConnected, format!("unable to connect to {address}"))
    }))
}

#[cfg(unix)]
fn unix_stream(path: &str) -> io::Result<Connection> {
    UnixStream::connect(path).map(Connection::UnixStream)
}

#[cfg(unix)]
fn unix_datagram(path: &str) -> io::Result<Connection> {
    let socket = UnixDatagram::unbound()?;
    socket.connect(path)?;
    Ok(Connection::UnixDatagram(socket))
}

#[cfg(not(unix))]
fn unix_stream(_path: &str) -> io::Result<Connection> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "unix domain sockets are not supported on this platform",
    ))
}

#[cfg(not(unix))]
fn unix_datagram(path: &str) -> io::Result<Connection> {
    unix_stream(path)
}
