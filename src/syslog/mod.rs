//! Reconnecting syslog writer.
//!
//! [`SyslogWriter`] owns one connection to a collector (TCP, UDP, a Unix
//! stream or datagram socket, or whatever local daemon it can find) and
//! writes `<PRI>TIMESTAMP HOSTNAME TAG[PID]: MESSAGE\n` frames through it.
//! When a write fails the writer reconnects once and retries once; anything
//! beyond that is returned to the caller.

mod builder;
mod config;
mod error;
mod frame;
mod transport;
mod writer;


pub use builder::SyslogWriterBuilder;
pub use config::{ConfigError, DEFAULT_CONNECT_TIMEOUT, DEFAULT_WRITE_TIMEOUT, SyslogConfig};
pub use error::{ConnectError, SyslogError};
pub use frame::{Frame, decode_priority, encode_frame, format_timestamp, now_nanos};
pub use transport::{
    Connection, Dialer, Endpoint, FrameSink, LOCAL_SOCKET_PATHS, LOOPBACK_FALLBACK, NetDialer,
    Transport,
};
pub use writer::SyslogWriter;
