//! The reconnecting syslog client.

use std::{io, process};

use log::{debug, warn};
use parking_lot::Mutex;

use crate::{
    hostname::{UNIX_SOCKET_HOSTNAME, local_hostname},
    priority::Priority,
};

use super::{
    config::SyslogConfig,
    error::{ConnectError, SyslogError},
    frame::{Frame, render},
    transport::{Dialer, Endpoint, FrameSink, NetDialer},
};

struct WriterState<C> {
    conn: Option<C>,
    hostname: String,
}

/// Writes syslog frames over one shared connection.
///
/// All connection access happens under a single lock, so concurrent
/// writers are serialised and never interleave bytes. A failed write is
/// followed by exactly one reconnect and one further write attempt.
pub struct SyslogWriter<D: Dialer = NetDialer> {
    endpoint: Endpoint,
    dialer: D,
    pid: u32,
    state: Mutex<WriterState<D::Conn>>,
}

impl SyslogWriter<NetDialer> {
    /// Dial `network`/`address` with the default timeouts.
    ///
    /// An empty `network` probes the local syslog daemon instead.
    pub fn dial(network: &str, address: &str) -> Result<Self, SyslogError> {
        let endpoint = Endpoint::parse(network, address)?;
        Ok(Self::dial_endpoint(endpoint, &SyslogConfig::default())?)
    }

    /// Dial the endpoint and timeouts described by `config`.
    pub fn from_config(config: &SyslogConfig) -> Result<Self, SyslogError> {
        let endpoint = config.endpoint()?;
        Ok(Self::dial_endpoint(endpoint, config)?)
    }

    pub fn dial_endpoint(endpoint: Endpoint, config: &SyslogConfig) -> Result<Self, ConnectError> {
        Self::with_dialer(endpoint, config.dialer())
    }
}

impl<D: Dialer> SyslogWriter<D> {
    /// Connect through a custom dialer. Failure is fatal: no writer is built.
    pub fn with_dialer(endpoint: Endpoint, dialer: D) -> Result<Self, ConnectError> {
        let (conn, hostname) = connect(&dialer, &endpoint)?;
        debug!("syslog: connected to {endpoint}");
        Ok(Self {
            endpoint,
            dialer,
            pid: process::id(),
            state: Mutex::new(WriterState {
                conn: Some(conn),
                hostname,
            }),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().conn.is_some()
    }

    /// Positional form of [`write_frame`](Self::write_frame).
    pub fn write(
        &self,
        priority: impl Into<i64>,
        timestamp: i64,
        hostname: &str,
        tag: &str,
        message: &str,
    ) -> Result<usize, SyslogError> {
        self.write_frame(&Frame {
            priority: priority.into(),
            timestamp,
            hostname,
            tag,
            message,
        })
    }

    /// Encode and send one frame, reconnecting once if the write fails.
    ///
    /// Out-of-range priorities are rejected before any I/O.
    pub fn write_frame(&self, frame: &Frame<'_>) -> Result<usize, SyslogError> {
        let priority = Priority::try_from(frame.priority)?;
        let mut state = self.state.lock();

        let first = {
            let WriterState { conn, hostname } = &mut *state;
            match conn.as_mut() {
                Some(conn) => {
                    let wire = render(frame, priority, hostname, self.pid);
                    match conn.write_frame(wire.as_bytes()) {
                        Ok(n) => return Ok(n),
                        Err(err) => Some(err),
                    }
                }
                None => None,
            }
        };

        match &first {
            Some(err) => warn!("syslog: write to {} failed: {err}; reconnecting", self.endpoint),
            None => debug!("syslog: no connection to {}; reconnecting", self.endpoint),
        }
        if let Some(old) = state.conn.take() {
            // Close errors are irrelevant once the connection is being replaced.
            let _ = old.close();
        }

        let (conn, hostname) = match connect(&self.dialer, &self.endpoint) {
            Ok(fresh) => fresh,
            Err(source) => {
                return Err(SyslogError::Reconnect {
                    write: first,
                    source,
                });
            }
        };
        let wire = render(frame, priority, &hostname, self.pid);
        state.hostname = hostname;
        let conn = state.conn.insert(conn);
        conn.write_frame(wire.as_bytes())
            .map_err(|source| SyslogError::Write { first, source })
    }

    /// Close the connection. Closing an already closed writer is a no-op.
    pub fn close(&self) -> Result<(), SyslogError> {
        match self.state.lock().conn.take() {
            Some(conn) => conn.close().map_err(SyslogError::Close),
            None => Ok(()),
        }
    }
}

impl<D: Dialer> std::fmt::Debug for SyslogWriter<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyslogWriter")
            .field("endpoint", &self.endpoint)
            .field(
                "connected",
                &self.state.try_lock().map(|state| state.conn.is_some()),
            )
            .finish()
    }
}

fn connect<D: Dialer>(dialer: &D, endpoint: &Endpoint) -> Result<(D::Conn, String), ConnectError> {
    let conn = dialer.dial(endpoint)?;
    let hostname = default_hostname(&conn).map_err(ConnectError::Hostname)?;
    Ok((conn, hostname))
}

fn default_hostname(conn: &impl FrameSink) -> io::Result<String> {
    if conn.is_unix() {
        Ok(UNIX_SOCKET_HOSTNAME.to_owned())
    } else {
        local_hostname()
    }
}
