//! Error types surfaced by the syslog writer.

use std::io;

use thiserror::Error;

use crate::priority::PriorityError;

use super::transport::Endpoint;

/// Failure to establish a connection to the collector.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("unknown syslog transport: {0:?}")]
    UnknownTransport(String),
    #[error("failed to connect to {endpoint}: {source}")]
    Io {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },
    /// Every local socket and the loopback fallback refused; carries the
    /// fallback's error.
    #[error("unix syslog delivery error: no local syslog daemon reachable: {0}")]
    NoLocalDaemon(#[source] io::Error),
    #[error("error retrieving hostname: {0}")]
    Hostname(#[source] io::Error),
}

/// Errors returned by [`SyslogWriter`](super::SyslogWriter) operations.
#[derive(Debug, Error)]
pub enum SyslogError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Priority(#[from] PriorityError),
    /// The write failed again on a freshly established connection.
    #[error("syslog write failed after reconnect: {source}{}", first_failure(.first))]
    Write {
        /// Failure on the previous connection, if there was one.
        first: Option<io::Error>,
        #[source]
        source: io::Error,
    },
    /// The write failed and the reconnect did too.
    #[error("syslog reconnect failed: {source}{}", first_failure(.write))]
    Reconnect {
        write: Option<io::Error>,
        #[source]
        source: ConnectError,
    },
    #[error("syslog close failed: {0}")]
    Close(#[source] io::Error),
}

fn first_failure(first: &Option<io::Error>) -> String {
    match first {
        Some(err) => format!(" (first write: {err})"),
        None => String::new(),
    }
}
