//! Configuration consumed by [`SyslogWriter`](super::SyslogWriter).
//!
//! The same keys are accepted from serde sources, INI sections, and the
//! fluent [`SyslogWriterBuilder`](super::SyslogWriterBuilder).

use std::{io, path::Path, time::Duration};

use ini::Ini;
use serde::{Deserialize, Deserializer, de};
use thiserror::Error;

use super::{
    error::ConnectError,
    transport::{Endpoint, NetDialer},
};

/// Default timeout applied when establishing TCP connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default timeout applied to every socket write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors raised while building writer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid user supplied configuration.
    #[error("invalid syslog configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to parse ini file: {0}")]
    Ini(#[from] ini::Error),
    #[error(transparent)]
    Connect(#[from] ConnectError),
}

/// Where and how to reach the collector.
///
/// `None` timeouts leave the operating system defaults in place, which may
/// block indefinitely.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyslogConfig {
    /// `tcp`, `udp`, `unix`, `unixgram`, or empty for local discovery.
    pub network: String,
    pub address: String,
    #[serde(rename = "connect_timeout_ms", deserialize_with = "optional_millis")]
    pub connect_timeout: Option<Duration>,
    #[serde(rename = "write_timeout_ms", deserialize_with = "optional_millis")]
    pub write_timeout: Option<Duration>,
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self {
            network: String::new(),
            address: String::new(),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            write_timeout: Some(DEFAULT_WRITE_TIMEOUT),
        }
    }
}

impl SyslogConfig {
    pub fn new(network: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn endpoint(&self) -> Result<Endpoint, ConnectError> {
        Endpoint::parse(&self.network, &self.address)
    }

    pub(crate) fn dialer(&self) -> NetDialer {
        NetDialer::new(self.connect_timeout, self.write_timeout)
    }

    /// Load the writer settings stored in `section` of an INI file.
    ///
    /// Recognised keys are `network`, `address`, `connect_timeout_ms`, and
    /// `write_timeout_ms`. A timeout of `none` disables it.
    pub fn from_ini(path: impl AsRef<Path>, section: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path.as_ref())?;
        let props = ini.section(Some(section)).ok_or_else(|| {
            ConfigError::InvalidConfig(format!(
                "section [{section}] missing from {}",
                path.as_ref().display()
            ))
        })?;

        let mut config = Self::default();
        for (key, value) in props.iter() {
            match key {
                "network" => config.network = value.trim().to_owned(),
                "address" => config.address = value.trim().to_owned(),
                "connect_timeout_ms" => config.connect_timeout = parse_millis(key, value)?,
                "write_timeout_ms" => config.write_timeout = parse_millis(key, value)?,
                other => {
                    return Err(ConfigError::InvalidConfig(format!(
                        "unknown key {other} in section [{section}]"
                    )));
                }
            }
        }
        config.endpoint()?;
        Ok(config)
    }
}

fn parse_millis(key: &str, value: &str) -> Result<Option<Duration>, ConfigError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidConfig(format!(
            "{key} must be greater than zero"
        ))),
        Ok(ms) => Ok(Some(Duration::from_millis(ms))),
        Err(err) => Err(ConfigError::InvalidConfig(format!(
            "{key} must be a whole number of milliseconds: {err}"
        ))),
    }
}

fn optional_millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<u64>::deserialize(deserializer)? {
        Some(0) => Err(de::Error::custom("timeout must be greater than zero")),
        Some(ms) => Ok(Some(Duration::from_millis(ms))),
        None => Ok(None),
    }
}
