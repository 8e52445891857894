//! Builder for [`SyslogWriter`].
//!
//! Exposes transport selection and timeout tuning, validating the inputs
//! before any socket is opened.

use std::{path::PathBuf, time::Duration};

use super::{
    SyslogWriter,
    config::{ConfigError, SyslogConfig},
    transport::{Endpoint, Transport},
};

#[derive(Clone, Debug)]
enum TransportConfig {
    Tcp { host: String, port: u16 },
    Udp { host: String, port: u16 },
    UnixStream { path: PathBuf },
    UnixDatagram { path: PathBuf },
    Local,
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ConfigError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`SyslogWriter`] instances.
///
/// Without a transport the writer probes the local syslog daemon.
#[derive(Clone, Debug, Default)]
pub struct SyslogWriterBuilder {
    transport: Option<TransportConfig>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
    os_default_timeouts: bool,
}

impl SyslogWriterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tcp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.transport = Some(TransportConfig::Tcp {
            host: host.into(),
            port,
        });
        self
    }

    pub fn with_udp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.transport = Some(TransportConfig::Udp {
            host: host.into(),
            port,
        });
        self
    }

    pub fn with_unix_stream(mut self, path: impl Into<PathBuf>) -> Self {
        self.transport = Some(TransportConfig::UnixStream { path: path.into() });
        self
    }

    pub fn with_unix_datagram(mut self, path: impl Into<PathBuf>) -> Self {
        self.transport = Some(TransportConfig::UnixDatagram { path: path.into() });
        self
    }

    /// Probe `/dev/log` and friends, falling back to UDP on loopback.
    pub fn with_local(mut self) -> Self {
        self.transport = Some(TransportConfig::Local);
        self
    }

    option_setter!(
        #[doc = "Bound how long a TCP connect may block."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Bound how long a single socket write may block."]
        with_write_timeout_ms,
        write_timeout_ms,
        u64
    );

    /// Drop both timeouts and rely on the operating system defaults.
    pub fn with_os_default_timeouts(mut self) -> Self {
        self.os_default_timeouts = true;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_transport()?;
        self.validate_timeouts()?;
        Ok(())
    }

    fn validate_transport(&self) -> Result<(), ConfigError> {
        match &self.transport {
            Some(TransportConfig::Tcp { host, port } | TransportConfig::Udp { host, port }) => {
                if host.trim().is_empty() {
                    return Err(ConfigError::InvalidConfig("host must not be empty".into()));
                }
                ensure_positive!(*port, "port")?;
                Ok(())
            }
            Some(
                TransportConfig::UnixStream { path } | TransportConfig::UnixDatagram { path },
            ) if path.as_os_str().is_empty() => Err(ConfigError::InvalidConfig(
                "unix socket path must not be empty".into(),
            )),
            _ => Ok(()),
        }
    }

    fn validate_timeouts(&self) -> Result<(), ConfigError> {
        if self.os_default_timeouts
            && (self.connect_timeout_ms.is_some() || self.write_timeout_ms.is_some())
        {
            return Err(ConfigError::InvalidConfig(
                "explicit timeouts conflict with os default timeouts".into(),
            ));
        }
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.write_timeout_ms {
            ensure_positive!(timeout, "write_timeout_ms")?;
        }
        Ok(())
    }

    fn endpoint(&self) -> Endpoint {
        match self.transport.as_ref().unwrap_or(&TransportConfig::Local) {
            TransportConfig::Tcp { host, port } => {
                Endpoint::new(Transport::Tcp, join_host_port(host, *port))
            }
            TransportConfig::Udp { host, port } => {
                Endpoint::new(Transport::Udp, join_host_port(host, *port))
            }
            TransportConfig::UnixStream { path } => {
                Endpoint::new(Transport::UnixStream, path.to_string_lossy())
            }
            TransportConfig::UnixDatagram { path } => {
                Endpoint::new(Transport::UnixDatagram, path.to_string_lossy())
            }
            TransportConfig::Local => Endpoint::local(),
        }
    }

    /// Validate the builder and produce the equivalent configuration.
    pub fn build_config(&self) -> Result<SyslogConfig, ConfigError> {
        self.validate()?;
        let endpoint = self.endpoint();
        let mut config = SyslogConfig::new(endpoint.transport.as_str(), endpoint.address);
        if self.os_default_timeouts {
            config.connect_timeout = None;
            config.write_timeout = None;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.connect_timeout = Some(Duration::from_millis(timeout));
        }
        if let Some(timeout) = self.write_timeout_ms {
            config.write_timeout = Some(Duration::from_millis(timeout));
        }
        Ok(config)
    }

    /// Validate the builder and dial the collector.
    pub fn build(&self) -> Result<SyslogWriter, ConfigError> {
        let config = self.build_config()?;
        let endpoint = config.endpoint()?;
        Ok(SyslogWriter::dial_endpoint(endpoint, &config)?)
    }
}

fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_to_local_discovery() {
        let config = SyslogWriterBuilder::new().build_config().expect("valid");
        assert_eq!(config.endpoint().expect("endpoint"), Endpoint::local());
    }

    #[rstest]
    #[case(SyslogWriterBuilder::new().with_tcp("", 514), "host")]
    #[case(SyslogWriterBuilder::new().with_udp("127.0.0.1", 0), "port")]
    #[case(SyslogWriterBuilder::new().with_unix_stream(""), "path")]
    #[case(SyslogWriterBuilder::new().with_write_timeout_ms(0), "write_timeout_ms")]
    #[case(SyslogWriterBuilder::new().with_connect_timeout_ms(0), "connect_timeout_ms")]
    #[case(
        SyslogWriterBuilder::new().with_os_default_timeouts().with_write_timeout_ms(5),
        "conflict"
    )]
    fn rejects_invalid_settings(#[case] builder: SyslogWriterBuilder, #[case] needle: &str) {
        let err = builder.build_config().expect_err("must be invalid");
        assert!(
            matches!(&err, ConfigError::InvalidConfig(msg) if msg.contains(needle)),
            "{err}"
        );
    }

    #[test]
    fn maps_transports_to_endpoints() {
        let tcp = SyslogWriterBuilder::new()
            .with_tcp("::1", 601)
            .build_config()
            .expect("valid");
        assert_eq!(tcp.network, "tcp");
        assert_eq!(tcp.address, "[::1]:601");

        let gram = SyslogWriterBuilder::new()
            .with_unix_datagram("/dev/log")
            .build_config()
            .expect("valid");
        assert_eq!(
            gram.endpoint().expect("endpoint"),
            Endpoint::new(Transport::UnixDatagram, "/dev/log")
        );
    }

    #[test]
    fn applies_timeouts() {
        let config = SyslogWriterBuilder::new()
            .with_udp("127.0.0.1", 514)
            .with_connect_timeout_ms(20)
            .with_write_timeout_ms(30)
            .build_config()
            .expect("valid");
        assert_eq!(config.connect_timeout, Some(Duration::from_millis(20)));
        assert_eq!(config.write_timeout, Some(Duration::from_millis(30)));

        let blocking = SyslogWriterBuilder::new()
            .with_os_default_timeouts()
            .build_config()
            .expect("valid");
        assert_eq!(blocking.connect_timeout, None);
        assert_eq!(blocking.write_timeout, None);
    }
}
