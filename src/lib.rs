//! Syslog delivery for pipeline outputs.
//!
//! The heart of the crate is [`SyslogWriter`], a thread-safe client that
//! keeps one connection to a syslog collector and reconnects once when a
//! write fails. Around it sit the pieces an output plugin needs: a
//! [`ConnectionRegistry`] for sharing writers, typed [`fields`] access, the
//! [`CefOutput`] encoder, and the [`run_output`] loop for the host runtime.

pub mod cef;
pub mod fields;
pub mod hostname;
pub mod message;
pub mod priority;
pub mod rate_limited_warner;
pub mod registry;
pub mod runner;
pub mod syslog;

pub use cef::{CefOutput, DEFAULT_CEF_PRIORITY, EncodeError, Encoder, SyslogRecord};
pub use fields::{FieldLookup, Fields, FromField, field};
pub use message::Message;
pub use priority::{Facility, MAX_PRIORITY, Priority, PriorityError, Severity, UnknownName};
pub use registry::ConnectionRegistry;
pub use runner::{OutputError, OutputRunner, RunSummary, run_output};
pub use syslog::{
    ConfigError, ConnectError, Endpoint, Frame, SyslogConfig, SyslogError, SyslogWriter,
    SyslogWriterBuilder, Transport,
};
