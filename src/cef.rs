//! CEF output: routes messages carrying `cef_meta` to syslog.
//!
//! `cef_meta` is an object with optional `syslog_ident`,
//! `syslog_priority`, and `syslog_facility` string entries. Unknown or
//! absent priority/facility names fall back to [`DEFAULT_CEF_PRIORITY`].

use thiserror::Error;

use crate::{
    fields::{FieldLookup, Fields, field},
    message::Message,
    priority::{Facility, Priority, Severity},
    syslog::Frame,
};

/// Priority used when `cef_meta` names no usable priority and facility.
pub const DEFAULT_CEF_PRIORITY: Priority = Priority::new(Facility::User, Severity::Info);

const CEF_META: &str = "cef_meta";

/// Why a message could not be turned into a syslog record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("can't output CEF message, missing {0} field")]
    MissingField(&'static str),
    #[error("can't output CEF message, {field} is not a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// A message mapped onto syslog terms, ready to become a [`Frame`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyslogRecord {
    pub priority: Priority,
    pub timestamp: i64,
    pub hostname: String,
    pub tag: String,
    pub payload: String,
}

impl SyslogRecord {
    pub fn as_frame(&self) -> Frame<'_> {
        Frame {
            priority: self.priority.into(),
            timestamp: self.timestamp,
            hostname: &self.hostname,
            tag: &self.tag,
            message: &self.payload,
        }
    }
}

/// Maps pipeline messages onto syslog records.
pub trait Encoder {
    fn encode(&self, message: &Message) -> Result<SyslogRecord, EncodeError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CefOutput;

impl CefOutput {
    fn priority(meta: &Fields) -> Priority {
        let severity = field::<&str>(meta, "syslog_priority")
            .found()
            .and_then(|name| name.parse::<Severity>().ok());
        let facility = field::<&str>(meta, "syslog_facility")
            .found()
            .and_then(|name| name.parse::<Facility>().ok());
        match (facility, severity) {
            (Some(facility), Some(severity)) => facility | severity,
            _ => DEFAULT_CEF_PRIORITY,
        }
    }
}

impl Encoder for CefOutput {
    fn encode(&self, message: &Message) -> Result<SyslogRecord, EncodeError> {
        let meta = match field::<&Fields>(&message.fields, CEF_META) {
            FieldLookup::Found(meta) => meta,
            FieldLookup::Missing => return Err(EncodeError::MissingField(CEF_META)),
            FieldLookup::WrongType { expected } => {
                return Err(EncodeError::WrongType {
                    field: CEF_META,
                    expected,
                });
            }
        };
        Ok(SyslogRecord {
            priority: Self::priority(meta),
            timestamp: message.timestamp,
            hostname: message.hostname.clone(),
            tag: field::<&str>(meta, "syslog_ident")
                .found()
                .unwrap_or_default()
                .to_owned(),
            payload: message.payload.clone(),
        })
    }
}
