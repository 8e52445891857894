//! Pipeline message representation.
//!
//! Messages arrive from the host runner and carry a payload plus dynamic
//! metadata fields that output encoders map onto syslog frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{fields::Fields, syslog::now_nanos};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
    /// Name of the component that produced the message.
    pub logger: String,
    /// Origin host; empty lets the writer pick its default.
    pub hostname: String,
    pub payload: String,
    pub fields: Fields,
}

impl Message {
    /// Construct a message stamped with the current time.
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            timestamp: now_nanos(),
            payload: payload.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}
