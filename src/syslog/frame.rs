//! Wire encoding for syslog frames.
//!
//! Every frame is a single line of the form
//! `<PRI>TIMESTAMP HOSTNAME TAG[PID]: MESSAGE\n`. `TIMESTAMP` is RFC 3339 in
//! UTC with nanosecond precision, and the message gains a trailing newline
//! only when it lacks one.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::priority::{Priority, PriorityError};

/// One record handed to [`SyslogWriter::write_frame`](super::SyslogWriter::write_frame).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Raw `facility | severity`; validated before any I/O.
    pub priority: i64,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
    /// Empty selects the writer's default hostname.
    pub hostname: &'a str,
    pub tag: &'a str,
    pub message: &'a str,
}

impl<'a> Frame<'a> {
    /// Construct a frame stamped with the current time and default hostname.
    pub fn new(priority: impl Into<i64>, tag: &'a str, message: &'a str) -> Self {
        Self {
            priority: priority.into(),
            timestamp: now_nanos(),
            hostname: "",
            tag,
            message,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_hostname(mut self, hostname: &'a str) -> Self {
        self.hostname = hostname;
        self
    }
}

/// Current time in nanoseconds since the Unix epoch.
pub fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// Render a nanosecond timestamp as it appears on the wire.
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp_nanos(timestamp).to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Encode `frame`, substituting `default_hostname` when the frame has none.
pub fn encode_frame(
    frame: &Frame<'_>,
    default_hostname: &str,
    pid: u32,
) -> Result<String, PriorityError> {
    let priority = Priority::try_from(frame.priority)?;
    Ok(render(frame, priority, default_hostname, pid))
}

pub(crate) fn render(frame: &Frame<'_>, priority: Priority, default_hostname: &str, pid: u32) -> String {
    let hostname = if frame.hostname.is_empty() {
        default_hostname
    } else {
        frame.hostname
    };
    let mut out = format!(
        "<{priority}>{} {hostname} {}[{pid}]: {}",
        format_timestamp(frame.timestamp),
        frame.tag,
        frame.message,
    );
    if !frame.message.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Read the `<N>` prefix back from a received frame.
pub fn decode_priority(wire: &[u8]) -> Option<Priority> {
    let rest = wire.strip_prefix(b"<")?;
    let end = rest.iter().position(|&b| b == b'>')?;
    let digits = &rest[..end];
    if digits.is_empty() || digits.len() > 3 || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = digits
        .iter()
        .fold(0i64, |acc, d| acc * 10 + i64::from(d - b'0'));
    Priority::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::{Facility, Severity};
    use proptest::prelude::*;
    use rstest::rstest;

    const T: i64 = 1_360_262_339_123_456_789;

    fn frame<'a>(priority: i64, message: &'a str) -> Frame<'a> {
        Frame {
            priority,
            timestamp: T,
            hostname: "myhost",
            tag: "syslog_test",
            message,
        }
    }

    #[test]
    fn timestamp_uses_rfc3339_nanos() {
        assert_eq!(format_timestamp(T), "2013-02-07T18:38:59.123456789Z");
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000000000Z");
    }

    #[rstest]
    #[case("", "<11>2013-02-07T18:38:59.123456789Z myhost syslog_test[42]: \n")]
    #[case("write test", "<11>2013-02-07T18:38:59.123456789Z myhost syslog_test[42]: write test\n")]
    #[case("write test 2\n", "<11>2013-02-07T18:38:59.123456789Z myhost syslog_test[42]: write test 2\n")]
    fn encodes_exact_wire_string(#[case] message: &str, #[case] expected: &str) {
        let priority = Facility::User | Severity::Err;
        let wire = encode_frame(&frame(priority.into(), message), "unused", 42).expect("valid priority");
        assert_eq!(wire, expected);
    }

    #[test]
    fn empty_hostname_uses_default() {
        let wire = encode_frame(&frame(14, "hi").with_hostname(""), "localhost", 1).expect("encode");
        assert!(wire.contains(" localhost syslog_test[1]: hi\n"), "{wire}");
    }

    #[rstest]
    #[case(-1)]
    #[case(64)]
    fn rejects_out_of_range_priority(#[case] priority: i64) {
        assert_eq!(
            encode_frame(&frame(priority, "x"), "h", 1),
            Err(PriorityError(priority))
        );
    }

    #[rstest]
    #[case(b"<11>rest".as_slice(), Some(11))]
    #[case(b"<0>".as_slice(), Some(0))]
    #[case(b"<64>".as_slice(), None)]
    #[case(b"<>".as_slice(), None)]
    #[case(b"11>".as_slice(), None)]
    #[case(b"<1a>".as_slice(), None)]
    fn decodes_priority_prefix(#[case] wire: &[u8], #[case] expected: Option<u8>) {
        assert_eq!(decode_priority(wire).map(Priority::value), expected);
    }

    proptest! {
        #[test]
        fn frame_ends_with_exactly_one_newline(message in "[^\n]{0,64}", trailing in any::<bool>()) {
            let message = if trailing { format!("{message}\n") } else { message };
            let wire = encode_frame(&frame(11, &message), "h", 7).expect("encode");
            prop_assert!(wire.ends_with('\n'));
            prop_assert!(!wire.ends_with("\n\n"));
            let with_newline = format!("{message}\n");
            prop_assert!(wire.ends_with(&message) || wire.ends_with(&with_newline));
        }

        #[test]
        fn priority_prefix_round_trips(raw in 0i64..=63) {
            let wire = encode_frame(&frame(raw, "m"), "h", 7).expect("encode");
            prop_assert_eq!(decode_priority(wire.as_bytes()).map(i64::from), Some(raw));
        }
    }
}
