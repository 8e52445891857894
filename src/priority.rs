//! Syslog facility and severity codes.
//!
//! A priority packs a facility (upper bits) and a severity (lower three
//! bits) into one integer. The writer only accepts priorities in
//! `0..=MAX_PRIORITY`, so [`Facility`] lists the eight facilities that fit.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Largest priority accepted on the wire: `(7 << 3) | 7`.
pub const MAX_PRIORITY: u8 = (7 << 3) | 7;

/// Raised when a numeric priority lies outside `0..=MAX_PRIORITY`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid syslog priority {0}; expected 0..={max}", max = MAX_PRIORITY)]
pub struct PriorityError(pub i64);

/// Raised when a facility or severity name is not recognised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown syslog {kind} name: {name}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Emerg = 0,
    Alert = 1,
    Crit = 2,
    Err = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Emerg => "EMERG",
            Severity::Alert => "ALERT",
            Severity::Crit => "CRIT",
            Severity::Err => "ERR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, UnknownName> {
        match s.to_ascii_uppercase().as_str() {
            "EMERG" => Ok(Severity::Emerg),
            "ALERT" => Ok(Severity::Alert),
            "CRIT" => Ok(Severity::Crit),
            "ERR" | "ERROR" => Ok(Severity::Err),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "NOTICE" => Ok(Severity::Notice),
            "INFO" => Ok(Severity::Info),
            "DEBUG" => Ok(Severity::Debug),
            _ => Err(UnknownName {
                kind: "severity",
                name: s.to_owned(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Facility {
    Kern = 0 << 3,
    User = 1 << 3,
    Mail = 2 << 3,
    Daemon = 3 << 3,
    Auth = 4 << 3,
    Syslog = 5 << 3,
    Lpr = 6 << 3,
    News = 7 << 3,
}

impl Facility {
    pub fn as_str(self) -> &'static str {
        match self {
            Facility::Kern => "KERN",
            Facility::User => "USER",
            Facility::Mail => "MAIL",
            Facility::Daemon => "DAEMON",
            Facility::Auth => "AUTH",
            Facility::Syslog => "SYSLOG",
            Facility::Lpr => "LPR",
            Facility::News => "NEWS",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facility {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, UnknownName> {
        match s.to_ascii_uppercase().as_str() {
            "KERN" => Ok(Self::Kern),
            "USER" => Ok(Self::User),
            "MAIL" => Ok(Self::Mail),
            "DAEMON" => Ok(Self::Daemon),
            "AUTH" => Ok(Self::Auth),
            "SYSLOG" => Ok(Self::Syslog),
            "LPR" => Ok(Self::Lpr),
            "NEWS" => Ok(Self::News),
            _ => Err(UnknownName {
                kind: "facility",
                name: s.to_owned(),
            }),
        }
    }
}

/// A validated `facility | severity` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    pub const fn new(facility: Facility, severity: Severity) -> Self {
        Self(facility as u8 | severity as u8)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub fn facility(self) -> Facility {
        match self.0 >> 3 {
            0 => Facility::Kern,
            1 => Facility::User,
            2 => Facility::Mail,
            3 => Facility::Daemon,
            4 => Facility::Auth,
            5 => Facility::Syslog,
            6 => Facility::Lpr,
            _ => Facility::News,
        }
    }

    pub fn severity(self) -> Severity {
        match self.0 & 7 {
            0 => Severity::Emerg,
            1 => Severity::Alert,
            2 => Severity::Crit,
            3 => Severity::Err,
            4 => Severity::Warning,
            5 => Severity::Notice,
            6 => Severity::Info,
            _ => Severity::Debug,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::new(Facility::User, Severity::Info)
    }
}

impl TryFrom<i64> for Priority {
    type Error = PriorityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= MAX_PRIORITY)
            .map(Self)
            .ok_or(PriorityError(value))
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        i64::from(priority.0)
    }
}

impl std::ops::BitOr<Severity> for Facility {
    type Output = Priority;

    fn bitor(self, severity: Severity) -> Priority {
        Priority::new(self, severity)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Facility::User, Severity::Err, 11)]
    #[case(Facility::User, Severity::Info, 14)]
    #[case(Facility::Kern, Severity::Emerg, 0)]
    #[case(Facility::News, Severity::Debug, 63)]
    fn packs_facility_and_severity(
        #[case] facility: Facility,
        #[case] severity: Severity,
        #[case] expected: u8,
    ) {
        let priority = facility | severity;
        assert_eq!(priority.value(), expected);
        assert_eq!(priority.facility(), facility);
        assert_eq!(priority.severity(), severity);
    }

    #[rstest]
    #[case(-1)]
    #[case(64)]
    #[case(191)]
    #[case(i64::MAX)]
    fn rejects_out_of_range(#[case] raw: i64) {
        assert_eq!(Priority::try_from(raw), Err(PriorityError(raw)));
    }

    #[test]
    fn accepts_whole_range() {
        for raw in 0..=i64::from(MAX_PRIORITY) {
            let priority = Priority::try_from(raw).expect("in range");
            assert_eq!(i64::from(priority), raw);
        }
    }

    #[rstest]
    #[case("err", Severity::Err)]
    #[case("WARNING", Severity::Warning)]
    #[case("warn", Severity::Warning)]
    #[case("Debug", Severity::Debug)]
    fn parses_severity_names(#[case] name: &str, #[case] expected: Severity) {
        assert_eq!(name.parse::<Severity>(), Ok(expected));
    }

    #[test]
    fn unknown_facility_reports_name() {
        let err = "LOCAL4".parse::<Facility>().expect_err("out of range facility");
        assert_eq!(err.kind, "facility");
        assert_eq!(err.name, "LOCAL4");
    }
}
