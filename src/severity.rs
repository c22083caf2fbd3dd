use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::Level;

/// Abstract severity of a log event, independent of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 5] = [
        Severity::Fatal,
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Debug,
    ];

    /// Map to the `tracing` level used by [`crate::tracing_sink::TracingSink`].
    ///
    /// `tracing` has no fatal level, so `Fatal` and `Error` both land on
    /// `ERROR`; the distinction survives in [`Severity::level_name`].
    pub fn to_level(self) -> Level {
        match self {
            Severity::Fatal => Level::ERROR,
            Severity::Error => Level::ERROR,
            Severity::Warn => Level::WARN,
            Severity::Info => Level::INFO,
            Severity::Debug => Level::DEBUG,
        }
    }

    /// Backend level name stored in [`crate::record::LogEvent::level`].
    pub fn level_name(self) -> &'static str {
        match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.level_name())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown severity: {0}")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fatal" => Ok(Severity::Fatal),
            "error" => Ok(Severity::Error),
            "warn" | "warning" => Ok(Severity::Warn),
            "info" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn level_names_are_distinct() {
        let names: HashSet<_> = Severity::ALL.iter().map(|s| s.level_name()).collect();
        assert_eq!(names.len(), Severity::ALL.len());
    }

    #[test]
    fn mapping_is_stable() {
        for severity in Severity::ALL {
            assert_eq!(severity.to_level(), severity.to_level());
            assert_eq!(severity.level_name(), severity.level_name());
        }
        assert_eq!(Severity::Fatal.to_level(), Level::ERROR);
        assert_eq!(Severity::Error.to_level(), Level::ERROR);
        assert_eq!(Severity::Warn.to_level(), Level::WARN);
        assert_eq!(Severity::Info.to_level(), Level::INFO);
        assert_eq!(Severity::Debug.to_level(), Level::DEBUG);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("FATAL".parse::<Severity>(), Ok(Severity::Fatal));
        assert_eq!(" warning ".parse::<Severity>(), Ok(Severity::Warn));
        assert_eq!("Info".parse::<Severity>(), Ok(Severity::Info));
        assert!("trace".parse::<Severity>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for severity in Severity::ALL {
            assert_eq!(severity.to_string().parse::<Severity>(), Ok(severity));
        }
    }
}
