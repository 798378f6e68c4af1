use std::fmt;
use std::str::FromStr;

/// Severity scale understood by the hook, most severe first.
///
/// The ordinal (`as u8`) grows as severity drops, so `Panic` is `0` and
/// `Debug` is `5`. A threshold enables itself and everything with a lower
/// ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Panic = 0,
    Fatal = 1,
    Error = 2,
    Warn = 3,
    Info = 4,
    Debug = 5,
}

impl Severity {
    /// Every severity in ordinal order.
    pub const ALL: [Severity; 6] = [
        Severity::Panic,
        Severity::Fatal,
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Debug,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Lowercase name as used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Panic => "panic",
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }

    /// Map a `tracing` level onto the scale. `TRACE` sits below `Debug`
    /// and has no counterpart.
    pub fn from_tracing(level: &tracing::Level) -> Option<Severity> {
        match *level {
            tracing::Level::ERROR => Some(Severity::Error),
            tracing::Level::WARN => Some(Severity::Warn),
            tracing::Level::INFO => Some(Severity::Info),
            tracing::Level::DEBUG => Some(Severity::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity name cannot be parsed.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown severity: {0}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "panic" => Ok(Severity::Panic),
            "fatal" => Ok(Severity::Fatal),
            "error" => Ok(Severity::Error),
            "warn" | "warning" => Ok(Severity::Warn),
            "info" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

/// Compute the severities handled for a given minimum `threshold`.
///
/// The result is ordered most severe first and contains the threshold
/// itself.
pub fn enabled_levels(threshold: Severity) -> Vec<Severity> {
    Severity::ALL
        .iter()
        .copied()
        .filter(|level| level.ordinal() <= threshold.ordinal())
        .collect()
}
