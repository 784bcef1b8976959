//! Torque job state letters.

use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// Job state as reported in the `S` column of `qstat` and `showq`.
///
/// From `man qstat`. Any other letter is rejected; there is no
/// catch-all variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// C - job is completed after having run
    Completed,
    /// E - job is exiting after having run
    Exiting,
    /// H - job is held
    Held,
    /// Q - job is queued, eligible to run or routed
    Queued,
    /// R - job is running
    Running,
    /// T - job is being moved to a new location
    Moving,
    /// W - job is waiting for its execution time to be reached
    Waiting,
    /// S - job is suspended
    Suspended,
}

impl StatusCode {
    pub const ALL: [StatusCode; 8] = [
        Self::Completed,
        Self::Exiting,
        Self::Held,
        Self::Queued,
        Self::Running,
        Self::Moving,
        Self::Waiting,
        Self::Suspended,
    ];

    /// Single-letter scheduler code.
    pub fn letter(self) -> &'static str {
        match self {
            Self::Completed => "C",
            Self::Exiting => "E",
            Self::Held => "H",
            Self::Queued => "Q",
            Self::Running => "R",
            Self::Moving => "T",
            Self::Waiting => "W",
            Self::Suspended => "S",
        }
    }
}

impl FromStr for StatusCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Self::Completed),
            "E" => Ok(Self::Exiting),
            "H" => Ok(Self::Held),
            "Q" => Ok(Self::Queued),
            "R" => Ok(Self::Running),
            "T" => Ok(Self::Moving),
            "W" => Ok(Self::Waiting),
            "S" => Ok(Self::Suspended),
            other => Err(ParseError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}
