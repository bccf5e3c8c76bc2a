//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default length of a CLI recording (30 seconds)
pub const DEFAULT_RECORD_DURATION_SECS: u64 = 30;

/// Upper bound for a single testimonial recording (5 minutes)
pub const DEFAULT_MAX_DURATION_SECS: u64 = 300;

/// Value object representing a time duration.
/// Immutable and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds, saturating at `u64::MAX` milliseconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs.saturating_mul(1000),
        }
    }

    /// Default recording duration (30 seconds)
    pub const fn default_duration() -> Self {
        Self::from_secs(DEFAULT_RECORD_DURATION_SECS)
    }

    /// Default upper bound for a recording (5 minutes)
    pub const fn default_max_duration() -> Self {
        Self::from_secs(DEFAULT_MAX_DURATION_SECS)
    }

    /// Get duration in seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }

    /// This duration, or `max` when it is longer
    pub fn clamp_to(self, max: Self) -> Self {
        Ord::min(self, max)
    }
}

/// Format an elapsed second counter as `mm:ss`
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse `<n>m`, `<n>s` or `<n>m<n>s` (case-insensitive).
    /// Zero-length durations are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_ascii_lowercase();

        let (minutes, rest) = match input.split_once('m') {
            Some((m, rest)) => (Some(m), rest),
            None => (None, input.as_str()),
        };
        let seconds = match rest {
            "" => None,
            r => Some(r.strip_suffix('s').ok_or_else(invalid)?),
        };
        if minutes.is_none() && seconds.is_none() {
            return Err(invalid());
        }

        let number = |digits: Option<&str>| -> Result<u64, DurationParseError> {
            match digits {
                None => Ok(0),
                Some(d) if !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()) => {
                    d.parse().map_err(|_| invalid())
                }
                Some(_) => Err(invalid()),
            }
        };

        let mins = number(minutes)?;
        let secs = number(seconds)?;
        let total_ms = mins
            .checked_mul(60)
            .and_then(|m| m.checked_add(secs))
            .and_then(|total| total.checked_mul(1000))
            .ok_or_else(invalid)?;
        if total_ms == 0 {
            return Err(invalid());
        }

        Ok(Self::from_millis(total_ms))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.as_secs() / 60, self.as_secs() % 60) {
            (0, secs) => write!(f, "{}s", secs),
            (mins, 0) => write!(f, "{}m", mins),
            (mins, secs) => write!(f, "{}m{}s", mins, secs),
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_duration()
    }
}
