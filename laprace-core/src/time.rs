//! Wall-clock lap timestamps and lap durations
//!
//! Timestamps are fixed `HH:MM:SS` strings (24-hour, zero-padded, no date or
//! timezone). They sort lexically in chronological order, which the storage
//! queries rely on.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RaceError, Result};

const TIME_FORMAT: &str = "%H:%M:%S";

/// Strict wall-clock pattern, rejects "9:00:00" and "24:00:00"
static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]$").expect("invalid time regex")
});

/// Validated `HH:MM:SS` timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LapTime(NaiveTime);

impl LapTime {
    /// Parse a strict `HH:MM:SS` value.
    ///
    /// # Example
    /// ```
    /// use laprace_core::LapTime;
    ///
    /// assert!(LapTime::parse("09:05:00").is_ok());
    /// assert!(LapTime::parse("9:05:00").is_err());  // not zero-padded
    /// assert!(LapTime::parse("09:05").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if !TIME_RE.is_match(s) {
            return Err(RaceError::malformed("time", s, "expected HH:MM:SS"));
        }
        NaiveTime::parse_from_str(s, TIME_FORMAT)
            .map(Self)
            .map_err(|_| RaceError::malformed("time", s, "expected HH:MM:SS"))
    }

    pub fn from_hms(hour: u32, min: u32, sec: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, min, sec).map(Self)
    }

    /// Signed duration from `earlier` to `self`
    pub fn since(&self, earlier: &LapTime) -> LapDuration {
        LapDuration::from_secs(self.seconds_of_day() - earlier.seconds_of_day())
    }

    fn seconds_of_day(&self) -> i64 {
        i64::from(self.0.num_seconds_from_midnight())
    }
}

impl fmt::Display for LapTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl FromStr for LapTime {
    type Err = RaceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for LapTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LapTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Whole-second signed duration, rendered like `1h2m3s`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LapDuration(i64);

impl LapDuration {
    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for LapDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let total = self.0.unsigned_abs();
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

        if hours > 0 {
            write!(f, "{}h{}m{}s", hours, minutes, seconds)
        } else if minutes > 0 {
            write!(f, "{}m{}s", minutes, seconds)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}

impl Serialize for LapDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
