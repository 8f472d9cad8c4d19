//! Domain records and input validation
//!
//! Raw operator input (identifiers, names) is validated when these types are
//! built, so invalid input is rejected as `MalformedInput` before any
//! storage access.

use serde::Serialize;

use crate::error::{RaceError, Result};
use crate::time::{LapDuration, LapTime};

/// Storage-assigned team identity
pub type TeamId = i64;

/// Maximum length for team display names
const MAX_TEAM_NAME_LEN: usize = 64;

/// Parse a numeric identifier (team id, race number, limit).
pub fn parse_number(field: &'static str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| RaceError::malformed(field, value, "expected an integer"))
}

/// Validated team display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamName(String);

impl TeamName {
    /// Surrounding whitespace is trimmed; the rest must be non-empty and at
    /// most 64 characters.
    pub fn new(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(RaceError::malformed("team name", s, "cannot be empty"));
        }
        if trimmed.chars().count() > MAX_TEAM_NAME_LEN {
            return Err(RaceError::malformed(
                "team name",
                s,
                "exceeds maximum length of 64 characters",
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Registered team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Team {
    pub id: TeamId,
    /// Race number, operator-assigned and unique
    pub number: i64,
    pub name: String,
}

impl Team {
    /// Stand-in rendered for ids the cache does not know about
    pub fn placeholder() -> Self {
        Self {
            id: -1,
            number: -1,
            name: "Not in cache".to_string(),
        }
    }
}

/// One recorded lap completion, denormalized with its team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeLog {
    pub team: Team,
    pub time: LapTime,
    /// Duration of the lap that started at `time`; `None` while the lap is
    /// still running (newest entry) or when not derived.
    pub lap_time: Option<LapDuration>,
}

/// The race singleton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Race {
    pub start_time: LapTime,
}

/// One row of the race standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub rank: u32,
    pub team: Team,
    pub laps: u32,
    pub elapsed: LapDuration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers() {
        assert_eq!(parse_number("team id", "42").unwrap(), 42);
        assert_eq!(parse_number("team id", " 7 ").unwrap(), 7);
        assert_eq!(parse_number("limit", "-1").unwrap(), -1);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = parse_number("team id", "abc").unwrap_err();
        assert!(matches!(err, RaceError::MalformedInput { field: "team id", .. }));
        assert!(parse_number("team id", "").is_err());
        assert!(parse_number("team id", "1.5").is_err());
    }

    #[test]
    fn team_names() {
        assert_eq!(TeamName::new("  Rabbits ").unwrap().as_str(), "Rabbits");
        assert!(TeamName::new("   ").is_err());
        assert!(TeamName::new(&"x".repeat(64)).is_ok());
        assert!(TeamName::new(&"x".repeat(65)).is_err());
    }

    #[test]
    fn placeholder_is_well_known() {
        let team = Team::placeholder();
        assert_eq!((team.id, team.number, team.name.as_str()), (-1, -1, "Not in cache"));
    }
}
