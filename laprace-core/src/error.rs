//! Structured error types for laprace-core.
//!
//! Every storage and validation failure is classified here so outer layers
//! can map it to a response. Binary crates (laprace-cli) wrap these with
//! `anyhow` for context.

use thiserror::Error;

/// Main error type for laprace-core operations
#[derive(Error, Debug)]
pub enum RaceError {
    /// A storage connection could not be opened. Fatal for a serving process.
    #[error("storage unavailable at {location}: {source}")]
    StorageUnavailable {
        location: String,
        #[source]
        source: sqlx::Error,
    },

    /// Uniqueness (or other integrity) constraint rejected the statement
    #[error("constraint violation while {context}: {detail}")]
    ConstraintViolation { context: String, detail: String },

    /// Foreign key points at a team that does not exist
    #[error("unknown team {team_id}")]
    UnknownTeam { team_id: i64 },

    /// A statement expected to change exactly one row changed `affected`
    #[error("no change while {context} ({affected} rows affected)")]
    NoRowsAffected { context: String, affected: u64 },

    /// Requested record does not exist
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// Input rejected before reaching storage
    #[error("invalid {field} {value:?}: {reason}")]
    MalformedInput {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Any other storage failure, propagated unmodified
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for laprace-core operations
pub type Result<T> = std::result::Result<T, RaceError>;

impl RaceError {
    pub fn storage_unavailable(location: impl Into<String>, source: sqlx::Error) -> Self {
        Self::StorageUnavailable {
            location: location.into(),
            source,
        }
    }

    pub fn no_rows_affected(context: impl Into<String>, affected: u64) -> Self {
        Self::NoRowsAffected {
            context: context.into(),
            affected,
        }
    }

    pub fn malformed(field: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedInput {
            field,
            value: value.into(),
            reason,
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Classify a failed write statement.
    ///
    /// Unique and check violations become `ConstraintViolation`, foreign key
    /// violations become `UnknownTeam` when the statement referenced a team,
    /// anything else stays a plain `Database` error.
    pub fn from_write(err: sqlx::Error, context: impl Into<String>, team_id: Option<i64>) -> Self {
        use sqlx::error::ErrorKind;

        let kind = match &err {
            sqlx::Error::Database(db_err) => db_err.kind(),
            _ => return Self::Database(err),
        };

        match (kind, team_id) {
            (ErrorKind::ForeignKeyViolation, Some(team_id)) => Self::UnknownTeam { team_id },
            (
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation,
                _,
            ) => Self::ConstraintViolation {
                context: context.into(),
                detail: err.to_string(),
            },
            _ => Self::Database(err),
        }
    }

    /// True for the error that should stop a serving process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }
}
