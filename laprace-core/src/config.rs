//! Configuration for laprace
//!
//! Loaded from `~/.laprace/config.toml` (or an explicit path) when present,
//! falling back to defaults. Environment variables:
//! - `LAPRACE_DATABASE`: database file path (overrides the file setting)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::db::pool::DEFAULT_POOL_CAPACITY;
use crate::error::{RaceError, Result};

/// Environment variable overriding the database path
pub const DATABASE_ENV: &str = "LAPRACE_DATABASE";

const DEFAULT_DATABASE: &str = "db/race.sqlite";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// SQLite database file
    pub database: PathBuf,
    /// Idle connections kept for reuse
    pub pool_capacity: usize,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

impl RaceConfig {
    /// Default config file path: ~/.laprace/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".laprace/config.toml")
    }

    /// Load from `path` (or the default path), then apply the environment.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(database) = std::env::var(DATABASE_ENV) {
            if !database.is_empty() {
                config.database = PathBuf::from(database);
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            RaceError::config(format!("failed to read {}: {}", path.display(), err))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|err| RaceError::config(format!("invalid TOML: {}", err)))
    }

    fn validate(&self) -> Result<()> {
        if self.database.as_os_str().is_empty() {
            return Err(RaceError::config("database path cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = RaceConfig::default();
        assert_eq!(config.database, PathBuf::from("db/race.sqlite"));
        assert_eq!(config.pool_capacity, 2);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RaceConfig::from_toml("pool_capacity = 8").unwrap();
        assert_eq!(config.pool_capacity, 8);
        assert_eq!(config.database, PathBuf::from("db/race.sqlite"));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = RaceConfig::from_toml("pool_capacity = \"many\"").unwrap_err();
        assert!(matches!(err, RaceError::Config { .. }));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database = \"/tmp/other.sqlite\"").unwrap();

        let config = RaceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database, PathBuf::from("/tmp/other.sqlite"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = RaceConfig::load(Some(Path::new("/nonexistent/laprace.toml"))).unwrap_err();
        assert!(matches!(err, RaceError::Config { .. }));
    }
}
