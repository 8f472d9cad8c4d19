//! Command implementations for the laprace CLI

pub mod init;
pub mod lap;
pub mod race;
pub mod results;
pub mod team;

use anyhow::Result;
use serde::Serialize;

// Re-export dispatcher functions for flat access from main.rs
pub use init::run_init;
pub use lap::run_lap;
pub use race::run_race;
pub use results::run_results;
pub use team::run_team;

/// Output mode selected by the global `--json` flag
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as pretty JSON, or hand it to `human` for text output.
    pub fn emit<T, F>(&self, value: &T, human: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T),
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}
