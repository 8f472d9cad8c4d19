//! Data-access layer for a lap race.
//!
//! Operators log the wall-clock moment each team crosses the line; standings
//! are derived from those logs on demand. Everything goes through
//! [`RaceDesk`], which owns the connection pool and the team cache.

pub mod cache;
pub mod config;
pub mod db;
pub mod desk;
pub mod error;
pub mod models;
pub mod standings;
pub mod time;

pub use cache::{CachedTeamSet, TeamCache, TeamLookup};
pub use config::RaceConfig;
pub use db::{Connector, RacePool, ResourcePool, SqliteConnector};
pub use desk::RaceDesk;
pub use error::{RaceError, Result};
pub use models::{parse_number, Race, Standing, Team, TeamId, TeamName, TimeLog};
pub use standings::{rank, LapTally, RankedTally};
pub use time::{LapDuration, LapTime};
