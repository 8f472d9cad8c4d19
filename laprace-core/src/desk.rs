//! Race desk - the operations exposed to outer layers
//!
//! Every verb borrows one pooled connection for the duration of one logical
//! operation and hands it back afterwards, whether the operation succeeded
//! or not. The team cache is owned here and refreshed on demand.

use tracing::info;

use crate::cache::TeamCache;
use crate::config::RaceConfig;
use crate::db::migrations;
use crate::db::pool::{RacePool, ResourcePool, SqliteConnector};
use crate::db::repos::{LapRepo, RaceRepo, TeamRepo};
use crate::error::Result;
use crate::models::{Race, Standing, Team, TeamId, TeamName, TimeLog};
use crate::standings;
use crate::time::LapTime;

/// Shared entry point; wrap in an `Arc` to serve concurrent callers.
pub struct RaceDesk {
    pool: RacePool,
    cache: TeamCache,
}

impl RaceDesk {
    /// Build a desk over the configured SQLite database.
    ///
    /// No connection is opened yet; the first verb opens one.
    pub fn open(config: &RaceConfig) -> Result<Self> {
        let connector = SqliteConnector::new(&config.database);
        connector.ensure_parent_dir()?;
        info!(
            database = %config.database.display(),
            pool_capacity = config.pool_capacity,
            "race desk ready"
        );
        Ok(Self::with_pool(ResourcePool::new(connector, config.pool_capacity)))
    }

    pub fn with_pool(pool: RacePool) -> Self {
        Self {
            pool,
            cache: TeamCache::new(),
        }
    }

    pub fn pool(&self) -> &RacePool {
        &self.pool
    }

    pub fn cache(&self) -> &TeamCache {
        &self.cache
    }

    /// Create the race tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        let result = migrations::run(&mut conn).await;
        self.pool.release(conn).await;
        result
    }

    // ------------------------------------------------------------------
    // Teams
    // ------------------------------------------------------------------

    /// All teams by race number. Always refreshes the cache.
    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        let mut conn = self.pool.acquire().await?;
        let result = self.cache.reload(&mut conn).await;
        self.pool.release(conn).await;
        result
    }

    pub async fn add_team(&self, number: i64, name: &TeamName) -> Result<TeamId> {
        let mut conn = self.pool.acquire().await?;
        let result = TeamRepo::new(&mut conn).add(number, name).await;
        self.pool.release(conn).await;

        if result.is_ok() {
            self.cache.invalidate().await;
        }
        result
    }

    pub async fn update_team(&self, id: TeamId, number: i64, name: &TeamName) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        let result = TeamRepo::new(&mut conn).update(id, number, name).await;
        self.pool.release(conn).await;

        if result.is_ok() {
            self.cache.invalidate().await;
        }
        result
    }

    pub async fn delete_team(&self, id: TeamId) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        let result = TeamRepo::new(&mut conn).delete(id).await;
        self.pool.release(conn).await;

        if result.is_ok() {
            self.cache.invalidate().await;
        }
        result
    }

    // ------------------------------------------------------------------
    // Time logs
    // ------------------------------------------------------------------

    /// Log a lap for each team at `time` (all or nothing) and return the
    /// logged entries with their teams resolved.
    pub async fn append_laps(&self, team_ids: &[TeamId], time: LapTime) -> Result<Vec<TimeLog>> {
        let mut conn = self.pool.acquire().await?;
        let appended = LapRepo::new(&mut conn).append(team_ids, time).await;
        let result = match appended {
            Ok(()) => {
                self.cache
                    .with_cache(&mut conn, |set| {
                        team_ids
                            .iter()
                            .map(|&team_id| TimeLog {
                                team: set.get(team_id).or_placeholder(),
                                time,
                                lap_time: None,
                            })
                            .collect()
                    })
                    .await
            }
            Err(err) => Err(err),
        };
        self.pool.release(conn).await;
        result
    }

    /// One team's laps, newest first, with lap durations.
    pub async fn team_laps(&self, team_id: TeamId) -> Result<Vec<TimeLog>> {
        let mut conn = self.pool.acquire().await?;
        let result = LapRepo::new(&mut conn).by_team(&self.cache, team_id).await;
        self.pool.release(conn).await;
        result
    }

    /// Latest laps across all teams (default 100).
    pub async fn recent_laps(&self, limit: Option<i64>) -> Result<Vec<TimeLog>> {
        let mut conn = self.pool.acquire().await?;
        let result = LapRepo::new(&mut conn).recent(&self.cache, limit).await;
        self.pool.release(conn).await;
        result
    }

    pub async fn update_lap(&self, team_id: TeamId, old: LapTime, new: LapTime) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        let result = LapRepo::new(&mut conn).update(team_id, old, new).await;
        self.pool.release(conn).await;
        result
    }

    pub async fn delete_lap(&self, team_id: TeamId, time: LapTime) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        let result = LapRepo::new(&mut conn).delete(team_id, time).await;
        self.pool.release(conn).await;
        result
    }

    // ------------------------------------------------------------------
    // Results and race
    // ------------------------------------------------------------------

    pub async fn standings(&self) -> Result<Vec<Standing>> {
        let mut conn = self.pool.acquire().await?;
        let result = standings::compute(&mut conn, &self.cache).await;
        self.pool.release(conn).await;
        result
    }

    pub async fn load_race(&self) -> Result<Race> {
        let mut conn = self.pool.acquire().await?;
        let result = RaceRepo::new(&mut conn).load().await;
        self.pool.release(conn).await;
        result
    }

    pub async fn save_race(&self, start_time: LapTime) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        let result = RaceRepo::new(&mut conn).save(start_time).await;
        self.pool.release(conn).await;
        result
    }

    /// Close idle connections. Call once when the process stops serving.
    pub async fn shutdown(&self) {
        self.pool.drain().await;
        info!("race desk shut down");
    }
}
