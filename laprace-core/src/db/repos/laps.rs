//! Time-log repository
//!
//! One row per completed lap, keyed by (team, `HH:MM:SS`). Batches of laps
//! logged at the same instant are written in one transaction.

use sqlx::{Connection, SqliteConnection};
use tracing::{debug, info, warn};

use crate::cache::TeamCache;
use crate::error::{RaceError, Result};
use crate::models::{TeamId, TimeLog};
use crate::time::LapTime;

const TIME_LOG_CREATE: &str = "INSERT INTO time_log (team_id, time) VALUES (?, ?)";
const TIME_LOG_UPDATE: &str = "UPDATE time_log SET time = ? WHERE team_id = ? AND time = ?";
const TIME_LOG_DELETE: &str = "DELETE FROM time_log WHERE team_id = ? AND time = ?";
const TIME_LOG_BY_TEAM: &str = "SELECT time FROM time_log WHERE team_id = ? ORDER BY time DESC";
const TIME_LOG_RECENT: &str = r#"
    SELECT team_id, time
    FROM time_log
    ORDER BY time DESC, team_id ASC
    LIMIT ?
"#;

/// Row count returned by `recent` when no positive limit is given.
pub const DEFAULT_RECENT_LIMIT: i64 = 100;

/// Time-log repository
pub struct LapRepo<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> LapRepo<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Log one lap for every team in `team_ids`, all at `time`.
    ///
    /// All rows are written or none are: any failing insert rolls the
    /// transaction back and its error is returned.
    pub async fn append(&mut self, team_ids: &[TeamId], time: LapTime) -> Result<()> {
        if team_ids.is_empty() {
            return Err(RaceError::malformed("teams", "", "at least one team id is required"));
        }
        debug!(?team_ids, %time, "saving time logs");

        let mut tx = self.conn.begin().await?;
        match insert_all(&mut tx, team_ids, time).await {
            Ok(()) => {
                tx.commit().await?;
                info!(?team_ids, %time, "time logs saved");
                Ok(())
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "rollback of time log batch failed");
                }
                Err(err)
            }
        }
    }

    /// A team's laps, newest first, with derived lap durations.
    pub async fn by_team(&mut self, cache: &TeamCache, team_id: TeamId) -> Result<Vec<TimeLog>> {
        debug!(team_id, "loading time logs for team");
        let rows: Vec<(String,)> = sqlx::query_as(TIME_LOG_BY_TEAM)
            .bind(team_id)
            .fetch_all(&mut *self.conn)
            .await?;

        let team = cache
            .with_cache(&mut *self.conn, |set| set.get(team_id).or_placeholder())
            .await?;

        let mut logs = rows
            .into_iter()
            .map(|(time,)| {
                Ok(TimeLog {
                    team: team.clone(),
                    time: LapTime::parse(&time)?,
                    lap_time: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        derive_lap_times(&mut logs);
        debug!(count = logs.len(), "loaded time logs");
        Ok(logs)
    }

    /// Most recent laps across all teams.
    ///
    /// Ordered by time descending, then team id ascending. `None`, zero or
    /// a negative limit falls back to [`DEFAULT_RECENT_LIMIT`].
    pub async fn recent(&mut self, cache: &TeamCache, limit: Option<i64>) -> Result<Vec<TimeLog>> {
        let limit = effective_limit(limit);
        debug!(limit, "loading recent time logs");

        let rows: Vec<(TeamId, String)> = sqlx::query_as(TIME_LOG_RECENT)
            .bind(limit)
            .fetch_all(&mut *self.conn)
            .await?;

        let logs = cache
            .with_cache(&mut *self.conn, |set| {
                rows.into_iter()
                    .map(|(team_id, time)| {
                        Ok(TimeLog {
                            team: set.get(team_id).or_placeholder(),
                            time: LapTime::parse(&time)?,
                            lap_time: None,
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .await??;

        debug!(count = logs.len(), "loaded time logs");
        Ok(logs)
    }

    /// Move one lap to a corrected time.
    pub async fn update(&mut self, team_id: TeamId, old: LapTime, new: LapTime) -> Result<()> {
        let context = format!("updating time log ({}, {}, {})", team_id, old, new);
        debug!("{}", context);

        let done = sqlx::query(TIME_LOG_UPDATE)
            .bind(new.to_string())
            .bind(team_id)
            .bind(old.to_string())
            .execute(&mut *self.conn)
            .await
            .map_err(|err| RaceError::from_write(err, context.as_str(), Some(team_id)))?;

        if done.rows_affected() != 1 {
            return Err(RaceError::no_rows_affected(context, done.rows_affected()));
        }
        info!(team_id, %old, %new, "time log updated");
        Ok(())
    }

    pub async fn delete(&mut self, team_id: TeamId, time: LapTime) -> Result<()> {
        let context = format!("deleting time log ({}, {})", team_id, time);
        debug!("{}", context);

        let done = sqlx::query(TIME_LOG_DELETE)
            .bind(team_id)
            .bind(time.to_string())
            .execute(&mut *self.conn)
            .await?;

        if done.rows_affected() != 1 {
            return Err(RaceError::no_rows_affected(context, done.rows_affected()));
        }
        info!(team_id, %time, "time log deleted");
        Ok(())
    }
}

async fn insert_all(conn: &mut SqliteConnection, team_ids: &[TeamId], time: LapTime) -> Result<()> {
    let time_value = time.to_string();
    for &team_id in team_ids {
        let context = format!("saving time log ({}, {})", team_id, time);
        let done = sqlx::query(TIME_LOG_CREATE)
            .bind(team_id)
            .bind(&time_value)
            .execute(&mut *conn)
            .await
            .map_err(|err| RaceError::from_write(err, context.as_str(), Some(team_id)))?;

        if done.rows_affected() != 1 {
            return Err(RaceError::no_rows_affected(context, done.rows_affected()));
        }
    }
    Ok(())
}

fn effective_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(n) if n > 0 => n,
        _ => DEFAULT_RECENT_LIMIT,
    }
}

/// Attach lap durations to laps ordered newest first.
///
/// Each entry gets the time until the next (newer) entry, i.e. the duration
/// of the lap that started there. The newest entry has none.
pub fn derive_lap_times(logs: &mut [TimeLog]) {
    for i in 1..logs.len() {
        let newer = logs[i - 1].time;
        logs[i].lap_time = Some(newer.since(&logs[i].time));
    }
}
