//! Race record repository - the single start-time row

use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::{RaceError, Result};
use crate::models::Race;
use crate::time::LapTime;

const RACE_QUERY: &str = "SELECT time FROM start_time WHERE id = 1";
const RACE_SAVE: &str = "INSERT OR REPLACE INTO start_time (id, time) VALUES (1, ?)";

/// Race record repository
pub struct RaceRepo<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> RaceRepo<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Load the race. `NotFound` until a start time has been saved once.
    pub async fn load(&mut self) -> Result<Race> {
        debug!("loading race");
        let (time,): (String,) = sqlx::query_as(RACE_QUERY)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or(RaceError::NotFound { resource: "race" })?;

        Ok(Race {
            start_time: LapTime::parse(&time)?,
        })
    }

    /// Replace the start time unconditionally.
    pub async fn save(&mut self, start_time: LapTime) -> Result<()> {
        let context = format!("saving race start ({})", start_time);
        debug!("{}", context);

        let done = sqlx::query(RACE_SAVE)
            .bind(start_time.to_string())
            .execute(&mut *self.conn)
            .await
            .map_err(|err| RaceError::from_write(err, context.as_str(), None))?;

        if done.rows_affected() != 1 {
            return Err(RaceError::no_rows_affected(context, done.rows_affected()));
        }
        info!(%start_time, "race start saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::memory_db;

    #[tokio::test]
    async fn load_before_init_is_not_found() {
        let mut conn = memory_db().await;
        let err = RaceRepo::new(&mut conn).load().await.unwrap_err();
        assert!(matches!(err, RaceError::NotFound { resource: "race" }));
    }

    #[tokio::test]
    async fn save_replaces_start_time() {
        let mut conn = memory_db().await;
        let mut repo = RaceRepo::new(&mut conn);

        repo.save(LapTime::parse("09:00:00").unwrap()).await.unwrap();
        repo.save(LapTime::parse("09:30:00").unwrap()).await.unwrap();

        let race = repo.load().await.unwrap();
        assert_eq!(race.start_time.to_string(), "09:30:00");

        let (rows,): (i64,) = sqlx::query_as("SELECT count(1) FROM start_time")
            .fetch_one(&mut conn)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }
}
