//! Team repository
//!
//! Plain storage access for the team table. The cache-refreshing variants
//! (`list` reloads the cache, mutations invalidate it) live on `RaceDesk`.

use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::{RaceError, Result};
use crate::models::{Team, TeamId, TeamName};

const TEAM_QUERY: &str = "SELECT id, number, name FROM team ORDER BY number";
const TEAM_INSERT: &str = "INSERT INTO team (number, name) VALUES (?, ?)";
const TEAM_UPDATE: &str = "UPDATE team SET number = ?, name = ? WHERE id = ?";
const TEAM_DELETE: &str = "DELETE FROM team WHERE id = ?";

/// Team repository
pub struct TeamRepo<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> TeamRepo<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// All teams, ordered by race number ascending.
    pub async fn list(&mut self) -> Result<Vec<Team>> {
        debug!("loading teams");
        let teams: Vec<Team> = sqlx::query_as(TEAM_QUERY).fetch_all(&mut *self.conn).await?;
        debug!(count = teams.len(), "loaded teams");
        Ok(teams)
    }

    /// Register a team, returning its storage id.
    ///
    /// A duplicate race number is a `ConstraintViolation`.
    pub async fn add(&mut self, number: i64, name: &TeamName) -> Result<TeamId> {
        let context = format!("adding team ({}, {})", number, name.as_str());
        debug!("{}", context);

        let done = sqlx::query(TEAM_INSERT)
            .bind(number)
            .bind(name.as_str())
            .execute(&mut *self.conn)
            .await
            .map_err(|err| RaceError::from_write(err, context.as_str(), None))?;

        if done.rows_affected() != 1 {
            return Err(RaceError::no_rows_affected(context, done.rows_affected()));
        }

        let id = done.last_insert_rowid();
        info!(id, number, name = name.as_str(), "team added");
        Ok(id)
    }

    pub async fn update(&mut self, id: TeamId, number: i64, name: &TeamName) -> Result<()> {
        let context = format!("updating team ({}, {}, {})", id, number, name.as_str());
        debug!("{}", context);

        let done = sqlx::query(TEAM_UPDATE)
            .bind(number)
            .bind(name.as_str())
            .bind(id)
            .execute(&mut *self.conn)
            .await
            .map_err(|err| RaceError::from_write(err, context.as_str(), None))?;

        if done.rows_affected() != 1 {
            return Err(RaceError::no_rows_affected(context, done.rows_affected()));
        }
        info!(id, number, name = name.as_str(), "team updated");
        Ok(())
    }

    /// Delete a team. Fails with `ConstraintViolation` while it still has laps.
    pub async fn delete(&mut self, id: TeamId) -> Result<()> {
        let context = format!("deleting team ({})", id);
        debug!("{}", context);

        let done = sqlx::query(TEAM_DELETE)
            .bind(id)
            .execute(&mut *self.conn)
            .await
            .map_err(|err| RaceError::from_write(err, context.as_str(), None))?;

        if done.rows_affected() != 1 {
            return Err(RaceError::no_rows_affected(context, done.rows_affected()));
        }
        info!(id, "team deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::memory_db;

    fn name(s: &str) -> TeamName {
        TeamName::new(s).unwrap()
    }

    #[tokio::test]
    async fn list_is_ordered_by_number() {
        let mut conn = memory_db().await;
        let mut repo = TeamRepo::new(&mut conn);

        repo.add(12, &name("Hares")).await.unwrap();
        repo.add(3, &name("Snails")).await.unwrap();
        repo.add(7, &name("Foxes")).await.unwrap();

        let numbers: Vec<_> = repo.list().await.unwrap().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![3, 7, 12]);
    }

    #[tokio::test]
    async fn duplicate_number_is_constraint_violation() {
        let mut conn = memory_db().await;
        let mut repo = TeamRepo::new(&mut conn);

        repo.add(1, &name("Hares")).await.unwrap();
        let err = repo.add(1, &name("Other")).await.unwrap_err();
        assert!(matches!(err, RaceError::ConstraintViolation { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn update_and_delete_need_exactly_one_row() {
        let mut conn = memory_db().await;
        let mut repo = TeamRepo::new(&mut conn);

        let id = repo.add(1, &name("Hares")).await.unwrap();
        repo.update(id, 2, &name("Fast Hares")).await.unwrap();

        let teams = repo.list().await.unwrap();
        assert_eq!(teams, vec![Team { id, number: 2, name: "Fast Hares".into() }]);

        let err = repo.update(id + 100, 5, &name("Ghost")).await.unwrap_err();
        assert!(matches!(err, RaceError::NoRowsAffected { affected: 0, .. }));

        repo.delete(id).await.unwrap();
        let err = repo.delete(id).await.unwrap_err();
        assert!(matches!(err, RaceError::NoRowsAffected { affected: 0, .. }));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_team_with_laps_is_rejected() {
        let mut conn = memory_db().await;
        let id = TeamRepo::new(&mut conn).add(1, &name("Hares")).await.unwrap();
        sqlx::query("INSERT INTO time_log (team_id, time) VALUES (?, '10:00:00')")
            .bind(id)
            .execute(&mut conn)
            .await
            .unwrap();

        let err = TeamRepo::new(&mut conn).delete(id).await.unwrap_err();
        assert!(matches!(err, RaceError::ConstraintViolation { .. }), "{err:?}");
    }
}
