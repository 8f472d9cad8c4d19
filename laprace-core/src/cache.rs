//! In-memory mirror of the team table
//!
//! Lookups by id are served from an immutable [`CachedTeamSet`] snapshot
//! behind a readers/writer lock. A reload fetches from storage without
//! holding the lock, then swaps the whole snapshot in one step, so readers
//! see either the old set or the new one and never a mix. Concurrent
//! reloads are safe; the last one to finish wins.
//!
//! There is no expiry. The cache is refreshed when it is empty before a
//! cache-dependent read, and on every full team listing.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqliteConnection;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::db::repos::TeamRepo;
use crate::error::Result;
use crate::models::{Team, TeamId};

/// Point-in-time snapshot of all teams
#[derive(Debug, Default)]
pub struct CachedTeamSet {
    by_id: HashMap<TeamId, Team>,
    ordered: Vec<Team>,
}

impl CachedTeamSet {
    /// Build a snapshot from teams already ordered by race number.
    pub fn new(ordered: Vec<Team>) -> Self {
        let by_id = ordered.iter().map(|team| (team.id, team.clone())).collect();
        Self { by_id, ordered }
    }

    pub fn get(&self, id: TeamId) -> TeamLookup {
        match self.by_id.get(&id) {
            Some(team) => TeamLookup::Found(team.clone()),
            None => {
                warn!(team_id = id, "team not in cache");
                TeamLookup::NotInCache(id)
            }
        }
    }

    /// Teams ordered by race number
    pub fn teams(&self) -> &[Team] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamLookup {
    Found(Team),
    NotInCache(TeamId),
}

impl TeamLookup {
    /// The team, or the well-known placeholder for a miss.
    pub fn or_placeholder(self) -> Team {
        match self {
            Self::Found(team) => team,
            Self::NotInCache(_) => Team::placeholder(),
        }
    }

    pub fn found(self) -> Option<Team> {
        match self {
            Self::Found(team) => Some(team),
            Self::NotInCache(_) => None,
        }
    }
}

/// Shared team cache, constructed once per service and passed by handle.
#[derive(Debug, Default)]
pub struct TeamCache {
    snapshot: RwLock<Arc<CachedTeamSet>>,
}

impl TeamCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. Cheap; callers keep a consistent view while holding it.
    pub async fn snapshot(&self) -> Arc<CachedTeamSet> {
        Arc::clone(&*self.snapshot.read().await)
    }

    pub async fn get(&self, id: TeamId) -> TeamLookup {
        self.snapshot().await.get(id)
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshot.read().await.is_empty()
    }

    /// Fetch all teams and replace the snapshot.
    pub async fn reload(&self, conn: &mut SqliteConnection) -> Result<Vec<Team>> {
        let teams = TeamRepo::new(conn).list().await?;
        let fresh = Arc::new(CachedTeamSet::new(teams.clone()));

        *self.snapshot.write().await = fresh;
        debug!(count = teams.len(), "team cache refreshed");
        Ok(teams)
    }

    /// Drop the snapshot so the next cache-dependent read reloads it.
    pub async fn invalidate(&self) {
        *self.snapshot.write().await = Arc::new(CachedTeamSet::default());
        debug!("team cache invalidated");
    }

    /// Run `f` against a non-empty snapshot, reloading once if needed.
    ///
    /// A reload failure short-circuits and is returned as is.
    pub async fn with_cache<T, F>(&self, conn: &mut SqliteConnection, f: F) -> Result<T>
    where
        F: FnOnce(&CachedTeamSet) -> T,
    {
        if self.is_empty().await {
            self.reload(conn).await?;
        }
        let snapshot = self.snapshot().await;
        Ok(f(&snapshot))
    }
}
