//! Race standings
//!
//! Standings are recomputed from the time log on every call. Storage
//! supplies one aggregate per team (lap count, latest lap); ordering and
//! ranking happen in [`rank`]:
//!
//! - more laps first
//! - equal laps: smaller elapsed time first
//! - fully tied rows share a rank and the following rank skips
//!   (competition ranking, `1, 1, 3`)
//! - fully tied rows are listed by team id

use sqlx::SqliteConnection;
use tracing::debug;

use crate::cache::TeamCache;
use crate::db::repos::RaceRepo;
use crate::error::{RaceError, Result};
use crate::models::{Standing, TeamId};
use crate::time::{LapDuration, LapTime};

const TALLY_QUERY: &str = r#"
    SELECT team_id, count(1) AS laps, max(time) AS latest
    FROM time_log
    GROUP BY team_id
"#;

/// Per-team lap aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapTally {
    pub team_id: TeamId,
    pub laps: u32,
    pub latest: LapTime,
}

/// A tally with its rank, before team denormalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedTally {
    pub rank: u32,
    pub team_id: TeamId,
    pub laps: u32,
    pub elapsed: LapDuration,
}

/// Order tallies and assign competition ranks.
pub fn rank(tallies: &[LapTally], start: LapTime) -> Vec<RankedTally> {
    let mut rows: Vec<RankedTally> = tallies
        .iter()
        .map(|tally| RankedTally {
            rank: 0,
            team_id: tally.team_id,
            laps: tally.laps,
            elapsed: tally.latest.since(&start),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.laps
            .cmp(&a.laps)
            .then(a.elapsed.cmp(&b.elapsed))
            .then(a.team_id.cmp(&b.team_id))
    });

    // Sorted, so the rows strictly ahead of a tie group are exactly the
    // rows before its first member.
    let mut group_rank = 0;
    for i in 0..rows.len() {
        let tied = i > 0 && rows[i - 1].laps == rows[i].laps && rows[i - 1].elapsed == rows[i].elapsed;
        if !tied {
            group_rank = i as u32 + 1;
        }
        rows[i].rank = group_rank;
    }
    rows
}

/// Current standings, denormalized through the team cache.
///
/// # Errors
///
/// `NotFound` when the race start time has not been set.
pub async fn compute(conn: &mut SqliteConnection, cache: &TeamCache) -> Result<Vec<Standing>> {
    debug!("loading results");
    let race = RaceRepo::new(&mut *conn).load().await?;

    let rows: Vec<(TeamId, i64, String)> = sqlx::query_as(TALLY_QUERY).fetch_all(&mut *conn).await?;
    let tallies = rows
        .into_iter()
        .map(|(team_id, laps, latest)| {
            let laps = u32::try_from(laps)
                .map_err(|_| RaceError::malformed("lap count", laps.to_string(), "out of range"))?;
            Ok(LapTally {
                team_id,
                laps,
                latest: LapTime::parse(&latest)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let ranked = rank(&tallies, race.start_time);
    let standings = cache
        .with_cache(&mut *conn, |set| {
            ranked
                .into_iter()
                .map(|row| Standing {
                    rank: row.rank,
                    team: set.get(row.team_id).or_placeholder(),
                    laps: row.laps,
                    elapsed: row.elapsed,
                })
                .collect::<Vec<_>>()
        })
        .await?;

    debug!(count = standings.len(), "loaded results");
    Ok(standings)
}
