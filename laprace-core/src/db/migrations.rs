//! Schema bootstrap
//!
//! Idempotent: every statement is `IF NOT EXISTS`. The race start time is
//! not inserted here; it is set once by the operator (`race start`).

use sqlx::SqliteConnection;
use tracing::info;

use crate::error::Result;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS team (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    number INTEGER NOT NULL UNIQUE,
    name   TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS time_log (
    team_id INTEGER NOT NULL REFERENCES team(id),
    time    TEXT    NOT NULL CHECK (length(time) = 8),
    PRIMARY KEY (team_id, time)
);

CREATE INDEX IF NOT EXISTS time_log_time ON time_log (time DESC, team_id);

CREATE TABLE IF NOT EXISTS start_time (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    time TEXT    NOT NULL CHECK (length(time) = 8)
);
"#;

/// Create the race tables on this connection's database.
pub async fn run(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::raw_sql(SCHEMA).execute(&mut *conn).await?;
    info!("database migrations complete");
    Ok(())
}
