//! `laprace lap` - lap completions
//!
//! ```bash
//! laprace lap add --time 10:05:00 --team 1 --team 4
//! laprace lap list --team 1
//! laprace lap update --team 1 --time 10:05:00 --new-time 10:05:30
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use laprace_core::{parse_number, LapTime, RaceDesk, TeamId, TimeLog};
use serde_json::json;

use super::Output;

#[derive(Parser, Debug)]
pub struct LapArgs {
    #[command(subcommand)]
    pub command: LapCommands,
}

#[derive(Subcommand, Debug)]
pub enum LapCommands {
    /// Log one lap for each team at the same time (all or nothing)
    Add {
        /// Time the teams crossed the line (HH:MM:SS)
        #[arg(long)]
        time: String,
        /// Team ID (repeat for several teams)
        #[arg(long = "team", required = true)]
        teams: Vec<String>,
    },
    /// List laps, newest first
    List {
        /// Only this team's laps, with lap durations
        #[arg(long)]
        team: Option<String>,
        /// Max laps across all teams (default 100, ignored with --team)
        #[arg(long)]
        limit: Option<String>,
    },
    /// Correct the time of a logged lap
    Update {
        /// Team ID
        #[arg(long)]
        team: String,
        /// Currently logged time
        #[arg(long)]
        time: String,
        /// Corrected time
        #[arg(long)]
        new_time: String,
    },
    /// Remove a logged lap
    Delete {
        /// Team ID
        #[arg(long)]
        team: String,
        /// Logged time
        #[arg(long)]
        time: String,
    },
}

pub async fn run_lap(desk: &RaceDesk, args: LapArgs, out: Output) -> Result<()> {
    match args.command {
        LapCommands::Add { time, teams } => {
            let time = LapTime::parse(&time)?;
            let team_ids = teams
                .iter()
                .map(|id| parse_number("team id", id))
                .collect::<laprace_core::Result<Vec<TeamId>>>()?;

            let logged = desk
                .append_laps(&team_ids, time)
                .await
                .context("failed to log laps")?;
            out.emit(&logged, |logged| {
                for log in logged {
                    println!("✓ {} #{} {}", log.time, log.team.number, log.team.name);
                }
            })
        }
        LapCommands::List { team, limit } => {
            let logs = match team {
                Some(team) => {
                    let team_id = parse_number("team id", &team)?;
                    desk.team_laps(team_id).await
                }
                None => {
                    let limit = limit.as_deref().map(|l| parse_number("limit", l)).transpose()?;
                    desk.recent_laps(limit).await
                }
            }
            .context("failed to list laps")?;
            out.emit(&logs, |logs| print_logs(logs))
        }
        LapCommands::Update {
            team,
            time,
            new_time,
        } => {
            let team_id = parse_number("team id", &team)?;
            let old = LapTime::parse(&time)?;
            let new = LapTime::parse(&new_time)?;
            desk.update_lap(team_id, old, new)
                .await
                .context("failed to update lap")?;
            out.emit(
                &json!({ "team_id": team_id, "time": old, "new_time": new }),
                |_| println!("✓ Team {} lap {} → {}", team_id, old, new),
            )
        }
        LapCommands::Delete { team, time } => {
            let team_id = parse_number("team id", &team)?;
            let time = LapTime::parse(&time)?;
            desk.delete_lap(team_id, time)
                .await
                .context("failed to delete lap")?;
            out.emit(
                &json!({ "team_id": team_id, "time": time, "deleted": true }),
                |_| println!("✓ Deleted team {} lap {}", team_id, time),
            )
        }
    }
}

fn print_logs(logs: &[TimeLog]) {
    if logs.is_empty() {
        println!("(no laps)");
        return;
    }
    for log in logs {
        let lap = log
            .lap_time
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  #{:<4} {:<32} {}",
            log.time, log.team.number, log.team.name, lap
        );
    }
}
