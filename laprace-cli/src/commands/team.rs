//! `laprace team` - team registration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use laprace_core::{parse_number, RaceDesk, TeamName};
use serde_json::json;

use super::Output;

#[derive(Parser, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommands,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// List teams by race number
    List,
    /// Register a team
    Add {
        /// Race number (unique)
        number: String,
        /// Display name
        name: String,
    },
    /// Change a team's number and name
    Update {
        /// Team ID
        id: String,
        /// New race number
        number: String,
        /// New display name
        name: String,
    },
    /// Remove a team that has no laps
    Delete {
        /// Team ID
        id: String,
    },
}

pub async fn run_team(desk: &RaceDesk, args: TeamArgs, out: Output) -> Result<()> {
    match args.command {
        TeamCommands::List => {
            let teams = desk.list_teams().await.context("failed to list teams")?;
            out.emit(&teams, |teams| {
                println!("┌─ {} teams", teams.len());
                for team in teams {
                    println!("│  #{:<4} {:<32} (id {})", team.number, team.name, team.id);
                }
            })
        }
        TeamCommands::Add { number, name } => {
            let number = parse_number("team number", &number)?;
            let name = TeamName::new(&name)?;
            let id = desk.add_team(number, &name).await.context("failed to add team")?;
            out.emit(
                &json!({ "id": id, "number": number, "name": name.as_str() }),
                |_| println!("✓ Added team #{} {} (id {})", number, name.as_str(), id),
            )
        }
        TeamCommands::Update { id, number, name } => {
            let id = parse_number("team id", &id)?;
            let number = parse_number("team number", &number)?;
            let name = TeamName::new(&name)?;
            desk.update_team(id, number, &name)
                .await
                .context("failed to update team")?;
            out.emit(
                &json!({ "id": id, "number": number, "name": name.as_str() }),
                |_| println!("✓ Updated team {}", id),
            )
        }
        TeamCommands::Delete { id } => {
            let id = parse_number("team id", &id)?;
            desk.delete_team(id).await.context("failed to delete team")?;
            out.emit(&json!({ "id": id, "deleted": true }), |_| {
                println!("✓ Deleted team {}", id)
            })
        }
    }
}
