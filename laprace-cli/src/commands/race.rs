//! `laprace race` - the race start time

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use laprace_core::{LapTime, Race, RaceDesk};

use super::Output;

#[derive(Parser, Debug)]
pub struct RaceArgs {
    #[command(subcommand)]
    pub command: RaceCommands,
}

#[derive(Subcommand, Debug)]
pub enum RaceCommands {
    /// Show the race start time
    Show,
    /// Set (or replace) the race start time
    Start {
        /// Start time (HH:MM:SS)
        time: String,
    },
}

pub async fn run_race(desk: &RaceDesk, args: RaceArgs, out: Output) -> Result<()> {
    match args.command {
        RaceCommands::Show => {
            let race = desk.load_race().await.context("failed to load race")?;
            out.emit(&race, |race| println!("Race start: {}", race.start_time))
        }
        RaceCommands::Start { time } => {
            let start_time = LapTime::parse(&time)?;
            desk.save_race(start_time)
                .await
                .context("failed to set race start")?;
            out.emit(&Race { start_time }, |race| {
                println!("✓ Race start set to {}", race.start_time)
            })
        }
    }
}
