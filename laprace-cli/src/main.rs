//! laprace CLI - lap race tracking for the timing desk
//!
//! Operators register teams, log the moment each team crosses the line and
//! read live standings:
//! - `init` creates the database schema
//! - `race` shows or sets the start time
//! - `team` manages registered teams
//! - `lap` logs and corrects lap completions
//! - `results` prints the current standings

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use laprace_core::{RaceConfig, RaceDesk};
use tracing::debug;

mod commands;
mod tracing_setup;

use commands::Output;
use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "laprace",
    author,
    version,
    about = "Lap race timing desk: teams, lap logs and live standings"
)]
struct Cli {
    /// SQLite database file (overrides config and LAPRACE_DATABASE)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (default: ~/.laprace/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the race tables (safe to run repeatedly)
    Init(commands::init::InitArgs),
    /// Show or set the race start time
    Race(commands::race::RaceArgs),
    /// Manage teams (list, add, update, delete)
    Team(commands::team::TeamArgs),
    /// Log and correct lap completions (add, list, update, delete)
    Lap(commands::lap::LapArgs),
    /// Print the current standings
    Results,
}

fn resolve_config(cli: &Cli) -> Result<RaceConfig> {
    // Priority: --db > LAPRACE_DATABASE > config file > default
    let mut config = RaceConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(db) = &cli.db {
        config.database = db.clone();
    }
    debug!(database = %config.database.display(), "resolved configuration");
    Ok(config)
}

async fn run(desk: &RaceDesk, command: Commands, out: Output) -> Result<()> {
    match command {
        Commands::Init(args) => commands::run_init(desk, args, out).await,
        Commands::Race(args) => commands::run_race(desk, args, out).await,
        Commands::Team(args) => commands::run_team(desk, args, out).await,
        Commands::Lap(args) => commands::run_lap(desk, args, out).await,
        Commands::Results => commands::run_results(desk, out).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug }).ok();

    let config = resolve_config(&cli)?;
    let desk = RaceDesk::open(&config).context("failed to open race database")?;
    let out = Output { json: cli.json };

    let result = run(&desk, cli.command, out).await;
    desk.shutdown().await;
    result
}
