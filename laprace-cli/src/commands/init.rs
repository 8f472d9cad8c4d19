//! `laprace init` - create the schema, optionally setting the start time

use anyhow::{Context, Result};
use clap::Parser;
use laprace_core::{LapTime, RaceDesk};
use serde_json::json;

use super::Output;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Also set the race start time (HH:MM:SS)
    #[arg(long)]
    pub start: Option<String>,
}

pub async fn run_init(desk: &RaceDesk, args: InitArgs, out: Output) -> Result<()> {
    let start = args.start.as_deref().map(LapTime::parse).transpose()?;

    desk.migrate().await.context("failed to create schema")?;
    if let Some(start) = start {
        desk.save_race(start).await.context("failed to set race start")?;
    }

    let database = desk.pool().connector().path().display().to_string();
    out.emit(&json!({ "database": database, "start_time": start }), |_| {
        println!("✓ Initialized {}", database);
        if let Some(start) = start {
            println!("  race start: {}", start);
        }
    })
}
