//! `laprace results` - current standings

use anyhow::{Context, Result};
use laprace_core::RaceDesk;

use super::Output;

pub async fn run_results(desk: &RaceDesk, out: Output) -> Result<()> {
    let standings = desk.standings().await.context("failed to compute standings")?;
    out.emit(&standings, |standings| {
        if standings.is_empty() {
            println!("(no laps logged)");
            return;
        }
        println!("{:>4}  {:<5} {:<32} {:>4}  {}", "RANK", "NO.", "TEAM", "LAPS", "ELAPSED");
        for row in standings {
            println!(
                "{:>4}  #{:<4} {:<32} {:>4}  {}",
                row.rank, row.team.number, row.team.name, row.laps, row.elapsed
            );
        }
    })
}
