#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a Siegeline action log and prints the score.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::de::from_str;
use siegeline_core::LevelDefinition;
use siegeline_runner::{ActionLog, Progress, Runner};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Replays an action log against a level and prints the final score.
#[derive(Debug, Parser)]
#[command(name = "siegeline", version, about)]
struct Cli {
    /// Level definition JSON file.
    #[arg(long)]
    level: PathBuf,
    /// Action log JSON file.
    #[arg(long)]
    actions: PathBuf,
    /// Log a progress line every hundred simulated ticks.
    #[arg(long)]
    progress: bool,
    /// Print the whole run summary as JSON instead of the bare score.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Siegeline command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let level: LevelDefinition = from_str(&read(&cli.level)?)
        .with_context(|| format!("failed to parse level {}", cli.level.display()))?;
    let log: ActionLog = from_str(&read(&cli.actions)?)
        .with_context(|| format!("failed to parse action log {}", cli.actions.display()))?;

    let mut report = |progress: &Progress| {
        info!(
            tick = progress.tick_count,
            last_action_tick = ?progress.last_action_tick,
            score = progress.score,
            lives = progress.lives,
            round = progress.round,
            credits = progress.credits,
            "progress"
        );
    };
    let progress: Option<&mut dyn FnMut(&Progress)> = if cli.progress {
        Some(&mut report)
    } else {
        None
    };

    let summary = Runner::new(level)
        .run(&log, progress)
        .context("replay failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.score);
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
