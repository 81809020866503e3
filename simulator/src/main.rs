use std::path::PathBuf;

use clap::Parser;
use door_control::MoveResult;

mod config;
mod scenario;

use crate::config::{Config, RawConfig};

#[derive(Parser, Debug)]
#[command(about, author = "Danilo Bargen", version)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "simulator.toml")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "door_simulator=info,door_control=info".to_string()),
        )
        .init();

    // Parse config
    let raw_config = match RawConfig::load(&args.config) {
        Ok(val) => val,
        Err(e) => {
            println!("Error: Failed to load config: {:#}", e);
            println!();
            println!(
                "Example config:\n\n{}",
                toml::to_string(&RawConfig::example())?
            );
            return Ok(());
        }
    };
    let config: Config = raw_config.try_into()?;

    let outcomes = scenario::run(&config)?;
    for outcome in &outcomes {
        tracing::info!(
            "Target {:>3}%: {:?} after {} ms, {} presses, now at {}% [State={:?}]",
            outcome.target,
            outcome.result,
            outcome.elapsed_ms,
            outcome.presses,
            outcome.snapshot.position,
            outcome.snapshot.state,
        );
    }

    let failed = outcomes
        .iter()
        .filter(|o| o.result == MoveResult::Fail)
        .count();
    if failed > 0 {
        tracing::warn!("{} of {} moves failed", failed, outcomes.len());
    }

    Ok(())
}
