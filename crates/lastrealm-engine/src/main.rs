//! # Last Realm
//!
//! Headless runner for the Last Realm simulation.
//!
//! Reads `lastrealm.toml` (or the path given as the first argument), plays
//! the configured runs with the autopilot and appends each summary to the
//! summary file.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use lastrealm_engine::run_report::{best_score, read_summaries};
use lastrealm_engine::{App, EngineConfig, CONFIG_FILE};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("lastrealm=info".parse()?))
        .init();

    info!("Last Realm starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let config = EngineConfig::load_from(&config_path);

    info!("Configuration loaded:");
    info!("  Class: {}", config.class.name());
    info!("  Mode: {}", config.mode.name());
    info!("  Tick rate: {} Hz", config.tick_rate);
    info!("  Summaries: {}", config.summary_path.display());

    let summary_path = config.summary_path.clone();
    let mut app = App::new(config);
    let outcomes = app.run_all().context("run failed")?;

    for (index, outcome) in outcomes.iter().enumerate() {
        match &outcome.summary {
            Some(summary) => info!(
                "Run {}: {:?} after {}s, {} kills, score {}",
                index + 1,
                outcome.state,
                summary.time_seconds,
                summary.kills,
                summary.score
            ),
            None => info!("Run {}: stopped at {:.1}s without ending", index + 1, outcome.elapsed),
        }
    }

    match read_summaries(&summary_path) {
        Ok(history) => {
            if let Some(best) = best_score(&history) {
                info!("Best recorded score: {} ({} runs on file)", best.score, history.len());
            }
        },
        Err(e) => warn!("Could not read run history: {e}"),
    }

    info!("Last Realm shutdown complete");
    Ok(())
}
