//! Engine binary for the Biologist analyzer.
//!
//! Wires a [`LifeSource`] into a [`Biologist`], lets it run until the board
//! settles (or a timeout elapses), and logs a report covering both stored
//! and cycle-remapped generations.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `biologist.yaml` (or `$BIOLOGIST_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Seed the life board from the `board` section
//! 4. Initialize the analysis engine and register it
//! 5. Start it and wait for it to settle
//! 6. Stop it and log the report

mod error;

use std::path::PathBuf;
use std::time::Duration;

use biologist_core::config::{BiologistConfig, LoggingConfig};
use biologist_core::{Biologist, QueryError, Registry};
use biologist_life::LifeSource;
use biologist_types::Status;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable overriding the config file location.
const CONFIG_ENV: &str = "BIOLOGIST_CONFIG";

/// Config file looked up in the working directory by default.
const DEFAULT_CONFIG_PATH: &str = "biologist.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the report fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, loaded_from) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("biologist-engine starting");
    let config_source = loaded_from
        .as_deref()
        .map_or_else(|| "defaults".to_owned(), |path| path.display().to_string());
    info!(source = %config_source, "Configuration loaded");

    // 3. Seed the board.
    let source = LifeSource::from_config(&config.board).map_err(EngineError::from)?;
    let seed = source.seed();
    info!(
        width = config.board.width,
        height = config.board.height,
        pattern = config.board.pattern,
        rule = config.board.rule,
        living = seed.living.len(),
        "Board seeded"
    );

    // 4. Initialize and register the engine.
    let registry = Registry::new();
    let biologist = Biologist::initialize(seed, Box::new(source), &config.engine)
        .await
        .map_err(EngineError::from)?;
    let biologist = registry.add(biologist).await;

    // 5. Run until settled or timed out.
    biologist.start().await.map_err(EngineError::from)?;
    wait_until_settled(&biologist, config.engine.run_timeout_ms).await;

    // 6. Stop and report.
    registry.stop_all().await;
    report(&biologist, config.engine.report_generations).await?;

    info!(id = %biologist.id(), "biologist-engine shutdown complete");
    Ok(())
}

/// Load configuration from `$BIOLOGIST_CONFIG` or `biologist.yaml`.
///
/// Returns the path it was read from, or `None` if no file exists and the
/// defaults are used.
fn load_config() -> Result<(BiologistConfig, Option<PathBuf>), EngineError> {
    let config_path = std::env::var_os(CONFIG_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = BiologistConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        Ok((BiologistConfig::default(), None))
    }
}

/// Install the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Wait for the worker to end on its own, up to `timeout_ms` (0 = forever).
async fn wait_until_settled(biologist: &Biologist, timeout_ms: u64) {
    if timeout_ms == 0 {
        biologist.finished().await;
        return;
    }
    let timeout = Duration::from_millis(timeout_ms);
    if tokio::time::timeout(timeout, biologist.finished()).await.is_err() {
        warn!(
            id = %biologist.id(),
            timeout_ms,
            "Board did not settle before the run timeout; stopping"
        );
    }
}

/// Log the outcome and the first `generations` analyses, stored or virtual.
async fn report(biologist: &Biologist, generations: usize) -> Result<(), EngineError> {
    let stored = biologist.analysis_count().await?;
    let exit = biologist
        .exit()
        .map_or_else(|| "unknown".to_owned(), |exit| exit.to_string());
    let cycle = biologist
        .cycle()
        .map_or_else(|| "none".to_owned(), |cycle| cycle.to_string());
    info!(stored, exit, cycle, "Analysis finished");

    let window = biologist.analyses(0, generations).await?;
    for (generation, analysis) in window.iter().enumerate() {
        info!(
            generation,
            status = %analysis.status,
            living = analysis.living.len(),
            changes = analysis.changes.len(),
            virtual_query = u64::try_from(generation).is_ok_and(|n| n >= stored),
            "Generation"
        );
    }
    if window.len() < generations {
        info!(
            available = window.len(),
            requested = generations,
            "Later generations are not available"
        );
    }

    let last = match biologist.analysis_at(stored.saturating_sub(1)).await {
        Ok(analysis) => analysis,
        Err(QueryError::NotAvailable { .. }) => return Ok(()),
        Err(err) => return Err(err.into()),
    };
    let settled = matches!(last.status, Status::Stable | Status::Dead);
    let analysis = serde_json::to_string(&*last)?;
    info!(settled, analysis, "Last stored analysis");
    Ok(())
}
