//! Real-time driver for the tactics world simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tactics-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Initialize the world systems
//! 4. Catch up on `TACTICS_CATCH_UP_HOURS` of absence, if set
//! 5. Auto-tick until Ctrl-C or `simulation.max_real_time_seconds`
//! 6. Log the latest headlines and clean up

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tactics_core::{AutoTick, SimulationConfig};
use tactics_engine::WorldSystems;
use tactics_engine::error::RunError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Config file looked up in the working directory.
const CONFIG_PATH: &str = "tactics-config.yaml";

/// Environment variable holding hours of absence to simulate at start-up.
const CATCH_UP_ENV: &str = "TACTICS_CATCH_UP_HOURS";

/// Headlines logged at shutdown.
const HEADLINES_AT_EXIT: usize = 5;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, initialization, or catch-up fails.
#[tokio::main]
async fn main() -> Result<(), RunError> {
    let config = load_config()?;
    init_tracing(&config);
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_minutes = config.time.tick_minutes,
        tick_interval_ms = config.time.tick_interval_ms,
        "tactics-engine starting"
    );

    let interval = Duration::from_millis(config.time.tick_interval_ms);
    let max_real_time = config.simulation.max_real_time_seconds;

    let mut systems = WorldSystems::new(config);
    systems.init_world_systems()?;

    if let Some(hours) = catch_up_hours()? {
        let outcome = systems.catch_up(hours)?;
        if let Some(summary) = outcome.summary {
            for highlight in &summary.highlights {
                info!(
                    category = ?highlight.category,
                    severity = ?highlight.severity,
                    at = %highlight.at,
                    "{}",
                    highlight.headline
                );
            }
        }
        if !outcome.failures.is_empty() {
            warn!(failures = outcome.failures.len(), "Managers failed during catch-up");
        }
    }

    let shared = systems.into_shared();
    let mut driver = AutoTick::new();
    driver.start(Arc::clone(&shared), interval);

    if max_real_time > 0 {
        tokio::select! {
            () = tokio::time::sleep(Duration::from_secs(max_real_time)) => {
                info!(seconds = max_real_time, "Real-time limit reached");
            }
            () = shutdown_signal() => {}
        }
    } else {
        shutdown_signal().await;
    }

    driver.stop().await;

    let mut systems = shared.lock().await;
    info!(at = %systems.now(), ticks = driver.ticks(), "Simulation stopped");
    for article in systems.headlines(HEADLINES_AT_EXIT) {
        info!(
            category = ?article.category,
            country = article.country_code.as_deref().unwrap_or("-"),
            "{}",
            article.headline
        );
    }
    systems.cleanup_world_systems();
    info!("tactics-engine shutdown complete");
    Ok(())
}

/// Load `tactics-config.yaml`, falling back to defaults when it is absent.
fn load_config() -> Result<SimulationConfig, RunError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.world.apply_env_overrides();
        Ok(config)
    }
}

/// `RUST_LOG` wins over `logging.level`.
fn init_tracing(config: &SimulationConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.json {
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

fn catch_up_hours() -> Result<Option<f64>, RunError> {
    let Ok(value) = std::env::var(CATCH_UP_ENV) else {
        return Ok(None);
    };
    match value.trim().parse::<f64>() {
        Ok(hours) if hours.is_finite() && hours >= 0.0 => Ok(Some(hours)),
        _ => Err(RunError::CatchUpHours { value }),
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl-C received"),
        Err(err) => error!(error = %err, "Failed to listen for Ctrl-C"),
    }
}
