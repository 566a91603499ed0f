//! Headless engine binary for the Tycoon economy.
//!
//! Loads the configuration, builds the store, and lets the tick scheduler
//! run the economy until a termination condition is met. No player is
//! attached; the run shows how the shipped balance evolves on its own.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tycoon-config.yaml` (or `$TYCOON_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Validate the catalog and build the reducer
//! 4. Create the store and register observers
//! 5. Start the tick scheduler
//! 6. Wait for the tick limit, game over, or Ctrl-C
//! 7. Stop the scheduler and log the result

mod error;
mod observers;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tycoon_core::config::GameConfig;
use tycoon_core::reducer::Reducer;
use tycoon_core::store::Store;
use tycoon_types::{Action, GameState};

use crate::error::EngineError;
use crate::observers::{TickLimit, TickLog};

/// Environment variable naming the configuration file.
const CONFIG_PATH_ENV: &str = "TYCOON_CONFIG";

/// Configuration file used when `TYCOON_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "tycoon-config.yaml";

/// Why the headless run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EndReason {
    /// The configured tick budget was spent.
    TickLimit,
    /// An action ended the game.
    GameOver(String),
    /// The operator pressed Ctrl-C.
    Interrupted,
    /// The store shut down on its own.
    StoreClosed,
}

/// Application entry point for the Tycoon engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the store fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("tycoon-engine starting");
    info!(
        ms_per_tick = config.ms_per_tick,
        max_ticks = config.simulation.max_ticks,
        commodities = config.commodities.len(),
        "Configuration loaded"
    );

    // 3-7. Run.
    let (final_state, reason) = run(config).await?;
    log_run_end(&final_state, &reason);

    info!("tycoon-engine shutdown complete");
    Ok(())
}

/// Drive one headless game from the initial state to an end condition.
async fn run(config: GameConfig) -> Result<(Arc<GameState>, EndReason), EngineError> {
    let max_ticks = config.simulation.max_ticks;
    let reducer = Reducer::new(config)?;

    let mut store = Store::new(reducer);
    store.register(TickLog::new());
    store.register(TickLimit::new(max_ticks));
    let handle = store.handle();
    let mut snapshots = handle.subscribe();
    let store_task = tokio::spawn(store.run());

    handle.dispatch(Action::StartTick)?;
    info!("Tick scheduler requested, entering run loop");

    let end_limit = TickLimit::new(max_ticks);
    let reason = tokio::select! {
        reason = wait_for_end(&mut snapshots, &end_limit) => reason,
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|source| EngineError::Signal { source })?;
            EndReason::Interrupted
        }
    };

    if reason != EndReason::StoreClosed {
        handle.dispatch(Action::StopTick)?;
        handle.shutdown()?;
    }
    let final_state = store_task.await?;
    Ok((final_state, reason))
}

/// Resolve once a published snapshot meets an end condition.
async fn wait_for_end(
    snapshots: &mut watch::Receiver<Arc<GameState>>,
    limit: &TickLimit,
) -> EndReason {
    match snapshots.wait_for(|s| s.is_over() || limit.reached(s)).await {
        Ok(state) => match &state.game_over {
            Some(reason) => EndReason::GameOver(reason.clone()),
            None => EndReason::TickLimit,
        },
        Err(_closed) => EndReason::StoreClosed,
    }
}

/// Load the game configuration.
///
/// Reads the file named by `TYCOON_CONFIG`, or `tycoon-config.yaml` relative
/// to the current working directory. A missing file yields the defaults.
fn load_config() -> Result<GameConfig, EngineError> {
    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        Ok(GameConfig::from_file(&config_path)?)
    } else {
        let mut config = GameConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

/// Log the run's end reason and the final economy.
fn log_run_end(state: &GameState, reason: &EndReason) {
    info!(reason = ?reason, total_ticks = state.tick, "Run ended");
    if state.tick == 0 {
        warn!("Run ended with no ticks executed");
        return;
    }

    info!(
        capital = %state.capital,
        labor = state.labor,
        assigned = state.assigned_labor(),
        wages = %state.wages,
        labor_savings = %state.labor_savings,
        unrest = %state.unrest,
        "Final economy"
    );
    for commodity in state.commodities.iter().filter(|c| c.unlocked) {
        info!(
            commodity = %commodity.name,
            price = %commodity.price,
            inventory = commodity.inventory,
            demand = commodity.demand,
            sold = commodity.num_sold,
            "Final market"
        );
    }
}
