//! Configuration loading and typed config structures for the Tycoon engine.
//!
//! The canonical configuration lives in `tycoon-config.yaml`. Every field has
//! a default matching the shipped game balance, so an empty file (or no file)
//! yields a playable game. Configuration is read once at startup and never
//! changes afterwards; a malformed catalog is a fatal error.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tycoon_types::DemandCurve;

use crate::catalog::{self, CatalogError};

/// Environment variable overriding [`GameConfig::ms_per_tick`].
pub const MS_PER_TICK_ENV: &str = "TYCOON_MS_PER_TICK";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The commodity catalog is malformed.
    #[error("invalid catalog: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: CatalogError,
    },

    /// A scalar setting is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `tycoon-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Real-time milliseconds between scheduled ticks.
    #[serde(default = "default_ms_per_tick")]
    pub ms_per_tick: u64,

    /// Maximum number of ticker messages retained.
    #[serde(default = "default_max_ticker_length")]
    pub max_ticker_length: usize,

    /// Starting values for the aggregate scalars.
    #[serde(default)]
    pub initial: InitialConfig,

    /// Labor pool growth parameters.
    #[serde(default)]
    pub growth: GrowthConfig,

    /// How wages and purchases move the workforce's savings.
    #[serde(default)]
    pub savings: SavingsPolicy,

    /// Weights of the unrest index.
    #[serde(default)]
    pub unrest: UnrestConfig,

    /// Headless run boundaries.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// The commodity catalog, in evaluation order.
    #[serde(default = "catalog::default_catalog")]
    pub commodities: Vec<CommodityConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ms_per_tick: default_ms_per_tick(),
            max_ticker_length: default_max_ticker_length(),
            initial: InitialConfig::default(),
            growth: GrowthConfig::default(),
            savings: SavingsPolicy::default(),
            unrest: UnrestConfig::default(),
            simulation: SimulationBoundsConfig::default(),
            logging: LoggingConfig::default(),
            commodities: catalog::default_catalog(),
        }
    }
}

impl GameConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// `TYCOON_MS_PER_TICK` overrides `ms_per_tick` when set to a valid
    /// integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error if the result is not playable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error if the result is not playable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(MS_PER_TICK_ENV) {
            match val.parse::<u64>() {
                Ok(ms) => self.ms_per_tick = ms,
                Err(e) => {
                    tracing::warn!(value = %val, error = %e, "ignoring invalid {MS_PER_TICK_ENV}");
                }
            }
        }
    }

    /// Check every setting the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for out-of-range scalars and
    /// [`ConfigError::Catalog`] for a malformed commodity catalog.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ms_per_tick == 0 {
            return Err(ConfigError::Invalid {
                reason: "ms_per_tick must be at least 1".to_owned(),
            });
        }
        if self.max_ticker_length == 0 {
            return Err(ConfigError::Invalid {
                reason: "max_ticker_length must be at least 1".to_owned(),
            });
        }
        if self.growth.period == 0 {
            return Err(ConfigError::Invalid {
                reason: "growth.period must be at least 1".to_owned(),
            });
        }
        if self.growth.rate.is_sign_negative() {
            return Err(ConfigError::Invalid {
                reason: "growth.rate must not be negative".to_owned(),
            });
        }
        if self.initial.wages.is_sign_negative() {
            return Err(ConfigError::Invalid {
                reason: "initial.wages must not be negative".to_owned(),
            });
        }
        if self.initial.unrest < Decimal::ZERO || self.initial.unrest > Decimal::ONE_HUNDRED {
            return Err(ConfigError::Invalid {
                reason: "initial.unrest must be within 0..=100".to_owned(),
            });
        }
        catalog::validate(&self.commodities)?;
        Ok(())
    }
}

/// Starting values for the aggregate scalars.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InitialConfig {
    /// Starting capital.
    #[serde(default = "default_capital")]
    pub capital: Decimal,

    /// Starting unassigned labor pool.
    #[serde(default = "default_labor")]
    pub labor: u64,

    /// Starting wage per assigned worker per tick.
    #[serde(default = "default_wages")]
    pub wages: Decimal,

    /// Starting unrest percentage.
    #[serde(default)]
    pub unrest: Decimal,

    /// Starting workforce savings.
    #[serde(default = "default_labor_savings")]
    pub labor_savings: Decimal,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            capital: default_capital(),
            labor: default_labor(),
            wages: default_wages(),
            unrest: Decimal::ZERO,
            labor_savings: default_labor_savings(),
        }
    }
}

/// Labor pool growth parameters.
///
/// Every `period` ticks the pool grows by `max(1, floor(population² * rate))`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GrowthConfig {
    /// Growth applies on ticks that are a multiple of this value.
    #[serde(default = "default_growth_period")]
    pub period: u64,

    /// Quadratic growth coefficient.
    #[serde(default = "default_growth_rate")]
    pub rate: Decimal,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            period: default_growth_period(),
            rate: default_growth_rate(),
        }
    }
}

/// How the workforce's savings change each tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SavingsPolicy {
    /// Workers receive the wage bill and pay for every unit sold.
    #[default]
    Circulating,
    /// Workers bank a fixed fraction of the wage bill and spend nothing.
    FractionOfWages {
        /// Share of wages saved, in `[0, 1]`.
        fraction: Decimal,
    },
}

/// Weights of the unrest index.
///
/// Unrest is `100 * (unemployment * unemployment_weight + wage_gap *
/// wage_weight + in_debt * debt_weight)`, clamped to `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnrestConfig {
    /// Weight of the unemployed share of the population.
    #[serde(default = "default_half")]
    pub unemployment_weight: Decimal,

    /// Weight of the relative shortfall of wages against cost of living.
    #[serde(default = "default_half")]
    pub wage_weight: Decimal,

    /// Weight applied while the workforce's savings are negative.
    #[serde(default = "default_debt_weight")]
    pub debt_weight: Decimal,
}

impl Default for UnrestConfig {
    fn default() -> Self {
        Self {
            unemployment_weight: default_half(),
            wage_weight: default_half(),
            debt_weight: default_debt_weight(),
        }
    }
}

/// Headless run boundaries.
///
/// A value of 0 means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop the headless engine after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// One catalog entry as written in the configuration file.
///
/// `name`, `labor_required`, `price` and `demand_curve` are required; a
/// missing field fails the whole load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommodityConfig {
    /// Unique display name.
    pub name: String,

    /// Labor units per unit of output.
    pub labor_required: Decimal,

    /// Starting price.
    pub price: Decimal,

    /// Starting inventory.
    #[serde(default)]
    pub inventory: u64,

    /// Demand shown before the first tick.
    #[serde(default = "default_initial_demand")]
    pub demand: u64,

    /// Whether the commodity is playable from the start.
    #[serde(default)]
    pub unlocked: bool,

    /// Demand strategy.
    pub demand_curve: DemandCurve,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_ms_per_tick() -> u64 {
    500
}

const fn default_max_ticker_length() -> usize {
    7
}

fn default_capital() -> Decimal {
    Decimal::from(10_000_u32)
}

const fn default_labor() -> u64 {
    10
}

fn default_wages() -> Decimal {
    Decimal::TEN
}

fn default_labor_savings() -> Decimal {
    Decimal::from(500_u32)
}

const fn default_growth_period() -> u64 {
    10
}

fn default_growth_rate() -> Decimal {
    Decimal::new(1, 3)
}

fn default_half() -> Decimal {
    Decimal::new(5, 1)
}

fn default_debt_weight() -> Decimal {
    Decimal::new(25, 2)
}

const fn default_initial_demand() -> u64 {
    1
}

fn default_log_level() -> String {
    "info".to_owned()
}
