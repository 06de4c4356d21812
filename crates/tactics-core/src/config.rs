//! Configuration loading and typed config structures for the world simulation.
//!
//! The canonical configuration lives in `tactics-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every section is optional; missing keys fall back to the defaults below.

use std::path::Path;

use serde::Deserialize;
use tactics_types::WorldEventCategory;

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

    /// A value parsed but is outside its valid range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `tactics-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World identity and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Tick cadence and catch-up policy.
    #[serde(default)]
    pub time: TimeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Process run limits for the binary.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Daily base rates for world events.
    #[serde(default)]
    pub world_events: WorldEventRates,

    /// Faction heat tuning.
    #[serde(default)]
    pub heat: HeatConfig,

    /// Dynamic economy tuning.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Tracked NPC population.
    #[serde(default)]
    pub npc: NpcConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `TACTICS_SEED`, when set to an integer, overrides `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.world.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time.tick_minutes == 0 {
            return Err(invalid("time.tick_minutes must be at least 1"));
        }
        if self.time.tick_interval_ms < MIN_TICK_INTERVAL_MS {
            return Err(invalid(&format!(
                "time.tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}"
            )));
        }
        if self.time.max_catch_up_hours < self.time.catch_up_threshold_hours {
            return Err(invalid(
                "time.max_catch_up_hours must not be below time.catch_up_threshold_hours",
            ));
        }

        let rates = [
            ("world_events.gang_territory", self.world_events.gang_territory),
            ("world_events.political", self.world_events.political),
            ("world_events.economic", self.world_events.economic),
            ("world_events.crime_wave", self.world_events.crime_wave),
            ("world_events.superhuman", self.world_events.superhuman),
            ("world_events.natural_disaster", self.world_events.natural_disaster),
            ("world_events.military", self.world_events.military),
            ("world_events.social", self.world_events.social),
            ("heat.global_decay_per_hour", self.heat.global_decay_per_hour),
            ("heat.hunt_threshold", self.heat.hunt_threshold),
            ("economy.reversion_rate", self.economy.reversion_rate),
            ("economy.fluctuation", self.economy.fluctuation),
            ("economy.condition_change_chance", self.economy.condition_change_chance),
        ];
        for (key, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(&format!("{key} must be a non-negative number")));
            }
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// Smallest accepted auto-tick interval.
pub const MIN_TICK_INTERVAL_MS: u64 = 100;

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable campaign name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed. Every boundary stream is derived from it.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl WorldConfig {
    /// Override the seed from `TACTICS_SEED` when it holds an integer.
    pub fn apply_env_overrides(&mut self) {
        if let Some(seed) = std::env::var("TACTICS_SEED")
            .ok()
            .and_then(|val| val.trim().parse().ok())
        {
            self.seed = seed;
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
        }
    }
}

/// Tick cadence and catch-up configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeConfig {
    /// Game minutes advanced by one default tick.
    #[serde(default = "default_tick_minutes")]
    pub tick_minutes: u64,

    /// Real milliseconds between auto-ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Gaps shorter than this are advanced normally, without a summary.
    #[serde(default = "default_catch_up_threshold_hours")]
    pub catch_up_threshold_hours: u64,

    /// Longest gap a single catch-up will simulate.
    #[serde(default = "default_max_catch_up_hours")]
    pub max_catch_up_hours: u64,

    /// Highlights kept per summary category.
    #[serde(default = "default_highlights_per_category")]
    pub highlights_per_category: usize,
}

impl TimeConfig {
    /// One default tick expressed in hours.
    #[allow(clippy::cast_precision_loss)]
    pub fn tick_hours(&self) -> f64 {
        self.tick_minutes as f64 / 60.0
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            tick_minutes: default_tick_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
            catch_up_threshold_hours: default_catch_up_threshold_hours(),
            max_catch_up_hours: default_max_catch_up_hours(),
            highlights_per_category: default_highlights_per_category(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Simulation boundary configuration for the binary.
///
/// A value of 0 for `max_real_time_seconds` means run until interrupted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Maximum wall-clock seconds before the binary shuts down.
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

/// Daily probability of each world event category, per country.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldEventRates {
    /// Gang territory changes.
    #[serde(default = "default_gang_rate")]
    pub gang_territory: f64,
    /// Political events.
    #[serde(default = "default_political_rate")]
    pub political: f64,
    /// Economic events.
    #[serde(default = "default_economic_rate")]
    pub economic: f64,
    /// Crime waves.
    #[serde(default = "default_crime_rate")]
    pub crime_wave: f64,
    /// Superhuman incidents.
    #[serde(default = "default_superhuman_rate")]
    pub superhuman: f64,
    /// Natural disasters.
    #[serde(default = "default_disaster_rate")]
    pub natural_disaster: f64,
    /// Military events.
    #[serde(default = "default_military_rate")]
    pub military: f64,
    /// Social unrest and festivals.
    #[serde(default = "default_social_rate")]
    pub social: f64,
}

impl Default for WorldEventRates {
    fn default() -> Self {
        Self {
            gang_territory: default_gang_rate(),
            political: default_political_rate(),
            economic: default_economic_rate(),
            crime_wave: default_crime_rate(),
            superhuman: default_superhuman_rate(),
            natural_disaster: default_disaster_rate(),
            military: default_military_rate(),
            social: default_social_rate(),
        }
    }
}

impl WorldEventRates {
    /// Daily rate for one category.
    pub const fn for_category(&self, category: WorldEventCategory) -> f64 {
        match category {
            WorldEventCategory::GangTerritory => self.gang_territory,
            WorldEventCategory::Political => self.political,
            WorldEventCategory::Economic => self.economic,
            WorldEventCategory::CrimeWave => self.crime_wave,
            WorldEventCategory::Superhuman => self.superhuman,
            WorldEventCategory::NaturalDisaster => self.natural_disaster,
            WorldEventCategory::Military => self.military,
            WorldEventCategory::Social => self.social,
        }
    }
}

/// Faction heat tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HeatConfig {
    /// Global heat lost per hour.
    #[serde(default = "default_global_decay_per_hour")]
    pub global_decay_per_hour: f64,

    /// Hours after an increase during which heat does not decay.
    #[serde(default = "default_decay_block_hours")]
    pub decay_block_hours: u64,

    /// Faction heat at which hunt missions are issued.
    #[serde(default = "default_hunt_threshold")]
    pub hunt_threshold: f64,
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            global_decay_per_hour: default_global_decay_per_hour(),
            decay_block_hours: default_decay_block_hours(),
            hunt_threshold: default_hunt_threshold(),
        }
    }
}

/// Dynamic economy tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EconomyConfig {
    /// Fraction of the distance to 50 that supply and demand recover per day.
    #[serde(default = "default_reversion_rate")]
    pub reversion_rate: f64,

    /// Width of the daily random supply/demand swing.
    #[serde(default = "default_fluctuation")]
    pub fluctuation: f64,

    /// Daily chance that a country's market condition changes on its own.
    #[serde(default = "default_condition_change_chance")]
    pub condition_change_chance: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            reversion_rate: default_reversion_rate(),
            fluctuation: default_fluctuation(),
            condition_change_chance: default_condition_change_chance(),
        }
    }
}

/// Tracked NPC population.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NpcConfig {
    /// NPCs seeded per roster city.
    #[serde(default = "default_npcs_per_city")]
    pub npcs_per_city: u32,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            npcs_per_city: default_npcs_per_city(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Living World".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_minutes() -> u64 {
    10
}

const fn default_tick_interval_ms() -> u64 {
    1_000
}

const fn default_catch_up_threshold_hours() -> u64 {
    4
}

const fn default_max_catch_up_hours() -> u64 {
    720
}

const fn default_highlights_per_category() -> usize {
    3
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_gang_rate() -> f64 {
    0.3
}

const fn default_political_rate() -> f64 {
    0.1
}

const fn default_economic_rate() -> f64 {
    0.2
}

const fn default_crime_rate() -> f64 {
    0.4
}

const fn default_superhuman_rate() -> f64 {
    0.15
}

const fn default_disaster_rate() -> f64 {
    0.02
}

const fn default_military_rate() -> f64 {
    0.05
}

const fn default_social_rate() -> f64 {
    0.25
}

const fn default_global_decay_per_hour() -> f64 {
    0.5
}

const fn default_decay_block_hours() -> u64 {
    6
}

const fn default_hunt_threshold() -> f64 {
    60.0
}

const fn default_reversion_rate() -> f64 {
    0.1
}

const fn default_fluctuation() -> f64 {
    5.0
}

const fn default_condition_change_chance() -> f64 {
    0.05
}

const fn default_npcs_per_city() -> u32 {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.time.tick_minutes, 10);
        assert_eq!(config.time.max_catch_up_hours, 720);
        assert_eq!(config.npc.npcs_per_city, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test World"
  seed: 123

time:
  tick_minutes: 30
  tick_interval_ms: 250
  catch_up_threshold_hours: 2
  max_catch_up_hours: 48
  highlights_per_category: 5

logging:
  level: "debug"
  json: true

simulation:
  max_real_time_seconds: 60

world_events:
  crime_wave: 0.9
  natural_disaster: 0.0

heat:
  global_decay_per_hour: 1.0
  decay_block_hours: 3
  hunt_threshold: 70

economy:
  reversion_rate: 0.2
  fluctuation: 2.5
  condition_change_chance: 0.0

npc:
  npcs_per_city: 2
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.name, "Test World");
        assert_eq!(config.world.seed, 123);
        assert_eq!(config.time.tick_minutes, 30);
        assert_eq!(config.time.highlights_per_category, 5);
        assert!(config.logging.json);
        assert_eq!(config.simulation.max_real_time_seconds, 60);
        assert_eq!(config.heat.decay_block_hours, 3);
        assert_eq!(config.npc.npcs_per_city, 2);
        // Unset rates keep their defaults.
        assert!((config.world_events.gang_territory - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 7\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.time.tick_interval_ms, 1_000);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn zero_tick_minutes_is_rejected() {
        let result = SimulationConfig::parse("time:\n  tick_minutes: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn fast_tick_interval_is_rejected() {
        let result = SimulationConfig::parse("time:\n  tick_interval_ms: 10\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let result = SimulationConfig::parse("world_events:\n  political: -0.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn tick_hours_is_a_sixth_by_default() {
        let hours = TimeConfig::default().tick_hours();
        assert!((hours - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("tactics-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
