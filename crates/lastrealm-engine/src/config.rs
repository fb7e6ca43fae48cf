//! Host configuration.
//!
//! Provides the headless driver's settings plus the full simulation tuning.
//! Configuration can be loaded from and saved to a TOML file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use lastrealm_gameplay::{GameMode, PlayerClass, SimConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::autopilot::AutopilotConfig;

/// Configuration file name.
pub const CONFIG_FILE: &str = "lastrealm.toml";

/// Errors reading or writing a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the file.
    #[error("Config IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to encode TOML.
    #[error("Failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Headless host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Driver ===
    /// Fixed simulation steps per second.
    pub tick_rate: u32,
    /// Stop after this many seconds of run time if the run is still going.
    pub max_seconds: f64,
    /// Pace ticks against the wall clock instead of running flat out.
    pub realtime: bool,
    /// Runs played back to back.
    pub runs: u32,

    // === Run ===
    /// Class to play.
    pub class: PlayerClass,
    /// Mode to play.
    pub mode: GameMode,
    /// Event bus capacity per run.
    pub event_capacity: usize,
    /// Log every drained event at debug level.
    pub log_events: bool,

    // === Data ===
    /// TOML file with melee base stats (None = built-in values).
    pub weapon_stats_path: Option<PathBuf>,
    /// TOML file replacing the powerup catalog (None = built-in catalog).
    pub powerup_catalog_path: Option<PathBuf>,
    /// JSON-lines file receiving run summaries.
    pub summary_path: PathBuf,

    // === Autopilot ===
    /// Scripted player tuning.
    pub autopilot: AutopilotConfig,

    // === Simulation ===
    /// Simulation tuning.
    pub sim: SimConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Driver
            tick_rate: 60,
            max_seconds: 600.0,
            realtime: false,
            runs: 1,

            // Run
            class: PlayerClass::Warrior,
            mode: GameMode::Timed,
            event_capacity: 1024,
            log_events: false,

            // Data
            weapon_stats_path: None,
            powerup_catalog_path: None,
            summary_path: PathBuf::from("runs.jsonl"),

            autopilot: AutopilotConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("{e}, using defaults");
                Self::default()
            },
        }
    }

    /// Load configuration, reporting why it could not be read.
    /// The result is validated.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.validate();
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.tick_rate = self.tick_rate.clamp(10, 240);
        if !(self.max_seconds.is_finite() && self.max_seconds > 0.0) {
            warn!("max_seconds {} is not usable", self.max_seconds);
            self.max_seconds = Self::default().max_seconds;
        }
        self.runs = self.runs.clamp(1, 1000);
        self.event_capacity = self.event_capacity.clamp(16, 65_536);
        self.sim.validate();
    }

    /// Seconds per fixed step.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}
