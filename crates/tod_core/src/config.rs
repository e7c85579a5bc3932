//! Sampler configuration
//!
//! The plugin runs on `SamplerConfig::default()`. The JSON loaders exist for
//! offline replays, where a different threshold or cadence is useful.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TodError};

/// Distance before TOD (NM) at which the sim is paused.
pub const DEFAULT_THRESHOLD: i32 = 10;
/// Ticks between two sample records (5 minutes at one tick per second).
pub const DEFAULT_LOG_EVERY_TICKS: i32 = 300;
/// Seconds until the next callback.
pub const DEFAULT_CALLBACK_INTERVAL: f32 = 1.0;
pub const DEFAULT_LOG_FILE_NAME: &str = "TODchecking.txt";
pub const DEFAULT_DATAREF: &str = "sim/cockpit2/radios/indicators/fms_distance_to_tod_pilot";

fn default_threshold() -> i32 {
    DEFAULT_THRESHOLD
}

fn default_log_every_ticks() -> i32 {
    DEFAULT_LOG_EVERY_TICKS
}

fn default_callback_interval() -> f32 {
    DEFAULT_CALLBACK_INTERVAL
}

fn default_log_file_name() -> String {
    DEFAULT_LOG_FILE_NAME.to_string()
}

fn default_dataref() -> String {
    DEFAULT_DATAREF.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_threshold")]
    pub initial_threshold: i32,
    #[serde(default = "default_log_every_ticks")]
    pub log_every_ticks: i32,
    #[serde(default = "default_callback_interval")]
    pub callback_interval: f32,
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,
    #[serde(default = "default_dataref")]
    pub dataref: String,
    /// Refuse to start when the log file can't be opened.
    #[serde(default)]
    pub fail_on_sink_error: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            initial_threshold: DEFAULT_THRESHOLD,
            log_every_ticks: DEFAULT_LOG_EVERY_TICKS,
            callback_interval: DEFAULT_CALLBACK_INTERVAL,
            log_file_name: default_log_file_name(),
            dataref: default_dataref(),
            fail_on_sink_error: false,
        }
    }
}

impl SamplerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SamplerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_every_ticks <= 0 {
            return Err(TodError::Config(format!(
                "log_every_ticks must be > 0, got {}",
                self.log_every_ticks
            )));
        }
        if !self.callback_interval.is_finite() || self.callback_interval <= 0.0 {
            return Err(TodError::Config(format!(
                "callback_interval must be a positive number of seconds, got {}",
                self.callback_interval
            )));
        }
        if self.log_file_name.trim().is_empty() {
            return Err(TodError::Config("log_file_name is empty".to_string()));
        }
        Ok(())
    }
}
