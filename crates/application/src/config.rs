//! Monitor configuration.
//!
//! Loaded from `<config_dir>/perfmon/config.json`. Every field is optional;
//! a missing file means defaults.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_SAMPLE_INTERVAL_MS, MIN_SAMPLE_INTERVAL,
    SAMPLE_INTERVAL_ENV,
};
use crate::error::ConfigError;
use perfmon_platform::{ChannelConfig, Platform};
use perfmon_settings::ColorScheme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub sample_interval_ms: u64,
    pub platform: Platform,
    /// System color scheme at startup; seeds `isDarkMode`.
    pub color_scheme: ColorScheme,
    pub notification_channel: ChannelConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            platform: Platform::default(),
            color_scheme: ColorScheme::default(),
            notification_channel: ChannelConfig::default(),
        }
    }
}

/// Default config file location.
///
/// Platform-specific paths:
/// - Linux: ~/.config/perfmon/config.json
/// - macOS: ~/Library/Application Support/perfmon/config.json
/// - Windows: %APPDATA%/perfmon/config.json
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl MonitorConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Read and validate a config file. The file must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load from the default location and apply environment overrides.
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut config = match default_config_path() {
            Some(path) => Self::load_or_default(&path)?,
            None => {
                tracing::warn!("no platform config directory, using defaults");
                Self::default()
            }
        };
        if let Ok(raw) = std::env::var(SAMPLE_INTERVAL_ENV) {
            config.apply_interval_override(&raw)?;
        }
        Ok(config)
    }

    /// Apply a `PERFMON_SAMPLE_INTERVAL_MS`-style override.
    pub fn apply_interval_override(&mut self, raw: &str) -> Result<(), ConfigError> {
        let ms: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            name: SAMPLE_INTERVAL_ENV,
            value: raw.to_string(),
        })?;
        let previous = self.sample_interval_ms;
        self.sample_interval_ms = ms;
        if let Err(e) = self.validate() {
            self.sample_interval_ms = previous;
            return Err(e);
        }
        tracing::info!(interval_ms = ms, "sample interval overridden from environment");
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let min = MIN_SAMPLE_INTERVAL.as_millis() as u64;
        if self.sample_interval_ms < min {
            return Err(ConfigError::IntervalTooShort(self.sample_interval_ms, min));
        }
        Ok(())
    }
}
