use std::time::Duration;

/// Directory under the platform config dir holding `config.json`.
pub const CONFIG_DIR_NAME: &str = "perfmon";

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Overrides `sample_interval_ms` from the config file.
pub const SAMPLE_INTERVAL_ENV: &str = "PERFMON_SAMPLE_INTERVAL_MS";

/// Default sampling interval in milliseconds.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 1000;

/// Shortest interval accepted from config; faster sampling only burns battery.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(50);
