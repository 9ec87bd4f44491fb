use perfmon_metrics::MetricsError;
use perfmon_permissions::PermissionKind;
use perfmon_settings::SettingsError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {name}={value}: expected a positive integer of milliseconds")]
    InvalidEnv { name: &'static str, value: String },
    #[error("sample interval {0}ms is below the {1}ms minimum")]
    IntervalTooShort(u64, u64),
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("{0} permission has not been granted")]
    PermissionRequired(PermissionKind),
    #[error("metrics sampling failed: {0}")]
    Metrics(#[from] MetricsError),
    #[error("invalid setting: {0}")]
    Settings(#[from] SettingsError),
    #[error("notifications unavailable: {0}")]
    Notify(#[from] perfmon_notify::NotifyError),
}
