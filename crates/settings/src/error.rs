use crate::key::SettingKey;
use thiserror::Error;

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Rejected settings updates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    /// Key is not one of the overlay settings.
    #[error("unknown setting '{0}'")]
    UnknownKey(String),

    /// Value has the wrong type for the key.
    #[error("setting '{key}' expects a {expected} value")]
    TypeMismatch {
        key: SettingKey,
        expected: &'static str,
    },

    /// Value has the right type but cannot be stored.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: SettingKey, reason: String },
}
