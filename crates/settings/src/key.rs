//! Closed set of setting keys and their values.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Every recognized overlay setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingKey {
    #[serde(rename = "showFPS")]
    ShowFps,
    #[serde(rename = "showCPU")]
    ShowCpu,
    #[serde(rename = "showGPU")]
    ShowGpu,
    #[serde(rename = "showTemp")]
    ShowTemp,
    #[serde(rename = "showRAM")]
    ShowRam,
    #[serde(rename = "transparency")]
    Transparency,
    #[serde(rename = "isDarkMode")]
    IsDarkMode,
    #[serde(rename = "isLandscape")]
    IsLandscape,
    #[serde(rename = "isPinned")]
    IsPinned,
    #[serde(rename = "isVisible")]
    IsVisible,
    #[serde(rename = "autoMinimize")]
    AutoMinimize,
}

impl SettingKey {
    pub const ALL: [SettingKey; 11] = [
        SettingKey::ShowFps,
        SettingKey::ShowCpu,
        SettingKey::ShowGpu,
        SettingKey::ShowTemp,
        SettingKey::ShowRam,
        SettingKey::Transparency,
        SettingKey::IsDarkMode,
        SettingKey::IsLandscape,
        SettingKey::IsPinned,
        SettingKey::IsVisible,
        SettingKey::AutoMinimize,
    ];

    /// Wire name, as used by the UI layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ShowFps => "showFPS",
            SettingKey::ShowCpu => "showCPU",
            SettingKey::ShowGpu => "showGPU",
            SettingKey::ShowTemp => "showTemp",
            SettingKey::ShowRam => "showRAM",
            SettingKey::Transparency => "transparency",
            SettingKey::IsDarkMode => "isDarkMode",
            SettingKey::IsLandscape => "isLandscape",
            SettingKey::IsPinned => "isPinned",
            SettingKey::IsVisible => "isVisible",
            SettingKey::AutoMinimize => "autoMinimize",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SettingKey::Transparency)
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// A value for a single setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            SettingValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            SettingValue::Number(n) => Some(*n),
            SettingValue::Bool(_) => None,
        }
    }

    /// Convert a JSON value for `key`, rejecting anything but bools/numbers.
    pub fn from_json(key: SettingKey, value: &serde_json::Value) -> Result<Self, SettingsError> {
        let expected = if key.is_numeric() { "number" } else { "boolean" };
        match value {
            serde_json::Value::Bool(b) if !key.is_numeric() => Ok(SettingValue::Bool(*b)),
            serde_json::Value::Number(n) if key.is_numeric() => n
                .as_f64()
                .map(SettingValue::Number)
                .ok_or(SettingsError::TypeMismatch { key, expected }),
            _ => Err(SettingsError::TypeMismatch { key, expected }),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_every_key() {
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert_eq!(
            "showBattery".parse::<SettingKey>(),
            Err(SettingsError::UnknownKey("showBattery".to_string()))
        );
        // Case matters: the wire names are exact.
        assert!("showfps".parse::<SettingKey>().is_err());
    }

    #[test]
    fn test_key_serde_matches_wire_name() {
        for key in SettingKey::ALL {
            let json = serde_json::to_value(key).unwrap();
            assert_eq!(json, json!(key.as_str()));
        }
    }

    #[test]
    fn test_from_json_types() {
        assert_eq!(
            SettingValue::from_json(SettingKey::ShowCpu, &json!(false)),
            Ok(SettingValue::Bool(false))
        );
        assert_eq!(
            SettingValue::from_json(SettingKey::Transparency, &json!(0.5)),
            Ok(SettingValue::Number(0.5))
        );
        assert_eq!(
            SettingValue::from_json(SettingKey::Transparency, &json!(true)),
            Err(SettingsError::TypeMismatch {
                key: SettingKey::Transparency,
                expected: "number"
            })
        );
        assert!(SettingValue::from_json(SettingKey::IsPinned, &json!("yes")).is_err());
    }
}
