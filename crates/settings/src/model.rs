//! The overlay settings record.

use crate::error::SettingsError;
use crate::key::{SettingKey, SettingValue};
use serde::{Deserialize, Serialize};

/// Overlay opacity used until the user changes it.
pub const DEFAULT_TRANSPARENCY: f64 = 0.8;

/// System color scheme at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

/// Overlay display configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlaySettings {
    #[serde(rename = "showFPS")]
    pub show_fps: bool,
    #[serde(rename = "showCPU")]
    pub show_cpu: bool,
    #[serde(rename = "showGPU")]
    pub show_gpu: bool,
    #[serde(rename = "showTemp")]
    pub show_temp: bool,
    #[serde(rename = "showRAM")]
    pub show_ram: bool,
    /// Overlay opacity in [0, 1].
    pub transparency: f64,
    #[serde(rename = "isDarkMode")]
    pub is_dark_mode: bool,
    #[serde(rename = "isLandscape")]
    pub is_landscape: bool,
    #[serde(rename = "isPinned")]
    pub is_pinned: bool,
    #[serde(rename = "isVisible")]
    pub is_visible: bool,
    #[serde(rename = "autoMinimize")]
    pub auto_minimize: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self::for_color_scheme(ColorScheme::default())
    }
}

impl OverlaySettings {
    /// Startup defaults; dark mode follows the system scheme.
    pub fn for_color_scheme(scheme: ColorScheme) -> Self {
        Self {
            show_fps: true,
            show_cpu: true,
            show_gpu: true,
            show_temp: true,
            show_ram: true,
            transparency: DEFAULT_TRANSPARENCY,
            is_dark_mode: scheme == ColorScheme::Dark,
            is_landscape: false,
            is_pinned: false,
            is_visible: true,
            auto_minimize: false,
        }
    }

    /// Current value of `key`.
    pub fn value(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::Transparency => SettingValue::Number(self.transparency),
            _ => SettingValue::Bool(*self.flag(key).unwrap_or(&false)),
        }
    }

    /// Merge a single value, validating it first. Nothing changes on error.
    pub(crate) fn apply(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingsError> {
        if key == SettingKey::Transparency {
            let raw = value.as_number().ok_or(SettingsError::TypeMismatch {
                key,
                expected: "number",
            })?;
            self.transparency = clamp_transparency(raw)?;
            return Ok(());
        }

        let new = value.as_bool().ok_or(SettingsError::TypeMismatch {
            key,
            expected: "boolean",
        })?;
        if let Some(flag) = self.flag_mut(key) {
            *flag = new;
        }
        Ok(())
    }

    fn flag(&self, key: SettingKey) -> Option<&bool> {
        match key {
            SettingKey::ShowFps => Some(&self.show_fps),
            SettingKey::ShowCpu => Some(&self.show_cpu),
            SettingKey::ShowGpu => Some(&self.show_gpu),
            SettingKey::ShowTemp => Some(&self.show_temp),
            SettingKey::ShowRam => Some(&self.show_ram),
            SettingKey::IsDarkMode => Some(&self.is_dark_mode),
            SettingKey::IsLandscape => Some(&self.is_landscape),
            SettingKey::IsPinned => Some(&self.is_pinned),
            SettingKey::IsVisible => Some(&self.is_visible),
            SettingKey::AutoMinimize => Some(&self.auto_minimize),
            SettingKey::Transparency => None,
        }
    }

    fn flag_mut(&mut self, key: SettingKey) -> Option<&mut bool> {
        match key {
            SettingKey::ShowFps => Some(&mut self.show_fps),
            SettingKey::ShowCpu => Some(&mut self.show_cpu),
            SettingKey::ShowGpu => Some(&mut self.show_gpu),
            SettingKey::ShowTemp => Some(&mut self.show_temp),
            SettingKey::ShowRam => Some(&mut self.show_ram),
            SettingKey::IsDarkMode => Some(&mut self.is_dark_mode),
            SettingKey::IsLandscape => Some(&mut self.is_landscape),
            SettingKey::IsPinned => Some(&mut self.is_pinned),
            SettingKey::IsVisible => Some(&mut self.is_visible),
            SettingKey::AutoMinimize => Some(&mut self.auto_minimize),
            SettingKey::Transparency => None,
        }
    }
}

fn clamp_transparency(raw: f64) -> Result<f64, SettingsError> {
    if !raw.is_finite() {
        return Err(SettingsError::InvalidValue {
            key: SettingKey::Transparency,
            reason: format!("{raw} is not a finite number"),
        });
    }
    let clamped = raw.clamp(0.0, 1.0);
    if clamped != raw {
        tracing::debug!(raw, clamped, "transparency clamped to [0, 1]");
    }
    Ok(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = OverlaySettings::default();
        assert!(settings.show_fps && settings.show_cpu && settings.show_gpu);
        assert!(settings.show_temp && settings.show_ram);
        assert_eq!(settings.transparency, 0.8);
        assert!(!settings.is_dark_mode);
        assert!(settings.is_visible);
        assert!(!settings.is_landscape && !settings.is_pinned && !settings.auto_minimize);
    }

    #[test]
    fn test_dark_scheme_sets_dark_mode() {
        assert!(OverlaySettings::for_color_scheme(ColorScheme::Dark).is_dark_mode);
    }

    #[test]
    fn test_value_reads_every_key() {
        let settings = OverlaySettings::default();
        assert_eq!(settings.value(SettingKey::Transparency), SettingValue::Number(0.8));
        assert_eq!(settings.value(SettingKey::IsVisible), SettingValue::Bool(true));
        assert_eq!(settings.value(SettingKey::IsPinned), SettingValue::Bool(false));
    }

    #[test]
    fn test_serializes_wire_names() {
        let json = serde_json::to_value(OverlaySettings::default()).unwrap();
        assert_eq!(json["showFPS"], true);
        assert_eq!(json["transparency"], 0.8);
        assert_eq!(json["autoMinimize"], false);
    }

    #[test]
    fn test_apply_rejects_non_finite_transparency() {
        let mut settings = OverlaySettings::default();
        let err = settings
            .apply(SettingKey::Transparency, SettingValue::Number(f64::NAN))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert_eq!(settings.transparency, 0.8);
    }
}
