//! Notification DTOs passed to the host notification service.

use serde::{Deserialize, Serialize};

/// Channel importance, mirroring the host's importance levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Min,
    #[default]
    Low,
    Default,
    High,
}

/// Notification channel configuration, registered once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub importance: Importance,
    /// Vibration timings in milliseconds. May be all zeros (silent).
    #[serde(default)]
    pub vibration_pattern: Vec<u64>,
    /// ARGB hex string, e.g. `#FF231F7C`.
    pub light_color: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            id: "performance".to_string(),
            name: "Performance Monitor".to_string(),
            importance: Importance::Low,
            vibration_pattern: vec![0, 0, 0, 0],
            light_color: "#FF231F7C".to_string(),
        }
    }
}

/// A local notification to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Caller-generated identifier.
    pub id: String,
    pub title: String,
    pub body: String,
    /// Opaque payload handed back to the app when the user taps it.
    pub data: serde_json::Value,
    /// Delay before delivery in milliseconds. `None` delivers immediately.
    #[serde(default)]
    pub trigger_ms: Option<u64>,
}

impl NotificationRequest {
    /// Create an immediate (untriggered) notification.
    pub fn immediate(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            data,
            trigger_ms: None,
        }
    }

    /// The `type` tag of the data payload, if any.
    pub fn data_type(&self) -> Option<&str> {
        self.data.get("type").and_then(|v| v.as_str())
    }
}
