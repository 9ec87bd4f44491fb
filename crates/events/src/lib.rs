//! Shared event contracts for perfmon state changes.
//!
//! This crate defines the DTOs mirrored onto the event bus whenever the
//! coordinator's state changes. Using shared types keeps the field names
//! the UI bridge sees in one place.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{EventBus, EventBusRef, InMemoryEventBus, NullEventBus, RecordedEvent, TracingEventBus};

use perfmon_metrics::MetricSnapshot;
use perfmon_settings::{OverlaySettings, SettingKey};
use serde::{Deserialize, Serialize};

/// Event emitted for every published metrics snapshot.
///
/// Producers: metrics sampler subscription
/// Consumers: overlay renderer, UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsUpdatedEvent {
    pub seq: u64,
    /// Timestamp in milliseconds since epoch.
    pub timestamp_ms: i64,
    pub fps: f64,
    pub cpu: f64,
    pub gpu: f64,
    pub temp: f64,
    pub ram: f64,
}

impl From<&MetricSnapshot> for MetricsUpdatedEvent {
    fn from(snapshot: &MetricSnapshot) -> Self {
        Self {
            seq: snapshot.seq(),
            timestamp_ms: snapshot.timestamp_ms(),
            fps: snapshot.fps(),
            cpu: snapshot.cpu(),
            gpu: snapshot.gpu(),
            temp: snapshot.temp(),
            ram: snapshot.ram(),
        }
    }
}

/// Event emitted after a settings update was merged.
///
/// Producers: settings store subscription
/// Consumers: overlay renderer, UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsChangedEvent {
    /// The key that changed.
    pub key: SettingKey,
    /// Full settings record after the merge.
    pub settings: OverlaySettings,
}

/// Event emitted when game mode flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameModeChangedEvent {
    pub active: bool,
}

/// Event emitted after a permission request resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionChangedEvent {
    /// `overlay` or `usage_stats`.
    pub permission: String,
    pub granted: bool,
    /// Request outcome, e.g. `denied` or `request_failed`.
    #[serde(default)]
    pub outcome: Option<String>,
}

/// Event emitted when the overlay window or monitoring service changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStatusEvent {
    pub visible: bool,
    pub service_running: bool,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// New metrics snapshot.
    pub const METRICS_UPDATED: &str = "metrics:updated";
    /// Overlay settings changed.
    pub const SETTINGS_CHANGED: &str = "settings:changed";
    /// Game mode toggled.
    pub const GAME_MODE_CHANGED: &str = "game_mode:changed";
    /// Permission request resolved.
    pub const PERMISSIONS_CHANGED: &str = "permissions:changed";
    /// Overlay visibility or service state changed.
    pub const OVERLAY_STATUS: &str = "overlay:status";
}
