//! Permission gateway for the overlay and usage-statistics grants.
//!
//! Wraps the native permission flows and reports an explicit
//! [`PermissionOutcome`] so callers can tell a user's "no" apart from a
//! request that failed. Granted state is tracked here and only ever changes
//! through an explicit request.

use perfmon_platform::{
    OverlayManagerRef, PerformanceMonitorModuleRef, Platform, SystemSettingsRef,
};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// The two permissions the overlay depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    Overlay,
    UsageStats,
}

impl std::fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionKind::Overlay => write!(f, "overlay"),
            PermissionKind::UsageStats => write!(f, "usage_stats"),
        }
    }
}

/// Result of a permission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum PermissionOutcome {
    /// The user granted it (now or earlier).
    Granted,
    /// The user declined, or the platform has no such permission.
    Denied,
    /// The request itself failed before the user could answer.
    RequestFailed(String),
    /// Granted at install time; no runtime request exists.
    NotRequired,
}

impl PermissionOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionOutcome::Granted | PermissionOutcome::NotRequired)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PermissionOutcome::Granted => "granted",
            PermissionOutcome::Denied => "denied",
            PermissionOutcome::RequestFailed(_) => "request_failed",
            PermissionOutcome::NotRequired => "not_required",
        }
    }
}

/// Which permissions are currently granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionState {
    pub overlay_granted: bool,
    pub usage_stats_granted: bool,
}

impl PermissionState {
    pub fn is_granted(&self, kind: PermissionKind) -> bool {
        match kind {
            PermissionKind::Overlay => self.overlay_granted,
            PermissionKind::UsageStats => self.usage_stats_granted,
        }
    }
}

/// Requests and tracks the overlay and usage-stats permissions.
pub struct PermissionGateway {
    platform: Platform,
    overlay: Option<OverlayManagerRef>,
    monitor: Option<PerformanceMonitorModuleRef>,
    system_settings: Option<SystemSettingsRef>,
    state: Mutex<PermissionState>,
}

impl PermissionGateway {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            overlay: None,
            monitor: None,
            system_settings: None,
            state: Mutex::new(PermissionState::default()),
        }
    }

    pub fn with_overlay_manager(mut self, overlay: OverlayManagerRef) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn with_monitor_module(mut self, monitor: PerformanceMonitorModuleRef) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn with_system_settings(mut self, settings: SystemSettingsRef) -> Self {
        self.system_settings = Some(settings);
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn state(&self) -> PermissionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_granted(&self, kind: PermissionKind) -> bool {
        self.state().is_granted(kind)
    }

    /// Request the overlay-drawing permission.
    ///
    /// Already-granted requests return without opening the OS dialog again.
    pub async fn request_overlay_permission(&self) -> PermissionOutcome {
        if !self.platform.is_android() {
            tracing::info!(platform = %self.platform, "overlay permission not available on this platform");
            return PermissionOutcome::Denied;
        }

        if !self.platform.requires_runtime_overlay_grant() {
            tracing::info!(
                api_level = self.platform.api_level,
                "overlay permission granted at install time"
            );
            self.mark_granted(PermissionKind::Overlay);
            return PermissionOutcome::NotRequired;
        }

        if self.is_granted(PermissionKind::Overlay) {
            return PermissionOutcome::Granted;
        }

        let Some(overlay) = &self.overlay else {
            tracing::error!("OverlayManager native module not available");
            return PermissionOutcome::RequestFailed("OverlayManager not available".to_string());
        };

        if overlay.can_draw_overlays().await {
            self.mark_granted(PermissionKind::Overlay);
            return PermissionOutcome::Granted;
        }

        match overlay.request_overlay_permission().await {
            Ok(true) => {
                tracing::info!("Overlay permission granted");
                self.mark_granted(PermissionKind::Overlay);
                PermissionOutcome::Granted
            }
            Ok(false) => {
                tracing::info!("Overlay permission denied");
                PermissionOutcome::Denied
            }
            Err(e) => {
                tracing::error!(error = %e, "Overlay permission request failed");
                PermissionOutcome::RequestFailed(e.to_string())
            }
        }
    }

    /// Request the usage-statistics permission.
    ///
    /// There is no in-app dialog for this grant, so on denial or failure the
    /// general settings screen is opened once for the user to grant it by hand.
    pub async fn request_usage_stats_permission(&self) -> PermissionOutcome {
        if !self.platform.is_android() {
            tracing::info!(platform = %self.platform, "usage stats permission not available on this platform");
            return PermissionOutcome::Denied;
        }

        if self.is_granted(PermissionKind::UsageStats) {
            return PermissionOutcome::Granted;
        }

        let outcome = match &self.monitor {
            None => {
                tracing::error!("PerformanceMonitorModule native module not available");
                PermissionOutcome::RequestFailed("PerformanceMonitorModule not available".to_string())
            }
            Some(monitor) => {
                if monitor.has_usage_stats_access().await {
                    PermissionOutcome::Granted
                } else {
                    match monitor.request_usage_stats_permission().await {
                        Ok(true) => PermissionOutcome::Granted,
                        Ok(false) => PermissionOutcome::Denied,
                        Err(e) => {
                            tracing::error!(error = %e, "Error requesting usage stats permission");
                            PermissionOutcome::RequestFailed(e.to_string())
                        }
                    }
                }
            }
        };

        if outcome.is_granted() {
            tracing::info!("Usage stats permission granted");
            self.mark_granted(PermissionKind::UsageStats);
        } else {
            tracing::info!(
                outcome = ?outcome,
                "Usage stats permission not granted, opening settings for manual grant"
            );
            self.open_settings_fallback().await;
        }

        outcome
    }

    async fn open_settings_fallback(&self) {
        let Some(settings) = &self.system_settings else {
            tracing::warn!("no system settings launcher available for fallback");
            return;
        };
        if let Err(e) = settings.open_settings().await {
            tracing::warn!(error = %e, "failed to open system settings");
        }
    }

    fn mark_granted(&self, kind: PermissionKind) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match kind {
            PermissionKind::Overlay => state.overlay_granted = true,
            PermissionKind::UsageStats => state.usage_stats_granted = true,
        }
    }
}

impl std::fmt::Debug for PermissionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGateway")
            .field("platform", &self.platform)
            .field("state", &self.state())
            .field("has_overlay_manager", &self.overlay.is_some())
            .field("has_monitor_module", &self.monitor.is_some())
            .finish_non_exhaustive()
    }
}
