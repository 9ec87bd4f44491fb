//! Traits for the native modules the coordinator talks to.
//!
//! These abstract the platform bridge so the coordination logic stays
//! testable without a device.

use crate::error::NativeError;
use crate::notification::{ChannelConfig, NotificationRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Overlay window + overlay-drawing permission.
#[async_trait]
pub trait OverlayManager: Send + Sync {
    /// Whether the app may currently draw over other apps.
    async fn can_draw_overlays(&self) -> bool;

    /// Open the OS permission screen and resolve once the user returns.
    ///
    /// `Ok(false)` means the user did not grant it.
    async fn request_overlay_permission(&self) -> Result<bool, NativeError>;

    /// Show the overlay window if hidden, hide it if shown.
    async fn toggle_overlay(&self) -> Result<(), NativeError>;
}

/// Background monitoring service + usage-statistics permission.
#[async_trait]
pub trait PerformanceMonitorModule: Send + Sync {
    /// Whether usage-statistics access is currently allowed.
    async fn has_usage_stats_access(&self) -> bool;

    /// Open the usage-access settings and resolve once the user returns.
    async fn request_usage_stats_permission(&self) -> Result<bool, NativeError>;

    async fn start_service(&self) -> Result<(), NativeError>;

    async fn stop_service(&self) -> Result<(), NativeError>;
}

/// Deep link into the platform settings app.
#[async_trait]
pub trait SystemSettings: Send + Sync {
    /// Open the general settings screen for this app.
    async fn open_settings(&self) -> Result<(), NativeError>;
}

/// Local notification delivery.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Register (or update) a notification channel.
    async fn set_notification_channel(&self, channel: &ChannelConfig) -> Result<(), NativeError>;

    /// Ask the user for permission to post notifications.
    async fn request_permissions(&self) -> Result<bool, NativeError>;

    /// Schedule a notification. Returns the host's notification identifier.
    async fn schedule(&self, request: &NotificationRequest) -> Result<String, NativeError>;
}

pub type OverlayManagerRef = Arc<dyn OverlayManager>;
pub type PerformanceMonitorModuleRef = Arc<dyn PerformanceMonitorModule>;
pub type SystemSettingsRef = Arc<dyn SystemSettings>;
pub type NotificationServiceRef = Arc<dyn NotificationService>;
