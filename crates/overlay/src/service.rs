//! Overlay window and monitoring-service control.

use perfmon_platform::{OverlayManagerRef, PerformanceMonitorModuleRef};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// What the service believes the native side is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStatus {
    pub visible: bool,
    pub service_running: bool,
}

/// Forwards overlay and background-service commands to the native modules.
///
/// A missing module is not an error: the command is logged and skipped, so
/// the coordinator keeps working on hosts without the native side.
pub struct OverlayService {
    overlay: Option<OverlayManagerRef>,
    monitor: Option<PerformanceMonitorModuleRef>,
    visible: AtomicBool,
    service_running: AtomicBool,
}

impl OverlayService {
    pub fn new(overlay: Option<OverlayManagerRef>, monitor: Option<PerformanceMonitorModuleRef>) -> Self {
        if overlay.is_none() {
            tracing::warn!("OverlayManager native module not available, overlay commands will be ignored");
        }
        if monitor.is_none() {
            tracing::warn!("PerformanceMonitorModule not available, service commands will be ignored");
        }
        Self {
            overlay,
            monitor,
            visible: AtomicBool::new(false),
            service_running: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> OverlayStatus {
        OverlayStatus {
            visible: self.visible.load(Ordering::SeqCst),
            service_running: self.service_running.load(Ordering::SeqCst),
        }
    }

    /// Show the overlay window if hidden, hide it if shown.
    ///
    /// Permission checks are the caller's job.
    pub async fn toggle(&self) -> OverlayStatus {
        let Some(overlay) = &self.overlay else {
            tracing::warn!("OverlayManager not available, toggle ignored");
            return self.status();
        };

        match overlay.toggle_overlay().await {
            Ok(()) => {
                let was_visible = self.visible.fetch_xor(true, Ordering::SeqCst);
                tracing::info!(visible = !was_visible, "overlay toggled");
            }
            Err(e) => {
                tracing::error!(error = %e, "Error toggling overlay");
            }
        }
        self.status()
    }

    /// Start the native background monitoring service.
    pub async fn start_monitoring_service(&self) -> OverlayStatus {
        let Some(monitor) = &self.monitor else {
            tracing::warn!("PerformanceMonitorModule not available, start ignored");
            return self.status();
        };

        if self.service_running.swap(true, Ordering::SeqCst) {
            tracing::debug!("monitoring service already running");
            return self.status();
        }

        match monitor.start_service().await {
            Ok(()) => tracing::info!("Performance monitoring service started"),
            Err(e) => {
                tracing::error!(error = %e, "Error starting monitoring service");
                self.service_running.store(false, Ordering::SeqCst);
            }
        }
        self.status()
    }

    /// Stop the native background monitoring service.
    pub async fn stop_monitoring_service(&self) -> OverlayStatus {
        let Some(monitor) = &self.monitor else {
            tracing::warn!("PerformanceMonitorModule not available, stop ignored");
            return self.status();
        };

        if !self.service_running.swap(false, Ordering::SeqCst) {
            tracing::debug!("monitoring service not running");
            return self.status();
        }

        match monitor.stop_service().await {
            Ok(()) => tracing::info!("Performance monitoring service stopped"),
            Err(e) => {
                // Still running as far as we know.
                tracing::error!(error = %e, "Error stopping monitoring service");
                self.service_running.store(true, Ordering::SeqCst);
            }
        }
        self.status()
    }
}

impl std::fmt::Debug for OverlayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayService")
            .field("status", &self.status())
            .field("has_overlay_manager", &self.overlay.is_some())
            .field("has_monitor_module", &self.monitor.is_some())
            .finish()
    }
}
