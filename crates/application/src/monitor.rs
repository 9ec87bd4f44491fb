//! The performance monitor coordinator.
//!
//! Owns every component and mirrors each state change onto the event bus.
//! Driven from one logical actor; the only background activity is the
//! sampler task and the notification worker.

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::game_mode::{GameModeController, GameModeState};
use perfmon_events::{
    event_names, EventBusRef, GameModeChangedEvent, MetricsUpdatedEvent, NullEventBus,
    OverlayStatusEvent, PermissionChangedEvent, SettingsChangedEvent,
};
use perfmon_metrics::{MetricSnapshot, MetricsSampler, MetricsSourceRef, SamplerHandle};
use perfmon_notify::{setup_notifications, NotificationGatewayRef, NullNotifier, QueuedNotifier};
use perfmon_overlay::{compose_overlay, OverlayFrame, OverlayService, OverlayStatus};
use perfmon_permissions::{PermissionGateway, PermissionKind, PermissionOutcome, PermissionState};
use perfmon_platform::{
    NotificationServiceRef, NullPlatform, OverlayManagerRef, PerformanceMonitorModuleRef,
    SystemSettingsRef,
};
use perfmon_settings::{OverlaySettings, SettingKey, SettingValue, SettingsStore};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Native modules available on this host. Any of them may be missing.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub overlay: Option<OverlayManagerRef>,
    pub monitor: Option<PerformanceMonitorModuleRef>,
    pub system_settings: Option<SystemSettingsRef>,
    pub notifications: Option<NotificationServiceRef>,
}

impl Collaborators {
    /// Every module present but inert.
    pub fn null() -> Self {
        let null = Arc::new(NullPlatform);
        Self {
            overlay: Some(null.clone()),
            monitor: Some(null.clone()),
            system_settings: Some(null.clone()),
            notifications: Some(null),
        }
    }
}

fn emit<T: Serialize>(bus: &EventBusRef, topic: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => bus.emit(topic, value),
        Err(e) => tracing::warn!(topic, error = %e, "failed to serialize event"),
    }
}

/// Builder for [`PerformanceMonitor`].
pub struct MonitorBuilder {
    config: MonitorConfig,
    source: MetricsSourceRef,
    collaborators: Collaborators,
    bus: Option<EventBusRef>,
    notifier: Option<NotificationGatewayRef>,
}

impl MonitorBuilder {
    pub fn collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn event_bus(mut self, bus: EventBusRef) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Use `notifier` instead of queueing onto the host notification service.
    pub fn notifier(mut self, notifier: NotificationGatewayRef) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Wire everything up. Must run inside a tokio runtime when the
    /// notification worker is spawned.
    pub fn build(self) -> Result<PerformanceMonitor, MonitorError> {
        let MonitorBuilder {
            config,
            source,
            collaborators,
            bus,
            notifier,
        } = self;
        let bus: EventBusRef = match bus {
            Some(bus) => bus,
            None => Arc::new(NullEventBus),
        };

        let (notifier, queued): (NotificationGatewayRef, Option<Arc<QueuedNotifier>>) =
            match (notifier, &collaborators.notifications) {
                (Some(notifier), _) => (notifier, None),
                (None, Some(service)) => {
                    let queued = Arc::new(QueuedNotifier::start(Arc::clone(service))?);
                    let gateway: NotificationGatewayRef = queued.clone();
                    (gateway, Some(queued))
                }
                (None, None) => {
                    tracing::warn!("Notifications module not available, notifications disabled");
                    let gateway: NotificationGatewayRef = Arc::new(NullNotifier);
                    (gateway, None)
                }
            };

        let settings = Arc::new(SettingsStore::new(OverlaySettings::for_color_scheme(
            config.color_scheme,
        )));
        {
            let bus = Arc::clone(&bus);
            settings.subscribe(Arc::new(move |key: SettingKey, settings: &OverlaySettings| {
                emit(
                    &bus,
                    event_names::SETTINGS_CHANGED,
                    &SettingsChangedEvent {
                        key,
                        settings: *settings,
                    },
                );
            }));
        }

        let sampler = MetricsSampler::new(source);
        {
            let bus = Arc::clone(&bus);
            sampler.subscribe(Arc::new(move |snapshot: &MetricSnapshot| {
                emit(&bus, event_names::METRICS_UPDATED, &MetricsUpdatedEvent::from(snapshot));
            }));
        }

        let mut permissions = PermissionGateway::new(config.platform);
        if let Some(overlay) = &collaborators.overlay {
            permissions = permissions.with_overlay_manager(Arc::clone(overlay));
        }
        if let Some(monitor) = &collaborators.monitor {
            permissions = permissions.with_monitor_module(Arc::clone(monitor));
        }
        if let Some(system_settings) = &collaborators.system_settings {
            permissions = permissions.with_system_settings(Arc::clone(system_settings));
        }

        let overlay = OverlayService::new(collaborators.overlay.clone(), collaborators.monitor.clone());
        let game_mode = GameModeController::new(notifier);

        tracing::info!(
            platform = %config.platform,
            interval_ms = config.sample_interval_ms,
            "performance monitor created"
        );

        Ok(PerformanceMonitor {
            config,
            settings,
            sampler,
            permissions,
            overlay,
            game_mode,
            notifications: collaborators.notifications,
            queued,
            bus,
            sampling: Mutex::new(None),
        })
    }
}

/// Coordinates permissions, overlay, sampling, settings and game mode.
pub struct PerformanceMonitor {
    config: MonitorConfig,
    settings: Arc<SettingsStore>,
    sampler: MetricsSampler,
    permissions: PermissionGateway,
    overlay: OverlayService,
    game_mode: GameModeController,
    notifications: Option<NotificationServiceRef>,
    queued: Option<Arc<QueuedNotifier>>,
    bus: EventBusRef,
    sampling: Mutex<Option<SamplerHandle>>,
}

impl PerformanceMonitor {
    pub fn builder(config: MonitorConfig, source: MetricsSourceRef) -> MonitorBuilder {
        MonitorBuilder {
            config,
            source,
            collaborators: Collaborators::default(),
            bus: None,
            notifier: None,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Register the notification channel and ask for notification permission.
    ///
    /// Returns whether notifications are allowed.
    pub async fn initialize(&self) -> bool {
        let Some(service) = &self.notifications else {
            tracing::warn!("Notifications module not available, skipping setup");
            return false;
        };
        setup_notifications(
            service.as_ref(),
            self.config.platform,
            &self.config.notification_channel,
        )
        .await
    }

    pub async fn request_overlay_permission(&self) -> PermissionOutcome {
        let outcome = self.permissions.request_overlay_permission().await;
        self.emit_permission(PermissionKind::Overlay, &outcome);
        outcome
    }

    pub async fn request_usage_stats_permission(&self) -> PermissionOutcome {
        let outcome = self.permissions.request_usage_stats_permission().await;
        self.emit_permission(PermissionKind::UsageStats, &outcome);
        outcome
    }

    pub fn permissions(&self) -> PermissionState {
        self.permissions.state()
    }

    /// Show or hide the overlay window. Refused until the overlay
    /// permission is granted.
    pub async fn toggle_overlay(&self) -> Result<OverlayStatus, MonitorError> {
        if !self.permissions.is_granted(PermissionKind::Overlay) {
            tracing::warn!("overlay toggle refused, permission not granted");
            return Err(MonitorError::PermissionRequired(PermissionKind::Overlay));
        }
        let status = self.overlay.toggle().await;
        self.emit_status(status);
        Ok(status)
    }

    /// Start the native monitoring service and the sampler. Idempotent.
    pub async fn start_monitoring(&self) -> Result<OverlayStatus, MonitorError> {
        if !self.permissions.is_granted(PermissionKind::UsageStats) {
            tracing::warn!("starting monitoring without usage stats access, metrics may be limited");
        }

        // Sampler first: if it cannot start, the native service stays off.
        {
            let mut sampling = self.sampling.lock().unwrap_or_else(|e| e.into_inner());
            if sampling.is_none() {
                *sampling = Some(self.sampler.start(self.config.sample_interval())?);
            } else {
                tracing::debug!("sampler already running");
            }
        }

        let status = self.overlay.start_monitoring_service().await;
        self.emit_status(status);
        Ok(status)
    }

    /// Stop sampling, then the native monitoring service.
    pub async fn stop_monitoring(&self) -> OverlayStatus {
        let handle = self
            .sampling
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.cancel();
            handle.join().await;
        }

        let status = self.overlay.stop_monitoring_service().await;
        self.emit_status(status);
        status
    }

    pub fn is_sampling(&self) -> bool {
        self.sampling
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn overlay_status(&self) -> OverlayStatus {
        self.overlay.status()
    }

    pub fn toggle_game_mode(&self) -> GameModeState {
        let state = self.game_mode.toggle();
        emit(
            &self.bus,
            event_names::GAME_MODE_CHANGED,
            &GameModeChangedEvent {
                active: state == GameModeState::Active,
            },
        );
        state
    }

    pub fn game_mode(&self) -> GameModeState {
        self.game_mode.state()
    }

    pub fn update_setting(
        &self,
        key: SettingKey,
        value: impl Into<SettingValue>,
    ) -> Result<OverlaySettings, MonitorError> {
        Ok(self.settings.update(key, value)?)
    }

    /// String-keyed variant of [`update_setting`](Self::update_setting).
    pub fn update_setting_named(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<OverlaySettings, MonitorError> {
        Ok(self.settings.update_named(key, value)?)
    }

    pub fn settings(&self) -> OverlaySettings {
        self.settings.get()
    }

    pub fn latest_metrics(&self) -> Option<MetricSnapshot> {
        self.sampler.latest()
    }

    /// Overlay contents for the latest snapshot, if any has been taken.
    pub fn overlay_frame(&self) -> Option<OverlayFrame> {
        self.latest_metrics()
            .map(|snapshot| compose_overlay(&self.settings.get(), &snapshot))
    }

    /// Stop monitoring and the notification worker.
    pub async fn shutdown(&self) {
        tracing::info!("performance monitor shutting down");
        self.stop_monitoring().await;
        if let Some(queued) = &self.queued {
            queued.join().await;
        }
    }

    fn emit_permission(&self, kind: PermissionKind, outcome: &PermissionOutcome) {
        emit(
            &self.bus,
            event_names::PERMISSIONS_CHANGED,
            &PermissionChangedEvent {
                permission: kind.to_string(),
                granted: self.permissions.is_granted(kind),
                outcome: Some(outcome.label().to_string()),
            },
        );
    }

    fn emit_status(&self, status: OverlayStatus) {
        emit(
            &self.bus,
            event_names::OVERLAY_STATUS,
            &OverlayStatusEvent {
                visible: status.visible,
                service_running: status.service_running,
            },
        );
    }
}

impl std::fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("config", &self.config)
            .field("permissions", &self.permissions.state())
            .field("overlay", &self.overlay.status())
            .field("game_mode", &self.game_mode.state())
            .field("sampling", &self.is_sampling())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfmon_events::InMemoryEventBus;
    use perfmon_metrics::{FixedSource, MetricReading, MetricsError};
    use perfmon_notify::RecordingNotifier;
    use perfmon_platform::Platform;
    use std::time::Duration;

    fn monitor(bus: Arc<InMemoryEventBus>) -> PerformanceMonitor {
        let config = MonitorConfig {
            platform: Platform::android(33),
            ..MonitorConfig::default()
        };
        PerformanceMonitor::builder(config, Arc::new(FixedSource::new(MetricReading::default())))
            .collaborators(Collaborators::null())
            .event_bus(bus)
            .notifier(Arc::new(RecordingNotifier::new()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_toggle_overlay_requires_permission() {
        let bus = Arc::new(InMemoryEventBus::new());
        let monitor = monitor(bus.clone());

        // NullPlatform denies.
        assert_eq!(monitor.request_overlay_permission().await, PermissionOutcome::Denied);
        assert!(matches!(
            monitor.toggle_overlay().await,
            Err(MonitorError::PermissionRequired(PermissionKind::Overlay))
        ));
        assert!(!monitor.overlay_status().visible);

        let event = bus.last_for(event_names::PERMISSIONS_CHANGED).unwrap();
        assert_eq!(event["permission"], "overlay");
        assert_eq!(event["outcome"], "denied");
    }

    #[tokio::test]
    async fn test_settings_updates_are_mirrored() {
        let bus = Arc::new(InMemoryEventBus::new());
        let monitor = monitor(bus.clone());

        monitor.update_setting(SettingKey::Transparency, 1.5).unwrap();
        assert_eq!(monitor.settings().transparency, 1.0);

        let event = bus.last_for(event_names::SETTINGS_CHANGED).unwrap();
        assert_eq!(event["key"], "transparency");
        assert_eq!(event["settings"]["transparency"], 1.0);

        assert!(monitor.update_setting_named("bogus", &serde_json::json!(true)).is_err());
        assert_eq!(bus.events_for(event_names::SETTINGS_CHANGED).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop_monitoring() {
        let bus = Arc::new(InMemoryEventBus::new());
        let monitor = monitor(bus.clone());

        assert!(monitor.start_monitoring().await.unwrap().service_running);
        assert!(monitor.start_monitoring().await.unwrap().service_running);
        assert!(monitor.is_sampling());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(monitor.latest_metrics().is_some());
        assert_eq!(monitor.overlay_frame().unwrap().rows.len(), 5);

        let status = monitor.stop_monitoring().await;
        assert!(!status.service_running);
        assert!(!monitor.is_sampling());

        let published = bus.events_for(event_names::METRICS_UPDATED).len();
        assert_eq!(published, 2);
        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(bus.events_for(event_names::METRICS_UPDATED).len(), published);
    }

    #[test]
    fn test_sampler_failure_leaves_service_stopped() {
        let bus = Arc::new(InMemoryEventBus::new());
        let monitor = monitor(bus.clone());

        // No tokio runtime here, so the sampler cannot start.
        let result = futures::executor::block_on(monitor.start_monitoring());
        assert!(matches!(
            result,
            Err(MonitorError::Metrics(MetricsError::NoRuntime))
        ));
        assert!(!monitor.is_sampling());
        assert!(!monitor.overlay_status().service_running);
        assert!(bus.events_for(event_names::OVERLAY_STATUS).is_empty());
    }

    #[tokio::test]
    async fn test_game_mode_events() {
        let bus = Arc::new(InMemoryEventBus::new());
        let monitor = monitor(bus.clone());

        assert_eq!(monitor.toggle_game_mode(), GameModeState::Active);
        assert_eq!(
            bus.last_for(event_names::GAME_MODE_CHANGED),
            Some(serde_json::json!({"active": true}))
        );
        assert_eq!(monitor.toggle_game_mode(), GameModeState::Inactive);
        assert_eq!(monitor.game_mode(), GameModeState::Inactive);
    }
}
