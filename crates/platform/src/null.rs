//! Inert collaborator for tests and hosts without native modules.

use crate::error::NativeError;
use crate::notification::{ChannelConfig, NotificationRequest};
use crate::provider::{NotificationService, OverlayManager, PerformanceMonitorModule, SystemSettings};
use async_trait::async_trait;

/// Null implementation of every native trait.
///
/// Denies all permissions and accepts all other calls without doing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlatform;

#[async_trait]
impl OverlayManager for NullPlatform {
    async fn can_draw_overlays(&self) -> bool {
        false
    }

    async fn request_overlay_permission(&self) -> Result<bool, NativeError> {
        Ok(false)
    }

    async fn toggle_overlay(&self) -> Result<(), NativeError> {
        tracing::debug!("NullPlatform: toggle_overlay ignored");
        Ok(())
    }
}

#[async_trait]
impl PerformanceMonitorModule for NullPlatform {
    async fn has_usage_stats_access(&self) -> bool {
        false
    }

    async fn request_usage_stats_permission(&self) -> Result<bool, NativeError> {
        Ok(false)
    }

    async fn start_service(&self) -> Result<(), NativeError> {
        Ok(())
    }

    async fn stop_service(&self) -> Result<(), NativeError> {
        Ok(())
    }
}

#[async_trait]
impl SystemSettings for NullPlatform {
    async fn open_settings(&self) -> Result<(), NativeError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationService for NullPlatform {
    async fn set_notification_channel(&self, _channel: &ChannelConfig) -> Result<(), NativeError> {
        Ok(())
    }

    async fn request_permissions(&self) -> Result<bool, NativeError> {
        Ok(false)
    }

    async fn schedule(&self, request: &NotificationRequest) -> Result<String, NativeError> {
        Ok(request.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_platform_denies_permissions() {
        let platform = NullPlatform;
        assert!(!platform.can_draw_overlays().await);
        assert_eq!(platform.request_overlay_permission().await, Ok(false));
        assert!(!platform.has_usage_stats_access().await);
        assert_eq!(platform.request_usage_stats_permission().await, Ok(false));
    }

    #[tokio::test]
    async fn test_null_platform_schedule_echoes_id() {
        let request = NotificationRequest::immediate("abc", "t", "b", serde_json::Value::Null);
        let id = NullPlatform.schedule(&request).await.unwrap();
        assert_eq!(id, "abc");
    }
}
