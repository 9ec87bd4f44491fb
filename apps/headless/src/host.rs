//! Desktop stand-ins for the native notification service.

use async_trait::async_trait;
use perfmon_platform::{ChannelConfig, NativeError, NotificationRequest, NotificationService};

/// Writes notifications to the log instead of the OS notification center.
pub struct LogNotifications;

#[async_trait]
impl NotificationService for LogNotifications {
    async fn set_notification_channel(&self, channel: &ChannelConfig) -> Result<(), NativeError> {
        tracing::info!(id = %channel.id, name = %channel.name, "notification channel");
        Ok(())
    }

    async fn request_permissions(&self) -> Result<bool, NativeError> {
        Ok(true)
    }

    async fn schedule(&self, request: &NotificationRequest) -> Result<String, NativeError> {
        tracing::info!(title = %request.title, body = %request.body, "notification");
        Ok(request.id.clone())
    }
}
