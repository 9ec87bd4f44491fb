//! One-time notification setup.

use perfmon_platform::{ChannelConfig, NotificationService, Platform};

/// Register the notification channel (Android only) and ask for permission.
///
/// Returns whether notifications are allowed. Failures are logged and never
/// propagated.
pub async fn setup_notifications(
    service: &dyn NotificationService,
    platform: Platform,
    channel: &ChannelConfig,
) -> bool {
    if platform.supports_notification_channels() {
        match service.set_notification_channel(channel).await {
            Ok(()) => tracing::debug!(channel = %channel.id, "notification channel registered"),
            Err(e) => tracing::error!(channel = %channel.id, error = %e, "Error registering notification channel"),
        }
    }

    match service.request_permissions().await {
        Ok(granted) => {
            tracing::info!(granted, "notification permission requested");
            granted
        }
        Err(e) => {
            tracing::error!(error = %e, "Error setting up notifications");
            false
        }
    }
}
