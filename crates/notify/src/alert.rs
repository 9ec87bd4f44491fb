//! Notification payloads.

use perfmon_platform::NotificationRequest;
use serde_json::json;

/// `type` tag carried by the game-mode notification payload.
pub const GAME_MODE_NOTIFICATION_TYPE: &str = "gameMode";

/// The notification shown when game mode is switched on.
///
/// Delivered immediately; each call gets a fresh id.
pub fn game_mode_alert() -> NotificationRequest {
    NotificationRequest::immediate(
        uuid::Uuid::new_v4().to_string(),
        "Performance Monitor Active",
        "Monitoring game performance...",
        json!({ "type": GAME_MODE_NOTIFICATION_TYPE }),
    )
}
