//! Local notifications for perfmon.
//!
//! Registers the performance notification channel at startup and delivers
//! notifications without blocking the caller: [`NotificationGateway::notify`]
//! only enqueues, a background worker talks to the host service.

mod alert;
mod error;
mod gateway;
mod queued;
mod setup;

pub use alert::{game_mode_alert, GAME_MODE_NOTIFICATION_TYPE};
pub use error::NotifyError;
pub use gateway::{NotificationGateway, NotificationGatewayRef, NullNotifier, RecordingNotifier};
pub use queued::QueuedNotifier;
pub use setup::setup_notifications;
