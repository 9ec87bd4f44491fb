//! Native collaborator contracts for perfmon.
//!
//! Everything the coordination layer consumes from the host OS lives behind
//! the traits in this crate:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  provider.rs     - OverlayManager, PerformanceMonitorModule,  │
//! │                    SystemSettings, NotificationService        │
//! │  notification.rs - channel config + notification request DTOs │
//! │  host.rs         - Platform descriptor (OS + API level)       │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  null.rs - inert implementation for tests / unsupported hosts │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The traits only describe return values and side effects; how a host
//! draws the overlay or schedules a notification is not our concern.

mod error;
mod host;
mod notification;
mod null;
mod provider;

pub use error::NativeError;
pub use host::{Os, Platform, OVERLAY_RUNTIME_GRANT_API_LEVEL};
pub use notification::{ChannelConfig, Importance, NotificationRequest};
pub use null::NullPlatform;
pub use provider::{
    NotificationService, NotificationServiceRef, OverlayManager, OverlayManagerRef,
    PerformanceMonitorModule, PerformanceMonitorModuleRef, SystemSettings, SystemSettingsRef,
};
