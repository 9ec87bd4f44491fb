//! Overlay display settings.
//!
//! A single [`OverlaySettings`] record owned by a [`SettingsStore`]. Updates
//! go through a closed set of [`SettingKey`]s, one field at a time, and
//! subscribers are told synchronously after each merge.

mod error;
mod key;
mod model;
mod store;

pub use error::{SettingsError, SettingsResult};
pub use key::{SettingKey, SettingValue};
pub use model::{ColorScheme, OverlaySettings, DEFAULT_TRANSPARENCY};
pub use store::{SettingsCallback, SettingsStore, SubscriptionId};
