//! Settings store - single owner of the overlay settings record.

use crate::error::SettingsResult;
use crate::key::{SettingKey, SettingValue};
use crate::model::OverlaySettings;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Called after every successful update with the key and the merged record.
pub type SettingsCallback = Arc<dyn Fn(SettingKey, &OverlaySettings) + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Holds the overlay settings and notifies subscribers on change.
pub struct SettingsStore {
    settings: RwLock<OverlaySettings>,
    subscribers: Mutex<Vec<(SubscriptionId, SettingsCallback)>>,
    next_id: AtomicU64,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(OverlaySettings::default())
    }
}

impl SettingsStore {
    pub fn new(initial: OverlaySettings) -> Self {
        Self {
            settings: RwLock::new(initial),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Read-only copy of the current settings.
    pub fn get(&self) -> OverlaySettings {
        *self.settings.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Merge one key into the record, leaving every other key untouched.
    ///
    /// `transparency` is clamped to [0, 1]. Subscribers run after the merge,
    /// on the caller's thread, in registration order.
    pub fn update(&self, key: SettingKey, value: impl Into<SettingValue>) -> SettingsResult<OverlaySettings> {
        let value = value.into();
        let merged = {
            let mut settings = self.settings.write().unwrap_or_else(|e| e.into_inner());
            let mut next = *settings;
            next.apply(key, value)?;
            *settings = next;
            next
        };

        tracing::debug!(key = %key, value = ?merged.value(key), "setting updated");
        self.notify(key, &merged);
        Ok(merged)
    }

    /// String-keyed update for UI bridges that speak JSON.
    pub fn update_named(&self, key: &str, value: &serde_json::Value) -> SettingsResult<OverlaySettings> {
        let key: SettingKey = key.parse().inspect_err(|e| {
            tracing::warn!(error = %e, "rejected settings update");
        })?;
        let value = SettingValue::from_json(key, value)?;
        self.update(key, value)
    }

    pub fn subscribe(&self, callback: SettingsCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, callback));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    fn notify(&self, key: SettingKey, settings: &OverlaySettings) {
        let callbacks: Vec<SettingsCallback> = self
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            callback(key, settings);
        }
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("settings", &self.get())
            .finish_non_exhaustive()
    }
}
