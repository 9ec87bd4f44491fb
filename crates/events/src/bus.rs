//! Where coordinator events go.
//!
//! The coordinator only knows [`EventBus`]; the host decides whether events
//! reach a UI bridge, the log, or nowhere.

use std::sync::{Arc, Mutex, MutexGuard};

/// Sink for `topic` + JSON payload pairs.
///
/// `emit` runs inline in settings and sampler callbacks and must return
/// promptly.
pub trait EventBus: Send + Sync {
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

pub type EventBusRef = Arc<dyn EventBus>;

/// One event as seen by [`InMemoryEventBus`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Keeps every event in emission order. Test fixture.
#[derive(Default)]
pub struct InMemoryEventBus {
    recorded: Mutex<Vec<RecordedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<RecordedEvent>> {
        self.recorded.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.recorded().clone()
    }

    /// Topics in the order they were emitted.
    pub fn topics(&self) -> Vec<String> {
        self.recorded().iter().map(|e| e.topic.clone()).collect()
    }

    pub fn events_for(&self, topic: &str) -> Vec<RecordedEvent> {
        self.recorded()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Payload of the newest event on `topic`.
    pub fn last_for(&self, topic: &str) -> Option<serde_json::Value> {
        self.recorded()
            .iter()
            .rev()
            .find(|e| e.topic == topic)
            .map(|e| e.payload.clone())
    }

    pub fn clear(&self) {
        self.recorded().clear();
    }

    pub fn len(&self) -> usize {
        self.recorded().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.recorded().push(RecordedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// Drops everything.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

/// Logs each event at debug level. The headless binary uses this since
/// nothing else listens there.
pub struct TracingEventBus;

impl EventBus for TracingEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        tracing::debug!(target: "perfmon::events", topic, %payload, "event");
    }
}
