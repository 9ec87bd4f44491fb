//! The notification gateway seam.

use perfmon_platform::NotificationRequest;
use std::sync::{Arc, Mutex};

/// Fire-and-forget notification delivery.
///
/// `notify` never blocks and never reports failure to the caller; delivery
/// problems are logged by the implementation.
pub trait NotificationGateway: Send + Sync {
    fn notify(&self, request: NotificationRequest);
}

pub type NotificationGatewayRef = Arc<dyn NotificationGateway>;

/// Records every request, for tests.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<NotificationRequest>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl NotificationGateway for RecordingNotifier {
    fn notify(&self, request: NotificationRequest) {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);
    }
}

/// Discards every notification.
pub struct NullNotifier;

impl NotificationGateway for NullNotifier {
    fn notify(&self, request: NotificationRequest) {
        tracing::trace!(id = %request.id, "notification discarded");
    }
}
