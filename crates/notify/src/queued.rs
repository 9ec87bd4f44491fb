//! Notification delivery through a background worker.

use crate::error::NotifyError;
use crate::gateway::NotificationGateway;
use perfmon_platform::{NotificationRequest, NotificationServiceRef};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Queues notifications and schedules them on a tokio worker.
///
/// Failed deliveries are logged and dropped; nothing is retried.
pub struct QueuedNotifier {
    tx: mpsc::UnboundedSender<NotificationRequest>,
    cancel_token: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl QueuedNotifier {
    /// Spawn the delivery worker on the current runtime.
    pub fn start(service: NotificationServiceRef) -> Result<Self, NotifyError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;
        let (tx, mut rx) = mpsc::unbounded_channel::<NotificationRequest>();
        let cancel_token = CancellationToken::new();

        let worker = {
            let cancel_token = cancel_token.clone();
            runtime.spawn(async move {
                tracing::debug!("notification worker started");
                loop {
                    let request = tokio::select! {
                        biased;
                        _ = cancel_token.cancelled() => break,
                        next = rx.recv() => match next {
                            Some(request) => request,
                            None => break,
                        },
                    };

                    match service.schedule(&request).await {
                        Ok(host_id) => {
                            tracing::info!(id = %request.id, host_id = %host_id, "notification scheduled");
                        }
                        Err(e) => {
                            tracing::error!(id = %request.id, error = %e, "Error sending notification");
                        }
                    }
                }
                tracing::debug!("notification worker stopped");
            })
        };

        Ok(Self {
            tx,
            cancel_token,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Stop the worker. Queued but undelivered notifications are dropped.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Shut down and wait for the worker to exit.
    pub async fn join(&self) {
        self.shutdown();
        let worker = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "notification worker ended abnormally");
            }
        }
    }
}

impl NotificationGateway for QueuedNotifier {
    fn notify(&self, request: NotificationRequest) {
        if self.is_shut_down() {
            tracing::warn!(id = %request.id, "notifier shut down, notification dropped");
            return;
        }
        if let Err(e) = self.tx.send(request) {
            tracing::warn!(id = %e.0.id, "notification worker gone, notification dropped");
        }
    }
}

impl Drop for QueuedNotifier {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::game_mode_alert;
    use async_trait::async_trait;
    use perfmon_platform::{ChannelConfig, NativeError, NotificationService};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeService {
        fail: AtomicBool,
        scheduled: Mutex<Vec<NotificationRequest>>,
        delivered: tokio::sync::Notify,
    }

    #[async_trait]
    impl NotificationService for FakeService {
        async fn set_notification_channel(&self, _channel: &ChannelConfig) -> Result<(), NativeError> {
            Ok(())
        }

        async fn request_permissions(&self) -> Result<bool, NativeError> {
            Ok(true)
        }

        async fn schedule(&self, request: &NotificationRequest) -> Result<String, NativeError> {
            let result = if self.fail.load(Ordering::SeqCst) {
                Err(NativeError::rejected("E_SCHEDULE", "notifications disabled"))
            } else {
                self.scheduled.lock().unwrap().push(request.clone());
                Ok(request.id.clone())
            };
            self.delivered.notify_one();
            result
        }
    }

    async fn wait_for_delivery(service: &FakeService) {
        tokio::time::timeout(Duration::from_secs(2), service.delivered.notified())
            .await
            .expect("delivery timed out");
    }

    #[tokio::test]
    async fn test_notify_schedules_on_worker() {
        let service = Arc::new(FakeService::default());
        let notifier = QueuedNotifier::start(service.clone()).unwrap();

        let alert = game_mode_alert();
        notifier.notify(alert.clone());
        wait_for_delivery(&service).await;

        assert_eq!(*service.scheduled.lock().unwrap(), vec![alert]);
        notifier.join().await;
    }

    #[tokio::test]
    async fn test_failed_delivery_is_not_retried() {
        let service = Arc::new(FakeService::default());
        service.fail.store(true, Ordering::SeqCst);
        let notifier = QueuedNotifier::start(service.clone()).unwrap();

        notifier.notify(game_mode_alert());
        wait_for_delivery(&service).await;

        service.fail.store(false, Ordering::SeqCst);
        notifier.notify(game_mode_alert());
        wait_for_delivery(&service).await;

        // Only the second one made it; the first was never retried.
        assert_eq!(service.scheduled.lock().unwrap().len(), 1);
        notifier.join().await;
    }

    #[tokio::test]
    async fn test_notify_after_shutdown_is_dropped() {
        let service = Arc::new(FakeService::default());
        let notifier = QueuedNotifier::start(service.clone()).unwrap();

        notifier.join().await;
        assert!(notifier.is_shut_down());
        notifier.notify(game_mode_alert());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(service.scheduled.lock().unwrap().is_empty());
    }

    #[test]
    fn test_start_requires_runtime() {
        let service = Arc::new(FakeService::default());
        assert_eq!(QueuedNotifier::start(service).err(), Some(NotifyError::NoRuntime));
    }
}
