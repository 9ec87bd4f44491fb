//! Metrics sampler - background task that polls a source on an interval.

use crate::error::MetricsError;
use crate::snapshot::MetricSnapshot;
use crate::source::MetricsSourceRef;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default sampling interval.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(1000);

/// Callback invoked with every published snapshot.
pub type MetricsCallback = Arc<dyn Fn(&MetricSnapshot) + Send + Sync + 'static>;

/// Identifies a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Subscribers {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(SubscriptionId, MetricsCallback)>>,
    latest: RwLock<Option<MetricSnapshot>>,
}

impl Subscribers {
    fn publish(&self, snapshot: &MetricSnapshot) {
        *self.latest.write().unwrap_or_else(|e| e.into_inner()) = Some(*snapshot);

        // Snapshot the list so callbacks may (un)subscribe without deadlocking.
        let callbacks: Vec<MetricsCallback> = self
            .callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            callback(snapshot);
        }
    }
}

/// Drives periodic sampling of a [`MetricsSource`](crate::MetricsSource).
///
/// Sampling runs whether or not anything is displayed; it never looks at
/// overlay settings.
pub struct MetricsSampler {
    source: MetricsSourceRef,
    subscribers: Arc<Subscribers>,
    seq: Arc<AtomicU64>,
}

impl MetricsSampler {
    pub fn new(source: MetricsSourceRef) -> Self {
        Self {
            source,
            subscribers: Arc::new(Subscribers::default()),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register a callback for every snapshot published from now on.
    pub fn subscribe(&self, callback: MetricsCallback) -> SubscriptionId {
        let id = SubscriptionId(self.subscribers.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, callback));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self
            .subscribers
            .callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Most recently published snapshot, if any tick has completed.
    pub fn latest(&self) -> Option<MetricSnapshot> {
        *self
            .subscribers
            .latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Start producing one snapshot every `interval`.
    ///
    /// The first tick fires immediately. Must be called from within a tokio
    /// runtime. The returned handle owns the task: cancel it (or drop it)
    /// when the owner goes away.
    pub fn start(&self, interval: Duration) -> Result<SamplerHandle, MetricsError> {
        if interval.is_zero() {
            return Err(MetricsError::InvalidInterval);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| MetricsError::NoRuntime)?;

        let token = CancellationToken::new();
        let gate = Arc::new(PublishGate::default());

        let task = {
            let token = token.clone();
            let gate = Arc::clone(&gate);
            let source = Arc::clone(&self.source);
            let subscribers = Arc::clone(&self.subscribers);
            let seq = Arc::clone(&self.seq);

            runtime.spawn(async move {
                tracing::info!("MetricsSampler started with interval {:?}", interval);

                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut published = 0u64;

                loop {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => {}
                    }

                    let result = tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        result = source.sample() => result,
                    };

                    match result {
                        Ok(reading) => {
                            let snapshot =
                                MetricSnapshot::from_reading(seq.fetch_add(1, Ordering::Relaxed), reading);
                            // The gate closes before cancel() returns, so a sample
                            // that finished late is dropped here.
                            if !gate.publish(|| subscribers.publish(&snapshot)) {
                                tracing::debug!(seq = snapshot.seq(), "discarding snapshot after cancel");
                                break;
                            }
                            published += 1;
                            tracing::trace!(
                                seq = snapshot.seq(),
                                fps = snapshot.fps(),
                                cpu = snapshot.cpu(),
                                "published snapshot"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "metrics sample failed, skipping tick");
                        }
                    }
                }

                tracing::info!(published, "MetricsSampler stopped");
            })
        };

        Ok(SamplerHandle {
            token,
            gate,
            task: Mutex::new(Some(task)),
            cancelled: AtomicBool::new(false),
        })
    }
}

/// Serializes publishing against cancellation.
struct PublishGate {
    open: Mutex<bool>,
}

impl Default for PublishGate {
    fn default() -> Self {
        Self {
            open: Mutex::new(true),
        }
    }
}

impl PublishGate {
    /// Run `publish` if the gate is still open. Returns false once closed.
    fn publish(&self, publish: impl FnOnce()) -> bool {
        let open = self.open.lock().unwrap_or_else(|e| e.into_inner());
        if !*open {
            return false;
        }
        publish();
        true
    }

    /// Close the gate, waiting for an in-progress publish to finish.
    fn close(&self) {
        *self.open.lock().unwrap_or_else(|e| e.into_inner()) = false;
    }
}

/// Cancellation handle for a running sampler.
///
/// Once [`cancel`](Self::cancel) returns, no further snapshot is published,
/// even if a sample was in flight. Subscribers must not cancel the handle
/// from inside their own callback.
pub struct SamplerHandle {
    token: CancellationToken,
    gate: Arc<PublishGate>,
    task: Mutex<Option<JoinHandle<()>>>,
    cancelled: AtomicBool,
}

impl SamplerHandle {
    /// Stop ticking. Idempotent.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.gate.close();
        self.token.cancel();
        tracing::debug!("MetricsSampler cancel requested");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Cancel and wait for the sampling task to exit.
    pub async fn join(self) {
        self.cancel();
        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "sampler task ended abnormally");
            }
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        if !self.is_cancelled() {
            tracing::warn!("SamplerHandle dropped without cancel; stopping sampler");
            self.cancel();
        }
    }
}

impl std::fmt::Debug for SamplerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplerHandle")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MetricReading;
    use crate::source::{FixedSource, MetricsSource, ScriptedSource};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::{mpsc, Notify};

    fn counting_callback(counter: &Arc<AtomicUsize>) -> MetricsCallback {
        let counter = Arc::clone(counter);
        Arc::new(move |_snapshot: &MetricSnapshot| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_publishes_each_tick() {
        let sampler = MetricsSampler::new(Arc::new(FixedSource::new(MetricReading::default())));
        let count = Arc::new(AtomicUsize::new(0));
        sampler.subscribe(counting_callback(&count));

        let handle = sampler.start(Duration::from_millis(100)).unwrap();

        // Ticks at 0, 100, 200 and 300ms.
        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.join().await;

        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert_eq!(sampler.latest().map(|s| s.seq()), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_snapshots_after_cancel() {
        let sampler = MetricsSampler::new(Arc::new(FixedSource::new(MetricReading::default())));
        let count = Arc::new(AtomicUsize::new(0));
        sampler.subscribe(counting_callback(&count));

        let handle = sampler.start(Duration::from_millis(100)).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.cancel();
        let after_cancel = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
        handle.join().await;
    }

    /// Source that blocks inside `sample()` until released.
    struct GatedSource {
        entered: mpsc::UnboundedSender<()>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl MetricsSource for GatedSource {
        async fn sample(&self) -> Result<MetricReading, MetricsError> {
            let _ = self.entered.send(());
            self.release.notified().await;
            Ok(MetricReading::default())
        }
    }

    #[tokio::test]
    async fn test_in_flight_sample_is_discarded_after_cancel() {
        let (entered_tx, mut entered_rx) = mpsc::unbounded_channel();
        let release = Arc::new(Notify::new());
        let sampler = MetricsSampler::new(Arc::new(GatedSource {
            entered: entered_tx,
            release: Arc::clone(&release),
        }));
        let count = Arc::new(AtomicUsize::new(0));
        sampler.subscribe(counting_callback(&count));

        let handle = sampler.start(Duration::from_millis(10)).unwrap();
        entered_rx.recv().await.unwrap();

        handle.cancel();
        release.notify_waiters();
        handle.join().await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(sampler.latest().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_waits_for_running_subscriber() {
        let sampler = MetricsSampler::new(Arc::new(FixedSource::new(MetricReading::default())));
        let (entered_tx, mut entered_rx) = mpsc::unbounded_channel();
        let in_callback = Arc::new(AtomicBool::new(false));
        let count = Arc::new(AtomicUsize::new(0));
        {
            let in_callback = Arc::clone(&in_callback);
            let count = Arc::clone(&count);
            sampler.subscribe(Arc::new(move |_snapshot: &MetricSnapshot| {
                in_callback.store(true, Ordering::SeqCst);
                let _ = entered_tx.send(());
                std::thread::sleep(Duration::from_millis(50));
                count.fetch_add(1, Ordering::SeqCst);
                in_callback.store(false, Ordering::SeqCst);
            }));
        }

        let handle = sampler.start(Duration::from_millis(10)).unwrap();
        entered_rx.recv().await.unwrap();

        // Cancel from another thread while the subscriber is still sleeping.
        let handle = tokio::task::spawn_blocking(move || {
            handle.cancel();
            handle
        })
        .await
        .unwrap();

        assert!(
            !in_callback.load(Ordering::SeqCst),
            "cancel returned while a subscriber was running"
        );
        let at_cancel = count.load(Ordering::SeqCst);
        assert!(at_cancel >= 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), at_cancel);
        handle.join().await;
    }

    #[test]
    fn test_closed_gate_discards_publish() {
        let gate = PublishGate::default();
        let runs = AtomicUsize::new(0);

        assert!(gate.publish(|| {
            runs.fetch_add(1, Ordering::SeqCst);
        }));
        gate.close();
        assert!(!gate.publish(|| {
            runs.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_snapshot_within_bounds() {
        let wild = MetricReading {
            fps: 1000.0,
            cpu: 250.0,
            gpu: -40.0,
            temp: -300.0,
            ram: f64::INFINITY,
        };
        let source = ScriptedSource::new(vec![Ok(wild), Ok(MetricReading::default()), Ok(wild)]);
        let sampler = MetricsSampler::new(Arc::new(source));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        sampler.subscribe(Arc::new(move |snapshot: &MetricSnapshot| {
            seen_clone.lock().unwrap().push(*snapshot);
        }));

        let handle = sampler.start(Duration::from_millis(100)).unwrap();
        tokio::time::sleep(Duration::from_millis(450)).await;
        handle.join().await;

        let seen = seen.lock().unwrap();
        assert!(seen.len() >= 3);
        assert!(seen.iter().all(|s| s.is_within_bounds()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tick_is_skipped() {
        let source = ScriptedSource::new(vec![
            Err(MetricsError::Source("sensor busy".to_string())),
            Ok(MetricReading::default()),
        ]);
        let sampler = MetricsSampler::new(Arc::new(source));
        let count = Arc::new(AtomicUsize::new(0));
        sampler.subscribe(counting_callback(&count));

        let handle = sampler.start(Duration::from_millis(100)).unwrap();
        // Ticks at 0 (fails) and 100 (ok).
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.join().await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(sampler.latest().map(|s| s.seq()), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_stops_delivery() {
        let sampler = MetricsSampler::new(Arc::new(FixedSource::new(MetricReading::default())));
        let kept = Arc::new(AtomicUsize::new(0));
        let removed = Arc::new(AtomicUsize::new(0));
        sampler.subscribe(counting_callback(&kept));
        let id = sampler.subscribe(counting_callback(&removed));

        assert!(sampler.unsubscribe(id));
        assert!(!sampler.unsubscribe(id));

        let handle = sampler.start(Duration::from_millis(100)).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.join().await;

        assert_eq!(kept.load(Ordering::SeqCst), 1);
        assert_eq!(removed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let sampler = MetricsSampler::new(Arc::new(FixedSource::new(MetricReading::default())));
        assert_eq!(
            sampler.start(Duration::ZERO).unwrap_err(),
            MetricsError::InvalidInterval
        );
    }

    #[test]
    fn test_start_without_runtime_fails() {
        let sampler = MetricsSampler::new(Arc::new(FixedSource::new(MetricReading::default())));
        assert_eq!(
            sampler.start(Duration::from_millis(100)).unwrap_err(),
            MetricsError::NoRuntime
        );
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let sampler = MetricsSampler::new(Arc::new(FixedSource::new(MetricReading::default())));
        let handle = sampler.start(Duration::from_millis(100)).unwrap();
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        handle.join().await;
    }
}
