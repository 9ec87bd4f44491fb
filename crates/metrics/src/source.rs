//! Metric sources.
//!
//! A [`MetricsSource`] produces one full reading per call. [`CompositeSource`]
//! builds one out of independent per-field [`MetricProbe`]s so a slow or
//! broken probe only affects its own field.

use crate::error::MetricsError;
use crate::snapshot::{MetricKind, MetricReading};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default per-probe deadline inside a [`CompositeSource`].
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(250);

/// Supplies one metric reading on demand.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Read all metrics. A failure skips the current tick.
    async fn sample(&self) -> Result<MetricReading, MetricsError>;
}

pub type MetricsSourceRef = Arc<dyn MetricsSource>;

/// Reads a single metric.
#[async_trait]
pub trait MetricProbe: Send + Sync {
    fn kind(&self) -> MetricKind;

    async fn read(&self) -> Result<f64, MetricsError>;
}

/// Source assembled from independent per-field probes.
///
/// Probes run concurrently, each under its own deadline. A field whose probe
/// fails or times out keeps its last good value; the other fields are
/// unaffected. Fields without a probe stay at their initial value.
pub struct CompositeSource {
    probes: Vec<Arc<dyn MetricProbe>>,
    timeout: Duration,
    last: Mutex<MetricReading>,
}

impl CompositeSource {
    pub fn new(probes: Vec<Arc<dyn MetricProbe>>) -> Self {
        Self::with_timeout(probes, DEFAULT_PROBE_TIMEOUT)
    }

    pub fn with_timeout(probes: Vec<Arc<dyn MetricProbe>>, timeout: Duration) -> Self {
        Self {
            probes,
            timeout,
            last: Mutex::new(MetricReading::default()),
        }
    }

    /// Seed the fallback values used until each probe first succeeds.
    pub fn with_initial(self, initial: MetricReading) -> Self {
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = initial;
        self
    }
}

#[async_trait]
impl MetricsSource for CompositeSource {
    async fn sample(&self) -> Result<MetricReading, MetricsError> {
        let timeout = self.timeout;
        let reads = self.probes.iter().map(|probe| {
            let probe = Arc::clone(probe);
            async move {
                let kind = probe.kind();
                match tokio::time::timeout(timeout, probe.read()).await {
                    Ok(result) => (kind, result),
                    Err(_) => (
                        kind,
                        Err(MetricsError::ProbeFailed {
                            kind,
                            message: format!("timed out after {:?}", timeout),
                        }),
                    ),
                }
            }
        });
        let results = futures::future::join_all(reads).await;

        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let mut fresh = 0usize;
        for (kind, result) in results {
            match result {
                Ok(value) => {
                    last.set(kind, value);
                    fresh += 1;
                }
                Err(e) => {
                    tracing::debug!(metric = %kind, error = %e, "probe failed, keeping last value");
                }
            }
        }

        if fresh == 0 && !self.probes.is_empty() {
            return Err(MetricsError::AllProbesFailed);
        }

        Ok(*last)
    }
}

/// Always returns the same reading.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource {
    reading: MetricReading,
}

impl FixedSource {
    pub fn new(reading: MetricReading) -> Self {
        Self { reading }
    }
}

#[async_trait]
impl MetricsSource for FixedSource {
    async fn sample(&self) -> Result<MetricReading, MetricsError> {
        Ok(self.reading)
    }
}

/// Replays a fixed script of results, then repeats the last one.
///
/// Deterministic fixture for sampler tests.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<MetricReading, MetricsError>>>,
    last: Mutex<Option<Result<MetricReading, MetricsError>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Result<MetricReading, MetricsError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `sample()` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsSource for ScriptedSource {
    async fn sample(&self) -> Result<MetricReading, MetricsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        match next {
            Some(result) => {
                *last = Some(result.clone());
                result
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(MetricsError::Source("empty script".to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstProbe(MetricKind, f64);

    #[async_trait]
    impl MetricProbe for ConstProbe {
        fn kind(&self) -> MetricKind {
            self.0
        }

        async fn read(&self) -> Result<f64, MetricsError> {
            Ok(self.1)
        }
    }

    struct FailingProbe(MetricKind);

    #[async_trait]
    impl MetricProbe for FailingProbe {
        fn kind(&self) -> MetricKind {
            self.0
        }

        async fn read(&self) -> Result<f64, MetricsError> {
            Err(MetricsError::ProbeFailed {
                kind: self.0,
                message: "sensor offline".to_string(),
            })
        }
    }

    struct StalledProbe(MetricKind);

    #[async_trait]
    impl MetricProbe for StalledProbe {
        fn kind(&self) -> MetricKind {
            self.0
        }

        async fn read(&self) -> Result<f64, MetricsError> {
            std::future::pending::<()>().await;
            Ok(0.0)
        }
    }

    /// Sensor whose driver call blocks an OS thread.
    struct BlockingSensor(MetricKind, Duration);

    #[async_trait]
    impl MetricProbe for BlockingSensor {
        fn kind(&self) -> MetricKind {
            self.0
        }

        async fn read(&self) -> Result<f64, MetricsError> {
            let delay = self.1;
            tokio::task::spawn_blocking(move || {
                std::thread::sleep(delay);
                99.0
            })
            .await
            .map_err(|e| MetricsError::ProbeFailed {
                kind: self.0,
                message: e.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_composite_collects_all_probes() {
        let source = CompositeSource::new(vec![
            Arc::new(ConstProbe(MetricKind::Fps, 58.0)),
            Arc::new(ConstProbe(MetricKind::Cpu, 12.5)),
            Arc::new(ConstProbe(MetricKind::Ram, 70.0)),
        ]);

        let reading = source.sample().await.unwrap();
        assert_eq!(reading.fps, 58.0);
        assert_eq!(reading.cpu, 12.5);
        assert_eq!(reading.ram, 70.0);
        // No probe: initial value
        assert_eq!(reading.gpu, MetricReading::default().gpu);
    }

    #[tokio::test]
    async fn test_failing_probe_keeps_last_value_for_its_field_only() {
        let source = CompositeSource::new(vec![
            Arc::new(ConstProbe(MetricKind::Cpu, 42.0)),
            Arc::new(FailingProbe(MetricKind::Temp)),
        ])
        .with_initial(MetricReading {
            temp: 38.0,
            ..MetricReading::default()
        });

        let reading = source.sample().await.unwrap();
        assert_eq!(reading.cpu, 42.0);
        assert_eq!(reading.temp, 38.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_probe_does_not_block_others() {
        let source = CompositeSource::with_timeout(
            vec![
                Arc::new(StalledProbe(MetricKind::Gpu)),
                Arc::new(ConstProbe(MetricKind::Fps, 30.0)),
            ],
            Duration::from_millis(50),
        );

        let reading = source.sample().await.unwrap();
        assert_eq!(reading.fps, 30.0);
        assert_eq!(reading.gpu, MetricReading::default().gpu);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_sensor_is_abandoned_at_deadline() {
        let source = CompositeSource::with_timeout(
            vec![
                Arc::new(BlockingSensor(MetricKind::Temp, Duration::from_millis(800))),
                Arc::new(ConstProbe(MetricKind::Cpu, 10.0)),
            ],
            Duration::from_millis(50),
        )
        .with_initial(MetricReading {
            temp: 50.0,
            ..MetricReading::default()
        });

        let started = std::time::Instant::now();
        let reading = source.sample().await.unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed < Duration::from_millis(500), "sample took {:?}", elapsed);
        assert_eq!(reading.cpu, 10.0);
        assert_eq!(reading.temp, 50.0, "late value must not be kept");
    }

    #[tokio::test]
    async fn test_all_probes_failing_is_an_error() {
        let source = CompositeSource::new(vec![
            Arc::new(FailingProbe(MetricKind::Fps)),
            Arc::new(FailingProbe(MetricKind::Gpu)),
        ]);
        assert_eq!(source.sample().await, Err(MetricsError::AllProbesFailed));
    }

    #[tokio::test]
    async fn test_scripted_source_repeats_last() {
        let first = MetricReading {
            fps: 10.0,
            ..MetricReading::default()
        };
        let source = ScriptedSource::new(vec![
            Err(MetricsError::Source("warming up".to_string())),
            Ok(first),
        ]);

        assert!(source.sample().await.is_err());
        assert_eq!(source.sample().await, Ok(first));
        assert_eq!(source.sample().await, Ok(first));
        assert_eq!(source.calls(), 3);
    }
}
