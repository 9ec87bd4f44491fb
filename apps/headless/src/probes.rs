//! Host metric probes backed by `sysinfo`.
//!
//! Frame rate and GPU load have no portable source, so those fields keep
//! their initial values. Every sysinfo refresh is a blocking syscall and runs
//! on the blocking pool, so the per-field deadline in `CompositeSource` can
//! abandon a slow read.

use async_trait::async_trait;
use perfmon_metrics::{MetricKind, MetricProbe, MetricsError};
use std::sync::{Arc, Mutex};
use sysinfo::{Components, System};

pub fn host_probes() -> Vec<Arc<dyn MetricProbe>> {
    vec![
        Arc::new(CpuProbe::default()),
        Arc::new(RamProbe::default()),
        Arc::new(TempProbe),
    ]
}

/// Run a sysinfo read on the blocking pool.
async fn read_blocking<F>(kind: MetricKind, read: F) -> Result<f64, MetricsError>
where
    F: FnOnce() -> Result<f64, MetricsError> + Send + 'static,
{
    tokio::task::spawn_blocking(read)
        .await
        .map_err(|e| MetricsError::ProbeFailed {
            kind,
            message: format!("sensor task join error: {}", e),
        })?
}

/// Global CPU usage. The first reading after startup is 0.
pub struct CpuProbe {
    system: Arc<Mutex<System>>,
}

impl CpuProbe {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self {
            system: Arc::new(Mutex::new(system)),
        }
    }
}

impl Default for CpuProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricProbe for CpuProbe {
    fn kind(&self) -> MetricKind {
        MetricKind::Cpu
    }

    async fn read(&self) -> Result<f64, MetricsError> {
        let system = Arc::clone(&self.system);
        read_blocking(MetricKind::Cpu, move || {
            let mut system = system.lock().unwrap_or_else(|e| e.into_inner());
            system.refresh_cpu_usage();
            Ok(f64::from(system.global_cpu_usage()))
        })
        .await
    }
}

/// Used memory as a percentage of total.
pub struct RamProbe {
    system: Arc<Mutex<System>>,
}

impl RamProbe {
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
        }
    }
}

impl Default for RamProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricProbe for RamProbe {
    fn kind(&self) -> MetricKind {
        MetricKind::Ram
    }

    async fn read(&self) -> Result<f64, MetricsError> {
        let system = Arc::clone(&self.system);
        read_blocking(MetricKind::Ram, move || {
            let mut system = system.lock().unwrap_or_else(|e| e.into_inner());
            system.refresh_memory();
            let total = system.total_memory();
            if total == 0 {
                return Err(MetricsError::ProbeFailed {
                    kind: MetricKind::Ram,
                    message: "total memory reported as zero".to_string(),
                });
            }
            Ok(system.used_memory() as f64 / total as f64 * 100.0)
        })
        .await
    }
}

/// Hottest reported sensor.
pub struct TempProbe;

#[async_trait]
impl MetricProbe for TempProbe {
    fn kind(&self) -> MetricKind {
        MetricKind::Temp
    }

    async fn read(&self) -> Result<f64, MetricsError> {
        read_blocking(MetricKind::Temp, || {
            let components = Components::new_with_refreshed_list();
            components
                .list()
                .iter()
                .map(|c| f64::from(c.temperature()))
                .filter(|t| t.is_finite())
                .reduce(f64::max)
                .ok_or_else(|| MetricsError::ProbeFailed {
                    kind: MetricKind::Temp,
                    message: "no temperature sensors".to_string(),
                })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ram_reading_is_a_percentage() {
        match RamProbe::default().read().await {
            Ok(value) => assert!((0.0..=100.0).contains(&value), "ram = {}", value),
            Err(e) => assert!(matches!(e, MetricsError::ProbeFailed { kind: MetricKind::Ram, .. })),
        }
    }

    #[tokio::test]
    async fn test_panicking_sensor_read_maps_to_probe_failure() {
        let result = read_blocking(MetricKind::Gpu, || panic!("driver crashed")).await;
        assert!(matches!(
            result,
            Err(MetricsError::ProbeFailed { kind: MetricKind::Gpu, .. })
        ));
    }

    #[test]
    fn test_host_probes_cover_cpu_ram_and_temp() {
        let kinds: Vec<MetricKind> = host_probes().iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, vec![MetricKind::Cpu, MetricKind::Ram, MetricKind::Temp]);
    }
}
