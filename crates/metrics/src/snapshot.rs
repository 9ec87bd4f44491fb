//! Metric snapshot and value bounds.

use serde::{Deserialize, Serialize};

/// One of the five overlay metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Fps,
    Cpu,
    Gpu,
    Temp,
    Ram,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Fps,
        MetricKind::Cpu,
        MetricKind::Gpu,
        MetricKind::Temp,
        MetricKind::Ram,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Fps => "fps",
            MetricKind::Cpu => "cpu",
            MetricKind::Gpu => "gpu",
            MetricKind::Temp => "temp",
            MetricKind::Ram => "ram",
        }
    }

    /// Plausible device range for this metric.
    pub fn bounds(&self) -> MetricBounds {
        match self {
            MetricKind::Fps => MetricBounds::new(0.0, 240.0),
            MetricKind::Cpu | MetricKind::Gpu | MetricKind::Ram => MetricBounds::new(0.0, 100.0),
            MetricKind::Temp => MetricBounds::new(-20.0, 120.0),
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Inclusive range a metric value is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricBounds {
    pub min: f64,
    pub max: f64,
}

impl MetricBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp into range. NaN collapses to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

/// Raw values produced by a source, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    pub fps: f64,
    pub cpu: f64,
    pub gpu: f64,
    pub temp: f64,
    pub ram: f64,
}

impl Default for MetricReading {
    /// Values shown before the first tick lands.
    fn default() -> Self {
        Self {
            fps: 60.0,
            cpu: 30.0,
            gpu: 25.0,
            temp: 45.0,
            ram: 60.0,
        }
    }
}

impl MetricReading {
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Fps => self.fps,
            MetricKind::Cpu => self.cpu,
            MetricKind::Gpu => self.gpu,
            MetricKind::Temp => self.temp,
            MetricKind::Ram => self.ram,
        }
    }

    pub fn set(&mut self, kind: MetricKind, value: f64) {
        match kind {
            MetricKind::Fps => self.fps = value,
            MetricKind::Cpu => self.cpu = value,
            MetricKind::Gpu => self.gpu = value,
            MetricKind::Temp => self.temp = value,
            MetricKind::Ram => self.ram = value,
        }
    }
}

/// One timestamped reading, every field within its bounds.
///
/// Fields are private so a snapshot can only be built through
/// [`MetricSnapshot::from_reading`], which clamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    seq: u64,
    timestamp_ms: i64,
    fps: f64,
    cpu: f64,
    gpu: f64,
    temp: f64,
    ram: f64,
}

impl MetricSnapshot {
    pub fn from_reading(seq: u64, reading: MetricReading) -> Self {
        Self::with_timestamp(seq, chrono::Utc::now().timestamp_millis(), reading)
    }

    pub fn with_timestamp(seq: u64, timestamp_ms: i64, reading: MetricReading) -> Self {
        let mut clamped = reading;
        for kind in MetricKind::ALL {
            let raw = reading.get(kind);
            let value = kind.bounds().clamp(raw);
            if value != raw {
                tracing::debug!(metric = %kind, raw, clamped = value, "metric out of bounds");
            }
            clamped.set(kind, value);
        }

        Self {
            seq,
            timestamp_ms,
            fps: clamped.fps,
            cpu: clamped.cpu,
            gpu: clamped.gpu,
            temp: clamped.temp,
            ram: clamped.ram,
        }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn cpu(&self) -> f64 {
        self.cpu
    }

    pub fn gpu(&self) -> f64 {
        self.gpu
    }

    pub fn temp(&self) -> f64 {
        self.temp
    }

    pub fn ram(&self) -> f64 {
        self.ram
    }

    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Fps => self.fps,
            MetricKind::Cpu => self.cpu,
            MetricKind::Gpu => self.gpu,
            MetricKind::Temp => self.temp,
            MetricKind::Ram => self.ram,
        }
    }

    pub fn reading(&self) -> MetricReading {
        MetricReading {
            fps: self.fps,
            cpu: self.cpu,
            gpu: self.gpu,
            temp: self.temp,
            ram: self.ram,
        }
    }

    /// True when every field lies within its declared bound.
    pub fn is_within_bounds(&self) -> bool {
        MetricKind::ALL
            .iter()
            .all(|kind| kind.bounds().contains(self.get(*kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_clamps_out_of_range() {
        let reading = MetricReading {
            fps: 500.0,
            cpu: -5.0,
            gpu: 150.0,
            temp: 400.0,
            ram: f64::NAN,
        };
        let snapshot = MetricSnapshot::with_timestamp(1, 0, reading);

        assert_eq!(snapshot.fps(), 240.0);
        assert_eq!(snapshot.cpu(), 0.0);
        assert_eq!(snapshot.gpu(), 100.0);
        assert_eq!(snapshot.temp(), 120.0);
        assert_eq!(snapshot.ram(), 0.0);
        assert!(snapshot.is_within_bounds());
    }

    #[test]
    fn test_snapshot_keeps_in_range_values() {
        let reading = MetricReading::default();
        let snapshot = MetricSnapshot::with_timestamp(7, 1234, reading);
        assert_eq!(snapshot.reading(), reading);
        assert_eq!(snapshot.seq(), 7);
        assert_eq!(snapshot.timestamp_ms(), 1234);
    }

    #[test]
    fn test_infinities_clamp_to_nearest_bound() {
        let bounds = MetricKind::Temp.bounds();
        assert_eq!(bounds.clamp(f64::NEG_INFINITY), -20.0);
        assert_eq!(bounds.clamp(f64::INFINITY), 120.0);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = MetricSnapshot::with_timestamp(3, 99, MetricReading::default());
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["timestampMs"], 99);
        assert_eq!(json["fps"], 60.0);
    }
}
