//! Metrics sampling for the performance overlay.
//!
//! The sampler drives a [`MetricsSource`] on a fixed interval and publishes
//! clamped [`MetricSnapshot`]s to subscribers. It knows nothing about which
//! metrics are displayed; filtering is up to the consumer.
//!
//! # Example
//!
//! ```ignore
//! use perfmon_metrics::{FixedSource, MetricReading, MetricSnapshot, MetricsSampler};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let sampler = MetricsSampler::new(Arc::new(FixedSource::new(MetricReading::default())));
//! sampler.subscribe(Arc::new(|snapshot: &MetricSnapshot| println!("fps={}", snapshot.fps())));
//!
//! let handle = sampler.start(Duration::from_millis(1000))?;
//! // ...
//! handle.cancel();
//! ```

mod error;
mod sampler;
mod snapshot;
mod source;

pub use error::MetricsError;
pub use sampler::{MetricsCallback, MetricsSampler, SamplerHandle, SubscriptionId, DEFAULT_SAMPLE_INTERVAL};
pub use snapshot::{MetricBounds, MetricKind, MetricReading, MetricSnapshot};
pub use source::{
    CompositeSource, FixedSource, MetricProbe, MetricsSource, MetricsSourceRef, ScriptedSource,
    DEFAULT_PROBE_TIMEOUT,
};
