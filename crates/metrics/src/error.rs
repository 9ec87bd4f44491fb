use crate::snapshot::MetricKind;
use thiserror::Error;

/// Errors from metric sources and the sampler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("sampling interval must be greater than zero")]
    InvalidInterval,

    #[error("no tokio runtime available to drive the sampler")]
    NoRuntime,

    #[error("metrics source failed: {0}")]
    Source(String),

    #[error("{kind} probe failed: {message}")]
    ProbeFailed { kind: MetricKind, message: String },

    #[error("every metric probe failed this tick")]
    AllProbesFailed,
}
