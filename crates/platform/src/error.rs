//! Error type shared by all native collaborators.

use thiserror::Error;

/// Failure reported by a native module call.
///
/// This is distinct from a user saying "no": a denied permission comes back
/// as `Ok(false)`, while `NativeError` means the call itself did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    /// The native module is not present on this build/platform.
    #[error("native module not available: {0}")]
    ModuleUnavailable(&'static str),

    /// No foreground activity to launch a system screen from.
    #[error("no current activity to start the request from")]
    NoActivity,

    /// The module rejected the call.
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },

    /// Anything else the host reported.
    #[error("native call failed: {0}")]
    Io(String),
}

impl NativeError {
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }
}
