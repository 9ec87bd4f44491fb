use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification worker needs a running tokio runtime")]
    NoRuntime,
}
