//! Error types for scheduling and flushing.

use thiserror::Error;

/// Failure reported by a [`crate::Navigator`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("navigation failed: {message}")]
pub struct NavigationError {
    pub message: String,
}

impl NavigationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors produced by the batch scheduler.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The navigator rejected the flushed navigation. Not retried.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// The owning scope has been torn down.
    #[error("scope has been torn down")]
    TornDown,

    /// No tokio runtime is available to defer the flush onto.
    #[error("no async runtime available to schedule flush")]
    NoRuntime,

    /// The current runtime can run the flush on another worker while the
    /// enqueuing task is still inside its tick.
    #[error("flush needs a current-thread runtime, found {0}")]
    UnsupportedRuntime(String),

    /// The flush task panicked.
    #[error("flush task panicked: {0}")]
    FlushPanicked(String),

    /// Configuration could not be parsed.
    #[error("invalid scope config: {0}")]
    Config(String),
}

/// Convenience alias used throughout the scheduler crate.
pub type Result<T> = std::result::Result<T, BatchError>;
