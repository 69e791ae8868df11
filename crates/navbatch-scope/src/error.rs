use navbatch_scheduler::BatchError;
use navbatch_types::TypeError;
use thiserror::Error;

/// Errors returned to consumers of a scope.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// `url` or `as` was a path string. Nothing was queued.
    #[error(transparent)]
    InvalidDescriptor(#[from] TypeError),

    /// The scope has been unmounted.
    #[error("scope is no longer mounted")]
    TornDown,

    #[error(transparent)]
    Batch(BatchError),
}

impl From<BatchError> for ScopeError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::TornDown => Self::TornDown,
            other => Self::Batch(other),
        }
    }
}

/// Convenience alias for scope operations.
pub type Result<T> = std::result::Result<T, ScopeError>;
