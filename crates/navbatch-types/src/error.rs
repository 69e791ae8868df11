use thiserror::Error;

/// Errors produced by type construction and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A `url`/`as` argument was not a `{ query, hash }` object.
    #[error("invalid {argument} descriptor: {reason}")]
    InvalidDescriptor {
        argument: &'static str,
        reason: String,
    },

    #[error("invalid href: {0}")]
    InvalidHref(String),
}

/// Convenience alias for type-level operations.
pub type Result<T> = std::result::Result<T, TypeError>;
