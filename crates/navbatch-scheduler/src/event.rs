use navbatch_types::NavigationRequest;
use tokio::sync::broadcast;

use crate::error::NavigationError;

/// Outcome of one flush, published to every subscriber of the scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlushEvent {
    /// The navigator accepted the merged request.
    Navigated { request: NavigationRequest },
    /// The navigator rejected it. The batch is gone; nothing is retried.
    Failed {
        request: NavigationRequest,
        error: NavigationError,
    },
}

impl FlushEvent {
    pub fn request(&self) -> &NavigationRequest {
        match self {
            Self::Navigated { request } | Self::Failed { request, .. } => request,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Receiver side of a scope's flush events.
pub type FlushStream = broadcast::Receiver<FlushEvent>;
