//! The [`Navigator`] trait: the host's navigation primitive.
//!
//! The host owns the real location and history. navbatch only reads the
//! current location at flush time and asks for exactly one navigation per
//! batch.

use async_trait::async_trait;
use navbatch_types::{NavigationRequest, UrlState};

use crate::error::NavigationError;

/// The host environment's navigation primitive.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Snapshot of the current location. Read once per flush as the merge
    /// baseline.
    fn current(&self) -> UrlState;

    /// Perform the navigation. Errors are surfaced to the scope and never
    /// retried.
    async fn navigate(&self, request: &NavigationRequest) -> Result<(), NavigationError>;
}
