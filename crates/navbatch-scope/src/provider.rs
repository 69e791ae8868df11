use std::sync::Arc;

use navbatch_scheduler::{BatchScheduler, FlushStream, Navigator, ScopeConfig};
use navbatch_types::{
    MutationDescriptor, NavigationKind, NavigationOptions, NavigationRequest, UrlState, UrlTarget,
};
use tracing::{info, warn};

use crate::error::{Result, ScopeError};

/// Consumer-side handle onto a scope's queue.
///
/// Cheap to clone; every clone feeds the same batch. Calls made after the
/// scope is unmounted fail with [`ScopeError::TornDown`].
#[derive(Clone)]
pub struct ScopeHandle {
    scheduler: BatchScheduler,
}

impl ScopeHandle {
    /// Queue a push with only a `url` object.
    pub fn push(&self, url: impl Into<UrlTarget>) -> Result<()> {
        self.navigate(NavigationKind::Push, url.into(), None, None)
    }

    /// Queue a push with optional `as` object and options.
    pub fn push_with(
        &self,
        url: impl Into<UrlTarget>,
        as_url: Option<UrlTarget>,
        options: Option<NavigationOptions>,
    ) -> Result<()> {
        self.navigate(NavigationKind::Push, url.into(), as_url, options)
    }

    /// Queue a replace with only a `url` object.
    pub fn replace(&self, url: impl Into<UrlTarget>) -> Result<()> {
        self.navigate(NavigationKind::Replace, url.into(), None, None)
    }

    pub fn replace_with(
        &self,
        url: impl Into<UrlTarget>,
        as_url: Option<UrlTarget>,
        options: Option<NavigationOptions>,
    ) -> Result<()> {
        self.navigate(NavigationKind::Replace, url.into(), as_url, options)
    }

    /// Validate and queue one mutation.
    ///
    /// Validation happens before anything touches the queue: a rejected call
    /// leaves the scope exactly as it was.
    pub fn navigate(
        &self,
        kind: NavigationKind,
        url: UrlTarget,
        as_url: Option<UrlTarget>,
        options: Option<NavigationOptions>,
    ) -> Result<()> {
        let descriptor = MutationDescriptor::new(kind, url, as_url, options).map_err(|e| {
            warn!(scope = %self.scheduler.config().name, %kind, error = %e, "mutation rejected");
            ScopeError::from(e)
        })?;
        self.scheduler.enqueue(descriptor)?;
        Ok(())
    }

    /// The live location, as the next flush would see it.
    pub fn current(&self) -> UrlState {
        self.scheduler.current()
    }

    pub fn is_mounted(&self) -> bool {
        !self.scheduler.is_torn_down()
    }
}

/// Owns one batching scope: a mutation queue plus its scheduler.
///
/// The scope is live from [`ScopeProvider::install`] until
/// [`ScopeProvider::unmount`] or drop. Unmounting cancels a pending flush;
/// no navigation is issued for mutations still queued at that point.
pub struct ScopeProvider {
    handle: ScopeHandle,
}

impl ScopeProvider {
    /// Install a scope over `navigator`.
    pub fn install(navigator: Arc<dyn Navigator>, config: ScopeConfig) -> Self {
        info!(scope = %config.name, location = %navigator.current(), "scope installed");
        Self {
            handle: ScopeHandle {
                scheduler: BatchScheduler::new(navigator, config),
            },
        }
    }

    /// A handle to give to consumers.
    pub fn handle(&self) -> ScopeHandle {
        self.handle.clone()
    }

    pub fn push(&self, url: impl Into<UrlTarget>) -> Result<()> {
        self.handle.push(url)
    }

    pub fn push_with(
        &self,
        url: impl Into<UrlTarget>,
        as_url: Option<UrlTarget>,
        options: Option<NavigationOptions>,
    ) -> Result<()> {
        self.handle.push_with(url, as_url, options)
    }

    pub fn replace(&self, url: impl Into<UrlTarget>) -> Result<()> {
        self.handle.replace(url)
    }

    pub fn replace_with(
        &self,
        url: impl Into<UrlTarget>,
        as_url: Option<UrlTarget>,
        options: Option<NavigationOptions>,
    ) -> Result<()> {
        self.handle.replace_with(url, as_url, options)
    }

    pub fn current(&self) -> UrlState {
        self.handle.current()
    }

    /// Flush queued mutations now instead of at the tick boundary.
    pub async fn flush(&self) -> Result<Option<NavigationRequest>> {
        Ok(self.handle.scheduler.flush_now().await?)
    }

    /// Wait for the scheduled flush and return its outcome, including a
    /// navigation failure.
    pub async fn settle(&self) -> Result<Option<NavigationRequest>> {
        Ok(self.handle.scheduler.settle().await?)
    }

    /// Flush outcomes for this scope, failures included.
    pub fn subscribe(&self) -> FlushStream {
        self.handle.scheduler.subscribe()
    }

    /// Number of mutations waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.handle.scheduler.pending()
    }

    pub fn is_flush_scheduled(&self) -> bool {
        self.handle.scheduler.is_scheduled()
    }

    pub fn is_mounted(&self) -> bool {
        self.handle.is_mounted()
    }

    pub fn config(&self) -> &ScopeConfig {
        self.handle.scheduler.config()
    }

    /// Tear the scope down. Equivalent to dropping it.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for ScopeProvider {
    fn drop(&mut self) {
        self.handle.scheduler.teardown();
    }
}
