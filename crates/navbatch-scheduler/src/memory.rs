//! In-memory navigator for tests and headless hosts.
//!
//! [`MemoryNavigator`] keeps a location and a history stack behind
//! `RwLock`s and records every request it receives.

use std::sync::RwLock;

use async_trait::async_trait;
use navbatch_types::{NavigationKind, NavigationRequest, UrlState};
use tracing::debug;

use crate::error::NavigationError;
use crate::navigator::Navigator;

/// An in-memory implementation of [`Navigator`].
#[derive(Debug)]
pub struct MemoryNavigator {
    history: RwLock<Vec<UrlState>>,
    requests: RwLock<Vec<NavigationRequest>>,
    failures: RwLock<Vec<String>>,
}

impl MemoryNavigator {
    /// Create a navigator whose history holds only `initial`.
    pub fn new(initial: UrlState) -> Self {
        Self {
            history: RwLock::new(vec![initial]),
            requests: RwLock::new(Vec::new()),
            failures: RwLock::new(Vec::new()),
        }
    }

    /// Create a navigator starting at a parsed href.
    pub fn at(href: &str) -> navbatch_types::Result<Self> {
        Ok(Self::new(UrlState::parse(href)?))
    }

    /// Simulate a navigation that happens outside any scope: the current
    /// entry is replaced without recording a request.
    pub fn set_location(&self, location: UrlState) {
        let mut history = self.history.write().expect("history lock poisoned");
        match history.last_mut() {
            Some(entry) => *entry = location,
            None => history.push(location),
        }
    }

    /// Make the next navigation fail with `message`. Queued failures are
    /// consumed in order.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.failures
            .write()
            .expect("failure lock poisoned")
            .push(message.into());
    }

    /// Every request received, in order, including failed ones.
    pub fn requests(&self) -> Vec<NavigationRequest> {
        self.requests.read().expect("request lock poisoned").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.read().expect("request lock poisoned").len()
    }

    /// The history stack, oldest first.
    pub fn history(&self) -> Vec<UrlState> {
        self.history.read().expect("history lock poisoned").clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(UrlState::new("/"))
    }
}

#[async_trait]
impl Navigator for MemoryNavigator {
    fn current(&self) -> UrlState {
        self.history
            .read()
            .expect("history lock poisoned")
            .last()
            .cloned()
            .unwrap_or_default()
    }

    async fn navigate(&self, request: &NavigationRequest) -> Result<(), NavigationError> {
        self.requests
            .write()
            .expect("request lock poisoned")
            .push(request.clone());

        {
            let mut failures = self.failures.write().expect("failure lock poisoned");
            if !failures.is_empty() {
                return Err(NavigationError::new(failures.remove(0)));
            }
        }

        let mut history = self.history.write().expect("history lock poisoned");
        match request.kind {
            NavigationKind::Push => history.push(request.url.clone()),
            NavigationKind::Replace => match history.last_mut() {
                Some(entry) => *entry = request.url.clone(),
                None => history.push(request.url.clone()),
            },
        }
        debug!(kind = %request.kind, href = %request.url, depth = history.len(), "memory navigation");
        Ok(())
    }
}
