use serde::{Deserialize, Serialize};

use crate::descriptor::{NavigationKind, NavigationOptions};
use crate::location::UrlState;

/// The single navigation a flushed batch resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub kind: NavigationKind,
    /// Merged target location.
    pub url: UrlState,
    /// Merged masked location; present when any call in the batch gave `as`.
    pub as_url: Option<UrlState>,
    pub options: NavigationOptions,
}

impl NavigationRequest {
    /// Rendered target href.
    pub fn href(&self) -> String {
        self.url.href()
    }

    /// Rendered masked href, if any.
    pub fn as_href(&self) -> Option<String> {
        self.as_url.as_ref().map(UrlState::href)
    }
}
