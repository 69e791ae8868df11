use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::location::{UrlObject, UrlTarget};

/// The two navigation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKind {
    /// Add a new history entry.
    Push,
    /// Overwrite the current history entry.
    Replace,
}

impl fmt::Display for NavigationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push => f.write_str("push"),
            Self::Replace => f.write_str("replace"),
        }
    }
}

/// Options passed through verbatim to the navigator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shallow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl NavigationOptions {
    pub fn scroll(mut self, scroll: bool) -> Self {
        self.scroll = Some(scroll);
        self
    }

    pub fn shallow(mut self, shallow: bool) -> Self {
        self.shallow = Some(shallow);
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// One queued `push` or `replace` call.
///
/// Fields are only readable once constructed; a descriptor in a queue is
/// never modified.
#[derive(Clone, Debug)]
pub struct MutationDescriptor {
    kind: NavigationKind,
    url: UrlObject,
    as_url: Option<UrlObject>,
    options: Option<NavigationOptions>,
}

impl MutationDescriptor {
    /// Validate consumer input and build a descriptor.
    ///
    /// Fails with [`crate::TypeError::InvalidDescriptor`] when `url` or `as`
    /// is a path string.
    pub fn new(
        kind: NavigationKind,
        url: UrlTarget,
        as_url: Option<UrlTarget>,
        options: Option<NavigationOptions>,
    ) -> Result<Self> {
        let url = url.into_object("url")?;
        let as_url = as_url.map(|target| target.into_object("as")).transpose()?;
        Ok(Self {
            kind,
            url,
            as_url,
            options,
        })
    }

    /// Shorthand for a validated `push` with only a `url` object.
    pub fn push(url: UrlObject) -> Self {
        Self {
            kind: NavigationKind::Push,
            url,
            as_url: None,
            options: None,
        }
    }

    /// Shorthand for a validated `replace` with only a `url` object.
    pub fn replace(url: UrlObject) -> Self {
        Self {
            kind: NavigationKind::Replace,
            url,
            as_url: None,
            options: None,
        }
    }

    pub fn kind(&self) -> NavigationKind {
        self.kind
    }

    pub fn url(&self) -> &UrlObject {
        &self.url
    }

    /// The masked (`as`) object, if one was given.
    pub fn as_url(&self) -> Option<&UrlObject> {
        self.as_url.as_ref()
    }

    /// The object folded into the masked URL: `as` when given, else `url`.
    pub fn effective_as(&self) -> &UrlObject {
        self.as_url.as_ref().unwrap_or(&self.url)
    }

    pub fn options(&self) -> Option<&NavigationOptions> {
        self.options.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TypeError;

    #[test]
    fn new_accepts_objects() {
        let desc = MutationDescriptor::new(
            NavigationKind::Replace,
            UrlObject::new().set("a", 1).into(),
            Some(UrlObject::new().with_hash("x").into()),
            Some(NavigationOptions::default().shallow(true)),
        )
        .unwrap();
        assert_eq!(desc.kind(), NavigationKind::Replace);
        assert!(desc.as_url().is_some());
        assert_eq!(desc.options().and_then(|o| o.shallow), Some(true));
    }

    #[test]
    fn new_rejects_path_url() {
        let err = MutationDescriptor::new(NavigationKind::Push, "/a?b=1".into(), None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            TypeError::InvalidDescriptor { argument: "url", .. }
        ));
    }

    #[test]
    fn new_rejects_path_as() {
        let err = MutationDescriptor::new(
            NavigationKind::Push,
            UrlObject::new().into(),
            Some("/masked".into()),
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TypeError::InvalidDescriptor { argument: "as", .. }
        ));
    }

    #[test]
    fn effective_as_falls_back_to_url() {
        let desc = MutationDescriptor::push(UrlObject::new().with_hash("u"));
        assert!(desc.as_url().is_none());
        assert_eq!(desc.effective_as().hash, crate::HashDelta::Set("u".into()));
    }

    #[test]
    fn kind_display() {
        assert_eq!(NavigationKind::Push.to_string(), "push");
        assert_eq!(NavigationKind::Replace.to_string(), "replace");
    }

    #[test]
    fn options_serde_skips_unset() {
        let json = serde_json::to_string(&NavigationOptions::default().scroll(false)).unwrap();
        assert_eq!(json, r#"{"scroll":false}"#);
    }
}
