use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{Result, TypeError};
use crate::query::{Query, QueryDelta, QueryPatch, QueryValue};

/// How a single mutation changes the hash fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HashDelta {
    /// Leave the fragment as it is.
    #[default]
    Unchanged,
    /// Set the fragment (without the leading `#`).
    Set(String),
    /// Remove the fragment.
    Clear,
}

impl HashDelta {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

impl From<&str> for HashDelta {
    fn from(value: &str) -> Self {
        Self::Set(value.to_string())
    }
}

impl From<String> for HashDelta {
    fn from(value: String) -> Self {
        Self::Set(value)
    }
}

impl From<Option<String>> for HashDelta {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}

/// The `{ query, hash }` object a consumer passes as `url` or `as`.
///
/// A missing `query` leaves the query untouched; a missing hash leaves the
/// fragment untouched.
#[derive(Clone, Debug, Default)]
pub struct UrlObject {
    pub query: Option<QueryDelta>,
    pub hash: HashDelta,
}

impl UrlObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the query delta.
    pub fn with_query(mut self, delta: impl Into<QueryDelta>) -> Self {
        self.query = Some(delta.into());
        self
    }

    /// Set a single key, turning the query into a patch if it is not one yet.
    ///
    /// Calling this after [`Self::update_query`] discards the updater.
    pub fn set(self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.entry(key.into(), value.into())
    }

    /// Mark a key for removal (`null`).
    pub fn remove(self, key: impl Into<String>) -> Self {
        self.entry(key.into(), QueryValue::Null)
    }

    /// Mention a key as `undefined`, which leaves it untouched in a patch.
    pub fn undefined(self, key: impl Into<String>) -> Self {
        self.entry(key.into(), QueryValue::Undefined)
    }

    /// Use an updater function as the query delta.
    pub fn update_query<F>(mut self, f: F) -> Self
    where
        F: Fn(&Query) -> QueryPatch + Send + Sync + 'static,
    {
        self.query = Some(QueryDelta::updater(f));
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = HashDelta::Set(hash.into());
        self
    }

    pub fn clear_hash(mut self) -> Self {
        self.hash = HashDelta::Clear;
        self
    }

    fn entry(mut self, key: String, value: QueryValue) -> Self {
        let mut patch = match self.query.take() {
            Some(QueryDelta::Patch(patch)) => patch,
            Some(QueryDelta::Updater(_)) | None => QueryPatch::new(),
        };
        patch.insert(key, value);
        self.query = Some(QueryDelta::Patch(patch));
        self
    }
}

/// What a consumer hands to `push`/`replace` as `url` or `as`.
///
/// Only [`UrlTarget::Object`] is navigable. Path strings exist so that a
/// caller passing one gets a validation error instead of a silent path change.
#[derive(Clone, Debug)]
pub enum UrlTarget {
    Object(UrlObject),
    Path(String),
}

impl UrlTarget {
    /// Validate and unwrap the object form. `argument` names the parameter
    /// (`"url"` or `"as"`) in the error.
    pub fn into_object(self, argument: &'static str) -> Result<UrlObject> {
        match self {
            Self::Object(object) => Ok(object),
            Self::Path(path) => Err(TypeError::InvalidDescriptor {
                argument,
                reason: format!(
                    "expected an object with query/hash, got path string {path:?}"
                ),
            }),
        }
    }
}

impl From<UrlObject> for UrlTarget {
    fn from(object: UrlObject) -> Self {
        Self::Object(object)
    }
}

impl From<&str> for UrlTarget {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for UrlTarget {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

/// A concrete location: the current one, or the result of a merge.
///
/// The pathname is carried through untouched; only `query` and `hash` are
/// ever edited.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UrlState {
    pub pathname: String,
    pub query: Query,
    pub hash: Option<String>,
}

impl UrlState {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            query: Query::new(),
            hash: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// The `application/x-www-form-urlencoded` query string, without `?`.
    pub fn search(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish()
    }

    /// Render as `pathname?query#hash`. Empty query and absent hash are
    /// omitted.
    pub fn href(&self) -> String {
        let mut href = self.pathname.clone();
        if !self.query.is_empty() {
            href.push('?');
            href.push_str(&self.search());
        }
        if let Some(hash) = &self.hash {
            href.push('#');
            href.push_str(hash);
        }
        href
    }

    /// Parse an href produced by [`Self::href`] (or any relative URL of the
    /// same shape). Repeated query keys keep the last value.
    pub fn parse(href: &str) -> Result<Self> {
        if href.contains(char::is_whitespace) {
            return Err(TypeError::InvalidHref(href.to_string()));
        }

        let (rest, hash) = match href.split_once('#') {
            Some((rest, hash)) => (rest, Some(hash.to_string())),
            None => (href, None),
        };
        let (pathname, search) = match rest.split_once('?') {
            Some((pathname, search)) => (pathname, search),
            None => (rest, ""),
        };

        let query = form_urlencoded::parse(search.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Ok(Self {
            pathname: pathname.to_string(),
            query,
            hash,
        })
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}
