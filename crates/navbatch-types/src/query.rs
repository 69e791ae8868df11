use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A fully resolved query mapping.
///
/// Ordered so that rendered query strings are stable across runs.
pub type Query = BTreeMap<String, String>;

/// A partial query description: each key maps to a [`QueryValue`].
pub type QueryPatch = BTreeMap<String, QueryValue>;

/// Updater function form of a query delta.
///
/// Receives the working query of the batch and returns the complete next
/// query. Keys missing from the result are removed.
pub type QueryUpdater = Arc<dyn Fn(&Query) -> QueryPatch + Send + Sync>;

/// One entry in a [`QueryPatch`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryValue {
    /// Set the key to this value.
    Value(String),
    /// Remove the key.
    Null,
    /// Present but undefined. A no-op in a patch, a removal in updater output.
    Undefined,
}

impl QueryValue {
    /// Returns the value if this entry carries one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v),
            Self::Null | Self::Undefined => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        Self::Value(value.clone())
    }
}

macro_rules! query_value_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    Self::Value(value.to_string())
                }
            }
        )*
    };
}

query_value_from_display!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool);

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// Copy a resolved query into a patch, so updater functions can spread the
/// previous query and then override individual keys.
pub fn patch_from(query: &Query) -> QueryPatch {
    query
        .iter()
        .map(|(k, v)| (k.clone(), QueryValue::Value(v.clone())))
        .collect()
}

/// How a single mutation changes the query.
#[derive(Clone)]
pub enum QueryDelta {
    /// Merged key by key into the working query.
    Patch(QueryPatch),
    /// Replaces the working query wholesale with the function's result.
    Updater(QueryUpdater),
}

impl QueryDelta {
    /// Build a patch from `(key, value)` pairs.
    pub fn patch<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        Self::Patch(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build an updater delta from a closure.
    pub fn updater<F>(f: F) -> Self
    where
        F: Fn(&Query) -> QueryPatch + Send + Sync + 'static,
    {
        Self::Updater(Arc::new(f))
    }

    pub fn is_updater(&self) -> bool {
        matches!(self, Self::Updater(_))
    }
}

impl fmt::Debug for QueryDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patch(patch) => f.debug_tuple("Patch").field(patch).finish(),
            Self::Updater(_) => f.write_str("Updater(<fn>)"),
        }
    }
}

impl From<QueryPatch> for QueryDelta {
    fn from(patch: QueryPatch) -> Self {
        Self::Patch(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_coerce_to_strings() {
        assert_eq!(QueryValue::from(1), QueryValue::Value("1".into()));
        assert_eq!(QueryValue::from(0u8), QueryValue::Value("0".into()));
        assert_eq!(QueryValue::from(2.5), QueryValue::Value("2.5".into()));
        assert_eq!(QueryValue::from(false), QueryValue::Value("false".into()));
    }

    #[test]
    fn none_is_null() {
        assert_eq!(QueryValue::from(None::<&str>), QueryValue::Null);
        assert_eq!(QueryValue::from(Some("x")), QueryValue::Value("x".into()));
    }

    #[test]
    fn undefined_and_null_are_distinct() {
        assert!(QueryValue::Undefined.is_undefined());
        assert!(!QueryValue::Undefined.is_null());
        assert!(!QueryValue::Null.is_undefined());
        assert_eq!(QueryValue::Undefined.as_str(), None);
    }

    #[test]
    fn patch_builder_collects_entries() {
        let delta = QueryDelta::patch([("a", QueryValue::from(1)), ("b", QueryValue::Null)]);
        match delta {
            QueryDelta::Patch(patch) => {
                assert_eq!(patch.len(), 2);
                assert_eq!(patch["a"].as_str(), Some("1"));
                assert!(patch["b"].is_null());
            }
            QueryDelta::Updater(_) => panic!("expected patch"),
        }
    }

    #[test]
    fn patch_from_spreads_query() {
        let mut query = Query::new();
        query.insert("x".into(), "1".into());
        let patch = patch_from(&query);
        assert_eq!(patch.get("x"), Some(&QueryValue::Value("1".into())));
    }

    #[test]
    fn updater_debug_hides_closure() {
        let delta = QueryDelta::updater(|_| QueryPatch::new());
        assert!(delta.is_updater());
        assert_eq!(format!("{delta:?}"), "Updater(<fn>)");
    }
}
