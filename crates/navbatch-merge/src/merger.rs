use navbatch_types::{
    HashDelta, MutationDescriptor, NavigationKind, NavigationRequest, Query, QueryDelta,
    QueryValue, UrlObject, UrlState,
};
use tracing::trace;

/// Apply one `{ query, hash }` object to the working location in place.
///
/// - Patch: `Value` sets, `Null` removes, `Undefined` leaves the key alone.
/// - Updater: called with the working query; its result replaces the query
///   and any `Null`/`Undefined` entries in it are dropped.
/// - Hash: `Set` overwrites, `Clear` removes, `Unchanged` keeps.
pub fn apply_object(working: &mut UrlState, object: &UrlObject) {
    match &object.query {
        None => {}
        Some(QueryDelta::Patch(patch)) => {
            for (key, value) in patch {
                match value {
                    QueryValue::Value(v) => {
                        working.query.insert(key.clone(), v.clone());
                    }
                    QueryValue::Null => {
                        working.query.remove(key);
                    }
                    QueryValue::Undefined => {}
                }
            }
        }
        Some(QueryDelta::Updater(update)) => {
            let next = update(&working.query);
            working.query = resolve(next);
        }
    }

    match &object.hash {
        HashDelta::Unchanged => {}
        HashDelta::Set(hash) => working.hash = Some(hash.clone()),
        HashDelta::Clear => working.hash = None,
    }
}

fn resolve(patch: navbatch_types::QueryPatch) -> Query {
    patch
        .into_iter()
        .filter_map(|(key, value)| match value {
            QueryValue::Value(v) => Some((key, v)),
            QueryValue::Null | QueryValue::Undefined => None,
        })
        .collect()
}

/// Fold the `url` objects of `descriptors`, in order, over `previous`.
///
/// The baseline is cloned; `previous` is never modified.
pub fn merge(previous: &UrlState, descriptors: &[MutationDescriptor]) -> UrlState {
    let mut working = previous.clone();
    for descriptor in descriptors {
        apply_object(&mut working, descriptor.url());
    }
    working
}

/// Resolve a whole batch into one navigation.
///
/// Returns `None` for an empty batch. Otherwise:
/// - `kind` is `Push` if any call in the batch was a push, else `Replace`;
/// - `url` is [`merge`] over `previous`;
/// - `as_url` is present only when some call passed `as`, and folds each
///   call's `as` (or its `url` when it had none) over the same baseline;
/// - `options` is the last options object supplied in the batch.
pub fn merge_batch(
    previous: &UrlState,
    descriptors: &[MutationDescriptor],
) -> Option<NavigationRequest> {
    if descriptors.is_empty() {
        return None;
    }

    let kind = if descriptors
        .iter()
        .any(|d| d.kind() == NavigationKind::Push)
    {
        NavigationKind::Push
    } else {
        NavigationKind::Replace
    };

    let url = merge(previous, descriptors);

    let as_url = if descriptors.iter().any(|d| d.as_url().is_some()) {
        let mut working = previous.clone();
        for descriptor in descriptors {
            apply_object(&mut working, descriptor.effective_as());
        }
        Some(working)
    } else {
        None
    };

    let options = descriptors
        .iter()
        .rev()
        .find_map(MutationDescriptor::options)
        .cloned()
        .unwrap_or_default();

    trace!(
        batch = descriptors.len(),
        %kind,
        href = %url,
        "batch merged"
    );

    Some(NavigationRequest {
        kind,
        url,
        as_url,
        options,
    })
}
