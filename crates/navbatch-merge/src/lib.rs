//! Merge engine for navbatch.
//!
//! Folds an ordered batch of [`MutationDescriptor`]s over a baseline
//! [`UrlState`] and produces the one [`NavigationRequest`] the batch stands
//! for. Merging is total: every well-formed batch yields a result.
//!
//! [`MutationDescriptor`]: navbatch_types::MutationDescriptor
//! [`UrlState`]: navbatch_types::UrlState
//! [`NavigationRequest`]: navbatch_types::NavigationRequest

pub mod merger;

pub use merger::{apply_object, merge, merge_batch};
