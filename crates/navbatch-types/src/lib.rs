//! Foundation types for navbatch.
//!
//! navbatch coalesces query-string and hash mutations issued within one
//! scheduling turn into a single navigation. This crate holds the vocabulary
//! shared by the merge engine, the scheduler, and the scope provider.
//!
//! # Key Types
//!
//! - [`Query`] — Fully resolved query mapping (`key -> value`)
//! - [`QueryValue`] — One entry of a query patch: a value, `Null`, or `Undefined`
//! - [`QueryDelta`] — Patch (merged) or updater function (replaces wholesale)
//! - [`HashDelta`] — Set, clear, or leave the fragment untouched
//! - [`UrlObject`] — The `{ query, hash }` object consumers pass to `push`/`replace`
//! - [`UrlTarget`] — Consumer input: an object, or a raw path string (always rejected)
//! - [`UrlState`] — A concrete location: pathname, query, and hash
//! - [`MutationDescriptor`] — One queued `push`/`replace` call
//! - [`NavigationRequest`] — The merged result handed to the navigator

pub mod descriptor;
pub mod error;
pub mod location;
pub mod query;
pub mod request;

pub use descriptor::{MutationDescriptor, NavigationKind, NavigationOptions};
pub use error::{Result, TypeError};
pub use location::{HashDelta, UrlObject, UrlState, UrlTarget};
pub use query::{patch_from, Query, QueryDelta, QueryPatch, QueryUpdater, QueryValue};
pub use request::NavigationRequest;
