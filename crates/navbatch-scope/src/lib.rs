//! Scope provider for navbatch.
//!
//! A [`ScopeProvider`] is installed around the part of an application that
//! wants batched query/hash navigation. It owns one mutation queue and one
//! batch scheduler; consumers get cheap [`ScopeHandle`] clones and call
//! [`ScopeHandle::push`] / [`ScopeHandle::replace`] with `{ query, hash }`
//! objects. Every call made in the same tick lands in one navigation.
//!
//! ```no_run
//! use std::sync::Arc;
//! use navbatch_scope::{ScopeConfig, ScopeProvider, MemoryNavigator, UrlObject};
//!
//! # async fn demo() -> Result<(), navbatch_scope::ScopeError> {
//! let scope = ScopeProvider::install(Arc::new(MemoryNavigator::default()), ScopeConfig::default());
//! let handle = scope.handle();
//! handle.push(UrlObject::new().set("page", 2))?;
//! handle.push(UrlObject::new().set("sort", "name"))?;
//! scope.settle().await?; // one navigation to /?page=2&sort=name
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod provider;

pub use error::{Result, ScopeError};
pub use provider::{ScopeHandle, ScopeProvider};

pub use navbatch_scheduler::{
    FlushEvent, FlushStream, MemoryNavigator, NavigationError, Navigator, ScopeConfig,
};
pub use navbatch_types::{
    HashDelta, NavigationKind, NavigationOptions, NavigationRequest, Query, QueryDelta,
    QueryPatch, QueryValue, UrlObject, UrlState, UrlTarget,
};
