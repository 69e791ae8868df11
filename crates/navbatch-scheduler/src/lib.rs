//! Batch scheduler for navbatch.
//!
//! A [`BatchScheduler`] owns one [`MutationQueue`] and guarantees that every
//! mutation enqueued during one scheduling turn is merged and handed to the
//! [`Navigator`] in a single call.
//!
//! # State machine
//!
//! ```text
//! Idle --enqueue--> FlushScheduled --tick boundary--> (merge + navigate) --> Idle
//!   \                    |
//!    \---- teardown -----+--> TornDown (pending flush suppressed)
//! ```
//!
//! # Modules
//!
//! - [`queue`] — FIFO buffer of pending descriptors
//! - [`navigator`] — The [`Navigator`] trait for the host's navigation primitive
//! - [`memory`] — In-memory [`MemoryNavigator`] for tests
//! - [`scheduler`] — The [`BatchScheduler`] itself
//! - [`event`] — [`FlushEvent`]s published after every flush
//! - [`config`] — [`ScopeConfig`]
//! - [`error`] — Error types

pub mod config;
pub mod error;
pub mod event;
pub mod memory;
pub mod navigator;
pub mod queue;
pub mod scheduler;

pub use config::ScopeConfig;
pub use error::{BatchError, NavigationError, Result};
pub use event::{FlushEvent, FlushStream};
pub use memory::MemoryNavigator;
pub use navigator::Navigator;
pub use queue::MutationQueue;
pub use scheduler::{BatchScheduler, SchedulerPhase};
