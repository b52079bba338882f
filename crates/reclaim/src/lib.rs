//! # nebula-reclaim
//!
//! Scope-tagged deferred release of heap allocations.
//!
//! Instead of freeing allocations one by one, callers hand their ownership to
//! a [`Tracker`], optionally under a scope token, and later free everything
//! belonging to one scope (or every unscoped allocation, or everything) in a
//! single call. This gives region-style lifetimes on top of the ordinary
//! allocator. It is not a garbage collector: nothing is traced, and nothing
//! is freed until the caller asks.
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_reclaim::prelude::*;
//!
//! let mut tracker = Tracker::with_config(TrackerConfig::bounded(16))?;
//!
//! // a scope groups allocations with a shared lifetime
//! let scope = tracker.request_token().expect("scope slot available");
//! tracker.register_scoped(scope, Handle::new(vec![0u8; 4096]))?;
//! tracker.register_scoped(scope, Handle::new(String::from("request body")))?;
//!
//! // unscoped allocations live until an unscoped collect or teardown
//! tracker.register(Handle::new([0u64; 32]));
//!
//! assert_eq!(tracker.release_by_tag(Tag::Scoped(scope)), 2);
//! assert_eq!(tracker.release_all(), 1);
//! # Ok::<(), nebula_reclaim::ReclaimError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): structured `tracing` events
//!
//! ## Architecture
//!
//! - [`registry`]: owns tagged allocations, releases them in bulk by tag
//! - [`scope`]: fixed-capacity table of unique scope tokens
//! - [`Tracker`]: couples the two; the only type that checks tokens
//! - [`global`]: one process-wide tracker behind a lock

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

// Error types
pub mod error;

// Core modules
pub mod config;
pub mod global;
pub mod handle;
pub mod registry;
pub mod scope;
pub mod stats;
pub mod token;
pub mod tracker;

pub use crate::config::TrackerConfig;
pub use crate::error::{ReclaimError, ReclaimResult};
pub use crate::handle::Handle;
pub use crate::registry::{AllocationRegistry, TrackedAllocation};
pub use crate::scope::{ScopeGuard, ScopeTable};
pub use crate::stats::TrackerStats;
pub use crate::token::{ScopeToken, Tag};
pub use crate::tracker::Tracker;

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::config::TrackerConfig;
    pub use crate::error::{ReclaimError, ReclaimResult};
    pub use crate::handle::Handle;
    pub use crate::scope::ScopeGuard;
    pub use crate::token::{ScopeToken, Tag};
    pub use crate::tracker::Tracker;
}
