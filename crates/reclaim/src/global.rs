//! Process-wide tracker
//!
//! Free functions over one lazily created [`Tracker`] guarded by a mutex.
//! Every call takes the lock once, so a scoped registration checks and
//! appends atomically even when several threads share the tracker. The
//! release functions drop the freed values after the lock is released, so
//! their destructors may call back into this module.
//!
//! # Examples
//!
//! ```
//! use nebula_reclaim::{Handle, Tag, global};
//!
//! global::enable(8).unwrap();
//!
//! if let Some(scope) = global::request_token() {
//!     global::register_scoped(scope, Handle::new(vec![0u8; 32])).unwrap();
//!     global::release_by_tag(Tag::Scoped(scope));
//! }
//! ```

use std::sync::OnceLock;

use parking_lot::{Mutex, MutexGuard};

use crate::error::ReclaimResult;
use crate::handle::Handle;
use crate::stats::TrackerStats;
use crate::token::{ScopeToken, Tag};
use crate::tracker::Tracker;

static GLOBAL_TRACKER: OnceLock<Mutex<Tracker>> = OnceLock::new();

fn tracker() -> &'static Mutex<Tracker> {
    GLOBAL_TRACKER.get_or_init(|| Mutex::new(Tracker::new()))
}

/// Locks the process-wide tracker.
///
/// Handles dropped while the guard is alive run their destructors under the
/// lock; a destructor that calls back into this module then deadlocks. Use
/// [`Tracker::take_by_tag`] / [`Tracker::take_all`] and drop the entries
/// after the guard.
pub fn lock() -> MutexGuard<'static, Tracker> {
    tracker().lock()
}

/// Runs `f` with exclusive access to the process-wide tracker.
pub fn with<R>(f: impl FnOnce(&mut Tracker) -> R) -> R {
    f(&mut lock())
}

/// See [`Tracker::enable`].
pub fn enable(capacity: usize) -> ReclaimResult<()> {
    lock().enable(capacity)
}

/// See [`Tracker::disable`].
pub fn disable() {
    lock().disable();
}

/// See [`Tracker::request_token`].
pub fn request_token() -> Option<ScopeToken> {
    lock().request_token()
}

#[must_use]
pub fn is_active(token: ScopeToken) -> bool {
    lock().is_active(token)
}

/// See [`Tracker::register`].
pub fn register(handle: Handle) {
    lock().register(handle);
}

/// See [`Tracker::register_scoped`].
pub fn register_scoped(token: ScopeToken, handle: Handle) -> ReclaimResult<()> {
    lock().register_scoped(token, handle)
}

/// See [`Tracker::release_by_tag`].
pub fn release_by_tag(tag: Tag) -> usize {
    let released = lock().take_by_tag(tag);
    released.len()
}

/// See [`Tracker::release_unscoped`].
pub fn release_unscoped() -> usize {
    release_by_tag(Tag::Unscoped)
}

/// See [`Tracker::release_all`].
pub fn release_all() -> usize {
    let released = lock().take_all();
    released.len()
}

#[must_use]
pub fn stats() -> TrackerStats {
    lock().stats()
}
