//! RAII guard for a scope
//!
//! The guard holds the tracker exclusively for as long as the scope is open,
//! so its token cannot be retired behind its back.

use crate::error::ReclaimResult;
use crate::handle::Handle;
use crate::token::{ScopeToken, Tag};
use crate::tracker::Tracker;

/// Open scope that releases its allocations when dropped
///
/// # Examples
///
/// ```
/// use nebula_reclaim::{Handle, Tracker};
///
/// let mut tracker = Tracker::new();
/// tracker.enable(1).unwrap();
///
/// {
///     let mut scope = tracker.open_scope().unwrap();
///     scope.register(Handle::new([0u8; 512])).unwrap();
///     scope.register(Handle::new(String::from("temp"))).unwrap();
///     // both freed here
/// }
///
/// assert!(tracker.is_empty());
/// assert!(!tracker.is_full());
/// ```
#[must_use = "ScopeGuard releases its scope as soon as it is dropped"]
pub struct ScopeGuard<'a> {
    tracker: &'a mut Tracker,
    token: ScopeToken,
    active: bool,
}

impl<'a> ScopeGuard<'a> {
    pub(crate) fn new(tracker: &'a mut Tracker, token: ScopeToken) -> Self {
        Self {
            tracker,
            token,
            active: true,
        }
    }

    #[must_use]
    pub fn token(&self) -> ScopeToken {
        self.token
    }

    /// Tracks `handle` inside this scope.
    pub fn register(&mut self, handle: Handle) -> ReclaimResult<()> {
        self.tracker.register_scoped(self.token, handle)
    }

    /// Tracks `handle` outside any scope, so it outlives this one.
    pub fn register_unscoped(&mut self, handle: Handle) {
        self.tracker.register(handle);
    }

    /// Number of allocations registered in this scope so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracker.count_tagged(Tag::Scoped(self.token))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases the scope now and returns how many allocations were freed.
    pub fn close(mut self) -> usize {
        self.release()
    }

    /// Keeps the scope open past the guard and returns its token.
    ///
    /// The caller becomes responsible for releasing the token's tag.
    pub fn leak(mut self) -> ScopeToken {
        self.active = false;
        self.token
    }

    fn release(&mut self) -> usize {
        if !self.active {
            return 0;
        }
        self.active = false;
        self.tracker.release_by_tag(Tag::Scoped(self.token))
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
