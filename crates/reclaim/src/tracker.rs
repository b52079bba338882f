//! The tracker: allocation registry and scope table behind one surface
//!
//! This is the only place where the two halves meet. Scoped registration
//! checks the scope table before appending, and releasing a scoped tag also
//! retires its token.

#[cfg(feature = "logging")]
use tracing::{debug, info};

use crate::config::TrackerConfig;
use crate::error::{ReclaimError, ReclaimResult};
use crate::handle::Handle;
use crate::registry::{AllocationRegistry, TrackedAllocation};
use crate::scope::{ScopeGuard, ScopeTable};
use crate::stats::TrackerStats;
use crate::token::{ScopeToken, Tag};

/// Scope-tagged deferred-release tracker
///
/// # Examples
///
/// ```
/// use nebula_reclaim::{Handle, Tag, Tracker};
///
/// let mut tracker = Tracker::new();
/// tracker.enable(4).unwrap();
///
/// let scope = tracker.request_token().expect("scope slot available");
/// tracker.register_scoped(scope, Handle::new(vec![0u8; 256])).unwrap();
/// tracker.register(Handle::new(String::from("long lived")));
///
/// // ends the scope and frees its allocation
/// assert_eq!(tracker.release_by_tag(Tag::Scoped(scope)), 1);
/// assert!(!tracker.is_active(scope));
/// assert_eq!(tracker.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Tracker {
    registry: AllocationRegistry,
    scopes: ScopeTable,
    registered: u64,
    rejected: u64,
    released: u64,
}

impl Tracker {
    /// Empty tracker with scopes disabled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker built from a validated configuration
    ///
    /// Enables the scope table right away when `scope_capacity` is set.
    pub fn with_config(config: TrackerConfig) -> ReclaimResult<Self> {
        config.validate()?;

        let mut tracker = Self {
            scopes: ScopeTable::with_seed(config.seed, config.max_token),
            ..Self::default()
        };

        if let Some(capacity) = config.scope_capacity {
            tracker.enable(capacity)?;
        }

        Ok(tracker)
    }

    // --- scopes ---

    /// Enables scopes with room for `capacity` concurrently open ones.
    ///
    /// No-op while already enabled.
    pub fn enable(&mut self, capacity: usize) -> ReclaimResult<()> {
        self.scopes.enable(capacity)
    }

    /// Discards the scope table. Tracked allocations are left alone.
    pub fn disable(&mut self) {
        self.scopes.disable();
    }

    /// Reseeds the token generator.
    pub fn reseed(&mut self, seed: u64) {
        self.scopes.reseed(seed);
    }

    /// Opens a scope. `None` when scopes are disabled or all slots are taken.
    pub fn request_token(&mut self) -> Option<ScopeToken> {
        self.scopes.request_token()
    }

    /// Retires a token without freeing anything tagged with it.
    ///
    /// Allocations still carrying the token can then only be freed by
    /// [`release_by_tag`](Self::release_by_tag) with the same tag or by
    /// [`release_all`](Self::release_all).
    pub fn release_token(&mut self, token: ScopeToken) -> bool {
        self.scopes.release_token(token)
    }

    #[must_use]
    pub fn is_active(&self, token: ScopeToken) -> bool {
        self.scopes.is_active(token)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.scopes.is_full()
    }

    #[must_use]
    pub fn scopes(&self) -> &ScopeTable {
        &self.scopes
    }

    /// Opens a scope that is released when the returned guard drops.
    pub fn open_scope(&mut self) -> Option<ScopeGuard<'_>> {
        let token = self.request_token()?;
        Some(ScopeGuard::new(self, token))
    }

    // --- registration ---

    /// Tracks an unscoped allocation.
    pub fn register(&mut self, handle: Handle) {
        self.registry.register(Tag::Unscoped, handle);
        self.registered += 1;
    }

    /// Tracks an allocation inside the scope `token`.
    ///
    /// Fails with [`ReclaimError::InactiveScope`] when `token` is not open;
    /// the error carries the handle back and the registry is unchanged.
    pub fn register_scoped(&mut self, token: ScopeToken, handle: Handle) -> ReclaimResult<()> {
        if !self.scopes.is_active(token) {
            self.rejected += 1;
            return Err(ReclaimError::inactive_scope(token, handle));
        }

        self.registry.register(Tag::Scoped(token), handle);
        self.registered += 1;
        Ok(())
    }

    /// Tracks an allocation under `tag`, scoped or not.
    pub fn register_tagged(&mut self, tag: Tag, handle: Handle) -> ReclaimResult<()> {
        match tag {
            Tag::Unscoped => {
                self.register(handle);
                Ok(())
            }
            Tag::Scoped(token) => self.register_scoped(token, handle),
        }
    }

    // --- release ---

    /// Frees every allocation tagged `tag` and returns how many were freed.
    ///
    /// For a scoped tag the token is retired as well, whether or not it was
    /// still active. Releasing [`Tag::Unscoped`] touches no token.
    pub fn release_by_tag(&mut self, tag: Tag) -> usize {
        let released = self.take_by_tag(tag);
        released.len()
    }

    /// Same as [`release_by_tag`](Self::release_by_tag), but the released
    /// entries are handed back instead of dropped.
    ///
    /// The tracker is fully updated before this returns, so destructors run
    /// by dropping the entries may call back into the tracker.
    #[must_use = "dropping the entries frees them"]
    pub fn take_by_tag(&mut self, tag: Tag) -> Vec<TrackedAllocation> {
        let released = self.registry.take_by_tag(tag);
        self.released += released.len() as u64;

        if let Tag::Scoped(token) = tag {
            self.scopes.release_token(token);

            #[cfg(feature = "logging")]
            debug!(token = token.get(), freed = released.len(), "scope released");
        }

        released
    }

    /// Frees every unscoped allocation.
    pub fn release_unscoped(&mut self) -> usize {
        self.release_by_tag(Tag::Unscoped)
    }

    /// Teardown: frees everything and disables the scope table.
    ///
    /// Afterwards the tracker is back in its initial state, apart from
    /// lifetime counters and the token generator.
    pub fn release_all(&mut self) -> usize {
        let released = self.take_all();
        released.len()
    }

    /// Teardown that hands the entries back instead of dropping them.
    #[must_use = "dropping the entries frees them"]
    pub fn take_all(&mut self) -> Vec<TrackedAllocation> {
        let released = self.registry.take_all();
        self.released += released.len() as u64;

        #[cfg(feature = "logging")]
        info!(
            freed = released.len(),
            open_scopes = self.scopes.active(),
            "tracker torn down"
        );

        self.scopes.disable();
        released
    }

    // --- introspection ---

    /// Number of tracked allocations
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    #[must_use]
    pub fn count_tagged(&self, tag: Tag) -> usize {
        self.registry.count_tagged(tag)
    }

    #[must_use]
    pub fn registry(&self) -> &AllocationRegistry {
        &self.registry
    }

    #[must_use]
    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            registered: self.registered,
            rejected: self.rejected,
            released: self.released,
            tokens_issued: self.scopes.issued(),
            tokens_released: self.scopes.released(),
            token_collisions: self.scopes.collisions(),
            live_allocations: self.registry.len(),
            live_bytes: self.registry.tracked_bytes(),
            active_scopes: self.scopes.active(),
            scope_capacity: self.scopes.capacity(),
        }
    }
}
