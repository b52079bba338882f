//! Registry of tracked allocations
//!
//! The registry owns every handle it is given and frees them in bulk, one tag
//! at a time or all at once. It treats tags as opaque keys and knows nothing
//! about which scopes are open; [`Tracker`](crate::Tracker) couples the two.

use core::fmt;

#[cfg(feature = "logging")]
use tracing::trace;

use crate::handle::Handle;
use crate::token::Tag;

/// One allocation owned by the registry
pub struct TrackedAllocation {
    tag: Tag,
    handle: Handle,
}

impl TrackedAllocation {
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl fmt::Debug for TrackedAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedAllocation")
            .field("tag", &self.tag)
            .field("handle", &self.handle)
            .finish()
    }
}

/// Append-only list of tagged allocations with bulk release
///
/// # Examples
///
/// ```
/// use nebula_reclaim::{AllocationRegistry, Handle, Tag};
///
/// let mut registry = AllocationRegistry::new();
/// registry.register(Tag::Unscoped, Handle::new([0u8; 128]));
/// registry.register(Tag::from_raw(7), Handle::new(String::from("scoped")));
///
/// assert_eq!(registry.release_by_tag(Tag::Unscoped), 1);
/// assert_eq!(registry.len(), 1);
/// assert_eq!(registry.release_all(), 1);
/// assert!(registry.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct AllocationRegistry {
    entries: Vec<TrackedAllocation>,
    bytes: usize,
}

impl AllocationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            bytes: 0,
        }
    }

    /// Takes ownership of `handle` under `tag`.
    ///
    /// Always succeeds; whether a scoped tag belongs to an open scope is the
    /// caller's concern.
    pub fn register(&mut self, tag: Tag, handle: Handle) {
        #[cfg(feature = "logging")]
        trace!(
            tag = tag.raw(),
            type_name = handle.type_name(),
            size = handle.size(),
            "allocation registered"
        );

        self.bytes += handle.size();
        self.entries.push(TrackedAllocation { tag, handle });
    }

    /// Frees every allocation tagged `tag` and returns how many were freed.
    ///
    /// Entries with other tags stay registered, in their original relative
    /// order. A tag that matches nothing frees nothing.
    pub fn release_by_tag(&mut self, tag: Tag) -> usize {
        let released = self.take_by_tag(tag);
        released.len()
    }

    /// Unlinks every allocation tagged `tag` and hands the entries back.
    ///
    /// Bookkeeping is already updated when this returns; the values are
    /// dropped whenever the caller drops the returned entries.
    #[must_use = "dropping the entries frees them"]
    pub fn take_by_tag(&mut self, tag: Tag) -> Vec<TrackedAllocation> {
        let released: Vec<TrackedAllocation> = self
            .entries
            .extract_if(.., |entry| entry.tag == tag)
            .collect();

        self.bytes -= released
            .iter()
            .map(|entry| entry.handle.size())
            .sum::<usize>();

        #[cfg(feature = "logging")]
        trace!(
            tag = tag.raw(),
            freed = released.len(),
            retained = self.entries.len(),
            "tag released"
        );

        released
    }

    /// Frees every allocation regardless of tag.
    pub fn release_all(&mut self) -> usize {
        let released = self.take_all();
        released.len()
    }

    /// Unlinks every allocation and hands the entries back.
    #[must_use = "dropping the entries frees them"]
    pub fn take_all(&mut self) -> Vec<TrackedAllocation> {
        let drained = core::mem::take(&mut self.entries);
        self.bytes = 0;
        drained
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of allocations currently carrying `tag`
    #[must_use]
    pub fn count_tagged(&self, tag: Tag) -> usize {
        self.entries.iter().filter(|entry| entry.tag == tag).count()
    }

    /// Sum of the shallow sizes of every tracked value
    #[must_use]
    pub fn tracked_bytes(&self) -> usize {
        self.bytes
    }

    pub fn iter(&self) -> core::slice::Iter<'_, TrackedAllocation> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a AllocationRegistry {
    type Item = &'a TrackedAllocation;
    type IntoIter = core::slice::Iter<'a, TrackedAllocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    struct Probe {
        id: u32,
        drops: Arc<AtomicUsize>,
    }

    impl Drop for Probe {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn probe(id: u32, drops: &Arc<AtomicUsize>) -> Handle {
        Handle::new(Probe {
            id,
            drops: Arc::clone(drops),
        })
    }

    fn ids(registry: &AllocationRegistry) -> Vec<u32> {
        registry
            .iter()
            .map(|entry| entry.handle().downcast_ref::<Probe>().unwrap().id)
            .collect()
    }

    #[test]
    fn release_by_tag_frees_only_matching() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = AllocationRegistry::new();
        let scope = Tag::from_raw(11);

        registry.register(Tag::Unscoped, probe(1, &drops));
        registry.register(scope, probe(2, &drops));
        registry.register(Tag::Unscoped, probe(3, &drops));
        registry.register(scope, probe(4, &drops));

        assert_eq!(registry.release_by_tag(scope), 2);
        assert_eq!(drops.load(Ordering::SeqCst), 2);
        assert_eq!(ids(&registry), vec![1, 3]);
        assert_eq!(registry.count_tagged(Tag::Unscoped), 2);
    }

    #[test]
    fn release_of_unknown_tag_is_noop() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = AllocationRegistry::new();
        registry.register(Tag::Unscoped, probe(1, &drops));

        assert_eq!(registry.release_by_tag(Tag::from_raw(5)), 0);
        assert_eq!(registry.len(), 1);
        assert_eq!(drops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn first_registered_entry_is_reachable() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = AllocationRegistry::new();
        registry.register(Tag::Unscoped, probe(1, &drops));

        assert_eq!(registry.release_by_tag(Tag::Unscoped), 1);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn released_entries_cannot_be_released_again() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = AllocationRegistry::new();
        let scope = Tag::from_raw(3);
        registry.register(scope, probe(1, &drops));

        assert_eq!(registry.release_by_tag(scope), 1);
        assert_eq!(registry.release_by_tag(scope), 0);
        assert_eq!(registry.release_all(), 0);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_all_frees_every_tag() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = AllocationRegistry::with_capacity(4);
        for (id, raw) in [(1, 0), (2, 9), (3, 10), (4, 0)] {
            registry.register(Tag::from_raw(raw), probe(id, &drops));
        }

        assert_eq!(registry.release_all(), 4);
        assert_eq!(drops.load(Ordering::SeqCst), 4);
        assert!(registry.is_empty());
        assert_eq!(registry.tracked_bytes(), 0);
    }

    #[test]
    fn tracked_bytes_follow_releases() {
        let mut registry = AllocationRegistry::new();
        registry.register(Tag::Unscoped, Handle::new([0u8; 16]));
        registry.register(Tag::from_raw(2), Handle::new([0u8; 48]));
        assert_eq!(registry.tracked_bytes(), 64);

        registry.release_by_tag(Tag::from_raw(2));
        assert_eq!(registry.tracked_bytes(), 16);
    }

    #[test]
    fn taken_entries_drop_with_the_caller() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = AllocationRegistry::new();
        let scope = Tag::from_raw(4);
        registry.register(scope, probe(1, &drops));
        registry.register(Tag::Unscoped, probe(2, &drops));

        let taken = registry.take_by_tag(scope);
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].tag(), scope);
        assert_eq!(registry.len(), 1);
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        drop(taken);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_destructor_leaves_consistent_accounting() {
        struct Explodes;

        impl Drop for Explodes {
            fn drop(&mut self) {
                panic!("destructor failure");
            }
        }

        let mut registry = AllocationRegistry::new();
        registry.register(Tag::Unscoped, Handle::new([0u8; 32]));
        registry.register(Tag::from_raw(6), Handle::new(Explodes));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| registry.release_all()));

        assert!(outcome.is_err());
        assert!(registry.is_empty());
        assert_eq!(registry.tracked_bytes(), 0);
    }

    #[test]
    fn borrowed_registry_iterates() {
        let mut registry = AllocationRegistry::new();
        registry.register(Tag::Unscoped, Handle::new(1_u8));
        registry.register(Tag::from_raw(3), Handle::new(2_u8));

        let mut tags = Vec::new();
        for entry in &registry {
            tags.push(entry.tag());
        }
        assert_eq!(tags, vec![Tag::Unscoped, Tag::from_raw(3)]);
    }
}
