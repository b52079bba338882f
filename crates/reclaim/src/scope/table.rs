//! Fixed-capacity table of active scope tokens
//!
//! Tokens are drawn from a seeded generator and checked for collision
//! against every active token before they are handed out. The slot array
//! keeps the capacity bound; a hash index and an ordered free set keep
//! lookup, claim and release O(1) / O(log n) regardless of occupancy.

use std::collections::{BTreeSet, HashMap};

use core::num::NonZeroU32;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use crate::config::{DEFAULT_MAX_TOKEN, DEFAULT_SEED, check_capacity};
use crate::error::ReclaimResult;
use crate::token::ScopeToken;

/// Table of checked-out scope tokens
///
/// A capacity of zero means the table is disabled: every request fails until
/// [`enable`](Self::enable) is called.
///
/// # Examples
///
/// ```
/// use nebula_reclaim::scope::ScopeTable;
///
/// let mut table = ScopeTable::new();
/// table.enable(2).unwrap();
///
/// let a = table.request_token().unwrap();
/// let b = table.request_token().unwrap();
/// assert_ne!(a, b);
/// assert!(table.request_token().is_none());
///
/// table.release_token(a);
/// assert!(!table.is_active(a));
/// ```
#[derive(Debug)]
pub struct ScopeTable {
    /// One entry per slot, `None` when free. Empty while disabled.
    slots: Vec<Option<ScopeToken>>,
    /// Indices of free slots, lowest first
    free: BTreeSet<usize>,
    /// Active token -> slot index
    index: HashMap<ScopeToken, usize>,
    /// Created on the first enable and kept across disable/enable cycles
    rng: Option<StdRng>,
    seed: u64,
    max_token: NonZeroU32,
    issued: u64,
    released: u64,
    collisions: u64,
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTable {
    /// Disabled table with the default seed and token range
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED, DEFAULT_MAX_TOKEN)
    }

    /// Disabled table drawing tokens from `1..=max_token` (`0` is treated as `1`)
    #[must_use]
    pub fn with_seed(seed: u64, max_token: u32) -> Self {
        Self {
            slots: Vec::new(),
            free: BTreeSet::new(),
            index: HashMap::new(),
            rng: None,
            seed,
            max_token: NonZeroU32::new(max_token).unwrap_or(NonZeroU32::MIN),
            issued: 0,
            released: 0,
            collisions: 0,
        }
    }

    /// Configures the table with `capacity` free slots.
    ///
    /// No-op while already enabled: the capacity only changes after an
    /// explicit [`disable`](Self::disable). The generator is seeded on the
    /// first enable of this table's lifetime.
    pub fn enable(&mut self, capacity: usize) -> ReclaimResult<()> {
        if self.is_enabled() {
            #[cfg(feature = "logging")]
            trace!(
                capacity = self.capacity(),
                requested = capacity,
                "scope table already enabled"
            );
            return Ok(());
        }

        check_capacity(capacity, self.max_token.get())?;

        if self.rng.is_none() {
            self.rng = Some(StdRng::seed_from_u64(self.seed));
        }

        self.slots = vec![None; capacity];
        self.free = (0..capacity).collect();
        self.index = HashMap::with_capacity(capacity);

        #[cfg(feature = "logging")]
        debug!(capacity, "scope table enabled");

        Ok(())
    }

    /// Discards every slot and returns to the disabled state.
    ///
    /// Tokens still active become dangling identifiers; allocations tagged
    /// with them are only reachable through teardown afterwards.
    pub fn disable(&mut self) {
        if !self.is_enabled() {
            return;
        }

        #[cfg(feature = "logging")]
        debug!(
            capacity = self.capacity(),
            dangling = self.index.len(),
            "scope table disabled"
        );

        self.slots = Vec::new();
        self.free = BTreeSet::new();
        self.index = HashMap::new();
    }

    /// Replaces the generator with one seeded from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Some(StdRng::seed_from_u64(seed));

        #[cfg(feature = "logging")]
        debug!(seed, "scope token generator reseeded");
    }

    /// Issues a token unique among the active ones.
    ///
    /// Returns `None` when the table is disabled or every slot is taken.
    pub fn request_token(&mut self) -> Option<ScopeToken> {
        let slot = self.free.first().copied()?;
        let rng = self.rng.as_mut()?;

        let token = loop {
            let candidate = rng.random_range(1..=self.max_token.get());
            let token = ScopeToken::new(NonZeroU32::new(candidate)?);
            if !self.index.contains_key(&token) {
                break token;
            }
            self.collisions += 1;
        };

        self.free.remove(&slot);
        self.slots[slot] = Some(token);
        self.index.insert(token, slot);
        self.issued += 1;

        #[cfg(feature = "logging")]
        trace!(token = token.get(), slot, "scope token issued");

        Some(token)
    }

    /// Frees the slot holding `token`. Unknown tokens are ignored.
    ///
    /// Returns whether a slot was freed.
    pub fn release_token(&mut self, token: ScopeToken) -> bool {
        let Some(slot) = self.index.remove(&token) else {
            return false;
        };

        self.slots[slot] = None;
        self.free.insert(slot);
        self.released += 1;

        #[cfg(feature = "logging")]
        trace!(token = token.get(), slot, "scope token released");

        true
    }

    #[must_use]
    pub fn is_active(&self, token: ScopeToken) -> bool {
        self.index.contains_key(&token)
    }

    /// True when no slot is free. A disabled table has no free slots.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Configured slot count, `0` while disabled
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of tokens currently checked out
    #[must_use]
    pub fn active(&self) -> usize {
        self.index.len()
    }

    /// Active tokens in slot order
    pub fn active_tokens(&self) -> impl Iterator<Item = ScopeToken> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    #[must_use]
    pub fn max_token(&self) -> u32 {
        self.max_token.get()
    }

    /// Tokens issued over the table's lifetime
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Tokens released over the table's lifetime
    #[must_use]
    pub fn released(&self) -> u64 {
        self.released
    }

    /// Candidates rejected because they were already active
    #[must_use]
    pub fn collisions(&self) -> u64 {
        self.collisions
    }
}
