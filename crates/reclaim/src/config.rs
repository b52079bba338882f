//! Tracker configuration

use crate::error::{ReclaimError, ReclaimResult};

/// Seed used for token generation unless the caller picks another one.
pub const DEFAULT_SEED: u64 = 0x32ff_2523;

/// Largest token value drawn by default (`RAND_MAX` of common C runtimes).
pub const DEFAULT_MAX_TOKEN: u32 = i32::MAX.unsigned_abs();

/// Configuration for [`Tracker`](crate::Tracker)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Enable the scope table with this many slots on construction
    ///
    /// `None` leaves scopes disabled until `enable` is called.
    pub scope_capacity: Option<usize>,

    /// Seed for the token generator, applied on the first enable
    pub seed: u64,

    /// Tokens are drawn from `1..=max_token`
    pub max_token: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            scope_capacity: None,
            seed: DEFAULT_SEED,
            max_token: DEFAULT_MAX_TOKEN,
        }
    }
}

impl TrackerConfig {
    /// Scopes enabled up front with `capacity` slots
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            scope_capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Default configuration with a caller-chosen seed
    #[must_use]
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_scope_capacity(mut self, capacity: usize) -> Self {
        self.scope_capacity = Some(capacity);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_token(mut self, max_token: u32) -> Self {
        self.max_token = max_token;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> ReclaimResult<()> {
        if self.max_token == 0 {
            return Err(ReclaimError::invalid_config("max_token must be at least 1"));
        }

        if self.max_token > DEFAULT_MAX_TOKEN {
            return Err(ReclaimError::invalid_config(
                "max_token must fit in a signed 32-bit integer",
            ));
        }

        if let Some(capacity) = self.scope_capacity {
            check_capacity(capacity, self.max_token)?;
        }

        Ok(())
    }
}

/// Capacity must be positive and no larger than the number of distinct tokens.
pub(crate) fn check_capacity(capacity: usize, max_token: u32) -> ReclaimResult<()> {
    if capacity == 0 {
        return Err(ReclaimError::invalid_capacity(capacity));
    }

    if capacity > max_token as usize {
        return Err(ReclaimError::capacity_exceeds_range(capacity, max_token));
    }

    Ok(())
}
