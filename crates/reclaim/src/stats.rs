//! Tracker statistics

use core::fmt;

/// Point-in-time statistics of a [`Tracker`](crate::Tracker)
///
/// Counters cover the tracker's whole lifetime; `live_*`, `active_scopes`
/// and `scope_capacity` describe the moment the snapshot was taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Allocations accepted by the registry
    pub registered: u64,
    /// Scoped registrations refused because the scope was not active
    pub rejected: u64,
    /// Allocations freed by bulk release or teardown
    pub released: u64,
    /// Tokens handed out by the scope table
    pub tokens_issued: u64,
    /// Tokens returned to the scope table
    pub tokens_released: u64,
    /// Generated candidates discarded as duplicates of an active token
    pub token_collisions: u64,
    /// Allocations currently tracked
    pub live_allocations: usize,
    /// Shallow bytes currently tracked
    pub live_bytes: usize,
    /// Scopes currently open
    pub active_scopes: usize,
    /// Scope table capacity, `0` while disabled
    pub scope_capacity: usize,
}

impl TrackerStats {
    /// Fraction of scope slots in use, `0.0` while disabled
    #[must_use]
    pub fn scope_utilization(&self) -> f64 {
        if self.scope_capacity == 0 {
            0.0
        } else {
            self.active_scopes as f64 / self.scope_capacity as f64
        }
    }
}

impl fmt::Display for TrackerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} live ({} bytes), {} registered, {} released, {} rejected, scopes {}/{}",
            self.live_allocations,
            self.live_bytes,
            self.registered,
            self.released,
            self.rejected,
            self.active_scopes,
            self.scope_capacity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utilization() {
        let stats = TrackerStats {
            active_scopes: 1,
            scope_capacity: 4,
            ..TrackerStats::default()
        };
        assert_eq!(stats.scope_utilization(), 0.25);
        assert_eq!(TrackerStats::default().scope_utilization(), 0.0);
    }

    #[test]
    fn display_mentions_scopes() {
        let stats = TrackerStats {
            active_scopes: 2,
            scope_capacity: 8,
            ..TrackerStats::default()
        };
        assert!(stats.to_string().contains("scopes 2/8"));
    }
}
