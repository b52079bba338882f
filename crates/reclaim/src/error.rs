//! Standalone error types for nebula-reclaim
//!
//! Only real faults are errors. "No scope available" and "nothing matched
//! this tag" are ordinary outcomes and are reported through `Option` and
//! release counts instead.

use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::warn;

use crate::handle::Handle;
use crate::token::ScopeToken;

// ============================================================================
// Main Error Types
// ============================================================================

/// Reclaim errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ReclaimError {
    // --- Scope Table Errors ---
    #[error("Scope capacity must be positive, got {capacity}")]
    InvalidCapacity { capacity: usize },

    #[error("Scope capacity {capacity} exceeds token range 1..={max_token}")]
    CapacityExceedsTokenRange { capacity: usize, max_token: u32 },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // --- Registration Errors ---
    /// The handle is returned untouched; the caller still owns it.
    #[error("Scope {token} is not active, allocation of {} was not registered", handle.type_name())]
    InactiveScope { token: ScopeToken, handle: Handle },
}

impl ReclaimError {
    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCapacity { .. } => "RECLAIM:SCOPE:CAPACITY",
            Self::CapacityExceedsTokenRange { .. } => "RECLAIM:SCOPE:RANGE",
            Self::InvalidConfig { .. } => "RECLAIM:CONFIG:INVALID",
            Self::InactiveScope { .. } => "RECLAIM:REGISTER:INACTIVE",
        }
    }

    /// Check if the same call can succeed later without changing its input
    ///
    /// An inactive scope may be a token that has not been issued yet, so the
    /// registration can be retried once the scope exists.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InactiveScope { .. })
    }

    /// Hands back the allocation carried by a rejected registration.
    #[must_use]
    pub fn into_handle(self) -> Option<Handle> {
        match self {
            Self::InactiveScope { handle, .. } => Some(handle),
            _ => None,
        }
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create invalid capacity error
    pub fn invalid_capacity(capacity: usize) -> Self {
        Self::InvalidCapacity { capacity }
    }

    /// Create capacity out of token range error
    pub fn capacity_exceeds_range(capacity: usize, max_token: u32) -> Self {
        Self::CapacityExceedsTokenRange {
            capacity,
            max_token,
        }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: &str) -> Self {
        Self::InvalidConfig {
            reason: reason.to_string(),
        }
    }

    /// Create inactive scope error, giving the handle back to the caller
    pub fn inactive_scope(token: ScopeToken, handle: Handle) -> Self {
        #[cfg(feature = "logging")]
        warn!(
            token = token.get(),
            type_name = handle.type_name(),
            "rejected registration into inactive scope"
        );

        Self::InactiveScope { token, handle }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for reclaim operations
pub type ReclaimResult<T> = core::result::Result<T, ReclaimError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn token(raw: u32) -> ScopeToken {
        ScopeToken::from_raw(raw).unwrap()
    }

    #[test]
    fn test_error_messages() {
        let error = ReclaimError::invalid_capacity(0);
        assert!(error.to_string().contains('0'));

        let error = ReclaimError::capacity_exceeds_range(10, 4);
        assert!(error.to_string().contains("1..=4"));

        let error = ReclaimError::inactive_scope(token(999), Handle::new(5_u8));
        assert!(error.to_string().contains("u8"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ReclaimError::invalid_capacity(0).code(),
            "RECLAIM:SCOPE:CAPACITY"
        );
        assert_eq!(
            ReclaimError::invalid_config("bad").code(),
            "RECLAIM:CONFIG:INVALID"
        );
        assert_eq!(
            ReclaimError::inactive_scope(token(1), Handle::new(())).code(),
            "RECLAIM:REGISTER:INACTIVE"
        );
    }

    #[test]
    fn test_into_handle() {
        let error = ReclaimError::inactive_scope(token(3), Handle::new(String::from("mine")));
        assert!(error.is_retryable());

        let handle = error.into_handle().unwrap();
        assert_eq!(handle.downcast_ref::<String>().unwrap(), "mine");

        assert!(ReclaimError::invalid_capacity(0).into_handle().is_none());
    }
}
