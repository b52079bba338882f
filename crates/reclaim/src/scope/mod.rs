//! Scope token allocation
//!
//! [`ScopeTable`] issues and retires tokens; [`ScopeGuard`] ties one token to
//! a lexical scope.

mod guard;
mod table;

pub use guard::ScopeGuard;
pub use table::ScopeTable;
