//! Scope tokens and allocation tags

use core::fmt;
use core::num::NonZeroU32;

/// Identifier of an open scope.
///
/// Tokens are nonzero by construction, so `Option<ScopeToken>` is the same
/// size as a `u32` and `None` plays the role of the "no scope" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeToken(NonZeroU32);

impl ScopeToken {
    /// Builds a token from its integer form. Returns `None` for `0`.
    ///
    /// A token built this way is not necessarily active; the scope table
    /// decides that.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    #[inline]
    pub(crate) const fn new(value: NonZeroU32) -> Self {
        Self(value)
    }

    /// Integer form of the token, never `0`.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ScopeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0.get())
    }
}

impl From<ScopeToken> for u32 {
    fn from(token: ScopeToken) -> Self {
        token.get()
    }
}

/// Tag stored on a tracked allocation
///
/// `Unscoped` is the reserved `0` tag; everything else belongs to a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tag {
    /// Not tied to any scope; released by an unscoped collect or teardown
    #[default]
    Unscoped,
    /// Released together with its scope
    Scoped(ScopeToken),
}

impl Tag {
    /// Interprets an integer tag, `0` meaning unscoped.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match ScopeToken::from_raw(raw) {
            Some(token) => Self::Scoped(token),
            None => Self::Unscoped,
        }
    }

    /// Integer form of the tag (`0` for unscoped).
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Unscoped => 0,
            Self::Scoped(token) => token.get(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn token(self) -> Option<ScopeToken> {
        match self {
            Self::Unscoped => None,
            Self::Scoped(token) => Some(token),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_scoped(self) -> bool {
        matches!(self, Self::Scoped(_))
    }
}

impl From<ScopeToken> for Tag {
    fn from(token: ScopeToken) -> Self {
        Self::Scoped(token)
    }
}

impl From<Option<ScopeToken>> for Tag {
    fn from(token: Option<ScopeToken>) -> Self {
        token.map_or(Self::Unscoped, Self::Scoped)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unscoped => f.write_str("unscoped"),
            Self::Scoped(token) => write!(f, "scope {token}"),
        }
    }
}
