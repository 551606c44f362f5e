//! Type-safe identifiers.
//!
//! Newtype wrappers prevent mixing a handle number with other integers.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// HandleId
// ============================================================================

/// Identifies one transport handle created by a connection manager.
///
/// Each call to [`ConnectionManager::connect`](crate::ConnectionManager::connect)
/// mints the next id. Ids are never reused within a manager, so an event
/// tagged with an older id can always be recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    /// Creates a handle id from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the id following this one.
    #[inline]
    #[must_use]
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_is_ordered() {
        let first = HandleId::new(1);
        assert!(first.next() > first);
        assert_eq!(first.next().as_u64(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(HandleId::new(7).to_string(), "#7");
    }
}
