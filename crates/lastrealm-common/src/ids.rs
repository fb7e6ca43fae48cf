//! Identifier types for simulation entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counter backing [`EntityId::new`].
static ENTITY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a live entity (enemy, projectile, powerup).
///
/// Ids are never reused within a process, so a dead entity's id can be kept
/// in visited sets without aliasing a newly spawned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Null/invalid entity ID.
    pub const NULL: Self = Self(0);

    /// Allocates a fresh entity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(ENTITY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps a raw value, e.g. one read back from a log line.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Checks if this is a valid (non-null) entity ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert!(b > a);
    }

    #[test]
    fn test_null_id() {
        assert!(!EntityId::NULL.is_valid());
        assert_eq!(EntityId::from_raw(7).raw(), 7);
        assert_eq!(EntityId::from_raw(7).to_string(), "#7");
    }
}
