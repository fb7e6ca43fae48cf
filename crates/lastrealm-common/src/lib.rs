//! # Last Realm Common
//!
//! Shared types for the Last Realm simulation crates:
//! - Entity identifiers
//! - Map-space geometry on top of `glam::Vec2`
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod math;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::math::*;
    pub use glam::Vec2;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
    }

    #[test]
    fn test_prelude_exposes_geometry() {
        let bounds = MapBounds::new(100.0, 100.0);
        let clamped = bounds.clamp_with_margin(Vec2::new(-5.0, 500.0), 10.0);
        assert_eq!(clamped, Vec2::new(10.0, 90.0));
    }
}
