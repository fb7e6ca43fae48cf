//! Map-space geometry helpers.
//!
//! All positions are `glam::Vec2` in map units with +y pointing down, the same
//! orientation the renderer uses. Angles are radians measured from +x.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Squared lengths below this are treated as zero when normalizing.
const EPSILON_SQ: f32 = 1e-12;

// ============================================================================
// Map Bounds
// ============================================================================

/// The fixed playable rectangle, anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    /// Width in map units.
    pub width: f32,
    /// Height in map units.
    pub height: f32,
}

impl Default for MapBounds {
    fn default() -> Self {
        Self::new(2400.0, 2400.0)
    }
}

impl MapBounds {
    /// Creates bounds of the given size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center point of the map.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Length of the longest side.
    #[must_use]
    pub fn longest_side(&self) -> f32 {
        self.width.max(self.height)
    }

    /// Clamps a point to the map shrunk by `margin` on every side.
    ///
    /// A margin larger than half the map collapses to the center line instead
    /// of producing an inverted range.
    #[must_use]
    pub fn clamp_with_margin(&self, point: Vec2, margin: f32) -> Vec2 {
        let mx = margin.min(self.width * 0.5);
        let my = margin.min(self.height * 0.5);
        Vec2::new(
            point.x.clamp(mx, self.width - mx),
            point.y.clamp(my, self.height - my),
        )
    }

    /// Whether a point lies inside the map grown by `margin` on every side.
    #[must_use]
    pub fn contains_with_margin(&self, point: Vec2, margin: f32) -> bool {
        point.x >= -margin
            && point.x <= self.width + margin
            && point.y >= -margin
            && point.y <= self.height + margin
    }
}

// ============================================================================
// Vector Helpers
// ============================================================================

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector pointing from `from` to `to`, or zero when they coincide.
#[must_use]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    if delta.length_squared() <= EPSILON_SQ {
        Vec2::ZERO
    } else {
        delta.normalize()
    }
}

/// Unit vector for an angle in radians.
#[must_use]
pub fn from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a vector in radians.
#[must_use]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Rotates a vector counter-clockwise by `angle` radians.
#[must_use]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Whether every component is finite.
#[must_use]
pub fn is_finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

// ============================================================================
// Shape Tests
// ============================================================================

/// Circle-circle overlap. Touching circles do not overlap.
#[must_use]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) < reach * reach
}

/// Tests a circle against a rectangle rotated by `angle` around `center`.
///
/// `half_extents.x` runs along the rotated axis, `half_extents.y` across it.
/// The target offset is inverse-rotated into the rectangle's frame and the
/// box is grown by the target radius.
#[must_use]
pub fn rotated_rect_hits_circle(
    center: Vec2,
    angle: f32,
    half_extents: Vec2,
    point: Vec2,
    radius: f32,
) -> bool {
    let local = rotate(point - center, -angle);
    local.x.abs() <= half_extents.x + radius && local.y.abs() <= half_extents.y + radius
}

/// Shortest distance from `point` to the segment `a`-`b`.
#[must_use]
pub fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= EPSILON_SQ {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
