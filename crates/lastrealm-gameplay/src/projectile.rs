//! Projectiles.
//!
//! Player bolts and arrows and hostile fireballs share one type tagged by
//! [`ProjectileKind`]. Bolts and fireballs are single-use; arrows pierce and
//! remember every enemy they have already hit.

use ahash::AHashSet;
use glam::Vec2;
use lastrealm_common::{is_finite, EntityId, MapBounds};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Projectile variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Mage bolt: time-limited, splashes on impact.
    Bolt,
    /// Ranger arrow: distance-limited, piercing.
    Arrow,
    /// Epic monster fireball: hostile, time-limited.
    Fireball,
}

impl ProjectileKind {
    /// Whether this kind damages the player rather than enemies.
    #[must_use]
    pub const fn is_hostile(&self) -> bool {
        matches!(self, Self::Fireball)
    }

    /// Whether this kind survives hitting an enemy.
    #[must_use]
    pub const fn pierces(&self) -> bool {
        matches!(self, Self::Arrow)
    }
}

/// A projectile in flight.
#[derive(Debug, Clone)]
pub struct Projectile {
    id: EntityId,
    kind: ProjectileKind,
    position: Vec2,
    /// Map units per reference tick.
    velocity: Vec2,
    radius: f32,
    damage: f32,
    lifetime_left: Option<f32>,
    max_travel: Option<f32>,
    travelled: f32,
    alive: bool,
    visited: AHashSet<EntityId>,
    splash_radius: f32,
    splash_fraction: f32,
}

impl Projectile {
    /// Create a projectile with no expiry; add one with [`Self::with_lifetime`]
    /// or [`Self::with_max_travel`].
    #[must_use]
    pub fn new(kind: ProjectileKind, origin: Vec2, velocity: Vec2, radius: f32, damage: f32) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            position: origin,
            velocity,
            radius,
            damage,
            lifetime_left: None,
            max_travel: None,
            travelled: 0.0,
            alive: true,
            visited: AHashSet::new(),
            splash_radius: 0.0,
            splash_fraction: 0.0,
        }
    }

    /// Expire after `seconds`.
    #[must_use]
    pub fn with_lifetime(mut self, seconds: f32) -> Self {
        self.lifetime_left = Some(seconds);
        self
    }

    /// Expire after travelling `distance`.
    #[must_use]
    pub fn with_max_travel(mut self, distance: f32) -> Self {
        self.max_travel = Some(distance);
        self
    }

    /// Splash `fraction` of the damage onto enemies within `radius` of impact.
    #[must_use]
    pub fn with_splash(mut self, radius: f32, fraction: f32) -> Self {
        self.splash_radius = radius.max(0.0);
        self.splash_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Entity ID.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Variant tag.
    #[must_use]
    pub fn kind(&self) -> ProjectileKind {
        self.kind
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity per reference tick.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Collision radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Damage on hit.
    #[must_use]
    pub fn damage(&self) -> f32 {
        self.damage
    }

    /// Distance travelled so far.
    #[must_use]
    pub fn travelled(&self) -> f32 {
        self.travelled
    }

    /// Whether still in flight.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Whether this projectile damages the player.
    #[must_use]
    pub fn is_hostile(&self) -> bool {
        self.kind.is_hostile()
    }

    /// Splash radius and damage fraction, if this projectile splashes.
    #[must_use]
    pub fn splash(&self) -> Option<(f32, f32)> {
        (self.splash_radius > 0.0 && self.splash_fraction > 0.0)
            .then_some((self.splash_radius, self.splash_fraction))
    }

    /// Removes the projectile at end of tick.
    pub fn destroy(&mut self) {
        self.alive = false;
    }

    /// Moves the projectile and expires it on timeout, travel limit, or when
    /// it leaves the map grown by `edge_margin`.
    pub fn update(&mut self, dt: f32, frame_scale: f32, bounds: &MapBounds, edge_margin: f32) {
        if !self.alive {
            return;
        }

        let step = self.velocity * frame_scale;
        self.position += step;
        self.travelled += step.length();

        if !is_finite(self.position) {
            warn!("Projectile {} has non-finite position, removing", self.id);
            self.alive = false;
            return;
        }

        if let Some(left) = self.lifetime_left.as_mut() {
            *left -= dt;
            if *left <= 0.0 {
                self.alive = false;
            }
        }
        if self.max_travel.is_some_and(|max| self.travelled >= max) {
            self.alive = false;
        }
        if !bounds.contains_with_margin(self.position, edge_margin) {
            self.alive = false;
        }
    }

    /// Whether this projectile may damage `target` now.
    #[must_use]
    pub fn can_hit(&self, target: EntityId) -> bool {
        self.alive && !self.visited.contains(&target)
    }

    /// Records a hit: arrows remember the target, everything else is spent.
    pub fn register_hit(&mut self, target: EntityId) {
        if self.kind.pierces() {
            self.visited.insert(target);
        } else {
            self.alive = false;
        }
    }

    /// Whether `target` has already been hit by this arrow.
    #[must_use]
    pub fn has_visited(&self, target: EntityId) -> bool {
        self.visited.contains(&target)
    }
}
