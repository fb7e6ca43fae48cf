//! Powerups.
//!
//! This module provides:
//! - Map powerup pickups that open a choice when touched
//! - A data-driven catalog of effects, each a list of stat modifiers
//! - Random offers drawn from the universal plus class pool
//!
//! Effects are resolved by [`crate::player::Player::apply_powerup`]; the
//! catalog only describes them, so a host can replace it wholesale.

use ahash::AHashSet;
use glam::Vec2;
use lastrealm_common::EntityId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::PlayerClass;

/// Errors in a powerup catalog definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// The catalog has no entries.
    #[error("powerup catalog is empty")]
    Empty,

    /// Two entries share an ID.
    #[error("duplicate powerup id: {0}")]
    DuplicateId(String),

    /// A multiplier would make a stat zero or negative.
    #[error("powerup {id} multiplies {target:?} by non-positive {amount}")]
    NonPositiveFactor {
        /// Offending powerup.
        id: String,
        /// Stat it modifies.
        target: StatTarget,
        /// Offending factor.
        amount: f32,
    },
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

// ============================================================================
// Modifiers
// ============================================================================

/// Player or weapon stat a modifier changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatTarget {
    /// Movement speed multiplier.
    Speed,
    /// Orbit/thrust/fire-rate multiplier.
    RotationSpeed,
    /// Hitbox and projectile size multiplier.
    Size,
    /// Melee damage multiplier.
    Damage,
    /// Ranged damage multiplier.
    RangedDamage,
    /// Incoming damage multiplier.
    DamageTaken,
    /// Projectile speed multiplier.
    ProjectileSpeed,
    /// Targeting range and projectile reach multiplier.
    ProjectileRange,
    /// Projectiles per volley.
    ProjectilesPerShot,
    /// Bolt splash radius multiplier.
    ExplosionRadius,
    /// Maximum health.
    MaxHealth,
    /// Immediate healing.
    Heal,
    /// Extra sword or spear instances.
    WeaponCount,
}

/// How a modifier combines with the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierOp {
    /// `value * amount`
    Multiply,
    /// `value + amount`
    Add,
}

/// One stat change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    /// Stat to change.
    pub target: StatTarget,
    /// Combination rule.
    pub op: ModifierOp,
    /// Factor or addend.
    pub amount: f32,
}

impl StatModifier {
    /// `target * amount`.
    #[must_use]
    pub const fn multiply(target: StatTarget, amount: f32) -> Self {
        Self {
            target,
            op: ModifierOp::Multiply,
            amount,
        }
    }

    /// `target + amount`.
    #[must_use]
    pub const fn add(target: StatTarget, amount: f32) -> Self {
        Self {
            target,
            op: ModifierOp::Add,
            amount,
        }
    }

    /// Applies the modifier to a value.
    #[must_use]
    pub fn apply_to(&self, value: f32) -> f32 {
        match self.op {
            ModifierOp::Multiply => value * self.amount,
            ModifierOp::Add => value + self.amount,
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// One selectable powerup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupDef {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Classes that may be offered this; empty means every class.
    #[serde(default)]
    pub classes: Vec<PlayerClass>,
    /// Stat changes applied when chosen.
    pub modifiers: Vec<StatModifier>,
}

impl PowerupDef {
    /// Create a universal powerup.
    #[must_use]
    pub fn new(id: &str, name: &str, description: &str, modifiers: Vec<StatModifier>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            classes: Vec::new(),
            modifiers,
        }
    }

    /// Restrict to the given classes.
    #[must_use]
    pub fn for_classes(mut self, classes: &[PlayerClass]) -> Self {
        self.classes = classes.to_vec();
        self
    }

    /// Whether every class may be offered this.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.classes.is_empty()
    }

    /// Whether `class` may be offered this.
    #[must_use]
    pub fn applies_to(&self, class: PlayerClass) -> bool {
        self.is_universal() || self.classes.contains(&class)
    }
}

/// The full set of powerups a run can offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupCatalog {
    entries: Vec<PowerupDef>,
}

impl Default for PowerupCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PowerupCatalog {
    /// Validates and wraps a list of definitions.
    pub fn from_entries(entries: Vec<PowerupDef>) -> CatalogResult<Self> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = AHashSet::new();
        for def in &entries {
            if !seen.insert(def.id.as_str()) {
                return Err(CatalogError::DuplicateId(def.id.clone()));
            }
            for m in &def.modifiers {
                if m.op == ModifierOp::Multiply && !(m.amount.is_finite() && m.amount > 0.0) {
                    return Err(CatalogError::NonPositiveFactor {
                        id: def.id.clone(),
                        target: m.target,
                        amount: m.amount,
                    });
                }
            }
        }
        Ok(Self { entries })
    }

    /// The standard catalog.
    #[must_use]
    pub fn builtin() -> Self {
        use PlayerClass::{FallenKnight, Rogue, Warrior, Wizard};
        use StatTarget as T;

        let entries = vec![
            PowerupDef::new(
                "player_speed",
                "Swift Boots",
                "Movement speed +50%",
                vec![StatModifier::multiply(T::Speed, 1.5)],
            ),
            PowerupDef::new(
                "damage_bonus",
                "Sharpened Edge",
                "Damage +30%",
                vec![
                    StatModifier::multiply(T::Damage, 1.3),
                    StatModifier::multiply(T::RangedDamage, 1.3),
                ],
            ),
            PowerupDef::new(
                "damage_reduction",
                "Iron Skin",
                "Damage taken -20%",
                vec![StatModifier::multiply(T::DamageTaken, 0.8)],
            ),
            PowerupDef::new(
                "hp_up",
                "Vitality",
                "Max health +50 and heal 30",
                vec![
                    StatModifier::add(T::MaxHealth, 50.0),
                    StatModifier::add(T::Heal, 30.0),
                ],
            ),
            PowerupDef::new(
                "sword_size",
                "Greatblade",
                "Sword size +20%",
                vec![StatModifier::multiply(T::Size, 1.2)],
            )
            .for_classes(&[Warrior]),
            PowerupDef::new(
                "sword_spin",
                "Whirlwind",
                "Sword rotation +30%",
                vec![StatModifier::multiply(T::RotationSpeed, 1.3)],
            )
            .for_classes(&[Warrior]),
            PowerupDef::new(
                "sword_count",
                "Twin Blades",
                "One more sword",
                vec![StatModifier::add(T::WeaponCount, 1.0)],
            )
            .for_classes(&[Warrior]),
            PowerupDef::new(
                "spear_count",
                "Phalanx",
                "One more spear",
                vec![StatModifier::add(T::WeaponCount, 1.0)],
            )
            .for_classes(&[FallenKnight]),
            PowerupDef::new(
                "spear_size",
                "Long Haft",
                "Spear size +20%",
                vec![StatModifier::multiply(T::Size, 1.2)],
            )
            .for_classes(&[FallenKnight]),
            PowerupDef::new(
                "spear_speed",
                "Quick Thrust",
                "Spear speed +30%",
                vec![StatModifier::multiply(T::RotationSpeed, 1.3)],
            )
            .for_classes(&[FallenKnight]),
            PowerupDef::new(
                "multi_shot",
                "Multi Shot",
                "One more projectile per volley",
                vec![StatModifier::add(T::ProjectilesPerShot, 1.0)],
            )
            .for_classes(&[Wizard, Rogue]),
            PowerupDef::new(
                "attack_speed",
                "Haste",
                "Attack speed +30%",
                vec![StatModifier::multiply(T::RotationSpeed, 1.3)],
            )
            .for_classes(&[Wizard, Rogue]),
            PowerupDef::new(
                "size_bonus",
                "Heavy Arrows",
                "Arrow size +20%",
                vec![StatModifier::multiply(T::Size, 1.2)],
            )
            .for_classes(&[Rogue]),
            PowerupDef::new(
                "explosion_size",
                "Volatile Bolts",
                "Explosion size +80%",
                vec![StatModifier::multiply(T::ExplosionRadius, 1.8)],
            )
            .for_classes(&[Wizard]),
            PowerupDef::new(
                "projectile_speed",
                "Tailwind",
                "Projectile speed +25%",
                vec![StatModifier::multiply(T::ProjectileSpeed, 1.25)],
            )
            .for_classes(&[Wizard, Rogue]),
            PowerupDef::new(
                "long_range",
                "Far Sight",
                "Range +25%",
                vec![StatModifier::multiply(T::ProjectileRange, 1.25)],
            )
            .for_classes(&[Wizard, Rogue]),
        ];
        Self { entries }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PowerupDef> {
        self.entries.iter().find(|d| d.id == id)
    }

    /// Every entry.
    pub fn iter(&self) -> impl Iterator<Item = &PowerupDef> {
        self.entries.iter()
    }

    /// Entries `class` may be offered.
    #[must_use]
    pub fn pool_for(&self, class: PlayerClass) -> Vec<&PowerupDef> {
        self.entries.iter().filter(|d| d.applies_to(class)).collect()
    }

    /// Up to `count` distinct entries drawn at random from the class pool.
    #[must_use]
    pub fn offer(&self, class: PlayerClass, count: usize, rng: &mut fastrand::Rng) -> Vec<PowerupDef> {
        let mut pool = self.pool_for(class);
        rng.shuffle(&mut pool);
        pool.into_iter().take(count).cloned().collect()
    }
}

// ============================================================================
// Map Pickups
// ============================================================================

/// A powerup lying on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupPickup {
    id: EntityId,
    position: Vec2,
    rotation: f32,
    alive: bool,
}

impl PowerupPickup {
    /// Place a pickup.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            id: EntityId::new(),
            position,
            rotation: 0.0,
            alive: true,
        }
    }

    /// Entity ID.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Position on the map.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Visual rotation.
    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Whether still on the map.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Spins the pickup. Rotation has no gameplay effect.
    pub fn update(&mut self, spin_speed: f32, frame_scale: f32) {
        self.rotation = (self.rotation + spin_speed * frame_scale).rem_euclid(std::f32::consts::TAU);
    }

    /// Whether the player at `player` with `player_radius` touches it.
    #[must_use]
    pub fn touches(&self, player: Vec2, player_radius: f32, pickup_radius: f32) -> bool {
        self.alive && self.position.distance(player) < player_radius + pickup_radius
    }

    /// Removes the pickup.
    pub fn collect(&mut self) {
        self.alive = false;
    }
}
