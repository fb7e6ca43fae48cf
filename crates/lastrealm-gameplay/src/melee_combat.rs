//! Melee weapons.
//!
//! This module provides:
//! - Base stats for the starting melee weapon and the source they come from
//! - The orbiting sword ring (rotated rectangular hit zones)
//! - The thrusting spear fan (circular hit zones beyond the tip)
//!
//! Weapons only move their hit zones. Whether a zone actually damages an
//! enemy is decided by the enemy's own damage cooldown in the resolver.

use std::f32::consts::TAU;

use glam::Vec2;
use lastrealm_common::{
    angle_of, circles_overlap, from_angle, rotated_rect_hits_circle, LastRealmResult,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::SpearConfig;

// ============================================================================
// Base Stats
// ============================================================================

/// Melee weapon families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeleeKind {
    /// Orbiting blade.
    Sword,
    /// Thrusting spear.
    Spear,
}

impl MeleeKind {
    /// Identifier used by stat sources.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sword => "sword",
            Self::Spear => "spear",
        }
    }
}

/// Base stats of a melee weapon before player multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponBaseStats {
    /// Damage per hit.
    pub damage: f32,
    /// Blade width, across the orbit.
    pub hitbox_width: f32,
    /// Blade length, along the orbit radius.
    pub hitbox_height: f32,
    /// Orbit speed in radians per reference tick.
    pub rotation_speed: f32,
    /// Orbit radius.
    pub radius: f32,
}

impl Default for WeaponBaseStats {
    fn default() -> Self {
        Self {
            damage: 1.0,
            hitbox_width: 50.0,
            hitbox_height: 160.0,
            rotation_speed: 0.005,
            radius: 120.0,
        }
    }
}

impl WeaponBaseStats {
    /// Whether every stat is usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let finite = [
            self.damage,
            self.hitbox_width,
            self.hitbox_height,
            self.rotation_speed,
            self.radius,
        ]
        .iter()
        .all(|v| v.is_finite());
        finite
            && self.damage >= 0.0
            && self.hitbox_width > 0.0
            && self.hitbox_height > 0.0
            && self.radius >= 0.0
    }
}

/// Supplies base stats for the starting melee weapon.
pub trait WeaponStatSource {
    /// Look up base stats for a weapon family.
    fn base_stats(&self, kind: MeleeKind) -> LastRealmResult<WeaponBaseStats>;
}

/// Stat source that always returns the built-in defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinWeaponStats;

impl WeaponStatSource for BuiltinWeaponStats {
    fn base_stats(&self, _kind: MeleeKind) -> LastRealmResult<WeaponBaseStats> {
        Ok(WeaponBaseStats::default())
    }
}

/// Fetch stats from a source, falling back to defaults when the source
/// fails or returns unusable values. Never blocks a run from starting.
pub fn resolve_base_stats(source: &dyn WeaponStatSource, kind: MeleeKind) -> WeaponBaseStats {
    match source.base_stats(kind) {
        Ok(stats) if stats.is_valid() => stats,
        Ok(stats) => {
            warn!("Invalid {} stats {:?}, using defaults", kind.name(), stats);
            WeaponBaseStats::default()
        },
        Err(e) => {
            warn!("Weapon stats for {} unavailable: {e}", kind.name());
            WeaponBaseStats::default()
        },
    }
}

// ============================================================================
// Hit Zones
// ============================================================================

/// Area a melee weapon can damage this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MeleeZone {
    /// Rotated rectangle; `half_extents.x` runs along `angle`.
    Blade {
        /// Rectangle center.
        center: Vec2,
        /// Rotation in radians.
        angle: f32,
        /// Half length and half width.
        half_extents: Vec2,
    },
    /// Circle.
    Tip {
        /// Circle center.
        center: Vec2,
        /// Circle radius.
        radius: f32,
    },
}

impl MeleeZone {
    /// Whether a circular target overlaps the zone.
    #[must_use]
    pub fn hits(&self, point: Vec2, radius: f32) -> bool {
        match *self {
            Self::Blade {
                center,
                angle,
                half_extents,
            } => rotated_rect_hits_circle(center, angle, half_extents, point, radius),
            Self::Tip {
                center,
                radius: zone_radius,
            } => circles_overlap(center, zone_radius, point, radius),
        }
    }
}

// ============================================================================
// Sword Ring
// ============================================================================

/// One or more swords orbiting the player, evenly spaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwordRing {
    stats: WeaponBaseStats,
    angle: f32,
    count: u32,
}

impl SwordRing {
    /// A single sword at angle 0.
    #[must_use]
    pub fn new(stats: WeaponBaseStats) -> Self {
        Self {
            stats,
            angle: 0.0,
            count: 1,
        }
    }

    /// Base stats of the blades.
    #[must_use]
    pub fn stats(&self) -> &WeaponBaseStats {
        &self.stats
    }

    /// Number of blades.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Angle of the first blade.
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Adds one blade; spacing is recomputed from the count.
    pub fn add_blade(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    /// Advances the orbit.
    pub fn update(&mut self, rotation_multiplier: f32, frame_scale: f32) {
        self.angle += self.stats.rotation_speed * rotation_multiplier * frame_scale;
        self.angle = self.angle.rem_euclid(TAU);
    }

    /// Angle of every blade.
    pub fn blade_angles(&self) -> impl Iterator<Item = f32> + '_ {
        let step = TAU / self.count.max(1) as f32;
        (0..self.count).map(move |i| self.angle + step * i as f32)
    }

    /// World position of every blade.
    #[must_use]
    pub fn blade_positions(&self, owner: Vec2) -> Vec<Vec2> {
        self.blade_angles()
            .map(|a| owner + from_angle(a) * self.stats.radius)
            .collect()
    }

    /// Hit zones of every blade.
    #[must_use]
    pub fn zones(&self, owner: Vec2, size_multiplier: f32) -> Vec<MeleeZone> {
        let half_extents = Vec2::new(
            self.stats.hitbox_height * 0.5 * size_multiplier,
            self.stats.hitbox_width * 0.5 * size_multiplier,
        );
        self.blade_angles()
            .map(|angle| MeleeZone::Blade {
                center: owner + from_angle(angle) * self.stats.radius,
                angle,
                half_extents,
            })
            .collect()
    }

    /// Damage per hit.
    #[must_use]
    pub fn damage(&self, damage_multiplier: f32) -> f32 {
        self.stats.damage * damage_multiplier
    }
}

// ============================================================================
// Spear Fan
// ============================================================================

/// One or more spears thrusting at the nearest enemy, fanned around the aim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpearSet {
    stats: WeaponBaseStats,
    config: SpearConfig,
    count: u32,
    phase: f32,
    aim: f32,
}

impl SpearSet {
    /// A single spear aimed up.
    #[must_use]
    pub fn new(stats: WeaponBaseStats, config: SpearConfig) -> Self {
        Self {
            stats,
            config,
            count: 1,
            phase: 0.0,
            aim: -std::f32::consts::FRAC_PI_2,
        }
    }

    /// Number of spears.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Current aim angle of the center spear.
    #[must_use]
    pub fn aim(&self) -> f32 {
        self.aim
    }

    /// Adds one spear to the fan.
    pub fn add_spear(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    /// Re-aims at `target` (keeping the previous aim when there is none) and
    /// advances the thrust phase.
    pub fn update(&mut self, owner: Vec2, target: Option<Vec2>, rotation_multiplier: f32, dt: f32) {
        if let Some(target) = target {
            let to_target = target - owner;
            if to_target.length_squared() > f32::EPSILON {
                self.aim = angle_of(to_target);
            }
        }
        let rate = TAU / self.config.thrust_period;
        self.phase = (self.phase + rate * rotation_multiplier * dt).rem_euclid(TAU);
    }

    /// Current tip distance from the player.
    #[must_use]
    pub fn thrust_distance(&self) -> f32 {
        self.config.base_distance + self.config.thrust_amplitude * (1.0 + self.phase.sin()) * 0.5
    }

    /// Aim angle of every spear.
    pub fn spear_angles(&self) -> impl Iterator<Item = f32> + '_ {
        let center = (self.count.max(1) - 1) as f32 * 0.5;
        (0..self.count).map(move |i| self.aim + (i as f32 - center) * self.config.fan_spread)
    }

    /// Tip position of every spear.
    #[must_use]
    pub fn tip_positions(&self, owner: Vec2) -> Vec<Vec2> {
        let distance = self.thrust_distance();
        self.spear_angles()
            .map(|a| owner + from_angle(a) * distance)
            .collect()
    }

    /// Hit circles just beyond every tip.
    #[must_use]
    pub fn zones(&self, owner: Vec2, size_multiplier: f32) -> Vec<MeleeZone> {
        let radius = self.config.tip_radius * size_multiplier;
        let reach = self.thrust_distance() + radius;
        self.spear_angles()
            .map(|a| MeleeZone::Tip {
                center: owner + from_angle(a) * reach,
                radius,
            })
            .collect()
    }

    /// Damage per hit.
    #[must_use]
    pub fn damage(&self, damage_multiplier: f32) -> f32 {
        self.stats.damage * damage_multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lastrealm_common::LastRealmError;
    use std::f32::consts::FRAC_PI_2;

    struct FailingSource;

    impl WeaponStatSource for FailingSource {
        fn base_stats(&self, _kind: MeleeKind) -> LastRealmResult<WeaponBaseStats> {
            Err(LastRealmError::External("offline".to_string()))
        }
    }

    struct BrokenSource;

    impl WeaponStatSource for BrokenSource {
        fn base_stats(&self, _kind: MeleeKind) -> LastRealmResult<WeaponBaseStats> {
            Ok(WeaponBaseStats {
                hitbox_width: f32::NAN,
                ..WeaponBaseStats::default()
            })
        }
    }

    #[test]
    fn test_stat_source_fallback() {
        let defaults = WeaponBaseStats::default();
        assert_eq!(resolve_base_stats(&FailingSource, MeleeKind::Sword), defaults);
        assert_eq!(resolve_base_stats(&BrokenSource, MeleeKind::Sword), defaults);
        assert_eq!(resolve_base_stats(&BuiltinWeaponStats, MeleeKind::Spear), defaults);
    }

    #[test]
    fn test_sword_orbit() {
        let mut ring = SwordRing::new(WeaponBaseStats::default());
        ring.update(2.0, 1.0);
        assert!((ring.angle() - 0.01).abs() < 1e-6);

        let owner = Vec2::new(500.0, 500.0);
        let positions = ring.blade_positions(owner);
        assert_eq!(positions.len(), 1);
        assert!((positions[0].distance(owner) - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_sword_zone_is_radial() {
        let ring = SwordRing::new(WeaponBaseStats::default());
        let zones = ring.zones(Vec2::ZERO, 1.0);
        // Blade at angle 0 spans x in [40, 200] and y in [-25, 25].
        assert!(zones[0].hits(Vec2::new(195.0, 0.0), 0.0));
        assert!(zones[0].hits(Vec2::new(45.0, 20.0), 0.0));
        assert!(!zones[0].hits(Vec2::new(120.0, 40.0), 0.0));
        assert!(!zones[0].hits(Vec2::new(20.0, 0.0), 0.0));
        // Bigger blades reach further.
        let big = ring.zones(Vec2::ZERO, 1.5);
        assert!(big[0].hits(Vec2::new(120.0, 35.0), 0.0));
    }

    #[test]
    fn test_extra_blades_are_evenly_spaced() {
        let mut ring = SwordRing::new(WeaponBaseStats::default());
        ring.add_blade();
        let angles: Vec<f32> = ring.blade_angles().collect();
        assert_eq!(angles.len(), 2);
        assert!((angles[1] - angles[0] - std::f32::consts::PI).abs() < 1e-5);
        let zones = ring.zones(Vec2::ZERO, 1.0);
        assert!(zones[1].hits(Vec2::new(-120.0, 0.0), 0.0));
    }

    #[test]
    fn test_spear_aims_at_target_and_keeps_aim() {
        let mut spears = SpearSet::new(WeaponBaseStats::default(), SpearConfig::default());
        let owner = Vec2::ZERO;
        spears.update(owner, Some(Vec2::new(0.0, 100.0)), 1.0, 0.0);
        assert!((spears.aim() - FRAC_PI_2).abs() < 1e-5);

        spears.update(owner, None, 1.0, 0.1);
        assert!((spears.aim() - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_spear_thrust_range() {
        let mut spears = SpearSet::new(WeaponBaseStats::default(), SpearConfig::default());
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..120 {
            spears.update(Vec2::ZERO, None, 1.0, 1.0 / 60.0);
            min = min.min(spears.thrust_distance());
            max = max.max(spears.thrust_distance());
        }
        assert!(min >= 80.0 - 1e-3);
        assert!(max <= 140.0 + 1e-3);
        assert!(max - min > 50.0);
    }

    #[test]
    fn test_spear_zone_beyond_tip() {
        let mut spears = SpearSet::new(WeaponBaseStats::default(), SpearConfig::default());
        spears.update(Vec2::ZERO, Some(Vec2::new(100.0, 0.0)), 1.0, 0.0);
        let distance = spears.thrust_distance();
        let zones = spears.zones(Vec2::ZERO, 1.0);
        assert!(zones[0].hits(Vec2::new(distance + 30.0, 0.0), 0.0));
        assert!(!zones[0].hits(Vec2::new(distance - 40.0, 0.0), 0.0));
    }

    #[test]
    fn test_spear_fan() {
        let mut spears = SpearSet::new(WeaponBaseStats::default(), SpearConfig::default());
        spears.add_spear();
        spears.add_spear();
        spears.update(Vec2::ZERO, Some(Vec2::new(100.0, 0.0)), 1.0, 0.0);
        let angles: Vec<f32> = spears.spear_angles().collect();
        assert_eq!(angles.len(), 3);
        assert!((angles[0] + 0.35).abs() < 1e-5);
        assert!(angles[1].abs() < 1e-5);
        assert!((angles[2] - 0.35).abs() < 1e-5);
    }
}
