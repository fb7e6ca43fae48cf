//! Auto-aim ranged emitters.
//!
//! This module provides:
//! - Target selection among living enemies within range
//! - Mage volleys split across the nearest targets, staggered in time
//! - Ranger cones of piercing arrows around the nearest target
//!
//! The volley interval shrinks with the player's rotation-speed multiplier.

use glam::Vec2;
use lastrealm_common::{angle_of, direction_to, from_angle, EntityId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EmitterConfig;
use crate::player::Multipliers;
use crate::projectile::{Projectile, ProjectileKind};

/// Emitter variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmitterKind {
    /// Bolts split across the nearest targets.
    Mage,
    /// Cone of piercing arrows.
    Ranger,
}

/// A living enemy as seen by targeting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    /// Enemy ID.
    pub id: EntityId,
    /// Enemy position.
    pub position: Vec2,
}

/// Where a volley comes from and which multipliers shape it.
#[derive(Debug, Clone, Copy)]
pub struct ShotContext<'a> {
    /// Spawn point of the projectiles.
    pub origin: Vec2,
    /// Player multipliers at fire time.
    pub multipliers: &'a Multipliers,
}

/// A shot waiting for its stagger delay.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingShot {
    delay: f32,
    target: EntityId,
    /// Aim used if the target is gone when the shot fires.
    fallback: Vec2,
}

/// Auto-aiming projectile emitter owned by a ranged player class.
#[derive(Debug, Clone)]
pub struct RangedEmitter {
    kind: EmitterKind,
    config: EmitterConfig,
    cooldown_left: f32,
    pending: Vec<PendingShot>,
}

impl RangedEmitter {
    /// Create a ready-to-fire emitter.
    #[must_use]
    pub fn new(kind: EmitterKind, config: EmitterConfig) -> Self {
        Self {
            kind,
            config,
            cooldown_left: 0.0,
            pending: Vec::new(),
        }
    }

    /// Emitter variant.
    #[must_use]
    pub fn kind(&self) -> EmitterKind {
        self.kind
    }

    /// Seconds until the next volley may fire.
    #[must_use]
    pub fn cooldown_left(&self) -> f32 {
        self.cooldown_left
    }

    /// Staggered shots not yet fired.
    #[must_use]
    pub fn pending_shots(&self) -> usize {
        self.pending.len()
    }

    /// Volley interval after the rotation-speed multiplier.
    #[must_use]
    pub fn effective_cooldown(&self, multipliers: &Multipliers) -> f32 {
        self.config.cooldown / multipliers.rotation_speed
    }

    /// Targeting range after the range multiplier.
    #[must_use]
    pub fn effective_range(&self, multipliers: &Multipliers) -> f32 {
        self.config.range * multipliers.projectile_range
    }

    /// Advances timers and returns the projectiles fired this tick.
    pub fn update(&mut self, dt: f32, ctx: &ShotContext<'_>, targets: &[TargetInfo]) -> Vec<Projectile> {
        let mut fired = self.release_pending(dt, ctx, targets);

        self.cooldown_left = (self.cooldown_left - dt).max(0.0);
        if self.cooldown_left > 0.0 {
            return fired;
        }

        let in_range = self.targets_in_range(ctx, targets);
        if in_range.is_empty() {
            return fired;
        }

        match self.kind {
            EmitterKind::Mage => self.fire_mage(ctx, &in_range, &mut fired),
            EmitterKind::Ranger => self.fire_ranger(ctx, in_range[0].position, &mut fired),
        }
        self.cooldown_left = self.effective_cooldown(ctx.multipliers);
        fired
    }

    /// Living targets within range, nearest first.
    fn targets_in_range(&self, ctx: &ShotContext<'_>, targets: &[TargetInfo]) -> Vec<TargetInfo> {
        let range = self.effective_range(ctx.multipliers);
        let range_sq = range * range;
        let mut in_range: Vec<TargetInfo> = targets
            .iter()
            .filter(|t| t.position.distance_squared(ctx.origin) <= range_sq)
            .copied()
            .collect();
        in_range.sort_by(|a, b| {
            a.position
                .distance_squared(ctx.origin)
                .total_cmp(&b.position.distance_squared(ctx.origin))
        });
        in_range
    }

    fn release_pending(&mut self, dt: f32, ctx: &ShotContext<'_>, targets: &[TargetInfo]) -> Vec<Projectile> {
        let mut fired = Vec::new();
        if self.pending.is_empty() {
            return fired;
        }
        for shot in &mut self.pending {
            shot.delay -= dt;
        }
        let (ready, waiting): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|s| s.delay <= 0.0);
        self.pending = waiting;

        for shot in ready {
            let direction = targets
                .iter()
                .find(|t| t.id == shot.target)
                .map(|t| direction_to(ctx.origin, t.position))
                .filter(|d| *d != Vec2::ZERO)
                .unwrap_or(shot.fallback);
            fired.push(self.spawn(ctx, direction));
        }
        fired
    }

    /// One bolt per distinct target among the nearest; leftover shots go to
    /// the nearest. Every shot after the first waits one more stagger step.
    fn fire_mage(&mut self, ctx: &ShotContext<'_>, in_range: &[TargetInfo], fired: &mut Vec<Projectile>) {
        let shots = ctx.multipliers.projectiles_per_shot.max(1) as usize;
        let nearest = in_range[0];
        for shot in 0..shots {
            let target = in_range.get(shot).copied().unwrap_or(nearest);
            let direction = direction_to(ctx.origin, target.position);
            let direction = if direction == Vec2::ZERO { Vec2::X } else { direction };
            let delay = self.config.stagger * shot as f32;
            if delay <= 0.0 {
                fired.push(self.spawn(ctx, direction));
            } else {
                self.pending.push(PendingShot {
                    delay,
                    target: target.id,
                    fallback: direction,
                });
            }
        }
        debug!("Mage volley: {shots} shots at {} targets", in_range.len().min(shots));
    }

    /// A cone of arrows centered on the nearest target.
    fn fire_ranger(&self, ctx: &ShotContext<'_>, target: Vec2, fired: &mut Vec<Projectile>) {
        let shots = ctx.multipliers.projectiles_per_shot.max(1);
        let to_target = target - ctx.origin;
        let base = if to_target.length_squared() > f32::EPSILON {
            angle_of(to_target)
        } else {
            0.0
        };
        let center = (shots - 1) as f32 * 0.5;
        for i in 0..shots {
            let angle = base + (i as f32 - center) * self.config.spread;
            fired.push(self.spawn(ctx, from_angle(angle)));
        }
    }

    fn spawn(&self, ctx: &ShotContext<'_>, direction: Vec2) -> Projectile {
        let m = ctx.multipliers;
        let velocity = direction * self.config.projectile_speed * m.projectile_speed;
        let radius = self.config.projectile_radius * m.size;
        let damage = self.config.damage * m.ranged_damage;
        match self.kind {
            EmitterKind::Mage => Projectile::new(ProjectileKind::Bolt, ctx.origin, velocity, radius, damage)
                .with_lifetime(self.config.lifetime * m.projectile_range)
                .with_splash(
                    self.config.splash_radius * m.explosion_radius,
                    self.config.splash_fraction,
                ),
            EmitterKind::Ranger => Projectile::new(ProjectileKind::Arrow, ctx.origin, velocity, radius, damage)
                .with_max_travel(self.config.max_travel * m.projectile_range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn target(x: f32, y: f32) -> TargetInfo {
        TargetInfo {
            id: EntityId::new(),
            position: Vec2::new(x, y),
        }
    }

    #[test]
    fn test_no_target_keeps_emitter_ready() {
        let multipliers = Multipliers::default();
        let ctx = ShotContext {
            origin: Vec2::ZERO,
            multipliers: &multipliers,
        };
        let mut emitter = RangedEmitter::new(EmitterKind::Mage, EmitterConfig::mage());
        assert!(emitter.update(DT, &ctx, &[]).is_empty());
        // Out of range.
        assert!(emitter.update(DT, &ctx, &[target(1000.0, 0.0)]).is_empty());
        assert_eq!(emitter.cooldown_left(), 0.0);

        let shots = emitter.update(DT, &ctx, &[target(100.0, 0.0)]);
        assert_eq!(shots.len(), 1);
        assert!(emitter.cooldown_left() > 0.0);
    }

    #[test]
    fn test_rotation_multiplier_shortens_cooldown() {
        let mut multipliers = Multipliers::default();
        let emitter = RangedEmitter::new(EmitterKind::Ranger, EmitterConfig::ranger());
        let base = emitter.effective_cooldown(&multipliers);
        multipliers.rotation_speed = 2.0;
        assert!((emitter.effective_cooldown(&multipliers) - base / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_mage_splits_across_targets_and_staggers() {
        let mut multipliers = Multipliers::default();
        multipliers.projectiles_per_shot = 3;
        let ctx = ShotContext {
            origin: Vec2::ZERO,
            multipliers: &multipliers,
        };
        let near = target(50.0, 0.0);
        let far = target(0.0, 120.0);
        let mut emitter = RangedEmitter::new(EmitterKind::Mage, EmitterConfig::mage());

        let first = emitter.update(DT, &ctx, &[far, near]);
        assert_eq!(first.len(), 1);
        // First shot goes to the nearest target.
        assert!(first[0].velocity().x > 0.0);
        assert_eq!(emitter.pending_shots(), 2);

        let mut later = Vec::new();
        for _ in 0..10 {
            later.extend(emitter.update(DT, &ctx, &[far, near]));
            if emitter.pending_shots() == 0 {
                break;
            }
        }
        assert_eq!(later.len(), 2);
        // Second shot at the second target, third (leftover) back at the nearest.
        assert!(later[0].velocity().y > 0.0);
        assert!(later[1].velocity().x > 0.0);
    }

    #[test]
    fn test_ranger_cone() {
        let mut multipliers = Multipliers::default();
        multipliers.projectiles_per_shot = 3;
        multipliers.projectile_range = 2.0;
        let ctx = ShotContext {
            origin: Vec2::ZERO,
            multipliers: &multipliers,
        };
        let mut emitter = RangedEmitter::new(EmitterKind::Ranger, EmitterConfig::ranger());
        let arrows = emitter.update(DT, &ctx, &[target(100.0, 0.0)]);
        assert_eq!(arrows.len(), 3);
        assert!(arrows.iter().all(|a| a.kind() == ProjectileKind::Arrow));

        let angles: Vec<f32> = arrows.iter().map(|a| angle_of(a.velocity())).collect();
        assert!((angles[0] + 0.2).abs() < 1e-4);
        assert!(angles[1].abs() < 1e-4);
        assert!((angles[2] - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_ranged_damage_multiplier_is_baked_in() {
        let mut multipliers = Multipliers::default();
        multipliers.ranged_damage = 2.5;
        multipliers.damage = 10.0;
        let ctx = ShotContext {
            origin: Vec2::ZERO,
            multipliers: &multipliers,
        };
        let mut emitter = RangedEmitter::new(EmitterKind::Ranger, EmitterConfig::ranger());
        let arrows = emitter.update(DT, &ctx, &[target(0.0, 50.0)]);
        assert!((arrows[0].damage() - 2.5).abs() < 1e-6);
    }
}
