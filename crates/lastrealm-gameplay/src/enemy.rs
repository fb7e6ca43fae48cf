//! Enemies.
//!
//! One `Enemy` type covers normal monsters, epic kiters and bosses. The kind
//! tag picks the stat template and the [`Behavior`] state the AI drives.

use glam::Vec2;
use lastrealm_common::{is_finite, EntityId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai::LaserAttack;
use crate::config::{EnemyRoster, EnemyTemplate};

/// Enemy variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Chases the player.
    Normal,
    /// Keeps its distance and throws fireballs.
    Epic,
    /// Chases the player and fires telegraphed lasers.
    Boss,
}

impl EnemyKind {
    /// Stat template for this kind.
    #[must_use]
    pub fn template(self, roster: &EnemyRoster) -> &EnemyTemplate {
        match self {
            Self::Normal => &roster.normal,
            Self::Epic => &roster.epic,
            Self::Boss => &roster.boss,
        }
    }

    /// Short name for logs and events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Normal => "monster",
            Self::Epic => "epic",
            Self::Boss => "boss",
        }
    }
}

/// Where damage on an enemy came from. Only melee is gated by the enemy's
/// damage cooldown; projectiles are single-use or track their own targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageSource {
    /// Sword or spear zone.
    Melee,
    /// Bolt or arrow.
    Projectile,
    /// Bolt splash.
    Splash,
}

/// Result of [`Enemy::apply_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Dead already, or inside the melee cooldown.
    Ignored,
    /// Damage applied, enemy alive.
    Damaged,
    /// This hit killed the enemy. Returned at most once per enemy.
    Killed,
}

/// Per-kind AI state.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// No extra state.
    Chaser,
    /// Epic monster fireball timer.
    Kiter {
        /// Seconds until the next fireball may fire.
        fire_cooldown: f32,
    },
    /// Boss laser timer and the attack in progress.
    Boss {
        /// Seconds until the next laser telegraph.
        laser_cooldown: f32,
        /// Laser currently telegraphing or firing.
        laser: Option<LaserAttack>,
    },
}

/// A live enemy.
#[derive(Debug, Clone)]
pub struct Enemy {
    id: EntityId,
    kind: EnemyKind,
    position: Vec2,
    speed: f32,
    radius: f32,
    separation: f32,
    health: f32,
    max_health: f32,
    contact_damage: f32,
    experience: u32,
    damage_cooldown: f32,
    last_damage_at: Option<f32>,
    alive: bool,
    designated_boss: bool,
    behavior: Behavior,
}

impl Enemy {
    /// Spawn an enemy from the roster with speed scaled by the current
    /// difficulty multiplier.
    #[must_use]
    pub fn spawn(kind: EnemyKind, position: Vec2, roster: &EnemyRoster, speed_multiplier: f32) -> Self {
        let template = kind.template(roster);
        let behavior = match kind {
            EnemyKind::Normal => Behavior::Chaser,
            EnemyKind::Epic => Behavior::Kiter {
                fire_cooldown: roster.kiter.fire_cooldown,
            },
            EnemyKind::Boss => Behavior::Boss {
                laser_cooldown: roster.laser.cooldown,
                laser: None,
            },
        };
        Self {
            id: EntityId::new(),
            kind,
            position,
            speed: template.speed * speed_multiplier,
            radius: template.radius,
            separation: template.separation,
            health: template.health,
            max_health: template.health,
            contact_damage: template.contact_damage,
            experience: template.experience,
            damage_cooldown: template.damage_cooldown,
            last_damage_at: None,
            alive: true,
            designated_boss: false,
            behavior,
        }
    }

    /// Marks this enemy as the boss whose death wins the run.
    #[must_use]
    pub fn designated(mut self) -> Self {
        self.designated_boss = true;
        self
    }

    /// Overrides health, e.g. for scripted scenarios.
    #[must_use]
    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self.max_health = self.max_health.max(health);
        self
    }

    /// Entity ID.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Variant tag.
    #[must_use]
    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the enemy.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Speed per reference tick.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Scales speed, used when a difficulty speed step fires.
    pub fn scale_speed(&mut self, factor: f32) {
        self.speed *= factor;
    }

    /// Collision radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Minimum distance kept from other enemies.
    #[must_use]
    pub fn separation(&self) -> f32 {
        self.separation
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Contact damage before the difficulty multiplier.
    #[must_use]
    pub fn contact_damage(&self) -> f32 {
        self.contact_damage
    }

    /// Experience granted on death.
    #[must_use]
    pub fn experience(&self) -> u32 {
        self.experience
    }

    /// Whether the enemy is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Whether this is the run's designated boss.
    #[must_use]
    pub fn is_designated_boss(&self) -> bool {
        self.designated_boss
    }

    /// AI state.
    #[must_use]
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Mutable AI state.
    pub fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    /// Laser in progress, for bosses.
    #[must_use]
    pub fn laser(&self) -> Option<&LaserAttack> {
        match &self.behavior {
            Behavior::Boss { laser, .. } => laser.as_ref(),
            Behavior::Chaser | Behavior::Kiter { .. } => None,
        }
    }

    /// Applies damage at simulation time `now`.
    ///
    /// Melee is ignored inside the damage cooldown since the last melee hit.
    /// Health reaching zero marks the enemy dead and returns `Killed` exactly
    /// once; any later call is `Ignored`.
    pub fn apply_damage(&mut self, amount: f32, source: DamageSource, now: f32) -> DamageOutcome {
        if !self.alive || !amount.is_finite() || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }
        if source == DamageSource::Melee {
            if let Some(last) = self.last_damage_at {
                if now - last < self.damage_cooldown {
                    return DamageOutcome::Ignored;
                }
            }
            self.last_damage_at = Some(now);
        }

        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            self.alive = false;
            debug!("{} {} killed", self.kind.name(), self.id);
            DamageOutcome::Killed
        } else {
            DamageOutcome::Damaged
        }
    }

    /// Removes an enemy whose state can no longer be simulated. Grants no
    /// kill credit. Returns true if the enemy was faulted.
    pub fn discard_if_faulted(&mut self) -> bool {
        if self.alive && !(is_finite(self.position) && self.health.is_finite()) {
            warn!("{} {} has invalid state, discarding", self.kind.name(), self.id);
            self.alive = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> EnemyRoster {
        EnemyRoster::default()
    }

    #[test]
    fn test_spawn_uses_template() {
        let roster = roster();
        let boss = Enemy::spawn(EnemyKind::Boss, Vec2::ZERO, &roster, 1.0).designated();
        assert_eq!(boss.health(), 300.0);
        assert_eq!(boss.radius(), 60.0);
        assert!(boss.is_designated_boss());
        assert!(matches!(boss.behavior(), Behavior::Boss { laser: None, .. }));

        let epic = Enemy::spawn(EnemyKind::Epic, Vec2::ZERO, &roster, 1.2);
        assert!((epic.speed() - 0.3).abs() < 1e-6);
        assert!(matches!(epic.behavior(), Behavior::Kiter { .. }));
    }

    #[test]
    fn test_melee_cooldown_is_per_enemy() {
        let mut enemy = Enemy::spawn(EnemyKind::Normal, Vec2::ZERO, &roster(), 1.0);
        assert_eq!(enemy.apply_damage(1.0, DamageSource::Melee, 1.0), DamageOutcome::Damaged);
        assert_eq!(enemy.apply_damage(1.0, DamageSource::Melee, 1.1), DamageOutcome::Ignored);
        // Projectiles bypass the melee cooldown.
        assert_eq!(
            enemy.apply_damage(1.0, DamageSource::Projectile, 1.1),
            DamageOutcome::Damaged
        );
        assert_eq!(enemy.apply_damage(1.0, DamageSource::Melee, 1.3), DamageOutcome::Killed);
    }

    #[test]
    fn test_killed_only_once() {
        let mut enemy = Enemy::spawn(EnemyKind::Normal, Vec2::ZERO, &roster(), 1.0).with_health(1.0);
        assert_eq!(enemy.apply_damage(10.0, DamageSource::Melee, 0.0), DamageOutcome::Killed);
        assert_eq!(
            enemy.apply_damage(5.0, DamageSource::Projectile, 0.0),
            DamageOutcome::Ignored
        );
        assert!(!enemy.is_alive());
        assert_eq!(enemy.health(), 0.0);
    }

    #[test]
    fn test_faulted_enemy_is_discarded() {
        let mut enemy = Enemy::spawn(EnemyKind::Normal, Vec2::ZERO, &roster(), 1.0);
        assert!(!enemy.discard_if_faulted());
        enemy.set_position(Vec2::new(f32::INFINITY, 0.0));
        assert!(enemy.discard_if_faulted());
        assert!(!enemy.is_alive());
        assert!(!enemy.discard_if_faulted());
    }
}
