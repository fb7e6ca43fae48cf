//! The player character.
//!
//! A single `Player` type covers every class; the class tag picks base speed
//! and the starting [`Loadout`]. Stats change only through the
//! [`Multipliers`] set, which powerups modify.

use glam::Vec2;
use lastrealm_common::{direction_to, is_finite, MapBounds};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{PlayerConfig, ProgressionConfig, SimConfig};
use crate::input::DirectionalInput;
use crate::melee_combat::{MeleeKind, MeleeZone, SpearSet, SwordRing, WeaponBaseStats};
use crate::powerup::{PowerupDef, StatModifier, StatTarget};
use crate::progression::ExperienceCurve;
use crate::projectile::Projectile;
use crate::ranged_combat::{EmitterKind, RangedEmitter, ShotContext, TargetInfo};

/// Lower bound for every multiplier.
const MIN_MULTIPLIER: f32 = 0.01;

// ============================================================================
// Class
// ============================================================================

/// Playable classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClass {
    /// Orbiting sword.
    Warrior,
    /// Mage bolts.
    Wizard,
    /// Ranger arrows.
    Rogue,
    /// Thrusting spear.
    FallenKnight,
}

impl PlayerClass {
    /// Every class, in menu order.
    pub const ALL: [Self; 4] = [Self::Warrior, Self::Wizard, Self::Rogue, Self::FallenKnight];

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Warrior => "Warrior",
            Self::Wizard => "Wizard",
            Self::Rogue => "Rogue",
            Self::FallenKnight => "Fallen Knight",
        }
    }

    /// Base movement speed from the class table.
    #[must_use]
    pub fn base_speed(&self, config: &PlayerConfig) -> f32 {
        let speeds = &config.class_speeds;
        match self {
            Self::Warrior => speeds.warrior,
            Self::Wizard => speeds.wizard,
            Self::Rogue => speeds.rogue,
            Self::FallenKnight => speeds.fallen_knight,
        }
    }

    /// Melee family whose base stats this class needs, if any.
    #[must_use]
    pub const fn melee_kind(&self) -> Option<MeleeKind> {
        match self {
            Self::Warrior => Some(MeleeKind::Sword),
            Self::FallenKnight => Some(MeleeKind::Spear),
            Self::Wizard | Self::Rogue => None,
        }
    }
}

// ============================================================================
// Multipliers
// ============================================================================

/// Every stat multiplier a powerup can touch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    /// Movement speed.
    pub speed: f32,
    /// Sword orbit, spear thrust and ranged fire rate.
    pub rotation_speed: f32,
    /// Melee hitbox and projectile size.
    pub size: f32,
    /// Melee damage.
    pub damage: f32,
    /// Ranged damage.
    pub ranged_damage: f32,
    /// Incoming damage.
    pub damage_taken: f32,
    /// Projectile speed.
    pub projectile_speed: f32,
    /// Targeting range and projectile reach.
    pub projectile_range: f32,
    /// Bolt splash radius.
    pub explosion_radius: f32,
    /// Projectiles per volley.
    pub projectiles_per_shot: u32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            speed: 1.0,
            rotation_speed: 1.0,
            size: 1.0,
            damage: 1.0,
            ranged_damage: 1.0,
            damage_taken: 1.0,
            projectile_speed: 1.0,
            projectile_range: 1.0,
            explosion_radius: 1.0,
            projectiles_per_shot: 1,
        }
    }
}

impl Multipliers {
    /// Mutable reference to a float multiplier, if `target` is one.
    fn factor_mut(&mut self, target: StatTarget) -> Option<&mut f32> {
        match target {
            StatTarget::Speed => Some(&mut self.speed),
            StatTarget::RotationSpeed => Some(&mut self.rotation_speed),
            StatTarget::Size => Some(&mut self.size),
            StatTarget::Damage => Some(&mut self.damage),
            StatTarget::RangedDamage => Some(&mut self.ranged_damage),
            StatTarget::DamageTaken => Some(&mut self.damage_taken),
            StatTarget::ProjectileSpeed => Some(&mut self.projectile_speed),
            StatTarget::ProjectileRange => Some(&mut self.projectile_range),
            StatTarget::ExplosionRadius => Some(&mut self.explosion_radius),
            StatTarget::ProjectilesPerShot
            | StatTarget::MaxHealth
            | StatTarget::Heal
            | StatTarget::WeaponCount => None,
        }
    }
}

// ============================================================================
// Loadout
// ============================================================================

/// The weapon a class fights with.
#[derive(Debug, Clone)]
pub enum Loadout {
    /// Warrior swords.
    Swords(SwordRing),
    /// Fallen knight spears.
    Spears(SpearSet),
    /// Wizard or rogue emitter.
    Emitter(RangedEmitter),
}

impl Loadout {
    /// Starting loadout for a class.
    #[must_use]
    pub fn for_class(class: PlayerClass, stats: WeaponBaseStats, config: &SimConfig) -> Self {
        match class {
            PlayerClass::Warrior => Self::Swords(SwordRing::new(stats)),
            PlayerClass::FallenKnight => Self::Spears(SpearSet::new(stats, config.weapons.spear.clone())),
            PlayerClass::Wizard => {
                Self::Emitter(RangedEmitter::new(EmitterKind::Mage, config.weapons.mage.clone()))
            },
            PlayerClass::Rogue => {
                Self::Emitter(RangedEmitter::new(EmitterKind::Ranger, config.weapons.ranger.clone()))
            },
        }
    }

    /// Adds one sword or spear. Emitters scale through projectiles per shot
    /// instead, so this is a no-op for them.
    pub fn add_instance(&mut self) {
        match self {
            Self::Swords(ring) => ring.add_blade(),
            Self::Spears(spears) => spears.add_spear(),
            Self::Emitter(_) => debug!("Weapon count has no effect on emitters"),
        }
    }
}

// ============================================================================
// Player
// ============================================================================

/// Outcome of a cooldown-gated hit on the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitResult {
    /// Inside the hit cooldown or already dead.
    Ignored,
    /// Damage applied, player alive.
    Damaged,
    /// Damage applied, player died.
    Killed,
}

/// The player character.
#[derive(Debug, Clone)]
pub struct Player {
    class: PlayerClass,
    position: Vec2,
    facing: Vec2,
    base_speed: f32,
    radius: f32,
    health: f32,
    max_health: f32,
    alive: bool,
    multipliers: Multipliers,
    knockback: Vec2,
    level: u32,
    experience: u32,
    experience_to_next: u32,
    curve: ExperienceCurve,
    last_hit_at: Option<f32>,
    loadout: Loadout,
    tuning: PlayerConfig,
    progression: ProgressionConfig,
}

impl Player {
    /// Create a level-1 player of `class` at `position`.
    #[must_use]
    pub fn new(class: PlayerClass, position: Vec2, config: &SimConfig, stats: WeaponBaseStats) -> Self {
        let tuning = config.player.clone();
        let curve = ExperienceCurve::from_config(&config.progression);
        Self {
            class,
            position,
            facing: Vec2::new(0.0, 1.0),
            base_speed: class.base_speed(&tuning),
            radius: tuning.radius,
            health: tuning.max_health,
            max_health: tuning.max_health,
            alive: true,
            multipliers: Multipliers::default(),
            knockback: Vec2::ZERO,
            level: 1,
            experience: 0,
            experience_to_next: curve.base_threshold(),
            curve,
            last_hit_at: None,
            loadout: Loadout::for_class(class, stats, config),
            tuning,
            progression: config.progression.clone(),
        }
    }

    /// Class tag.
    #[must_use]
    pub fn class(&self) -> PlayerClass {
        self.class
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Teleports the player, e.g. for scripted scenarios.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Last movement direction, normalized.
    #[must_use]
    pub fn facing(&self) -> Vec2 {
        self.facing
    }

    /// Collision radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
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

    /// Whether the player is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Current multipliers.
    #[must_use]
    pub fn multipliers(&self) -> &Multipliers {
        &self.multipliers
    }

    /// Current knockback velocity.
    #[must_use]
    pub fn knockback(&self) -> Vec2 {
        self.knockback
    }

    /// Overrides the knockback velocity.
    pub fn set_knockback(&mut self, knockback: Vec2) {
        self.knockback = knockback;
    }

    /// Current level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Experience toward the next level.
    #[must_use]
    pub fn experience(&self) -> u32 {
        self.experience
    }

    /// Experience needed for the next level.
    #[must_use]
    pub fn experience_to_next(&self) -> u32 {
        self.experience_to_next
    }

    /// Equipped weapon.
    #[must_use]
    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    // ------------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------------

    /// Moves along the held axes, applies and decays knockback, then clamps
    /// to the map minus the edge margin.
    ///
    /// Held axes are not normalized, so diagonals move faster.
    pub fn move_by(&mut self, input: &DirectionalInput, bounds: &MapBounds, frame_scale: f32) {
        let previous = self.position;
        let axis = input.axis();
        if axis != Vec2::ZERO {
            self.facing = axis.normalize();
        }

        self.position += axis * self.base_speed * self.multipliers.speed * frame_scale;
        self.position += self.knockback * frame_scale;
        self.decay_knockback(frame_scale);

        if !is_finite(self.position) {
            warn!("Player position became non-finite, restoring");
            self.position = previous;
            self.knockback = Vec2::ZERO;
        }
        self.position = bounds.clamp_with_margin(self.position, self.tuning.edge_margin);
    }

    fn decay_knockback(&mut self, frame_scale: f32) {
        let factor = self.tuning.knockback_decay.powf(frame_scale);
        let epsilon = self.tuning.knockback_epsilon;
        self.knockback *= factor;
        if self.knockback.x.abs() < epsilon {
            self.knockback.x = 0.0;
        }
        if self.knockback.y.abs() < epsilon {
            self.knockback.y = 0.0;
        }
    }

    // ------------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------------

    /// Applies damage scaled by the damage-taken multiplier and knocks the
    /// player away from `source`. Returns true when this hit killed the player.
    pub fn take_damage(&mut self, amount: f32, source: Vec2) -> bool {
        if !self.alive || !amount.is_finite() {
            return false;
        }
        let scaled = (amount * self.multipliers.damage_taken).max(0.0);
        self.health = (self.health - scaled).max(0.0);
        self.knockback = direction_to(source, self.position) * self.tuning.knockback_force;
        debug!("Player took {scaled:.1} damage, {:.1} left", self.health);

        if self.health <= 0.0 {
            self.alive = false;
            info!("Player died at level {}", self.level);
            return true;
        }
        false
    }

    /// Whether the hit cooldown has elapsed at `now`.
    #[must_use]
    pub fn is_vulnerable(&self, now: f32) -> bool {
        self.alive
            && self
                .last_hit_at
                .map_or(true, |last| now - last >= self.tuning.hit_cooldown)
    }

    /// Cooldown-gated [`Self::take_damage`], used for repeatable contact hits.
    pub fn take_hit(&mut self, amount: f32, source: Vec2, now: f32) -> HitResult {
        if !self.is_vulnerable(now) {
            return HitResult::Ignored;
        }
        self.last_hit_at = Some(now);
        if self.take_damage(amount, source) {
            HitResult::Killed
        } else {
            HitResult::Damaged
        }
    }

    /// Restores health up to the maximum.
    pub fn heal(&mut self, amount: f32) {
        if !self.alive || !amount.is_finite() {
            return;
        }
        self.health = (self.health + amount.max(0.0)).min(self.max_health);
    }

    // ------------------------------------------------------------------------
    // Progression
    // ------------------------------------------------------------------------

    /// Adds experience and returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: u32) -> u32 {
        if !self.alive {
            return 0;
        }
        self.experience = self.experience.saturating_add(amount);

        let mut gained = 0;
        while self.experience >= self.experience_to_next {
            self.experience -= self.experience_to_next;
            self.experience_to_next = self.curve.next_threshold(self.experience_to_next);
            self.level += 1;
            gained += 1;

            self.max_health += self.progression.max_health_per_level;
            if self.progression.heal_on_level_up {
                self.health = self.max_health;
            }
        }
        if gained > 0 {
            info!("Player reached level {}", self.level);
        }
        gained
    }

    /// Applies every modifier of a powerup.
    pub fn apply_powerup(&mut self, powerup: &PowerupDef) {
        for modifier in &powerup.modifiers {
            self.apply_modifier(modifier);
        }
        info!("Applied powerup {}", powerup.id);
    }

    /// Applies one stat modifier.
    pub fn apply_modifier(&mut self, modifier: &StatModifier) {
        if !modifier.amount.is_finite() {
            warn!("Ignoring non-finite modifier {:?}", modifier);
            return;
        }
        if let Some(factor) = self.multipliers.factor_mut(modifier.target) {
            *factor = modifier.apply_to(*factor).max(MIN_MULTIPLIER);
            return;
        }
        match modifier.target {
            StatTarget::ProjectilesPerShot => {
                let current = self.multipliers.projectiles_per_shot as f32;
                self.multipliers.projectiles_per_shot = modifier.apply_to(current).round().max(1.0) as u32;
            },
            StatTarget::MaxHealth => {
                self.max_health = modifier.apply_to(self.max_health).max(1.0);
                self.health = self.health.min(self.max_health);
            },
            StatTarget::Heal => self.heal(modifier.apply_to(0.0)),
            StatTarget::WeaponCount => {
                let extra = modifier.apply_to(0.0).round().max(0.0) as u32;
                for _ in 0..extra {
                    self.loadout.add_instance();
                }
            },
            _ => {},
        }
    }

    // ------------------------------------------------------------------------
    // Weapons
    // ------------------------------------------------------------------------

    /// Advances the loadout and returns any projectiles fired.
    ///
    /// `targets` are the living enemies; spears aim at the nearest and
    /// emitters pick from those within range.
    pub fn update_weapons(&mut self, dt: f32, frame_scale: f32, targets: &[TargetInfo]) -> Vec<Projectile> {
        let position = self.position;
        let multipliers = self.multipliers;
        match &mut self.loadout {
            Loadout::Swords(ring) => {
                ring.update(multipliers.rotation_speed, frame_scale);
                Vec::new()
            },
            Loadout::Spears(spears) => {
                let nearest = targets
                    .iter()
                    .min_by(|a, b| {
                        a.position
                            .distance_squared(position)
                            .total_cmp(&b.position.distance_squared(position))
                    })
                    .map(|t| t.position);
                spears.update(position, nearest, multipliers.rotation_speed, dt);
                Vec::new()
            },
            Loadout::Emitter(emitter) => {
                let ctx = ShotContext {
                    origin: position,
                    multipliers: &multipliers,
                };
                emitter.update(dt, &ctx, targets)
            },
        }
    }

    /// Melee hit zones this tick.
    #[must_use]
    pub fn melee_zones(&self) -> Vec<MeleeZone> {
        match &self.loadout {
            Loadout::Swords(ring) => ring.zones(self.position, self.multipliers.size),
            Loadout::Spears(spears) => spears.zones(self.position, self.multipliers.size),
            Loadout::Emitter(_) => Vec::new(),
        }
    }

    /// Melee damage per hit after the damage multiplier.
    #[must_use]
    pub fn melee_damage(&self) -> f32 {
        match &self.loadout {
            Loadout::Swords(ring) => ring.damage(self.multipliers.damage),
            Loadout::Spears(spears) => spears.damage(self.multipliers.damage),
            Loadout::Emitter(_) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powerup::PowerupCatalog;
    use proptest::prelude::*;

    fn player(class: PlayerClass) -> Player {
        Player::new(
            class,
            Vec2::new(500.0, 500.0),
            &SimConfig::default(),
            WeaponBaseStats::default(),
        )
    }

    #[test]
    fn test_class_speeds() {
        assert_eq!(player(PlayerClass::Warrior).base_speed, 0.4);
        assert_eq!(player(PlayerClass::Wizard).base_speed, 0.5);
        assert_eq!(player(PlayerClass::Rogue).base_speed, 0.6);
        assert!(matches!(player(PlayerClass::FallenKnight).loadout(), Loadout::Spears(_)));
        assert!(matches!(player(PlayerClass::Wizard).loadout(), Loadout::Emitter(_)));
    }

    #[test]
    fn test_move_diagonal_not_normalized() {
        let mut p = player(PlayerClass::Rogue);
        let input = DirectionalInput {
            down: true,
            right: true,
            ..DirectionalInput::NONE
        };
        p.move_by(&input, &MapBounds::default(), 1.0);
        assert!((p.position() - Vec2::new(500.6, 500.6)).length() < 1e-4);
        assert!((p.facing().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_move_clamps_to_margin() {
        let mut p = player(PlayerClass::Warrior);
        p.set_position(Vec2::new(50.2, 2349.9));
        let input = DirectionalInput {
            left: true,
            down: true,
            ..DirectionalInput::NONE
        };
        p.move_by(&input, &MapBounds::default(), 1.0);
        assert_eq!(p.position(), Vec2::new(50.0, 2350.0));
    }

    #[test]
    fn test_take_damage_knockback_and_multiplier() {
        let mut p = player(PlayerClass::Warrior);
        p.multipliers.damage_taken = 0.5;
        let died = p.take_damage(20.0, Vec2::new(500.0, 400.0));
        assert!(!died);
        assert_eq!(p.health(), 90.0);
        // Pushed away from a source above the player.
        assert!((p.knockback() - Vec2::new(0.0, 8.0)).length() < 1e-5);
    }

    #[test]
    fn test_take_damage_floors_at_zero_and_reports_once() {
        let mut p = player(PlayerClass::Warrior);
        assert!(p.take_damage(500.0, Vec2::ZERO));
        assert_eq!(p.health(), 0.0);
        assert!(!p.is_alive());
        assert!(!p.take_damage(10.0, Vec2::ZERO));
    }

    #[test]
    fn test_hit_cooldown() {
        let mut p = player(PlayerClass::Warrior);
        assert_eq!(p.take_hit(5.0, Vec2::ZERO, 1.0), HitResult::Damaged);
        assert_eq!(p.take_hit(5.0, Vec2::ZERO, 1.2), HitResult::Ignored);
        assert_eq!(p.take_hit(5.0, Vec2::ZERO, 1.5), HitResult::Damaged);
        assert_eq!(p.health(), 90.0);
    }

    #[test]
    fn test_gain_experience_crosses_two_thresholds() {
        let mut p = player(PlayerClass::Warrior);
        p.gain_experience(90);
        assert_eq!(p.level(), 1);
        assert_eq!(p.experience(), 90);

        let gained = p.gain_experience(150);
        assert_eq!(gained, 2);
        assert_eq!(p.level(), 3);
        // 240 - 100 - 120
        assert_eq!(p.experience(), 20);
        assert_eq!(p.experience_to_next(), 144);
        assert_eq!(p.max_health(), 120.0);
        assert_eq!(p.health(), 120.0);
    }

    #[test]
    fn test_no_level_up() {
        let mut p = player(PlayerClass::Warrior);
        assert_eq!(p.gain_experience(99), 0);
        assert_eq!(p.level(), 1);
    }

    #[test]
    fn test_apply_builtin_powerups() {
        let catalog = PowerupCatalog::builtin();
        let mut p = player(PlayerClass::Warrior);
        p.apply_powerup(catalog.get("player_speed").expect("entry"));
        p.apply_powerup(catalog.get("sword_count").expect("entry"));
        p.apply_powerup(catalog.get("damage_reduction").expect("entry"));
        assert!((p.multipliers().speed - 1.5).abs() < 1e-6);
        assert!((p.multipliers().damage_taken - 0.8).abs() < 1e-6);
        match p.loadout() {
            Loadout::Swords(ring) => assert_eq!(ring.count(), 2),
            other => panic!("unexpected loadout {other:?}"),
        }

        p.take_damage(50.0, Vec2::ZERO);
        p.apply_powerup(catalog.get("hp_up").expect("entry"));
        assert_eq!(p.max_health(), 150.0);
        assert!((p.health() - 90.0).abs() < 1e-4);

        let mut wizard = player(PlayerClass::Wizard);
        wizard.apply_powerup(catalog.get("multi_shot").expect("entry"));
        assert_eq!(wizard.multipliers().projectiles_per_shot, 2);
    }

    #[test]
    fn test_multipliers_stay_positive() {
        let mut p = player(PlayerClass::Warrior);
        p.apply_modifier(&StatModifier::add(StatTarget::Speed, -10.0));
        assert!(p.multipliers().speed > 0.0);
        p.apply_modifier(&StatModifier::add(StatTarget::ProjectilesPerShot, -5.0));
        assert_eq!(p.multipliers().projectiles_per_shot, 1);
    }

    #[test]
    fn test_sword_zones_follow_player() {
        let p = player(PlayerClass::Warrior);
        let zones = p.melee_zones();
        assert_eq!(zones.len(), 1);
        assert!(zones[0].hits(Vec2::new(620.0, 500.0), 10.0));
        assert!((p.melee_damage() - 1.0).abs() < 1e-6);
        assert!(player(PlayerClass::Rogue).melee_zones().is_empty());
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_bounds(ops in proptest::collection::vec((any::<bool>(), 0.0f32..200.0), 1..40)) {
            let mut p = player(PlayerClass::Warrior);
            for (is_damage, amount) in ops {
                if is_damage {
                    p.take_damage(amount, Vec2::ZERO);
                } else {
                    p.heal(amount);
                }
                prop_assert!(p.health() >= 0.0);
                prop_assert!(p.health() <= p.max_health());
            }
        }

        #[test]
        fn prop_knockback_decays_without_reversal(
            magnitude in 0.02f32..50.0,
            angle in 0.0f32..std::f32::consts::TAU,
        ) {
            let mut p = player(PlayerClass::Warrior);
            p.set_position(Vec2::new(1200.0, 1200.0));
            let initial = lastrealm_common::from_angle(angle) * magnitude;
            p.set_knockback(initial);

            let bound = ((0.01 / magnitude).ln() / 0.9f32.ln()).ceil() as u32;
            for _ in 0..bound {
                p.move_by(&DirectionalInput::NONE, &MapBounds::default(), 1.0);
                let k = p.knockback();
                prop_assert!(k.x == 0.0 || k.x.signum() == initial.x.signum());
                prop_assert!(k.y == 0.0 || k.y.signum() == initial.y.signum());
            }
            prop_assert!(p.knockback().length() <= 0.01 + 1e-5);
        }
    }
}
