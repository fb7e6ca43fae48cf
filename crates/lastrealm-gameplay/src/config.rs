//! Simulation tuning.
//!
//! Every gameplay constant lives here so a host can override any of them from
//! a config file. All structs use `#[serde(default)]`, so a partial file only
//! replaces the fields it names.
//!
//! Units: distances in map units, durations in seconds. Movement speeds are
//! map units per reference tick (1/60 s) and get scaled by the tick's frame
//! scale when `dt` differs from the reference.

use lastrealm_common::MapBounds;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Duration of one reference tick in seconds. Per-tick speeds are tuned
/// against this rate.
pub const REFERENCE_TICK_SECONDS: f32 = 1.0 / 60.0;

/// Smallest value any multiplier or positive tunable is clamped to.
const MIN_POSITIVE: f32 = 0.001;

/// Converts a tick `dt` into a frame scale relative to the reference tick.
#[must_use]
pub fn frame_scale(dt: f32) -> f32 {
    (dt / REFERENCE_TICK_SECONDS).max(0.0)
}

// ============================================================================
// Root
// ============================================================================

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimConfig {
    /// Playable map rectangle.
    pub map: MapBounds,
    /// Player tuning.
    pub player: PlayerConfig,
    /// Enemy stat templates.
    pub enemies: EnemyRoster,
    /// Melee and ranged weapon tuning.
    pub weapons: WeaponConfig,
    /// Experience curve and level-up rewards.
    pub progression: ProgressionConfig,
    /// Timed difficulty escalation.
    pub difficulty: DifficultyConfig,
    /// Monster and epic spawn cadence.
    pub spawning: SpawnConfig,
    /// Map powerup cadence and choice presentation.
    pub powerups: PowerupConfig,
    /// RNG seed (None = seeded from entropy).
    pub seed: Option<u64>,
}

impl SimConfig {
    /// Clamp every value into a range the simulation can run with.
    ///
    /// Out-of-range values are logged and replaced rather than rejected so a
    /// hand-edited file never stops a run from starting.
    pub fn validate(&mut self) {
        if !(self.map.width.is_finite() && self.map.height.is_finite())
            || self.map.width < 200.0
            || self.map.height < 200.0
        {
            warn!(
                "Map {}x{} is too small, using default",
                self.map.width, self.map.height
            );
            self.map = MapBounds::default();
        }
        self.player.validate();
        self.enemies.normal.validate();
        self.enemies.epic.validate();
        self.enemies.boss.validate();
        self.weapons.validate();
        self.progression.validate();
        self.difficulty.validate();
        self.spawning.validate();
        self.powerups.validate();
    }
}

fn positive(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value.max(MIN_POSITIVE)
    } else {
        fallback
    }
}

// ============================================================================
// Player
// ============================================================================

/// Base movement speed per class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassSpeeds {
    /// Warrior (sword).
    pub warrior: f32,
    /// Wizard (mage bolts).
    pub wizard: f32,
    /// Rogue (ranger arrows).
    pub rogue: f32,
    /// Fallen knight (spear).
    pub fallen_knight: f32,
}

impl Default for ClassSpeeds {
    fn default() -> Self {
        Self {
            warrior: 0.4,
            wizard: 0.5,
            rogue: 0.6,
            fallen_knight: 0.4,
        }
    }
}

/// Player tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Starting maximum health.
    pub max_health: f32,
    /// Collision radius.
    pub radius: f32,
    /// Distance kept from the map edge.
    pub edge_margin: f32,
    /// Invulnerability window after a contact hit.
    pub hit_cooldown: f32,
    /// Knockback impulse applied on damage.
    pub knockback_force: f32,
    /// Per-tick knockback decay factor.
    pub knockback_decay: f32,
    /// Knockback components below this snap to zero.
    pub knockback_epsilon: f32,
    /// Base speed per class.
    pub class_speeds: ClassSpeeds,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            radius: 10.0,
            edge_margin: 50.0,
            hit_cooldown: 0.5,
            knockback_force: 8.0,
            knockback_decay: 0.9,
            knockback_epsilon: 0.01,
            class_speeds: ClassSpeeds::default(),
        }
    }
}

impl PlayerConfig {
    fn validate(&mut self) {
        let d = Self::default();
        self.max_health = positive(self.max_health, d.max_health);
        self.radius = positive(self.radius, d.radius);
        self.edge_margin = self.edge_margin.max(0.0);
        self.hit_cooldown = self.hit_cooldown.max(0.0);
        self.knockback_force = self.knockback_force.max(0.0);
        if !(self.knockback_decay > 0.0 && self.knockback_decay < 1.0) {
            warn!("Knockback decay {} outside (0, 1)", self.knockback_decay);
            self.knockback_decay = d.knockback_decay;
        }
        self.knockback_epsilon = positive(self.knockback_epsilon, d.knockback_epsilon);
        let s = &mut self.class_speeds;
        s.warrior = positive(s.warrior, d.class_speeds.warrior);
        s.wizard = positive(s.wizard, d.class_speeds.wizard);
        s.rogue = positive(s.rogue, d.class_speeds.rogue);
        s.fallen_knight = positive(s.fallen_knight, d.class_speeds.fallen_knight);
    }
}

// ============================================================================
// Enemies
// ============================================================================

/// Stats an enemy is spawned with.
///
/// Templates are given in full when overridden; the per-kind defaults differ,
/// so there is no single fallback for a missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Starting health.
    pub health: f32,
    /// Movement speed per reference tick.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Minimum distance kept from other enemies.
    pub separation: f32,
    /// Damage dealt on contact with the player.
    pub contact_damage: f32,
    /// Experience granted on death.
    pub experience: u32,
    /// Minimum time between two melee hits landing on this enemy.
    pub damage_cooldown: f32,
}

impl Default for EnemyTemplate {
    fn default() -> Self {
        Self::normal()
    }
}

impl EnemyTemplate {
    /// Regular chasing monster.
    #[must_use]
    pub fn normal() -> Self {
        Self {
            health: 3.0,
            speed: 0.3,
            radius: 10.0,
            separation: 25.0,
            contact_damage: 5.0,
            experience: 10,
            damage_cooldown: 0.25,
        }
    }

    /// Ranged kiting monster.
    #[must_use]
    pub fn epic() -> Self {
        Self {
            health: 10.0,
            speed: 0.25,
            radius: 20.0,
            separation: 40.0,
            contact_damage: 10.0,
            experience: 50,
            damage_cooldown: 0.25,
        }
    }

    /// Boss monster.
    #[must_use]
    pub fn boss() -> Self {
        Self {
            health: 300.0,
            speed: 0.2,
            radius: 60.0,
            separation: 80.0,
            contact_damage: 20.0,
            experience: 500,
            damage_cooldown: 0.25,
        }
    }

    fn validate(&mut self) {
        self.health = positive(self.health, 1.0);
        self.speed = self.speed.max(0.0);
        self.radius = positive(self.radius, 10.0);
        self.separation = self.separation.max(0.0);
        self.contact_damage = self.contact_damage.max(0.0);
        self.damage_cooldown = self.damage_cooldown.max(0.0);
    }
}

/// Ranged behavior of epic monsters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KiterConfig {
    /// Seconds between fireballs.
    pub fire_cooldown: f32,
    /// Beyond this distance the kiter approaches; fireballs need the player inside it.
    pub attack_range: f32,
    /// Closer than this the kiter retreats.
    pub min_distance: f32,
}

impl Default for KiterConfig {
    fn default() -> Self {
        Self {
            fire_cooldown: 2.0,
            attack_range: 300.0,
            min_distance: 150.0,
        }
    }
}

/// Boss laser telegraph timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserConfig {
    /// Seconds between laser attacks.
    pub cooldown: f32,
    /// Telegraph duration before the beam turns on.
    pub warning: f32,
    /// Duration the beam can hit.
    pub active: f32,
    /// Half the beam's width.
    pub half_width: f32,
    /// Damage per activation.
    pub damage: f32,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            cooldown: 5.0,
            warning: 0.7,
            active: 0.2,
            half_width: 30.0,
            damage: 30.0,
        }
    }
}

/// Epic monster fireball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireballConfig {
    /// Speed per reference tick.
    pub speed: f32,
    /// Lifetime in seconds.
    pub lifetime: f32,
    /// Damage on hit.
    pub damage: f32,
    /// Collision radius.
    pub radius: f32,
}

impl Default for FireballConfig {
    fn default() -> Self {
        Self {
            speed: 0.6,
            lifetime: 400.0 * REFERENCE_TICK_SECONDS,
            damage: 10.0,
            radius: 20.0,
        }
    }
}

/// Enemy stat templates plus behavior tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyRoster {
    /// Normal monster template.
    pub normal: EnemyTemplate,
    /// Epic monster template.
    pub epic: EnemyTemplate,
    /// Boss template.
    pub boss: EnemyTemplate,
    /// Epic kiting behavior.
    pub kiter: KiterConfig,
    /// Epic fireball.
    pub fireball: FireballConfig,
    /// Boss laser.
    pub laser: LaserConfig,
}

impl Default for EnemyRoster {
    fn default() -> Self {
        Self {
            normal: EnemyTemplate::normal(),
            epic: EnemyTemplate::epic(),
            boss: EnemyTemplate::boss(),
            kiter: KiterConfig::default(),
            fireball: FireballConfig::default(),
            laser: LaserConfig::default(),
        }
    }
}

// ============================================================================
// Weapons
// ============================================================================

/// Spear thrust tuning. The spear's damage comes from the weapon base stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpearConfig {
    /// Distance of the tip from the player at the start of a thrust.
    pub base_distance: f32,
    /// Extra reach at full extension.
    pub thrust_amplitude: f32,
    /// Seconds per thrust cycle at rotation multiplier 1.
    pub thrust_period: f32,
    /// Radius of the hit circle around the tip.
    pub tip_radius: f32,
    /// Angle between neighbouring spears.
    pub fan_spread: f32,
}

impl Default for SpearConfig {
    fn default() -> Self {
        Self {
            base_distance: 80.0,
            thrust_amplitude: 60.0,
            thrust_period: 0.5,
            tip_radius: 30.0,
            fan_spread: 0.35,
        }
    }
}

/// Auto-aim emitter tuning, shared by mage and ranger. Overrides are given in
/// full, like [`EnemyTemplate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Seconds between volleys at rotation multiplier 1.
    pub cooldown: f32,
    /// Targeting range.
    pub range: f32,
    /// Projectile speed per reference tick.
    pub projectile_speed: f32,
    /// Projectile collision radius.
    pub projectile_radius: f32,
    /// Base projectile damage.
    pub damage: f32,
    /// Lifetime of time-limited projectiles.
    pub lifetime: f32,
    /// Travel limit of distance-limited projectiles.
    pub max_travel: f32,
    /// Delay between consecutive shots of one volley.
    pub stagger: f32,
    /// Angle between arrows of one volley.
    pub spread: f32,
    /// Splash radius on impact (0 disables).
    pub splash_radius: f32,
    /// Fraction of the damage dealt to splashed enemies.
    pub splash_fraction: f32,
}

impl EmitterConfig {
    /// Mage bolts: time-limited, single-target with splash.
    #[must_use]
    pub fn mage() -> Self {
        Self {
            cooldown: 0.25,
            range: 250.0,
            projectile_speed: 0.8,
            projectile_radius: 20.0,
            damage: 1.0,
            lifetime: 300.0 * REFERENCE_TICK_SECONDS,
            max_travel: 0.0,
            stagger: 0.05,
            spread: 0.0,
            splash_radius: 35.0,
            splash_fraction: 0.5,
        }
    }

    /// Ranger arrows: distance-limited, piercing.
    #[must_use]
    pub fn ranger() -> Self {
        Self {
            cooldown: 0.3,
            range: 250.0,
            projectile_speed: 0.8,
            projectile_radius: 35.0,
            damage: 1.0,
            lifetime: 0.0,
            max_travel: 250.0,
            stagger: 0.0,
            spread: 0.2,
            splash_radius: 0.0,
            splash_fraction: 0.0,
        }
    }

    fn validate(&mut self, fallback: &Self) {
        self.cooldown = positive(self.cooldown, fallback.cooldown);
        self.range = positive(self.range, fallback.range);
        self.projectile_speed = positive(self.projectile_speed, fallback.projectile_speed);
        self.projectile_radius = positive(self.projectile_radius, fallback.projectile_radius);
        self.damage = self.damage.max(0.0);
        self.lifetime = self.lifetime.max(0.0);
        self.max_travel = self.max_travel.max(0.0);
        if self.lifetime <= 0.0 && self.max_travel <= 0.0 {
            warn!("Emitter projectiles would never expire, restoring limits");
            self.lifetime = fallback.lifetime;
            self.max_travel = fallback.max_travel;
        }
        self.stagger = self.stagger.max(0.0);
        self.splash_radius = self.splash_radius.max(0.0);
        self.splash_fraction = self.splash_fraction.clamp(0.0, 1.0);
    }
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self::mage()
    }
}

/// Weapon tuning that is not part of the external base stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Spear thrust.
    pub spear: SpearConfig,
    /// Mage emitter.
    pub mage: EmitterConfig,
    /// Ranger emitter.
    pub ranger: EmitterConfig,
    /// Player projectiles are destroyed this far outside the map.
    pub projectile_edge_margin: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            spear: SpearConfig::default(),
            mage: EmitterConfig::mage(),
            ranger: EmitterConfig::ranger(),
            projectile_edge_margin: 50.0,
        }
    }
}

impl WeaponConfig {
    fn validate(&mut self) {
        self.mage.validate(&EmitterConfig::mage());
        self.ranger.validate(&EmitterConfig::ranger());
        let d = SpearConfig::default();
        self.spear.base_distance = self.spear.base_distance.max(0.0);
        self.spear.thrust_amplitude = self.spear.thrust_amplitude.max(0.0);
        self.spear.thrust_period = positive(self.spear.thrust_period, d.thrust_period);
        self.spear.tip_radius = positive(self.spear.tip_radius, d.tip_radius);
        self.projectile_edge_margin = self.projectile_edge_margin.max(0.0);
    }
}

// ============================================================================
// Progression
// ============================================================================

/// Experience curve and level-up rewards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Experience needed for level 2.
    pub base_threshold: u32,
    /// Threshold growth factor per level (floored).
    pub threshold_growth: f32,
    /// Max health gained per level.
    pub max_health_per_level: f32,
    /// Whether a level-up restores health to full.
    pub heal_on_level_up: bool,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            base_threshold: 100,
            threshold_growth: 1.2,
            max_health_per_level: 10.0,
            heal_on_level_up: true,
        }
    }
}

impl ProgressionConfig {
    fn validate(&mut self) {
        self.base_threshold = self.base_threshold.max(1);
        if !(self.threshold_growth.is_finite() && self.threshold_growth >= 1.0) {
            warn!("Threshold growth {} below 1", self.threshold_growth);
            self.threshold_growth = Self::default().threshold_growth;
        }
        self.max_health_per_level = self.max_health_per_level.max(0.0);
    }
}

/// Repeating difficulty cycle. Offsets are seconds into each cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Cycle length.
    pub cycle_length: f32,
    /// Offset of the contact-damage step.
    pub damage_step_at: f32,
    /// Contact-damage factor per step.
    pub damage_step_factor: f32,
    /// Offset of the spawn-count step.
    pub spawn_step_at: f32,
    /// Monsters added per wave per step.
    pub spawn_step_amount: u32,
    /// Offset of the speed step.
    pub speed_step_at: f32,
    /// Speed factor per step, applied to living enemies too.
    pub speed_step_factor: f32,
    /// Offset of the epic burst.
    pub epic_burst_at: f32,
    /// Epics in the first burst; each later cycle adds one.
    pub epic_burst_base: u32,
    /// Elapsed seconds at which timed mode spawns its boss.
    pub timed_boss_at: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            cycle_length: 180.0,
            damage_step_at: 30.0,
            damage_step_factor: 1.2,
            spawn_step_at: 60.0,
            spawn_step_amount: 1,
            speed_step_at: 90.0,
            speed_step_factor: 1.2,
            epic_burst_at: 170.0,
            epic_burst_base: 3,
            timed_boss_at: 300.0,
        }
    }
}

impl DifficultyConfig {
    fn validate(&mut self) {
        let d = Self::default();
        self.cycle_length = positive(self.cycle_length, d.cycle_length);
        let cycle = self.cycle_length;
        for offset in [
            &mut self.damage_step_at,
            &mut self.spawn_step_at,
            &mut self.speed_step_at,
            &mut self.epic_burst_at,
        ] {
            *offset = offset.clamp(0.0, cycle);
        }
        self.damage_step_factor = positive(self.damage_step_factor, d.damage_step_factor);
        self.speed_step_factor = positive(self.speed_step_factor, d.speed_step_factor);
        self.timed_boss_at = self.timed_boss_at.max(0.0);
    }
}

// ============================================================================
// Spawning & Powerups
// ============================================================================

/// Monster and epic spawn cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Seconds between monster waves.
    pub monster_interval: f32,
    /// Delay before the first wave.
    pub first_monster_delay: f32,
    /// Cap on living enemies; waves stop at the cap.
    pub max_alive: usize,
    /// Inner radius of the spawn ring around the player.
    pub ring_min: f32,
    /// Outer radius of the spawn ring.
    pub ring_max: f32,
    /// Seconds between scheduled epic spawns.
    pub epic_interval: f32,
    /// Delay before the first epic.
    pub first_epic_delay: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            monster_interval: 2.0,
            first_monster_delay: 1.0,
            max_alive: 80,
            ring_min: 450.0,
            ring_max: 650.0,
            epic_interval: 30.0,
            first_epic_delay: 10.0,
        }
    }
}

impl SpawnConfig {
    fn validate(&mut self) {
        let d = Self::default();
        self.monster_interval = positive(self.monster_interval, d.monster_interval);
        self.epic_interval = positive(self.epic_interval, d.epic_interval);
        self.first_monster_delay = self.first_monster_delay.max(0.0);
        self.first_epic_delay = self.first_epic_delay.max(0.0);
        self.ring_min = self.ring_min.max(0.0);
        if self.ring_max < self.ring_min {
            self.ring_max = self.ring_min;
        }
    }
}

/// Map powerups and choice presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupConfig {
    /// Seconds between powerup spawns.
    pub spawn_interval: f32,
    /// Cap on live map powerups.
    pub max_alive: usize,
    /// Pickup distance, added to the player radius.
    pub pickup_radius: f32,
    /// Visual spin per reference tick.
    pub spin_speed: f32,
    /// Options per presentation.
    pub offer_size: usize,
    /// Forced picks before a boss-rush run starts.
    pub boss_rush_picks: u32,
}

impl Default for PowerupConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 15.0,
            max_alive: 3,
            pickup_radius: 40.0,
            spin_speed: 0.05,
            offer_size: 3,
            boss_rush_picks: 5,
        }
    }
}

impl PowerupConfig {
    fn validate(&mut self) {
        self.spawn_interval = positive(self.spawn_interval, Self::default().spawn_interval);
        self.pickup_radius = self.pickup_radius.max(0.0);
        self.offer_size = self.offer_size.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{"player": {"max_health": 150.0}, "seed": 9}"#)
                .expect("parse");
        assert_eq!(config.player.max_health, 150.0);
        assert_eq!(config.player.hit_cooldown, 0.5);
        assert_eq!(config.enemies.boss.health, 300.0);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = SimConfig::default();
        config.player.knockback_decay = 1.5;
        config.player.class_speeds.rogue = -1.0;
        config.progression.threshold_growth = 0.5;
        config.difficulty.epic_burst_at = 500.0;
        config.spawning.ring_max = 10.0;
        config.map = MapBounds::new(10.0, 10.0);
        config.weapons.ranger.max_travel = 0.0;

        config.validate();

        assert_eq!(config.player.knockback_decay, 0.9);
        assert_eq!(config.player.class_speeds.rogue, 0.6);
        assert_eq!(config.progression.threshold_growth, 1.2);
        assert_eq!(config.difficulty.epic_burst_at, 180.0);
        assert_eq!(config.spawning.ring_max, config.spawning.ring_min);
        assert_eq!(config.map, MapBounds::default());
        assert_eq!(config.weapons.ranger.max_travel, 250.0);
    }

    #[test]
    fn test_frame_scale() {
        assert!((frame_scale(REFERENCE_TICK_SECONDS) - 1.0).abs() < 1e-6);
        assert!((frame_scale(REFERENCE_TICK_SECONDS * 2.0) - 2.0).abs() < 1e-5);
        assert_eq!(frame_scale(-1.0), 0.0);
    }
}
