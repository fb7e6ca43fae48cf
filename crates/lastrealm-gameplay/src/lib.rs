//! # Last Realm Gameplay
//!
//! Real-time simulation core for Last Realm.
//!
//! This crate provides everything a run needs, independent of rendering:
//! - Player classes, movement, knockback and leveling
//! - Sword orbits, spear thrusts and auto-aim emitters
//! - Projectiles (bolts, piercing arrows, fireballs)
//! - Enemy AI (chasers, kiters, laser bosses)
//! - Collision and damage resolution
//! - Difficulty cycles, spawning and powerups
//! - The run state machine, clock, events and summaries

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ai;
pub mod combat;
pub mod config;
pub mod enemy;
pub mod events;
pub mod input;
pub mod melee_combat;
pub mod pause;
pub mod player;
pub mod powerup;
pub mod progression;
pub mod projectile;
pub mod ranged_combat;
pub mod session;
pub mod spawn;
pub mod summary;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ai::*;
    pub use crate::combat::*;
    pub use crate::config::*;
    pub use crate::enemy::*;
    pub use crate::events::*;
    pub use crate::input::*;
    pub use crate::melee_combat::*;
    pub use crate::pause::*;
    pub use crate::player::*;
    pub use crate::powerup::*;
    pub use crate::progression::*;
    pub use crate::projectile::*;
    pub use crate::ranged_combat::*;
    pub use crate::session::*;
    pub use crate::spawn::*;
    pub use crate::summary::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use lastrealm_common::MapBounds;

    const DT: f32 = 1.0 / 60.0;

    fn wizard_at(position: Vec2) -> Player {
        Player::new(
            PlayerClass::Wizard,
            position,
            &SimConfig::default(),
            WeaponBaseStats::default(),
        )
    }

    /// Runs AI and the hostile pass for one tick at `now`.
    fn step(
        player: &mut Player,
        enemies: &mut [Enemy],
        projectiles: &mut Vec<Projectile>,
        cycle: &mut LaserCycle,
        roster: &EnemyRoster,
        now: f32,
    ) -> HostileReport {
        let bounds = MapBounds::default();
        let mut ctx = AiContext {
            dt: DT,
            frame_scale: 1.0,
            player: player.position(),
            bounds: &bounds,
            roster,
            damage_multiplier: 1.0,
            laser_cycle: cycle,
        };
        let output = update_enemies(enemies, &mut ctx);
        projectiles.extend(output.fireballs);
        for projectile in projectiles.iter_mut() {
            projectile.update(DT, 1.0, &bounds, 50.0);
        }
        let hostile = HostileContext {
            now,
            damage_multiplier: 1.0,
            bounds: &bounds,
            laser: &roster.laser,
        };
        resolve_hostile_attacks(player, enemies, projectiles, &hostile)
    }

    #[test]
    fn test_monster_reaches_player_and_hits_per_cooldown() {
        let roster = EnemyRoster::default();
        let mut player = wizard_at(Vec2::new(100.0, 100.0));
        let mut enemies = vec![Enemy::spawn(EnemyKind::Normal, Vec2::new(100.0, 0.0), &roster, 1.0)];
        let mut projectiles = Vec::new();
        let mut cycle = LaserCycle::default();

        let mut first_hit_tick = None;
        let mut hits = 0;
        for tick in 0..600 {
            let now = tick as f32 * DT;
            let report = step(&mut player, &mut enemies, &mut projectiles, &mut cycle, &roster, now);
            if report.hits > 0 && first_hit_tick.is_none() {
                first_hit_tick = Some(tick);
            }
            hits += report.hits;
        }

        // 100 units to close to a 20-unit contact distance at 0.3 per tick.
        let first = first_hit_tick.expect("monster reached the player");
        assert!((260..=270).contains(&first), "first hit at tick {first}");

        // Contact for the rest of the run, gated at one hit per 0.5 s.
        let contact_seconds = (600 - first) as f32 * DT;
        let max_hits = (contact_seconds / 0.5).floor() as u32 + 1;
        assert!(hits >= 2 && hits <= max_hits, "{hits} hits, at most {max_hits}");
        assert!((player.health() - (100.0 - 5.0 * hits as f32)).abs() < 1e-3);
    }

    #[test]
    fn test_laser_outside_half_width_never_hits() {
        let mut roster = EnemyRoster::default();
        roster.laser.cooldown = 0.1;
        // Boss laser fires Up first; stand beside the beam, never in contact.
        let boss_at = Vec2::new(1200.0, 1200.0);
        let mut enemies = vec![Enemy::spawn(EnemyKind::Boss, boss_at, &roster, 0.0)];
        let mut player = wizard_at(Vec2::new(1200.0 + 30.0 + 10.0 + 1.0, 600.0));
        let mut projectiles = Vec::new();
        let mut cycle = LaserCycle::default();

        let mut saw_active = false;
        for tick in 0..90 {
            let report = step(&mut player, &mut enemies, &mut projectiles, &mut cycle, &roster, tick as f32 * DT);
            assert_eq!(report.hits, 0);
            saw_active |= enemies[0].laser().is_some_and(LaserAttack::is_active);
        }
        assert!(saw_active);
        assert_eq!(player.health(), player.max_health());
    }

    #[test]
    fn test_laser_inside_half_width_hits_once() {
        let mut roster = EnemyRoster::default();
        roster.laser.cooldown = 0.1;
        let boss_at = Vec2::new(1200.0, 1200.0);
        let mut enemies = vec![Enemy::spawn(EnemyKind::Boss, boss_at, &roster, 0.0)];
        let mut player = wizard_at(Vec2::new(1215.0, 600.0));
        let mut projectiles = Vec::new();
        let mut cycle = LaserCycle::default();

        let mut hits = 0;
        for tick in 0..90 {
            hits += step(&mut player, &mut enemies, &mut projectiles, &mut cycle, &roster, tick as f32 * DT).hits;
        }
        assert_eq!(hits, 1);
        assert!((player.health() - 70.0).abs() < 1e-3);
    }
}
