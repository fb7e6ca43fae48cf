//! Collision and damage resolution.
//!
//! Two passes run each tick after movement:
//! - player attacks against enemies (melee zones, player projectiles, splash)
//! - enemies, fireballs and lasers against the player
//!
//! Both passes only read alive flags, so an entity killed earlier in the same
//! pass can neither be credited twice nor deal damage.

use glam::Vec2;
use lastrealm_common::{circles_overlap, EntityId, MapBounds};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::LaserAttack;
use crate::config::LaserConfig;
use crate::enemy::{Behavior, DamageOutcome, DamageSource, Enemy, EnemyKind};
use crate::player::{HitResult, Player};
use crate::projectile::Projectile;

/// A confirmed enemy death, credited exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KillRecord {
    /// Enemy ID.
    pub id: EntityId,
    /// Enemy variant.
    pub kind: EnemyKind,
    /// Experience granted.
    pub experience: u32,
    /// Where it died.
    pub position: Vec2,
    /// Whether this was the run's designated boss.
    pub designated_boss: bool,
}

impl KillRecord {
    fn of(enemy: &Enemy) -> Self {
        Self {
            id: enemy.id(),
            kind: enemy.kind(),
            experience: enemy.experience(),
            position: enemy.position(),
            designated_boss: enemy.is_designated_boss(),
        }
    }
}

/// Splash queued by a bolt impact.
#[derive(Debug, Clone, Copy)]
struct Splash {
    center: Vec2,
    radius: f32,
    damage: f32,
    struck: EntityId,
}

// ============================================================================
// Player Attacks
// ============================================================================

/// Applies melee zones and player projectiles to every living enemy and
/// returns the kills.
pub fn resolve_player_attacks(
    player: &Player,
    enemies: &mut [Enemy],
    projectiles: &mut [Projectile],
    now: f32,
) -> Vec<KillRecord> {
    let mut kills = Vec::new();
    let mut splashes = Vec::new();
    let zones = player.melee_zones();
    let melee_damage = player.melee_damage();

    for enemy in enemies.iter_mut() {
        if !enemy.is_alive() {
            continue;
        }

        if zones.iter().any(|zone| zone.hits(enemy.position(), enemy.radius())) {
            let outcome = enemy.apply_damage(melee_damage, DamageSource::Melee, now);
            record(enemy, outcome, &mut kills);
        }

        for projectile in projectiles.iter_mut() {
            if !enemy.is_alive() {
                break;
            }
            if projectile.is_hostile() || !projectile.can_hit(enemy.id()) {
                continue;
            }
            if !circles_overlap(projectile.position(), projectile.radius(), enemy.position(), enemy.radius()) {
                continue;
            }

            let outcome = enemy.apply_damage(projectile.damage(), DamageSource::Projectile, now);
            projectile.register_hit(enemy.id());
            if let Some((radius, fraction)) = projectile.splash() {
                splashes.push(Splash {
                    center: enemy.position(),
                    radius,
                    damage: projectile.damage() * fraction,
                    struck: enemy.id(),
                });
            }
            record(enemy, outcome, &mut kills);
        }
    }

    apply_splashes(&splashes, enemies, now, &mut kills);
    kills
}

fn apply_splashes(splashes: &[Splash], enemies: &mut [Enemy], now: f32, kills: &mut Vec<KillRecord>) {
    for splash in splashes {
        for enemy in enemies.iter_mut() {
            if !enemy.is_alive() || enemy.id() == splash.struck {
                continue;
            }
            if enemy.position().distance(splash.center) <= splash.radius {
                let outcome = enemy.apply_damage(splash.damage, DamageSource::Splash, now);
                record(enemy, outcome, kills);
            }
        }
    }
}

fn record(enemy: &Enemy, outcome: DamageOutcome, kills: &mut Vec<KillRecord>) {
    if outcome == DamageOutcome::Killed {
        kills.push(KillRecord::of(enemy));
    }
}

// ============================================================================
// Hostile Attacks
// ============================================================================

/// Inputs for the hostile pass.
#[derive(Debug, Clone, Copy)]
pub struct HostileContext<'a> {
    /// Run clock in seconds.
    pub now: f32,
    /// Difficulty damage multiplier.
    pub damage_multiplier: f32,
    /// Map bounds, for laser length.
    pub bounds: &'a MapBounds,
    /// Laser tuning.
    pub laser: &'a LaserConfig,
}

/// What the hostile pass did to the player.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HostileReport {
    /// Hits that landed.
    pub hits: u32,
    /// Health lost this tick.
    pub damage_taken: f32,
    /// Set on the tick the player died.
    pub player_killed: bool,
}

/// Applies contact damage, fireballs and active lasers to the player.
pub fn resolve_hostile_attacks(
    player: &mut Player,
    enemies: &mut [Enemy],
    projectiles: &mut [Projectile],
    ctx: &HostileContext<'_>,
) -> HostileReport {
    let mut report = HostileReport::default();
    let health_before = player.health();

    for enemy in enemies.iter().filter(|e| e.is_alive()) {
        if !player.is_alive() {
            break;
        }
        if !circles_overlap(enemy.position(), enemy.radius(), player.position(), player.radius()) {
            continue;
        }
        let damage = enemy.contact_damage() * ctx.damage_multiplier;
        match player.take_hit(damage, enemy.position(), ctx.now) {
            HitResult::Ignored => {},
            HitResult::Damaged => report.hits += 1,
            HitResult::Killed => {
                report.hits += 1;
                report.player_killed = true;
            },
        }
    }

    for projectile in projectiles.iter_mut() {
        if !player.is_alive() {
            break;
        }
        if !projectile.is_alive() || !projectile.is_hostile() {
            continue;
        }
        if circles_overlap(projectile.position(), projectile.radius(), player.position(), player.radius()) {
            report.hits += 1;
            report.player_killed |= player.take_damage(projectile.damage(), projectile.position());
            projectile.destroy();
        }
    }

    for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
        if !player.is_alive() {
            break;
        }
        if let Behavior::Boss { laser: Some(attack), .. } = enemy.behavior_mut() {
            if strike_with_laser(attack, player, ctx, &mut report) {
                debug!("Laser {:?} hit the player", attack.direction());
            }
        }
    }

    report.damage_taken = (health_before - player.health()).max(0.0);
    report
}

fn strike_with_laser(
    attack: &mut LaserAttack,
    player: &mut Player,
    ctx: &HostileContext<'_>,
    report: &mut HostileReport,
) -> bool {
    if !attack.can_hit(player.position(), player.radius(), ctx.bounds, ctx.laser) {
        return false;
    }
    attack.mark_hit();
    report.hits += 1;
    report.player_killed |= player.take_damage(ctx.laser.damage * ctx.damage_multiplier, attack.origin());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::LaserDirection;
    use crate::config::{EnemyRoster, SimConfig};
    use crate::melee_combat::{MeleeZone, WeaponBaseStats};
    use crate::player::PlayerClass;
    use crate::projectile::ProjectileKind;

    fn warrior_at(position: Vec2, damage: f32) -> Player {
        let stats = WeaponBaseStats {
            damage,
            ..WeaponBaseStats::default()
        };
        Player::new(PlayerClass::Warrior, position, &SimConfig::default(), stats)
    }

    fn wizard_at(position: Vec2) -> Player {
        Player::new(
            PlayerClass::Wizard,
            position,
            &SimConfig::default(),
            WeaponBaseStats::default(),
        )
    }

    fn normal(position: Vec2, health: f32) -> Enemy {
        Enemy::spawn(EnemyKind::Normal, position, &EnemyRoster::default(), 1.0).with_health(health)
    }

    #[test]
    fn test_sword_and_projectile_same_tick_kill_once() {
        let player = warrior_at(Vec2::new(1000.0, 1000.0), 10.0);
        // The blade starts pointing at +x, orbiting at radius 120.
        let MeleeZone::Blade { center: target, .. } = player.melee_zones()[0] else {
            panic!("warrior should carry a blade");
        };
        let mut enemies = vec![normal(target, 1.0)];
        let mut projectiles = vec![Projectile::new(ProjectileKind::Bolt, target, Vec2::ZERO, 10.0, 5.0)];

        let kills = resolve_player_attacks(&player, &mut enemies, &mut projectiles, 0.0);
        assert_eq!(kills.len(), 1);
        assert_eq!(kills[0].experience, 10);
        // The bolt found no living target and is still in flight.
        assert!(projectiles[0].is_alive());
    }

    #[test]
    fn test_arrow_pierces_two_enemies() {
        let player = wizard_at(Vec2::new(100.0, 100.0));
        let spot = Vec2::new(600.0, 600.0);
        let mut enemies = vec![normal(spot, 3.0), normal(spot + Vec2::new(5.0, 0.0), 3.0)];
        let mut projectiles = vec![Projectile::new(ProjectileKind::Arrow, spot, Vec2::X, 35.0, 5.0)];

        let kills = resolve_player_attacks(&player, &mut enemies, &mut projectiles, 0.0);
        assert_eq!(kills.len(), 2);
        assert!(projectiles[0].is_alive());
        assert!(projectiles[0].has_visited(enemies[0].id()));
        assert!(projectiles[0].has_visited(enemies[1].id()));

        // A second pass registers nothing new.
        let again = resolve_player_attacks(&player, &mut enemies, &mut projectiles, 0.1);
        assert!(again.is_empty());
    }

    #[test]
    fn test_bolt_is_single_use_and_splashes() {
        let player = wizard_at(Vec2::new(100.0, 100.0));
        let spot = Vec2::new(600.0, 600.0);
        let mut enemies = vec![
            normal(spot, 3.0),
            normal(spot + Vec2::new(30.0, 0.0), 0.5),
            normal(spot + Vec2::new(200.0, 0.0), 0.5),
        ];
        let mut projectiles = vec![
            Projectile::new(ProjectileKind::Bolt, spot, Vec2::ZERO, 5.0, 1.0).with_splash(35.0, 0.5),
        ];

        let kills = resolve_player_attacks(&player, &mut enemies, &mut projectiles, 0.0);
        assert!(!projectiles[0].is_alive());
        assert!((enemies[0].health() - 2.0).abs() < 1e-6);
        assert_eq!(kills.len(), 1);
        assert_eq!(kills[0].id, enemies[1].id());
        assert!(enemies[2].is_alive());
    }

    #[test]
    fn test_contact_damage_gated_by_player_cooldown() {
        let mut player = wizard_at(Vec2::new(500.0, 500.0));
        let mut enemies = vec![normal(Vec2::new(505.0, 500.0), 3.0)];
        let bounds = MapBounds::default();
        let laser = LaserConfig::default();
        let mut projectiles = Vec::new();

        let mut total_hits = 0;
        for tick in 0..60 {
            let ctx = HostileContext {
                now: tick as f32 / 60.0,
                damage_multiplier: 1.0,
                bounds: &bounds,
                laser: &laser,
            };
            total_hits += resolve_hostile_attacks(&mut player, &mut enemies, &mut projectiles, &ctx).hits;
        }
        // t = 0 and t = 0.5.
        assert_eq!(total_hits, 2);
        assert!((player.health() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_fireball_hits_once_and_is_destroyed() {
        let mut player = wizard_at(Vec2::new(500.0, 500.0));
        let mut projectiles = vec![Projectile::new(
            ProjectileKind::Fireball,
            Vec2::new(510.0, 500.0),
            Vec2::ZERO,
            20.0,
            12.0,
        )];
        let bounds = MapBounds::default();
        let laser = LaserConfig::default();
        let ctx = HostileContext {
            now: 0.0,
            damage_multiplier: 1.0,
            bounds: &bounds,
            laser: &laser,
        };
        let report = resolve_hostile_attacks(&mut player, &mut [], &mut projectiles, &ctx);
        assert_eq!(report.hits, 1);
        assert!((report.damage_taken - 12.0).abs() < 1e-4);
        assert!(!projectiles[0].is_alive());
        // Knocked away from the fireball.
        assert!(player.knockback().x < 0.0);
    }

    #[test]
    fn test_laser_misses_outside_half_width() {
        let roster = EnemyRoster::default();
        let bounds = MapBounds::default();
        let laser = roster.laser.clone();
        let mut boss = Enemy::spawn(EnemyKind::Boss, Vec2::new(1200.0, 1200.0), &roster, 1.0);
        let mut attack = LaserAttack::telegraph(boss.position(), LaserDirection::Right, &laser);
        attack.advance(laser.warning + 0.01, &laser);
        if let Behavior::Boss { laser: slot, .. } = boss.behavior_mut() {
            *slot = Some(attack);
        }
        let mut enemies = vec![boss];

        // 50 units off the beam: outside 30 + 10.
        let mut player = wizard_at(Vec2::new(1800.0, 1250.0));
        let ctx = HostileContext {
            now: 0.0,
            damage_multiplier: 1.0,
            bounds: &bounds,
            laser: &laser,
        };
        let report = resolve_hostile_attacks(&mut player, &mut enemies, &mut [], &ctx);
        assert_eq!(report.hits, 0);
        assert_eq!(player.health(), player.max_health());

        // On the beam: exactly one hit per activation.
        player.set_position(Vec2::new(1800.0, 1210.0));
        let first = resolve_hostile_attacks(&mut player, &mut enemies, &mut [], &ctx);
        let second = resolve_hostile_attacks(&mut player, &mut enemies, &mut [], &ctx);
        assert_eq!(first.hits, 1);
        assert_eq!(second.hits, 0);
        assert!((player.health() - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_player_death_reported_once() {
        let mut player = wizard_at(Vec2::new(500.0, 500.0));
        let mut projectiles: Vec<Projectile> = (0..3)
            .map(|_| Projectile::new(ProjectileKind::Fireball, Vec2::new(500.0, 500.0), Vec2::ZERO, 20.0, 60.0))
            .collect();
        let bounds = MapBounds::default();
        let laser = LaserConfig::default();
        let ctx = HostileContext {
            now: 0.0,
            damage_multiplier: 1.0,
            bounds: &bounds,
            laser: &laser,
        };
        let report = resolve_hostile_attacks(&mut player, &mut [], &mut projectiles, &ctx);
        assert!(report.player_killed);
        assert_eq!(report.hits, 2);
        // The third fireball never reached a living player.
        assert!(projectiles[2].is_alive());

        let after = resolve_hostile_attacks(&mut player, &mut [], &mut projectiles, &ctx);
        assert!(!after.player_killed);
    }
}
