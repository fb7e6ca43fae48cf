//! Enemy AI.
//!
//! This module provides:
//! - Chasing with hard-reject separation (normal monsters, bosses)
//! - Distance-band kiting with fireballs (epic monsters)
//! - Telegraphed four-direction boss lasers
//!
//! Enemies update in collection order and see each other's already-updated
//! positions, so separation is checked against the current tick's state.

use glam::Vec2;
use lastrealm_common::{direction_to, distance_to_segment, EntityId, MapBounds};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EnemyRoster, LaserConfig};
use crate::enemy::{Behavior, Enemy};
use crate::projectile::{Projectile, ProjectileKind};

// ============================================================================
// Boss Lasers
// ============================================================================

/// Map-relative laser directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaserDirection {
    /// Toward -y.
    Up,
    /// Toward +x.
    Right,
    /// Toward +y.
    Down,
    /// Toward -x.
    Left,
}

impl LaserDirection {
    /// Clockwise order used by [`LaserCycle`].
    pub const ORDER: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Unit vector of the beam.
    #[must_use]
    pub const fn vector(&self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
        }
    }
}

/// Round-robin direction source shared by every boss in a run, so two bosses
/// never telegraph the same direction back to back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaserCycle {
    next: usize,
}

impl LaserCycle {
    /// Returns the next direction and advances.
    pub fn next_direction(&mut self) -> LaserDirection {
        let direction = LaserDirection::ORDER[self.next % LaserDirection::ORDER.len()];
        self.next = (self.next + 1) % LaserDirection::ORDER.len();
        direction
    }
}

/// Phase of a laser attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaserPhase {
    /// Telegraph: visible, harmless.
    Warning,
    /// Beam: damages the player once.
    Active,
}

/// A laser from telegraph to the end of its beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserAttack {
    direction: LaserDirection,
    origin: Vec2,
    phase: LaserPhase,
    remaining: f32,
    has_hit: bool,
}

impl LaserAttack {
    /// Begin the warning phase at `origin`.
    #[must_use]
    pub fn telegraph(origin: Vec2, direction: LaserDirection, config: &LaserConfig) -> Self {
        Self {
            direction,
            origin,
            phase: LaserPhase::Warning,
            remaining: config.warning,
            has_hit: false,
        }
    }

    /// Beam direction.
    #[must_use]
    pub fn direction(&self) -> LaserDirection {
        self.direction
    }

    /// Beam start point.
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> LaserPhase {
        self.phase
    }

    /// Whether the beam is on.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == LaserPhase::Active
    }

    /// Whether this activation already hit the player.
    #[must_use]
    pub fn has_hit(&self) -> bool {
        self.has_hit
    }

    /// Advances the phase timer. Returns false once the beam has ended.
    pub fn advance(&mut self, dt: f32, config: &LaserConfig) -> bool {
        self.remaining -= dt;
        if self.remaining > 0.0 {
            return true;
        }
        match self.phase {
            LaserPhase::Warning => {
                self.phase = LaserPhase::Active;
                self.remaining += config.active;
                debug!("Laser {:?} active", self.direction);
                true
            },
            LaserPhase::Active => false,
        }
    }

    /// End point of a beam spanning the whole map.
    #[must_use]
    pub fn end_point(&self, bounds: &MapBounds) -> Vec2 {
        self.origin + self.direction.vector() * bounds.longest_side()
    }

    /// Whether the beam can hit a circle at `point` now.
    #[must_use]
    pub fn can_hit(&self, point: Vec2, radius: f32, bounds: &MapBounds, config: &LaserConfig) -> bool {
        self.is_active()
            && !self.has_hit
            && distance_to_segment(point, self.origin, self.end_point(bounds)) <= config.half_width + radius
    }

    /// Records the activation's single hit.
    pub fn mark_hit(&mut self) {
        self.has_hit = true;
    }
}

// ============================================================================
// Update
// ============================================================================

/// Inputs shared by every enemy update in a tick.
#[derive(Debug)]
pub struct AiContext<'a> {
    /// Tick duration in seconds.
    pub dt: f32,
    /// Tick duration relative to the reference tick.
    pub frame_scale: f32,
    /// Player position.
    pub player: Vec2,
    /// Map bounds.
    pub bounds: &'a MapBounds,
    /// Enemy tuning.
    pub roster: &'a EnemyRoster,
    /// Difficulty damage multiplier, baked into fireballs at spawn.
    pub damage_multiplier: f32,
    /// Run-wide laser direction source.
    pub laser_cycle: &'a mut LaserCycle,
}

/// What the AI produced this tick.
#[derive(Debug, Default)]
pub struct AiOutput {
    /// Fireballs thrown by kiters.
    pub fireballs: Vec<Projectile>,
    /// Lasers that started telegraphing.
    pub telegraphs: Vec<(EntityId, LaserDirection)>,
}

/// What a single enemy wants to do before separation is checked.
enum Intent {
    Hold,
    Step(Vec2),
}

/// Updates every living enemy in order.
pub fn update_enemies(enemies: &mut [Enemy], ctx: &mut AiContext<'_>) -> AiOutput {
    let mut output = AiOutput::default();

    for index in 0..enemies.len() {
        if !enemies[index].is_alive() || enemies[index].discard_if_faulted() {
            continue;
        }

        let intent = plan(&mut enemies[index], ctx, &mut output);
        if let Intent::Step(step) = intent {
            let proposed = enemies[index].position() + step;
            if !is_crowded(enemies, index, proposed) {
                let clamped = ctx.bounds.clamp_with_margin(proposed, 0.0);
                enemies[index].set_position(clamped);
            }
        }
    }

    output
}

/// Runs per-kind timers and decides on a movement step.
fn plan(enemy: &mut Enemy, ctx: &mut AiContext<'_>, output: &mut AiOutput) -> Intent {
    let position = enemy.position();
    let toward = direction_to(position, ctx.player);
    let step = toward * enemy.speed() * ctx.frame_scale;
    let distance = position.distance(ctx.player);
    let id = enemy.id();

    match enemy.behavior_mut() {
        Behavior::Chaser => Intent::Step(step),
        Behavior::Kiter { fire_cooldown } => {
            let kiter = &ctx.roster.kiter;
            *fire_cooldown = (*fire_cooldown - ctx.dt).max(0.0);
            if *fire_cooldown <= 0.0 && distance <= kiter.attack_range && toward != Vec2::ZERO {
                let fireball = &ctx.roster.fireball;
                output.fireballs.push(
                    Projectile::new(
                        ProjectileKind::Fireball,
                        position,
                        toward * fireball.speed,
                        fireball.radius,
                        fireball.damage * ctx.damage_multiplier,
                    )
                    .with_lifetime(fireball.lifetime),
                );
                *fire_cooldown = kiter.fire_cooldown;
            }

            if distance > kiter.attack_range {
                Intent::Step(step)
            } else if distance < kiter.min_distance {
                Intent::Step(-step)
            } else {
                Intent::Hold
            }
        },
        Behavior::Boss {
            laser_cooldown,
            laser,
        } => {
            let config = &ctx.roster.laser;
            if let Some(attack) = laser.as_mut() {
                if !attack.advance(ctx.dt, config) {
                    *laser = None;
                    *laser_cooldown = config.cooldown;
                }
                // Bosses stand still while lasering.
                return Intent::Hold;
            }

            *laser_cooldown -= ctx.dt;
            if *laser_cooldown <= 0.0 {
                let direction = ctx.laser_cycle.next_direction();
                *laser = Some(LaserAttack::telegraph(position, direction, config));
                output.telegraphs.push((id, direction));
                debug!("Boss {id} telegraphs laser {direction:?}");
                return Intent::Hold;
            }
            Intent::Step(step)
        },
    }
}

/// Whether any other living enemy would be inside the mover's separation
/// distance at `proposed`.
fn is_crowded(enemies: &[Enemy], index: usize, proposed: Vec2) -> bool {
    let separation = enemies[index].separation();
    let separation_sq = separation * separation;
    enemies.iter().enumerate().any(|(other, enemy)| {
        other != index && enemy.is_alive() && enemy.position().distance_squared(proposed) < separation_sq
    })
}
