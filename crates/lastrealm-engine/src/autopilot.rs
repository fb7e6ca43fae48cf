//! Scripted player for headless runs.
//!
//! Steers away from nearby enemies, hostile projectiles, laser lanes and the
//! map edge, drifts toward map powerups when nothing threatens, and answers
//! powerup choices from a preference list.

use glam::Vec2;
use lastrealm_common::MapBounds;
use lastrealm_gameplay::{Arena, DirectionalInput, EnemyKind, LaserConfig, PowerupChoice};
use serde::{Deserialize, Serialize};

/// Autopilot tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Threats closer than this push the player away.
    pub threat_radius: f32,
    /// Distance from the map edge where the edge starts pushing back.
    pub wall_margin: f32,
    /// Lanes this many half-widths around a laser are avoided.
    pub laser_caution: f32,
    /// Axis components below this are not pressed.
    pub deadzone: f32,
    /// Powerup ids in order of preference.
    pub preferred: Vec<String>,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            threat_radius: 200.0,
            wall_margin: 150.0,
            laser_caution: 2.0,
            deadzone: 0.15,
            preferred: [
                "hp_up",
                "damage_reduction",
                "damage_bonus",
                "multi_shot",
                "sword_count",
                "spear_count",
                "player_speed",
            ]
            .iter()
            .map(|id| (*id).to_string())
            .collect(),
        }
    }
}

/// Produces input and choice picks for a run.
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    config: AutopilotConfig,
}

impl Autopilot {
    /// Create an autopilot.
    #[must_use]
    pub fn new(config: AutopilotConfig) -> Self {
        Self { config }
    }

    /// Direction to move this tick.
    #[must_use]
    pub fn steer(&self, arena: &Arena, bounds: &MapBounds, laser: &LaserConfig) -> DirectionalInput {
        let player = arena.player.position();
        let mut push = self.threat_push(arena, player);
        push += self.laser_push(arena, player, bounds, laser);
        push += self.wall_push(player, bounds);

        if push.length_squared() < self.config.deadzone * self.config.deadzone {
            push = nearest_pickup(arena, player).map_or(Vec2::ZERO, |target| (target - player).normalize_or_zero());
        }
        self.to_input(push)
    }

    /// Option to take from an open choice.
    #[must_use]
    pub fn choose(&self, choice: &PowerupChoice) -> usize {
        choice
            .options
            .iter()
            .enumerate()
            .min_by_key(|(_, option)| {
                self.config
                    .preferred
                    .iter()
                    .position(|id| *id == option.id)
                    .unwrap_or(usize::MAX)
            })
            .map_or(0, |(index, _)| index)
    }

    fn threat_push(&self, arena: &Arena, player: Vec2) -> Vec2 {
        let radius = self.config.threat_radius;
        let enemies = arena.enemies.iter().filter(|e| e.is_alive()).map(|e| {
            let weight = if e.kind() == EnemyKind::Boss { 2.0 } else { 1.0 };
            (e.position(), radius + e.radius(), weight)
        });
        let projectiles = arena
            .projectiles
            .iter()
            .filter(|p| p.is_alive() && p.is_hostile())
            .map(|p| (p.position(), radius, 1.5));

        enemies
            .chain(projectiles)
            .map(|(position, reach, weight)| {
                let away = player - position;
                let distance = away.length();
                if distance >= reach {
                    return Vec2::ZERO;
                }
                away.normalize_or_zero() * (1.0 - distance / reach) * weight
            })
            .sum()
    }

    fn laser_push(&self, arena: &Arena, player: Vec2, bounds: &MapBounds, laser: &LaserConfig) -> Vec2 {
        let lane = laser.half_width * self.config.laser_caution + arena.player.radius();
        arena
            .enemies
            .iter()
            .filter_map(|e| e.laser())
            .map(|attack| {
                let origin = attack.origin();
                let beam = attack.end_point(bounds) - origin;
                let t = ((player - origin).dot(beam) / beam.length_squared().max(f32::EPSILON)).clamp(0.0, 1.0);
                let away = player - (origin + beam * t);
                if away.length() >= lane {
                    return Vec2::ZERO;
                }
                let side = if away.length_squared() > f32::EPSILON {
                    away.normalize()
                } else {
                    attack.direction().vector().perp()
                };
                side * 3.0
            })
            .sum()
    }

    fn wall_push(&self, player: Vec2, bounds: &MapBounds) -> Vec2 {
        let margin = self.config.wall_margin;
        let mut push = Vec2::ZERO;
        if player.x < margin {
            push.x += 1.0;
        }
        if player.x > bounds.width - margin {
            push.x -= 1.0;
        }
        if player.y < margin {
            push.y += 1.0;
        }
        if player.y > bounds.height - margin {
            push.y -= 1.0;
        }
        push
    }

    fn to_input(&self, push: Vec2) -> DirectionalInput {
        let deadzone = self.config.deadzone;
        DirectionalInput {
            up: push.y < -deadzone,
            down: push.y > deadzone,
            left: push.x < -deadzone,
            right: push.x > deadzone,
        }
    }
}

fn nearest_pickup(arena: &Arena, player: Vec2) -> Option<Vec2> {
    arena
        .pickups
        .iter()
        .filter(|p| p.is_alive())
        .map(|p| p.position())
        .min_by(|a, b| a.distance_squared(player).total_cmp(&b.distance_squared(player)))
}
