//! Spawn scheduling and placement.
//!
//! The scheduler is owned by the run and ticked with the run clock, so it
//! freezes while a modal is open. Placement uses the run's seeded RNG.

use std::f32::consts::TAU;

use glam::Vec2;
use lastrealm_common::{from_angle, MapBounds};
use serde::{Deserialize, Serialize};

use crate::config::{PowerupConfig, SpawnConfig};
use crate::enemy::Enemy;

/// Most times a timer may fire in one tick after a long stall.
const MAX_CATCH_UP: u32 = 4;

/// Placement attempts before accepting a crowded spawn point.
const PLACEMENT_ATTEMPTS: usize = 8;

// ============================================================================
// Timers
// ============================================================================

/// Repeating countdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalTimer {
    interval: f32,
    remaining: f32,
}

impl IntervalTimer {
    /// Fires first after `first_delay`, then every `interval`.
    #[must_use]
    pub fn new(interval: f32, first_delay: f32) -> Self {
        Self {
            interval: interval.max(f32::EPSILON),
            remaining: first_delay.max(0.0),
        }
    }

    /// Seconds until the next firing.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Counts down and returns how many times the timer fired.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.remaining -= dt;
        let mut fired = 0;
        while self.remaining <= 0.0 && fired < MAX_CATCH_UP {
            self.remaining += self.interval;
            fired += 1;
        }
        if self.remaining <= 0.0 {
            self.remaining = self.interval;
        }
        fired
    }
}

/// What is due this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnRequests {
    /// Monster waves due.
    pub monster_waves: u32,
    /// Single epic spawns due.
    pub epics: u32,
    /// Map powerups due.
    pub powerups: u32,
}

/// Run-owned spawn timers.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnScheduler {
    monsters: IntervalTimer,
    epics: IntervalTimer,
    powerups: IntervalTimer,
}

impl SpawnScheduler {
    /// Create timers from tuning.
    #[must_use]
    pub fn new(spawning: &SpawnConfig, powerups: &PowerupConfig) -> Self {
        Self {
            monsters: IntervalTimer::new(spawning.monster_interval, spawning.first_monster_delay),
            epics: IntervalTimer::new(spawning.epic_interval, spawning.first_epic_delay),
            powerups: IntervalTimer::new(powerups.spawn_interval, powerups.spawn_interval),
        }
    }

    /// Advances every timer.
    pub fn tick(&mut self, dt: f32) -> SpawnRequests {
        SpawnRequests {
            monster_waves: self.monsters.tick(dt),
            epics: self.epics.tick(dt),
            powerups: self.powerups.tick(dt),
        }
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Random point on a ring around `center`, clamped to the map.
pub fn ring_point(center: Vec2, min: f32, max: f32, bounds: &MapBounds, rng: &mut fastrand::Rng) -> Vec2 {
    let angle = rng.f32() * TAU;
    let distance = min + rng.f32() * (max - min).max(0.0);
    bounds.clamp_with_margin(center + from_angle(angle) * distance, 0.0)
}

/// Random point inside the map minus `margin`.
pub fn random_map_point(bounds: &MapBounds, margin: f32, rng: &mut fastrand::Rng) -> Vec2 {
    let margin = margin.min(bounds.width * 0.5).min(bounds.height * 0.5).max(0.0);
    Vec2::new(
        margin + rng.f32() * (bounds.width - 2.0 * margin),
        margin + rng.f32() * (bounds.height - 2.0 * margin),
    )
}

/// Ring point that keeps `separation` from living enemies when possible.
///
/// Separation rejects any move that ends too close to another enemy, so an
/// enemy spawned inside another's separation would never move.
pub fn clear_ring_point(
    center: Vec2,
    spawning: &SpawnConfig,
    separation: f32,
    enemies: &[Enemy],
    bounds: &MapBounds,
    rng: &mut fastrand::Rng,
) -> Vec2 {
    let mut point = ring_point(center, spawning.ring_min, spawning.ring_max, bounds, rng);
    for _ in 1..PLACEMENT_ATTEMPTS {
        let crowded = enemies
            .iter()
            .filter(|e| e.is_alive())
            .any(|e| e.position().distance(point) < separation.max(e.separation()));
        if !crowded {
            break;
        }
        point = ring_point(center, spawning.ring_min, spawning.ring_max, bounds, rng);
    }
    point
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnemyRoster;
    use crate::enemy::EnemyKind;

    #[test]
    fn test_interval_timer_first_delay() {
        let mut timer = IntervalTimer::new(2.0, 1.0);
        assert_eq!(timer.tick(0.5), 0);
        assert_eq!(timer.tick(0.5), 1);
        assert_eq!(timer.tick(1.5), 0);
        assert_eq!(timer.tick(0.5), 1);
    }

    #[test]
    fn test_interval_timer_catch_up_is_bounded() {
        let mut timer = IntervalTimer::new(1.0, 1.0);
        assert_eq!(timer.tick(100.0), MAX_CATCH_UP);
        assert!(timer.remaining() > 0.0);
        assert_eq!(timer.tick(0.0), 0);
    }

    #[test]
    fn test_scheduler_defaults() {
        let mut scheduler = SpawnScheduler::new(&SpawnConfig::default(), &PowerupConfig::default());
        let mut totals = SpawnRequests::default();
        // 30.5 seconds at 1/10 s steps.
        for _ in 0..305 {
            let due = scheduler.tick(0.1);
            totals.monster_waves += due.monster_waves;
            totals.epics += due.epics;
            totals.powerups += due.powerups;
        }
        // Waves at 1, 3, ..., 29 s; epics at 10 s; powerups at 15 and 30 s.
        assert_eq!(totals.monster_waves, 15);
        assert_eq!(totals.epics, 1);
        assert_eq!(totals.powerups, 2);
    }

    #[test]
    fn test_ring_point_distance() {
        let bounds = MapBounds::default();
        let mut rng = fastrand::Rng::with_seed(7);
        let center = bounds.center();
        for _ in 0..100 {
            let p = ring_point(center, 450.0, 650.0, &bounds, &mut rng);
            let d = p.distance(center);
            assert!((450.0 - 1e-3..=650.0 + 1e-3).contains(&d));
        }
    }

    #[test]
    fn test_ring_point_clamped_to_map() {
        let bounds = MapBounds::default();
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..100 {
            let p = ring_point(Vec2::new(10.0, 10.0), 450.0, 650.0, &bounds, &mut rng);
            assert!(bounds.contains_with_margin(p, 0.0));
        }
    }

    #[test]
    fn test_random_map_point_respects_margin() {
        let bounds = MapBounds::new(300.0, 200.0);
        let mut rng = fastrand::Rng::with_seed(11);
        for _ in 0..100 {
            let p = random_map_point(&bounds, 50.0, &mut rng);
            assert!((50.0..=250.0).contains(&p.x));
            assert!((50.0..=150.0).contains(&p.y));
        }
    }

    #[test]
    fn test_clear_ring_point_avoids_enemies() {
        let bounds = MapBounds::default();
        let roster = EnemyRoster::default();
        let center = bounds.center();
        let mut rng = fastrand::Rng::with_seed(5);
        let first = clear_ring_point(center, &SpawnConfig::default(), 25.0, &[], &bounds, &mut rng);
        let enemies = vec![Enemy::spawn(EnemyKind::Normal, first, &roster, 1.0)];
        let second = clear_ring_point(center, &SpawnConfig::default(), 25.0, &enemies, &bounds, &mut rng);
        assert!(second.distance(first) >= 25.0);
    }
}
