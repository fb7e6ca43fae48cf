//! Experience curve and timed difficulty escalation.
//!
//! The difficulty controller runs on the run clock (paused time excluded) and
//! is independent of player level. Each step of the repeating cycle is keyed
//! by `(cycle index, step)` in an applied set, so a clock that jumps or a
//! tick that stalls can never fire the same step twice.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{DifficultyConfig, ProgressionConfig};
use crate::session::GameMode;

// ============================================================================
// Experience
// ============================================================================

/// Multiplicative experience thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperienceCurve {
    base: u32,
    growth: f32,
}

impl Default for ExperienceCurve {
    fn default() -> Self {
        Self::from_config(&ProgressionConfig::default())
    }
}

impl ExperienceCurve {
    /// Builds the curve from progression tuning.
    #[must_use]
    pub fn from_config(config: &ProgressionConfig) -> Self {
        Self {
            base: config.base_threshold.max(1),
            growth: config.threshold_growth.max(1.0),
        }
    }

    /// Threshold for the first level-up.
    #[must_use]
    pub fn base_threshold(&self) -> u32 {
        self.base
    }

    /// Threshold following `current`, floored and always strictly larger.
    #[must_use]
    pub fn next_threshold(&self, current: u32) -> u32 {
        let grown = (current as f32 * self.growth).floor() as u32;
        grown.max(current.saturating_add(1))
    }
}

// ============================================================================
// Difficulty Steps
// ============================================================================

/// One scheduled escalation inside a difficulty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyStep {
    /// Contact-damage multiplier grows.
    DamageUp,
    /// One more monster per wave.
    SpawnCountUp,
    /// Enemy speed multiplier grows, living enemies included.
    SpeedUp,
    /// One-off burst of epic monsters.
    EpicBurst,
}

impl DifficultyStep {
    /// Short name for logs and events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DamageUp => "damage_up",
            Self::SpawnCountUp => "spawn_count_up",
            Self::SpeedUp => "speed_up",
            Self::EpicBurst => "epic_burst",
        }
    }
}

/// A step that fired during [`DifficultyController::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAction {
    /// Which step fired.
    pub step: DifficultyStep,
    /// Cycle index it belongs to.
    pub cycle: u32,
    /// Speed factor to apply to living enemies (1.0 unless `SpeedUp`).
    pub speed_factor: f32,
    /// Epics to spawn (0 unless `EpicBurst`).
    pub epic_count: u32,
}

// ============================================================================
// Controller
// ============================================================================

/// Tracks the difficulty multipliers and the boss trigger for one run.
#[derive(Debug, Clone)]
pub struct DifficultyController {
    config: DifficultyConfig,
    damage_multiplier: f32,
    spawn_count: u32,
    speed_multiplier: f32,
    applied: AHashSet<(u32, DifficultyStep)>,
    /// Every cycle before this one has all of its steps applied.
    first_open_cycle: u32,
    boss_fired: bool,
}

impl Default for DifficultyController {
    fn default() -> Self {
        Self::new(DifficultyConfig::default())
    }
}

impl DifficultyController {
    /// Create a controller at base difficulty.
    #[must_use]
    pub fn new(config: DifficultyConfig) -> Self {
        Self {
            config,
            damage_multiplier: 1.0,
            spawn_count: 1,
            speed_multiplier: 1.0,
            applied: AHashSet::new(),
            first_open_cycle: 0,
            boss_fired: false,
        }
    }

    /// Current enemy contact-damage multiplier.
    #[must_use]
    pub fn damage_multiplier(&self) -> f32 {
        self.damage_multiplier
    }

    /// Monsters per spawn wave.
    #[must_use]
    pub fn spawn_count(&self) -> u32 {
        self.spawn_count
    }

    /// Current enemy speed multiplier.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Whether a step has already fired for a cycle.
    #[must_use]
    pub fn is_applied(&self, cycle: u32, step: DifficultyStep) -> bool {
        self.applied.contains(&(cycle, step))
    }

    /// Whether the boss trigger has fired.
    #[must_use]
    pub fn boss_fired(&self) -> bool {
        self.boss_fired
    }

    fn schedule(&self) -> [(DifficultyStep, f32); 4] {
        [
            (DifficultyStep::DamageUp, self.config.damage_step_at),
            (DifficultyStep::SpawnCountUp, self.config.spawn_step_at),
            (DifficultyStep::SpeedUp, self.config.speed_step_at),
            (DifficultyStep::EpicBurst, self.config.epic_burst_at),
        ]
    }

    /// Fire every step whose time has come at `elapsed` seconds and return
    /// what fired, oldest first.
    pub fn advance(&mut self, elapsed: f32) -> Vec<DifficultyAction> {
        let mut fired = Vec::new();
        if !elapsed.is_finite() || elapsed < 0.0 {
            return fired;
        }

        let length = self.config.cycle_length;
        let current = (elapsed / length).floor() as u32;
        let schedule = self.schedule();

        for cycle in self.first_open_cycle..=current {
            let cycle_start = cycle as f32 * length;
            for (step, offset) in schedule {
                if elapsed < cycle_start + offset {
                    continue;
                }
                if !self.applied.insert((cycle, step)) {
                    continue;
                }
                fired.push(self.apply(step, cycle));
            }
        }
        self.first_open_cycle = current;

        fired
    }

    fn apply(&mut self, step: DifficultyStep, cycle: u32) -> DifficultyAction {
        let mut action = DifficultyAction {
            step,
            cycle,
            speed_factor: 1.0,
            epic_count: 0,
        };
        match step {
            DifficultyStep::DamageUp => {
                self.damage_multiplier *= self.config.damage_step_factor;
            },
            DifficultyStep::SpawnCountUp => {
                self.spawn_count = self.spawn_count.saturating_add(self.config.spawn_step_amount);
            },
            DifficultyStep::SpeedUp => {
                self.speed_multiplier *= self.config.speed_step_factor;
                action.speed_factor = self.config.speed_step_factor;
            },
            DifficultyStep::EpicBurst => {
                action.epic_count = self.config.epic_burst_base.saturating_add(cycle);
            },
        }
        info!(
            "Difficulty step {} (cycle {}): damage x{:.2}, spawn {}, speed x{:.2}",
            step.name(),
            cycle,
            self.damage_multiplier,
            self.spawn_count,
            self.speed_multiplier
        );
        action
    }

    /// One-shot boss trigger. Timed mode fires once the threshold passes;
    /// boss rush fires on the first poll; infinite never fires.
    pub fn poll_boss(&mut self, elapsed: f32, mode: GameMode) -> bool {
        if self.boss_fired {
            return false;
        }
        let due = match mode {
            GameMode::Infinite => false,
            GameMode::Timed => elapsed >= self.config.timed_boss_at,
            GameMode::BossRush => true,
        };
        if due {
            debug!("Boss trigger fired at {elapsed:.1}s");
            self.boss_fired = true;
        }
        due
    }
}
