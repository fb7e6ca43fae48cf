//! Run clock and pause handling.
//!
//! This module manages the simulation clock:
//! - Advance wall time on every host tick
//! - Accumulate paused time while a modal is open
//! - Report elapsed run time with paused time excluded
//!
//! The clock is driven by the host's `dt` rather than an OS timer, so a run
//! replays identically from the same inputs.

use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Pause State
// ============================================================================

/// Why the run is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PauseReason {
    /// Not paused.
    #[default]
    NotPaused,
    /// A powerup choice is on screen.
    PowerupChoice,
    /// Paused by the player.
    PlayerPaused,
    /// Victory or defeat reached.
    RunOver,
}

impl PauseReason {
    /// Check if actually paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        !matches!(self, Self::NotPaused)
    }

    /// Whether choices may still be made while paused for this reason.
    #[must_use]
    pub const fn accepts_choice(&self) -> bool {
        matches!(self, Self::PowerupChoice)
    }

    /// Overlay message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NotPaused => "",
            Self::PowerupChoice => "Choose a powerup",
            Self::PlayerPaused => "PAUSED",
            Self::RunOver => "Run over",
        }
    }
}

// ============================================================================
// Run Clock
// ============================================================================

/// Simulation clock with nested pause reasons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunClock {
    /// Current pause reason.
    reason: PauseReason,
    /// Reasons shadowed by the current one.
    pause_stack: Vec<PauseReason>,
    /// Host time seen since the run started.
    wall_time: f64,
    /// Host time spent paused.
    total_paused_time: f64,
    /// Host time spent in the current pause.
    current_pause: f64,
}

impl RunClock {
    /// Create a running clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current pause reason.
    #[must_use]
    pub fn reason(&self) -> PauseReason {
        self.reason
    }

    /// Check if the clock is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.reason.is_paused()
    }

    /// Host time seen since the run started.
    #[must_use]
    pub fn wall_time(&self) -> f64 {
        self.wall_time
    }

    /// Total paused time in seconds.
    #[must_use]
    pub fn total_paused_time(&self) -> f64 {
        self.total_paused_time
    }

    /// Duration of the pause in progress.
    #[must_use]
    pub fn current_pause_duration(&self) -> f64 {
        self.current_pause
    }

    /// Run time with paused time excluded.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        (self.wall_time - self.total_paused_time).max(0.0)
    }

    /// Elapsed time as `f32`, the precision the simulation runs at.
    #[must_use]
    pub fn now(&self) -> f32 {
        self.elapsed() as f32
    }

    /// Advances the clock by one host tick.
    pub fn advance(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.wall_time += dt;
        if self.is_paused() {
            self.total_paused_time += dt;
            self.current_pause += dt;
        }
    }

    /// Pause for `reason`. Nested reasons are stacked.
    pub fn pause(&mut self, reason: PauseReason) {
        if !reason.is_paused() {
            return;
        }
        if !self.is_paused() {
            self.current_pause = 0.0;
        }
        if self.reason != reason && self.reason.is_paused() {
            self.pause_stack.push(self.reason);
        }
        debug!("Clock paused: {:?}", reason);
        self.reason = reason;
    }

    /// Resume from the current pause reason.
    pub fn resume(&mut self) {
        self.resume_from(self.reason);
    }

    /// Resume from a specific pause reason.
    pub fn resume_from(&mut self, reason: PauseReason) {
        if self.reason != reason {
            self.pause_stack.retain(|r| *r != reason);
            return;
        }
        if let Some(previous) = self.pause_stack.pop() {
            self.reason = previous;
        } else {
            self.complete_resume();
        }
    }

    /// Force resume, clearing all pause states.
    pub fn force_resume(&mut self) {
        self.pause_stack.clear();
        self.complete_resume();
    }

    fn complete_resume(&mut self) {
        if self.is_paused() {
            debug!("Clock resumed after {:.2}s", self.current_pause);
        }
        self.current_pause = 0.0;
        self.reason = PauseReason::NotPaused;
    }

    /// Toggle a player pause.
    pub fn toggle_pause(&mut self) {
        if self.reason == PauseReason::PlayerPaused {
            self.resume_from(PauseReason::PlayerPaused);
        } else if !self.is_paused() {
            self.pause(PauseReason::PlayerPaused);
        }
    }

    /// Reset for a new run.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_reason() {
        assert!(!PauseReason::NotPaused.is_paused());
        assert!(PauseReason::PowerupChoice.is_paused());
        assert!(PauseReason::PowerupChoice.accepts_choice());
        assert!(!PauseReason::PlayerPaused.accepts_choice());
        assert_eq!(PauseReason::PlayerPaused.message(), "PAUSED");
    }

    #[test]
    fn test_elapsed_excludes_paused_time() {
        let mut clock = RunClock::new();
        clock.advance(10.0);
        clock.pause(PauseReason::PowerupChoice);
        clock.advance(4.0);
        assert!((clock.current_pause_duration() - 4.0).abs() < 1e-9);
        clock.resume();
        clock.advance(2.0);

        assert!((clock.wall_time() - 16.0).abs() < 1e-9);
        assert!((clock.total_paused_time() - 4.0).abs() < 1e-9);
        assert!((clock.elapsed() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_nested_pause() {
        let mut clock = RunClock::new();
        clock.pause(PauseReason::PowerupChoice);
        clock.pause(PauseReason::PlayerPaused);
        assert_eq!(clock.reason(), PauseReason::PlayerPaused);

        clock.resume_from(PauseReason::PlayerPaused);
        assert_eq!(clock.reason(), PauseReason::PowerupChoice);

        clock.resume_from(PauseReason::PowerupChoice);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_resume_from_shadowed_reason() {
        let mut clock = RunClock::new();
        clock.pause(PauseReason::PowerupChoice);
        clock.pause(PauseReason::PlayerPaused);
        clock.resume_from(PauseReason::PowerupChoice);
        assert_eq!(clock.reason(), PauseReason::PlayerPaused);
        clock.resume();
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_toggle_and_force_resume() {
        let mut clock = RunClock::new();
        clock.toggle_pause();
        assert_eq!(clock.reason(), PauseReason::PlayerPaused);
        clock.toggle_pause();
        assert!(!clock.is_paused());

        clock.pause(PauseReason::PowerupChoice);
        // Toggling does not hide a modal.
        clock.toggle_pause();
        assert_eq!(clock.reason(), PauseReason::PowerupChoice);
        clock.force_resume();
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_invalid_dt_ignored() {
        let mut clock = RunClock::new();
        clock.advance(f64::NAN);
        clock.advance(-1.0);
        assert_eq!(clock.wall_time(), 0.0);
    }
}
