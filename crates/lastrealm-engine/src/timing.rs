//! Fixed-step timing.
//!
//! The driver feeds host frame time into an accumulator and runs as many
//! fixed simulation steps as fit, with a cap so a stall cannot spiral.

use std::time::{Duration, Instant};

/// Most fixed steps run for one frame.
pub const MAX_STEPS_PER_FRAME: u32 = 10;

/// Largest frame delta accepted.
pub const MAX_FRAME_DT: f32 = 0.25;

/// Fixed-step timing manager.
#[derive(Debug)]
pub struct FrameTiming {
    /// Fixed timestep delta
    fixed_dt: f32,
    /// Accumulator for fixed timestep
    accumulator: f32,
    /// Time of last frame start
    last_frame: Instant,
    /// Total fixed steps handed out
    total_steps: u64,
}

impl FrameTiming {
    /// Create a timing manager stepping `tick_rate` times per second.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        Self {
            fixed_dt: 1.0 / tick_rate.max(1) as f32,
            accumulator: 0.0,
            last_frame: Instant::now(),
            total_steps: 0,
        }
    }

    /// Get the fixed timestep value.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Fixed steps handed out since creation or reset.
    #[must_use]
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Wall time since the last frame, clamped to [`MAX_FRAME_DT`].
    pub fn delta_time(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        dt.min(MAX_FRAME_DT)
    }

    /// Accumulate time for fixed timestep updates.
    /// Returns the number of fixed updates that should be performed.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt.min(MAX_FRAME_DT);

        let mut count = 0;
        while self.accumulator >= self.fixed_dt && count < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind after the cap: drop the backlog.
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        self.total_steps += u64::from(count);
        count
    }

    /// Sleep until one fixed step has passed since the last frame.
    pub fn sleep_remainder(&self) {
        let budget = Duration::from_secs_f32(self.fixed_dt);
        let elapsed = self.last_frame.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
    }

    /// Reset timing (call after a run ends or a long pause).
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.accumulator = 0.0;
        self.total_steps = 0;
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_whole_steps() {
        let mut timing = FrameTiming::new(60);
        assert_eq!(timing.accumulate(1.0 / 30.0 + 0.0001), 2);
        assert_eq!(timing.accumulate(0.001), 0);
        assert_eq!(timing.total_steps(), 2);
    }

    #[test]
    fn test_accumulate_carries_remainder() {
        let mut timing = FrameTiming::new(10);
        assert_eq!(timing.accumulate(0.06), 0);
        assert_eq!(timing.accumulate(0.06), 1);
    }

    #[test]
    fn test_accumulate_caps_steps() {
        let mut timing = FrameTiming::new(240);
        // Clamped to 0.25 s = 60 steps, capped at 10 and the rest dropped.
        assert_eq!(timing.accumulate(5.0), MAX_STEPS_PER_FRAME);
        assert_eq!(timing.accumulate(0.0), 0);
        assert!(timing.accumulate(1.0 / 240.0 + 1e-4) <= 1);
    }

    #[test]
    fn test_accumulate_rejects_bad_dt() {
        let mut timing = FrameTiming::default();
        assert_eq!(timing.accumulate(f32::NAN), 0);
        assert_eq!(timing.accumulate(-1.0), 0);
    }

    #[test]
    fn test_reset() {
        let mut timing = FrameTiming::new(60);
        timing.accumulate(0.1);
        timing.reset();
        assert_eq!(timing.total_steps(), 0);
        assert_eq!(timing.accumulate(0.001), 0);
    }
}
