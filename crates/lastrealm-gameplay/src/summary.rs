//! End-of-run summary and the sinks that receive it.

use std::io;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::PlayerClass;
use crate::session::GameMode;

/// Errors a summary sink may report. The run logs them and moves on.
#[derive(Debug, Error)]
pub enum SummarySinkError {
    /// Writing failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Encoding the summary failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The sink refused the summary.
    #[error("Summary rejected: {0}")]
    Rejected(String),
}

/// Result alias for summary sinks.
pub type SummarySinkResult<T> = Result<T, SummarySinkError>;

/// Final statistics of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Enemies killed, epics and bosses included.
    pub kills: u32,
    /// Epic monsters killed.
    pub epic_kills: u32,
    /// Whole seconds of run time, pauses excluded.
    pub time_seconds: u64,
    /// Highest level reached.
    pub max_level: u32,
    /// Boss rush won.
    pub hero_mode_win: bool,
    /// Timed mode won.
    pub normal_mode_win: bool,
    /// `kills * time_seconds`.
    pub score: u64,
    /// Mode played.
    pub mode: GameMode,
    /// Class played.
    pub class: PlayerClass,
    /// Whether the run ended in victory.
    pub victory: bool,
}

impl RunSummary {
    /// Score for a run: kills times whole elapsed seconds.
    #[must_use]
    pub fn compute_score(kills: u32, elapsed_seconds: f64) -> u64 {
        u64::from(kills).saturating_mul(whole_seconds(elapsed_seconds))
    }

    /// Builds a summary, deriving the score and mode flags.
    #[must_use]
    pub fn new(
        mode: GameMode,
        class: PlayerClass,
        victory: bool,
        kills: u32,
        epic_kills: u32,
        elapsed_seconds: f64,
        max_level: u32,
    ) -> Self {
        Self {
            kills,
            epic_kills,
            time_seconds: whole_seconds(elapsed_seconds),
            max_level,
            hero_mode_win: victory && mode == GameMode::BossRush,
            normal_mode_win: victory && mode == GameMode::Timed,
            score: Self::compute_score(kills, elapsed_seconds),
            mode,
            class,
            victory,
        }
    }
}

fn whole_seconds(elapsed: f64) -> u64 {
    if elapsed.is_finite() && elapsed > 0.0 {
        elapsed.floor() as u64
    } else {
        0
    }
}

/// Receives the summary of every finished run.
pub trait RunSummarySink: Send {
    /// Sink name for logs.
    fn name(&self) -> &str;

    /// Delivers one summary.
    fn submit(&mut self, summary: &RunSummary) -> SummarySinkResult<()>;
}

/// Discards summaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSummarySink;

impl RunSummarySink for NullSummarySink {
    fn name(&self) -> &str {
        "null"
    }

    fn submit(&mut self, _summary: &RunSummary) -> SummarySinkResult<()> {
        Ok(())
    }
}

/// Keeps summaries in memory behind a shared handle.
#[derive(Debug, Clone, Default)]
pub struct RecordingSummarySink {
    records: Arc<Mutex<Vec<RunSummary>>>,
}

impl RecordingSummarySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the recorded summaries.
    #[must_use]
    pub fn handle(&self) -> Arc<Mutex<Vec<RunSummary>>> {
        Arc::clone(&self.records)
    }

    /// Copy of every recorded summary.
    #[must_use]
    pub fn recorded(&self) -> Vec<RunSummary> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl RunSummarySink for RecordingSummarySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn submit(&mut self, summary: &RunSummary) -> SummarySinkResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| SummarySinkError::Rejected("record lock poisoned".to_string()))?;
        records.push(summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score() {
        assert_eq!(RunSummary::compute_score(12, 185.0), 2220);
        assert_eq!(RunSummary::compute_score(12, 185.9), 2220);
        assert_eq!(RunSummary::compute_score(0, 500.0), 0);
        assert_eq!(RunSummary::compute_score(10, f64::NAN), 0);
    }

    #[test]
    fn test_mode_flags() {
        let hero = RunSummary::new(GameMode::BossRush, PlayerClass::Rogue, true, 1, 0, 10.0, 6);
        assert!(hero.hero_mode_win);
        assert!(!hero.normal_mode_win);

        let normal = RunSummary::new(GameMode::Timed, PlayerClass::Warrior, true, 40, 2, 320.5, 9);
        assert!(normal.normal_mode_win);
        assert_eq!(normal.time_seconds, 320);
        assert_eq!(normal.score, 40 * 320);

        let lost = RunSummary::new(GameMode::Timed, PlayerClass::Warrior, false, 40, 2, 100.0, 3);
        assert!(!lost.normal_mode_win && !lost.hero_mode_win);
    }

    #[test]
    fn test_summary_json_field_names() {
        let summary = RunSummary::new(GameMode::Infinite, PlayerClass::Wizard, false, 3, 1, 42.0, 2);
        let json = serde_json::to_value(&summary).expect("summary serializes");
        for field in ["kills", "epic_kills", "time_seconds", "max_level", "hero_mode_win", "normal_mode_win"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingSummarySink::new();
        let handle = sink.handle();
        let summary = RunSummary::new(GameMode::Infinite, PlayerClass::Wizard, false, 3, 1, 42.0, 2);
        sink.submit(&summary).expect("memory sink accepts");
        assert_eq!(sink.recorded(), vec![summary]);
        assert_eq!(handle.lock().expect("lock").len(), 1);
        assert_eq!(NullSummarySink.name(), "null");
    }
}
