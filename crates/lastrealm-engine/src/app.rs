//! Headless application loop.
//!
//! Drives runs with the fixed-step timer and the autopilot, answering
//! powerup choices and draining the event bus between frames.

use lastrealm_gameplay::{
    BuiltinWeaponStats, DirectionalInput, GameEvent, Run, RunState, RunSummary, SessionError, SessionResult,
    WeaponStatSource,
};
use tracing::{debug, info, warn};

use crate::autopilot::Autopilot;
use crate::catalog_loader::catalog_or_builtin;
use crate::config::EngineConfig;
use crate::run_report::JsonLinesSummarySink;
use crate::timing::FrameTiming;
use crate::weapon_loader::WeaponStatLoader;

/// How one driven run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// State when the driver stopped.
    pub state: RunState,
    /// Summary, if the run reached a terminal state.
    pub summary: Option<RunSummary>,
    /// Run time in seconds, pauses excluded.
    pub elapsed: f64,
    /// Fixed steps performed.
    pub steps: u64,
    /// Events drained from the bus.
    pub events: usize,
    /// Powerups chosen by the autopilot.
    pub choices: u32,
}

impl RunOutcome {
    /// Whether the run stopped on the time limit rather than ending.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        !self.state.is_terminal()
    }
}

/// Melee stat source selected by configuration.
enum StatSource {
    Builtin(BuiltinWeaponStats),
    File(WeaponStatLoader),
}

impl StatSource {
    fn from_config(config: &EngineConfig) -> Self {
        let Some(path) = &config.weapon_stats_path else {
            return Self::Builtin(BuiltinWeaponStats);
        };
        match WeaponStatLoader::open(path) {
            Ok(loader) => Self::File(loader),
            Err(e) => {
                warn!("{e}, using built-in weapon stats");
                Self::Builtin(BuiltinWeaponStats)
            },
        }
    }

    fn as_source(&self) -> &dyn WeaponStatSource {
        match self {
            Self::Builtin(builtin) => builtin,
            Self::File(loader) => loader,
        }
    }

    fn refresh(&mut self) {
        if let Self::File(loader) = self {
            match loader.reload_if_changed() {
                Ok(true) => info!("Reloaded weapon stats from {}", loader.path().display()),
                Ok(false) => {},
                Err(e) => warn!("Keeping previous weapon stats: {e}"),
            }
        }
    }
}

/// Headless host owning one [`Run`] and everything that drives it.
pub struct App {
    config: EngineConfig,
    run: Run,
    stats: StatSource,
    autopilot: Autopilot,
    timing: FrameTiming,
}

impl App {
    /// Build the host from a validated configuration.
    #[must_use]
    pub fn new(mut config: EngineConfig) -> Self {
        config.validate();

        Self {
            run: Self::build_run(&config),
            stats: StatSource::from_config(&config),
            autopilot: Autopilot::new(config.autopilot.clone()),
            timing: FrameTiming::new(config.tick_rate),
            config,
        }
    }

    fn build_run(config: &EngineConfig) -> Run {
        let catalog = catalog_or_builtin(config.powerup_catalog_path.as_deref());
        Run::new(config.sim.clone())
            .with_catalog(catalog)
            .with_sink(Box::new(JsonLinesSummarySink::new(&config.summary_path)))
            .with_event_capacity(config.event_capacity)
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The run being driven.
    #[must_use]
    pub fn run(&self) -> &Run {
        &self.run
    }

    /// Play `config.runs` runs back to back.
    pub fn run_all(&mut self) -> SessionResult<Vec<RunOutcome>> {
        let mut outcomes = Vec::with_capacity(self.config.runs as usize);
        for index in 0..self.config.runs {
            if index > 0 {
                self.stats.refresh();
            }
            outcomes.push(self.play_once()?);
        }
        Ok(outcomes)
    }

    /// Play one run until it ends or hits the time limit, then return to
    /// character select.
    pub fn play_once(&mut self) -> SessionResult<RunOutcome> {
        self.run
            .start(self.config.class, self.config.mode, self.stats.as_source())?;
        self.timing.reset();

        let mut events = 0;
        let mut choices = 0;
        let fixed_dt = self.timing.fixed_dt();

        loop {
            let steps = if self.config.realtime {
                let dt = self.timing.delta_time();
                self.timing.accumulate(dt)
            } else {
                self.timing.accumulate(fixed_dt)
            };

            for _ in 0..steps {
                choices += self.answer_choices()?;
                let input = self.steer();
                if self.run.tick(fixed_dt, &input).is_terminal() {
                    break;
                }
            }
            events += self.drain_events();

            if self.run.state().is_terminal() || self.run.elapsed() >= self.config.max_seconds {
                break;
            }
            if self.config.realtime {
                self.timing.sleep_remainder();
            }
        }

        let outcome = RunOutcome {
            state: self.run.state(),
            summary: self.run.summary().cloned(),
            elapsed: self.run.elapsed(),
            steps: self.timing.total_steps(),
            events,
            choices,
        };
        if outcome.timed_out() {
            // An unfinished run has no summary and cannot return to select.
            info!("Run stopped at the {:.0} s limit", self.config.max_seconds);
            self.run = Self::build_run(&self.config);
        } else {
            self.run.return_to_select()?;
        }
        Ok(outcome)
    }

    /// Takes every open choice. Returns how many were taken.
    fn answer_choices(&mut self) -> SessionResult<u32> {
        let mut taken = 0;
        while self.run.state() == RunState::PowerupChoice {
            let index = self
                .run
                .pending_choice()
                .map(|choice| self.autopilot.choose(choice))
                .ok_or(SessionError::NoPendingChoice)?;
            let powerup = self.run.choose(index)?;
            debug!("Autopilot chose {}", powerup.id);
            taken += 1;
        }
        Ok(taken)
    }

    fn steer(&self) -> DirectionalInput {
        let sim = self.run.config();
        self.run.arena().map_or_else(Default::default, |arena| {
            self.autopilot.steer(arena, &sim.map, &sim.enemies.laser)
        })
    }

    fn drain_events(&self) -> usize {
        let events = self.run.drain_events();
        for event in &events {
            match event {
                GameEvent::BossSpawned { entity_id } => info!("Boss {entity_id} arrived"),
                GameEvent::LevelUp { level } => info!("Reached level {level}"),
                GameEvent::RunEnded { summary } => info!(
                    "Run ended: victory={} kills={} time={}s score={}",
                    summary.victory, summary.kills, summary.time_seconds, summary.score
                ),
                other if self.config.log_events => debug!("{other:?}"),
                _ => {},
            }
        }
        events.len()
    }
}
