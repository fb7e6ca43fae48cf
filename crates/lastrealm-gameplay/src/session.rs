//! Run state machine.
//!
//! A [`Run`] owns everything a single play session needs:
//! - Character and mode selection
//! - The fixed per-tick simulation order
//! - Powerup choices that freeze the clock
//! - Victory and defeat with a one-shot summary hand-off
//!
//! Per tick while playing: player movement, weapons, projectiles, pickups,
//! enemy AI, player attacks, hostile attacks, cleanup, difficulty, spawning.

use std::collections::VecDeque;
use std::fmt;

use glam::Vec2;
use lastrealm_common::EntityId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ai::{update_enemies, AiContext, LaserCycle};
use crate::combat::{resolve_hostile_attacks, resolve_player_attacks, HostileContext, KillRecord};
use crate::config::{frame_scale, SimConfig};
use crate::enemy::{Enemy, EnemyKind};
use crate::events::{EventBus, GameEvent};
use crate::input::DirectionalInput;
use crate::melee_combat::{resolve_base_stats, WeaponBaseStats, WeaponStatSource};
use crate::pause::{PauseReason, RunClock};
use crate::player::{Player, PlayerClass};
use crate::powerup::{PowerupCatalog, PowerupDef, PowerupPickup};
use crate::progression::{DifficultyController, DifficultyStep};
use crate::projectile::Projectile;
use crate::ranged_combat::TargetInfo;
use crate::spawn::{clear_ring_point, random_map_point, SpawnScheduler};
use crate::summary::{NullSummarySink, RunSummary, RunSummarySink};

// ============================================================================
// States
// ============================================================================

/// Run modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Survive as long as possible; no boss.
    #[default]
    Infinite,
    /// A boss arrives after a fixed time; killing it wins.
    Timed,
    /// Forced powerup draft, then the boss arrives at once.
    BossRush,
}

impl GameMode {
    /// Short name for logs and summaries.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Infinite => "infinite",
            Self::Timed => "timed",
            Self::BossRush => "boss_rush",
        }
    }

    /// Whether killing the designated boss wins the run.
    #[must_use]
    pub const fn has_boss(&self) -> bool {
        !matches!(self, Self::Infinite)
    }
}

/// Run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RunState {
    /// Waiting for a class and mode.
    #[default]
    CharacterSelect,
    /// Simulation advancing.
    Playing,
    /// A powerup choice is open; the clock is frozen.
    PowerupChoice,
    /// Designated boss killed.
    Victory,
    /// Player died.
    Defeat,
}

impl RunState {
    /// Whether the run is over.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }

    /// Whether the simulation advances in this state.
    #[must_use]
    pub const fn should_update_world(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Whether host time is counted (as play or as pause) in this state.
    #[must_use]
    pub const fn tracks_time(&self) -> bool {
        matches!(self, Self::Playing | Self::PowerupChoice)
    }
}

/// Why a powerup choice was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceOrigin {
    /// One per level gained.
    LevelUp,
    /// Player touched a map powerup.
    Pickup,
    /// Boss rush draft before the boss.
    BossRushDraft,
}

/// An open powerup choice.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerupChoice {
    /// Why it was opened.
    pub origin: ChoiceOrigin,
    /// Distinct options.
    pub options: Vec<PowerupDef>,
    /// Forced choices reject cancel.
    pub forced: bool,
}

// ============================================================================
// Errors
// ============================================================================

/// Result type for run operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Run operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Invalid state transition.
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current state.
        from: RunState,
        /// Attempted state.
        to: RunState,
    },
    /// No choice is open.
    #[error("No powerup choice is open")]
    NoPendingChoice,
    /// Option index out of range.
    #[error("Choice {index} out of range ({available} options)")]
    InvalidChoice {
        /// Requested index.
        index: usize,
        /// Options offered.
        available: usize,
    },
    /// Forced choices cannot be cancelled.
    #[error("This choice cannot be cancelled")]
    ForcedChoice,
    /// Operation needs a started run.
    #[error("No run in progress")]
    NoRun,
}

// ============================================================================
// Run
// ============================================================================

/// Everything on the map.
#[derive(Debug, Clone)]
pub struct Arena {
    /// The player.
    pub player: Player,
    /// Enemies, dead ones removed at end of tick.
    pub enemies: Vec<Enemy>,
    /// Player and hostile projectiles.
    pub projectiles: Vec<Projectile>,
    /// Map powerups.
    pub pickups: Vec<PowerupPickup>,
}

impl Arena {
    fn new(player: Player) -> Self {
        Self {
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
        }
    }

    fn remove_dead(&mut self) {
        self.enemies.retain(Enemy::is_alive);
        self.projectiles.retain(Projectile::is_alive);
        self.pickups.retain(PowerupPickup::is_alive);
    }

    fn living_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }
}

/// One play session from character select to victory or defeat.
pub struct Run {
    config: SimConfig,
    catalog: PowerupCatalog,
    rng: fastrand::Rng,
    state: RunState,
    mode: GameMode,
    clock: RunClock,
    difficulty: DifficultyController,
    scheduler: SpawnScheduler,
    laser_cycle: LaserCycle,
    events: EventBus,
    sink: Box<dyn RunSummarySink>,
    arena: Option<Arena>,
    kills: u32,
    epic_kills: u32,
    pending_origins: VecDeque<ChoiceOrigin>,
    current_choice: Option<PowerupChoice>,
    boss_id: Option<EntityId>,
    summary: Option<RunSummary>,
}

impl fmt::Debug for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Run")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("elapsed", &self.clock.elapsed())
            .field("kills", &self.kills)
            .field("epic_kills", &self.epic_kills)
            .field("sink", &self.sink.name())
            .finish_non_exhaustive()
    }
}

impl Default for Run {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Run {
    /// Create a run at character select with the built-in catalog and no
    /// summary sink.
    #[must_use]
    pub fn new(mut config: SimConfig) -> Self {
        config.validate();
        let rng = config.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self {
            difficulty: DifficultyController::new(config.difficulty.clone()),
            scheduler: SpawnScheduler::new(&config.spawning, &config.powerups),
            config,
            catalog: PowerupCatalog::builtin(),
            rng,
            state: RunState::CharacterSelect,
            mode: GameMode::default(),
            clock: RunClock::new(),
            laser_cycle: LaserCycle::default(),
            events: EventBus::default(),
            sink: Box::new(NullSummarySink),
            arena: None,
            kills: 0,
            epic_kills: 0,
            pending_origins: VecDeque::new(),
            current_choice: None,
            boss_id: None,
            summary: None,
        }
    }

    /// Replace the powerup catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: PowerupCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the summary sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn RunSummarySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the event bus with one of `capacity`.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.events = EventBus::new(capacity);
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Mode of the current or last run.
    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Simulation tuning.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run time in seconds, pauses excluded.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    /// Run clock.
    #[must_use]
    pub fn clock(&self) -> &RunClock {
        &self.clock
    }

    /// Difficulty state.
    #[must_use]
    pub fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }

    /// Map contents, once a run has started.
    #[must_use]
    pub fn arena(&self) -> Option<&Arena> {
        self.arena.as_ref()
    }

    /// Mutable map contents, for hosts that script scenarios.
    pub fn arena_mut(&mut self) -> Option<&mut Arena> {
        self.arena.as_mut()
    }

    /// The player, once a run has started.
    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        self.arena.as_ref().map(|a| &a.player)
    }

    /// Enemies killed.
    #[must_use]
    pub fn kills(&self) -> u32 {
        self.kills
    }

    /// Epic monsters killed.
    #[must_use]
    pub fn epic_kills(&self) -> u32 {
        self.epic_kills
    }

    /// The open choice, if any.
    #[must_use]
    pub fn pending_choice(&self) -> Option<&PowerupChoice> {
        self.current_choice.as_ref()
    }

    /// Choices queued behind the open one.
    #[must_use]
    pub fn queued_choices(&self) -> usize {
        self.pending_origins.len()
    }

    /// ID of the designated boss once spawned.
    #[must_use]
    pub fn boss_id(&self) -> Option<EntityId> {
        self.boss_id
    }

    /// Final summary once the run ended.
    #[must_use]
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Drains pending events.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events.drain()
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Start a run. Melee classes pull their base stats from `stats`,
    /// falling back to built-in values.
    pub fn start(&mut self, class: PlayerClass, mode: GameMode, stats: &dyn WeaponStatSource) -> SessionResult<()> {
        if self.state != RunState::CharacterSelect {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: RunState::Playing,
            });
        }

        let base_stats = class
            .melee_kind()
            .map_or_else(WeaponBaseStats::default, |kind| resolve_base_stats(stats, kind));
        let player = Player::new(class, self.config.map.center(), &self.config, base_stats);

        self.mode = mode;
        self.arena = Some(Arena::new(player));
        self.clock.reset();
        self.difficulty = DifficultyController::new(self.config.difficulty.clone());
        self.scheduler = SpawnScheduler::new(&self.config.spawning, &self.config.powerups);
        self.laser_cycle = LaserCycle::default();
        self.kills = 0;
        self.epic_kills = 0;
        self.pending_origins.clear();
        self.current_choice = None;
        self.boss_id = None;
        self.summary = None;

        info!("Run started: {} in {} mode", class.name(), mode.name());
        self.transition_to(RunState::Playing)?;

        if mode == GameMode::BossRush {
            for _ in 0..self.config.powerups.boss_rush_picks {
                self.pending_origins.push_back(ChoiceOrigin::BossRushDraft);
            }
            self.open_next_choice()?;
        }
        Ok(())
    }

    /// Takes option `index` of the open choice and applies it.
    pub fn choose(&mut self, index: usize) -> SessionResult<PowerupDef> {
        let choice = self.current_choice.as_ref().ok_or(SessionError::NoPendingChoice)?;
        let Some(powerup) = choice.options.get(index).cloned() else {
            return Err(SessionError::InvalidChoice {
                index,
                available: choice.options.len(),
            });
        };

        let arena = self.arena.as_mut().ok_or(SessionError::NoRun)?;
        arena.player.apply_powerup(&powerup);
        self.events.publish(GameEvent::PowerupChosen {
            powerup_id: powerup.id.clone(),
        });
        self.close_choice()?;
        Ok(powerup)
    }

    /// Dismisses the open choice without effect.
    pub fn cancel_choice(&mut self) -> SessionResult<()> {
        let choice = self.current_choice.as_ref().ok_or(SessionError::NoPendingChoice)?;
        if choice.forced {
            return Err(SessionError::ForcedChoice);
        }
        debug!("Choice {:?} cancelled", choice.origin);
        self.events.publish(GameEvent::ChoiceCancelled);
        self.close_choice()
    }

    /// Toggle a player pause while playing.
    pub fn toggle_pause(&mut self) -> SessionResult<()> {
        if self.state != RunState::Playing {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: self.state,
            });
        }
        self.clock.toggle_pause();
        Ok(())
    }

    /// Leave a finished run for character select.
    pub fn return_to_select(&mut self) -> SessionResult<()> {
        self.transition_to(RunState::CharacterSelect)?;
        self.arena = None;
        self.pending_origins.clear();
        self.current_choice = None;
        self.clock.reset();
        Ok(())
    }

    fn close_choice(&mut self) -> SessionResult<()> {
        self.current_choice = None;
        if self.open_next_choice()? {
            return Ok(());
        }
        self.clock.resume_from(PauseReason::PowerupChoice);
        self.transition_to(RunState::Playing)
    }

    /// Presents the next queued choice. Returns false when nothing could be
    /// offered.
    fn open_next_choice(&mut self) -> SessionResult<bool> {
        let class = self.arena.as_ref().ok_or(SessionError::NoRun)?.player.class();
        while let Some(origin) = self.pending_origins.pop_front() {
            let options = self.catalog.offer(class, self.config.powerups.offer_size, &mut self.rng);
            if options.is_empty() {
                warn!("No powerups available for {}, skipping choice", class.name());
                continue;
            }

            self.events.publish(GameEvent::ChoiceOffered {
                origin,
                options: options.iter().map(|p| p.id.clone()).collect(),
            });
            self.current_choice = Some(PowerupChoice {
                origin,
                options,
                forced: origin == ChoiceOrigin::BossRushDraft,
            });
            self.clock.pause(PauseReason::PowerupChoice);
            self.transition_to(RunState::PowerupChoice)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn transition_to(&mut self, new_state: RunState) -> SessionResult<()> {
        let old_state = self.state;
        if !Self::is_valid_transition(old_state, new_state) {
            return Err(SessionError::InvalidTransition {
                from: old_state,
                to: new_state,
            });
        }
        if old_state != new_state {
            self.state = new_state;
            info!("Run state {:?} -> {:?}", old_state, new_state);
            self.events.publish(GameEvent::StateChanged {
                from: old_state,
                to: new_state,
            });
        }
        Ok(())
    }

    fn is_valid_transition(from: RunState, to: RunState) -> bool {
        if from == to {
            return true;
        }
        matches!(
            (from, to),
            (RunState::CharacterSelect, RunState::Playing)
                | (
                    RunState::Playing,
                    RunState::PowerupChoice | RunState::Victory | RunState::Defeat
                )
                | (RunState::PowerupChoice, RunState::Playing)
                | (RunState::Victory | RunState::Defeat, RunState::CharacterSelect)
        )
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advances the run by `dt` seconds of host time.
    ///
    /// Outside `Playing`, or while paused, only the clock's paused time moves.
    pub fn tick(&mut self, dt: f32, input: &DirectionalInput) -> RunState {
        if !self.state.tracks_time() || !dt.is_finite() || dt <= 0.0 {
            return self.state;
        }
        self.clock.advance(f64::from(dt));
        if !self.state.should_update_world() || self.clock.is_paused() {
            return self.state;
        }

        let Some(mut arena) = self.arena.take() else {
            return self.state;
        };
        let outcome = self.simulate(&mut arena, dt, input);
        self.arena = Some(arena);

        match outcome {
            Some(terminal) => self.finish(terminal),
            None => {
                if let Err(err) = self.open_next_choice() {
                    warn!("Could not open powerup choice: {err}");
                }
            },
        }
        self.state
    }

    /// One simulation step. Returns the terminal state if the run ended.
    fn simulate(&mut self, arena: &mut Arena, dt: f32, input: &DirectionalInput) -> Option<RunState> {
        let scale = frame_scale(dt);
        let now = self.clock.now();
        let bounds = self.config.map;

        arena.player.move_by(input, &bounds, scale);

        let targets: Vec<TargetInfo> = arena
            .enemies
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| TargetInfo {
                id: e.id(),
                position: e.position(),
            })
            .collect();
        let fired = arena.player.update_weapons(dt, scale, &targets);
        arena.projectiles.extend(fired);

        let edge_margin = self.config.weapons.projectile_edge_margin;
        for projectile in &mut arena.projectiles {
            projectile.update(dt, scale, &bounds, edge_margin);
        }

        self.update_pickups(arena, scale);

        let mut ai_ctx = AiContext {
            dt,
            frame_scale: scale,
            player: arena.player.position(),
            bounds: &bounds,
            roster: &self.config.enemies,
            damage_multiplier: self.difficulty.damage_multiplier(),
            laser_cycle: &mut self.laser_cycle,
        };
        let ai = update_enemies(&mut arena.enemies, &mut ai_ctx);
        arena.projectiles.extend(ai.fireballs);
        for (entity_id, direction) in ai.telegraphs {
            self.events.publish(GameEvent::LaserTelegraph { entity_id, direction });
        }

        let kills = resolve_player_attacks(&arena.player, &mut arena.enemies, &mut arena.projectiles, now);
        if self.credit_kills(arena, &kills) {
            arena.remove_dead();
            return Some(RunState::Victory);
        }

        let hostile_ctx = HostileContext {
            now,
            damage_multiplier: self.difficulty.damage_multiplier(),
            bounds: &bounds,
            laser: &self.config.enemies.laser,
        };
        let report = resolve_hostile_attacks(&mut arena.player, &mut arena.enemies, &mut arena.projectiles, &hostile_ctx);
        if report.damage_taken > 0.0 {
            self.events.publish(GameEvent::PlayerDamaged {
                damage: report.damage_taken,
                health: arena.player.health(),
            });
        }

        arena.remove_dead();
        if !arena.player.is_alive() {
            return Some(RunState::Defeat);
        }

        self.escalate(arena, now);
        self.spawn_due(arena, dt);
        None
    }

    fn update_pickups(&mut self, arena: &mut Arena, scale: f32) {
        let tuning = &self.config.powerups;
        for pickup in arena.pickups.iter_mut().filter(|p| p.is_alive()) {
            pickup.update(tuning.spin_speed, scale);
            if pickup.touches(arena.player.position(), arena.player.radius(), tuning.pickup_radius) {
                pickup.collect();
                self.pending_origins.push_back(ChoiceOrigin::Pickup);
                self.events.publish(GameEvent::PowerupPickedUp {
                    entity_id: pickup.id(),
                });
            }
        }
    }

    /// Credits kills and experience. Returns true if the designated boss died
    /// in a mode where that wins.
    fn credit_kills(&mut self, arena: &mut Arena, kills: &[KillRecord]) -> bool {
        let mut boss_down = false;
        for kill in kills {
            self.kills += 1;
            if kill.kind == EnemyKind::Epic {
                self.epic_kills += 1;
            }
            self.events.publish(GameEvent::EnemyKilled {
                entity_id: kill.id,
                kind: kill.kind,
                experience: kill.experience,
            });

            let gained = arena.player.gain_experience(kill.experience);
            for _ in 0..gained {
                self.pending_origins.push_back(ChoiceOrigin::LevelUp);
            }
            if gained > 0 {
                self.events.publish(GameEvent::LevelUp {
                    level: arena.player.level(),
                });
            }

            if kill.designated_boss && self.mode.has_boss() {
                info!("Boss {} defeated", kill.id);
                boss_down = true;
            }
        }
        boss_down
    }

    /// Applies due difficulty steps and the boss trigger.
    fn escalate(&mut self, arena: &mut Arena, now: f32) {
        for action in self.difficulty.advance(now) {
            self.events.publish(GameEvent::DifficultyStep {
                step: action.step,
                cycle: action.cycle,
            });
            match action.step {
                DifficultyStep::SpeedUp => {
                    for enemy in arena.enemies.iter_mut().filter(|e| e.is_alive()) {
                        enemy.scale_speed(action.speed_factor);
                    }
                },
                DifficultyStep::EpicBurst => {
                    for _ in 0..action.epic_count {
                        self.spawn_enemy(arena, EnemyKind::Epic, false);
                    }
                },
                DifficultyStep::DamageUp | DifficultyStep::SpawnCountUp => {},
            }
        }

        if self.difficulty.poll_boss(now, self.mode) {
            let id = self.spawn_enemy(arena, EnemyKind::Boss, true);
            self.boss_id = Some(id);
            self.events.publish(GameEvent::BossSpawned { entity_id: id });
            info!("Boss {id} spawned at {now:.1}s");
        }
    }

    /// Spawns whatever the scheduler says is due, within the alive caps.
    fn spawn_due(&mut self, arena: &mut Arena, dt: f32) {
        let due = self.scheduler.tick(dt);
        let cap = self.config.spawning.max_alive;

        for _ in 0..due.monster_waves {
            for _ in 0..self.difficulty.spawn_count() {
                if arena.living_enemies() >= cap {
                    break;
                }
                self.spawn_enemy(arena, EnemyKind::Normal, false);
            }
        }
        for _ in 0..due.epics {
            if arena.living_enemies() < cap {
                self.spawn_enemy(arena, EnemyKind::Epic, false);
            }
        }
        for _ in 0..due.powerups {
            let alive = arena.pickups.iter().filter(|p| p.is_alive()).count();
            if alive >= self.config.powerups.max_alive {
                break;
            }
            let position = random_map_point(&self.config.map, self.config.player.edge_margin, &mut self.rng);
            let pickup = PowerupPickup::new(position);
            self.events.publish(GameEvent::PowerupSpawned {
                entity_id: pickup.id(),
                position,
            });
            arena.pickups.push(pickup);
        }
    }

    fn spawn_enemy(&mut self, arena: &mut Arena, kind: EnemyKind, designated: bool) -> EntityId {
        let separation = kind.template(&self.config.enemies).separation;
        let position: Vec2 = clear_ring_point(
            arena.player.position(),
            &self.config.spawning,
            separation,
            &arena.enemies,
            &self.config.map,
            &mut self.rng,
        );
        let mut enemy = Enemy::spawn(kind, position, &self.config.enemies, self.difficulty.speed_multiplier());
        if designated {
            enemy = enemy.designated();
        }
        let id = enemy.id();
        debug!("Spawned {} {id}", kind.name());
        self.events.publish(GameEvent::EnemySpawned {
            entity_id: id,
            kind,
            position,
        });
        arena.enemies.push(enemy);
        id
    }

    /// Enters a terminal state and hands the summary to the sink once.
    fn finish(&mut self, outcome: RunState) {
        if self.summary.is_some() {
            return;
        }
        if let Err(err) = self.transition_to(outcome) {
            warn!("Cannot end run: {err}");
            return;
        }
        self.pending_origins.clear();
        self.current_choice = None;
        self.clock.force_resume();
        self.clock.pause(PauseReason::RunOver);

        let (class, max_level) = self
            .arena
            .as_ref()
            .map_or((PlayerClass::Warrior, 1), |a| (a.player.class(), a.player.level()));
        let summary = RunSummary::new(
            self.mode,
            class,
            outcome == RunState::Victory,
            self.kills,
            self.epic_kills,
            self.clock.elapsed(),
            max_level,
        );
        info!(
            "Run over ({:?}): {} kills, {}s, level {}, score {}",
            outcome, summary.kills, summary.time_seconds, summary.max_level, summary.score
        );

        if let Err(err) = self.sink.submit(&summary) {
            warn!("Summary sink '{}' failed: {err}", self.sink.name());
        }
        self.events.publish(GameEvent::RunEnded {
            summary: summary.clone(),
        });
        self.summary = Some(summary);
    }
}
