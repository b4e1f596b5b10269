use crate::inventory::{Inventory, InventoryEntry};
use crate::matcher::{InputMatcher, MatchOutcome};
use crate::penalty::{Penalty, DEFAULT_MAX_ERRORS, LOCKOUT_TICKS};
use crate::sequence::{SequenceGenerator, Symbol, TargetBuffer, Unit, MIN_PENDING_CHARS};
use crate::snapshot::{GameSnapshot, PenaltySnapshot, StockSnapshot};
use std::collections::VecDeque;

/// Fixed simulation step fed to the decay math; the terminal loop schedules
/// ticks at ~16 ms for a nominal 60 Hz.
pub const TICK_SECS: f64 = 0.016;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Intro,
    Playing,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum GameOverReason {
    #[strum(serialize = "inventory exhausted")]
    InventoryExhausted,
    #[strum(serialize = "too many errors")]
    TooManyErrors,
    #[strum(serialize = "manual exit")]
    ManualExit,
}

/// A discrete key event from the input layer, queued until the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyInput {
    Symbol(Symbol),
    /// Accepted by the interface, discarded by the session: typed symbols
    /// cannot be edited back out.
    Backspace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlInput {
    Start,
    Quit,
}

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub max_errors: u32,
    pub lockout_ticks: u32,
    /// Fixed seed for the unit generator; None draws from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_errors: DEFAULT_MAX_ERRORS,
            lockout_ticks: LOCKOUT_TICKS,
            seed: None,
        }
    }
}

/// The whole game in one value: lifecycle, simulation clock, target buffer,
/// matcher, stock and penalties. Created fresh per program run; restarting
/// rebuilds the per-session parts in place.
#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    phase: GamePhase,
    elapsed: f64,
    score: f64,
    reason: Option<GameOverReason>,
    target: TargetBuffer,
    matcher: InputMatcher,
    inventory: Inventory,
    penalty: Penalty,
    queued_keys: VecDeque<KeyInput>,
    completed_units: u32,
    exit_requested: bool,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let generator = match config.seed {
            Some(seed) => SequenceGenerator::seeded(seed),
            None => SequenceGenerator::new(),
        };
        let penalty = Penalty::new(config.max_errors, config.lockout_ticks);

        Self {
            config,
            phase: GamePhase::Intro,
            elapsed: 0.0,
            score: 0.0,
            reason: None,
            target: TargetBuffer::new(generator),
            matcher: InputMatcher::new(),
            inventory: Inventory::new(),
            penalty,
            queued_keys: VecDeque::new(),
            completed_units: 0,
            exit_requested: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed
    }

    /// Survival time in simulated seconds; set once, on entering GameOver.
    pub fn score_secs(&self) -> Option<f64> {
        match self.phase {
            GamePhase::GameOver => Some(self.score),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<GameOverReason> {
        self.reason
    }

    /// True once the player asked to leave the program altogether.
    pub fn should_exit(&self) -> bool {
        self.exit_requested
    }

    /// Queues one key event for the next tick. Events arriving within the
    /// same tick are processed in arrival order.
    pub fn submit_key(&mut self, key: KeyInput) {
        if self.phase == GamePhase::Playing {
            self.queued_keys.push_back(key);
        }
    }

    pub fn submit_control(&mut self, control: ControlInput) {
        match (self.phase, control) {
            (GamePhase::Intro, ControlInput::Start)
            | (GamePhase::GameOver, ControlInput::Start) => self.start(),
            (GamePhase::Playing, ControlInput::Quit) => self.end(GameOverReason::ManualExit),
            (GamePhase::Intro, ControlInput::Quit)
            | (GamePhase::GameOver, ControlInput::Quit) => self.exit_requested = true,
            _ => {}
        }
    }

    /// Advances the simulation by one fixed step. Update order within a
    /// tick: penalty decay, inventory decay, end-condition check, buffer
    /// replenishment, queued input.
    pub fn tick(&mut self, dt_secs: f64) {
        if self.phase != GamePhase::Playing {
            return;
        }

        self.elapsed += dt_secs;

        if self.penalty.tick() {
            // lockout over: drop the stale partial input before keys resume
            self.matcher.clear();
        }

        self.inventory.tick(dt_secs, self.penalty.speed_multiplier());

        if self.inventory.is_empty() {
            self.end(GameOverReason::InventoryExhausted);
            return;
        }

        self.target.ensure_minimum_length(MIN_PENDING_CHARS);

        while let Some(key) = self.queued_keys.pop_front() {
            self.process_key(key);
            if self.phase != GamePhase::Playing {
                break;
            }
        }
    }

    fn start(&mut self) {
        self.phase = GamePhase::Playing;
        self.elapsed = 0.0;
        self.score = 0.0;
        self.reason = None;
        self.matcher.clear();
        self.queued_keys.clear();
        self.inventory.clear();
        // bootstrap stock so an empty market cannot end the game at t=0
        self.inventory.push(InventoryEntry::new(Unit::smallest()));
        self.penalty = Penalty::new(self.config.max_errors, self.config.lockout_ticks);
        self.completed_units = 0;
        self.target.regenerate();
    }

    fn end(&mut self, reason: GameOverReason) {
        self.phase = GamePhase::GameOver;
        self.reason = Some(reason);
        self.score = self.elapsed;
        self.queued_keys.clear();
    }

    fn process_key(&mut self, key: KeyInput) {
        if self.penalty.is_locked() {
            return;
        }
        let KeyInput::Symbol(symbol) = key else {
            return;
        };

        let target = self.current_target();
        match self.matcher.submit(symbol, &target) {
            MatchOutcome::Progress => {}
            MatchOutcome::Complete => {
                self.inventory.push(InventoryEntry::new(target));
                self.target.advance();
                self.completed_units += 1;
            }
            MatchOutcome::Mismatch => {
                if self.penalty.on_error() {
                    self.end(GameOverReason::TooManyErrors);
                }
            }
        }
    }

    /// Replenishment always runs before reads, so the buffer cannot be
    /// exhausted here; if it ever is, regenerate instead of failing the run.
    fn current_target(&mut self) -> Unit {
        if let Ok(unit) = self.target.current_unit() {
            return unit.clone();
        }
        self.target.ensure_minimum_length(MIN_PENDING_CHARS);
        self.target
            .current_unit()
            .cloned()
            .unwrap_or_else(|_| Unit::smallest())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            elapsed_secs: self.elapsed,
            score_secs: self.score_secs(),
            reason: self.reason,
            target_text: self.target.pending_text(),
            current_unit_len: self
                .target
                .current_unit()
                .map(Unit::len)
                .unwrap_or_default(),
            typed: self.matcher.typed().to_vec(),
            completed_units: self.completed_units,
            penalty: PenaltySnapshot {
                locked: self.penalty.is_locked(),
                ticks_remaining: self.penalty.ticks_remaining(),
                error_count: self.penalty.error_count(),
                max_errors: self.penalty.max_errors(),
                speed_multiplier: self.penalty.speed_multiplier(),
            },
            inventory: self
                .inventory
                .iter()
                .map(|entry| StockSnapshot {
                    text: entry.unit.text(),
                    remaining: entry.remaining,
                    capacity: entry.unit.len(),
                })
                .collect(),
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
