//! Read-only view of a running session, rebuilt once per frame. Rendering
//! and headless assertions consume this instead of reaching into the engine.

use crate::game::{GameOverReason, GamePhase};
use crate::sequence::Symbol;

#[derive(Clone, Debug)]
pub struct PenaltySnapshot {
    pub locked: bool,
    pub ticks_remaining: u32,
    pub error_count: u32,
    pub max_errors: u32,
    pub speed_multiplier: f64,
}

/// One row of the stock display.
#[derive(Clone, Debug)]
pub struct StockSnapshot {
    pub text: String,
    pub remaining: f64,
    pub capacity: usize,
}

impl StockSnapshot {
    /// Fill ratio for the depletion gauge, clamped to [0, 1].
    pub fn ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        (self.remaining / self.capacity as f64).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub elapsed_secs: f64,
    /// Only meaningful once the session entered GameOver.
    pub score_secs: Option<f64>,
    pub reason: Option<GameOverReason>,
    /// Concatenated pending target text, head unit first.
    pub target_text: String,
    /// Symbol count of the unit currently being typed; marks the highlight
    /// boundary inside `target_text`.
    pub current_unit_len: usize,
    pub typed: Vec<Symbol>,
    /// Units completed since the session started.
    pub completed_units: u32,
    pub penalty: PenaltySnapshot,
    /// Stock rows in queue order; the first row is the one being consumed.
    pub inventory: Vec<StockSnapshot>,
}

impl GameSnapshot {
    /// The symbol the player is expected to type next, if input is open.
    pub fn expected_symbol(&self) -> Option<Symbol> {
        if self.phase != GamePhase::Playing || self.penalty.locked {
            return None;
        }
        let idx = self.typed.len();
        if idx >= self.current_unit_len {
            return None;
        }
        self.target_text.chars().nth(idx).map(|c| {
            if c == Symbol::Rice.glyph() {
                Symbol::Rice
            } else {
                Symbol::Old
            }
        })
    }
}
