use crate::sequence::{Symbol, Unit};

/// What a submitted symbol did to the match in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Correct symbol, unit not finished yet.
    Progress,
    /// Correct symbol and it was the last one; the typed buffer was cleared.
    Complete,
    /// Wrong symbol. The typed buffer is left as-is so the player can see
    /// how far they got; the session clears it when the lockout expires.
    Mismatch,
}

/// Validates typed symbols, one at a time, against the current target unit.
#[derive(Debug, Default)]
pub struct InputMatcher {
    typed: Vec<Symbol>,
}

impl InputMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbols typed so far toward the current unit.
    pub fn typed(&self) -> &[Symbol] {
        &self.typed
    }

    pub fn clear(&mut self) {
        self.typed.clear();
    }

    pub fn submit(&mut self, symbol: Symbol, target: &Unit) -> MatchOutcome {
        match target.symbol_at(self.typed.len()) {
            Some(expected) if expected == symbol => {
                self.typed.push(symbol);
                if self.typed.len() == target.len() {
                    self.typed.clear();
                    MatchOutcome::Complete
                } else {
                    MatchOutcome::Progress
                }
            }
            // wrong symbol, or typed past the unit end (cannot happen while
            // completion clears the buffer)
            _ => MatchOutcome::Mismatch,
        }
    }
}
