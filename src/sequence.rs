use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::error::Error;
use std::fmt;

/// Minimum number of pending target characters kept ahead of the player.
pub const MIN_PENDING_CHARS: usize = 20;

/// Bounds for the old-rice run inside a unit (inclusive).
pub const MIN_OLD_RUN: usize = 1;
pub const MAX_OLD_RUN: usize = 5;

/// One of the two symbols the player can type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    /// 古 — the "old" half of a unit
    Old,
    /// 米 — the "rice" cap that closes a unit
    Rice,
}

impl Symbol {
    pub fn glyph(self) -> char {
        match self {
            Symbol::Old => '古',
            Symbol::Rice => '米',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// An immutable target pattern: a run of 古 capped by exactly one 米.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    old_run: usize,
}

#[allow(clippy::len_without_is_empty)] // a unit is never empty
impl Unit {
    pub fn new(old_run: usize) -> Self {
        Self { old_run }
    }

    /// The shortest unit that is still well-formed (古米). Used to seed the
    /// inventory on start so the market has stock at t=0.
    pub fn smallest() -> Self {
        Self {
            old_run: MIN_OLD_RUN,
        }
    }

    pub fn old_run(&self) -> usize {
        self.old_run
    }

    /// Number of symbols in the unit, the 米 cap included.
    pub fn len(&self) -> usize {
        self.old_run + 1
    }

    pub fn symbol_at(&self, idx: usize) -> Option<Symbol> {
        if idx < self.old_run {
            Some(Symbol::Old)
        } else if idx == self.old_run {
            Some(Symbol::Rice)
        } else {
            None
        }
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.len()).filter_map(|idx| self.symbol_at(idx))
    }

    pub fn text(&self) -> String {
        self.symbols().map(Symbol::glyph).collect()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// Produces randomized units. Stateless apart from the random source, which
/// is injected so sessions and tests can be made deterministic.
#[derive(Debug)]
pub struct SequenceGenerator {
    rng: StdRng,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate_unit(&mut self) -> Unit {
        Unit::new(self.rng.gen_range(MIN_OLD_RUN..=MAX_OLD_RUN))
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// The target buffer was read while it had no pending units left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyBufferError;

impl fmt::Display for EmptyBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target buffer exhausted")
    }
}

impl Error for EmptyBufferError {}

/// Rolling buffer of pending units. The head unit is the one being typed.
/// Invariant: the concatenated pending text is at least [`MIN_PENDING_CHARS`]
/// long after construction, after `ensure_minimum_length`, and after every
/// `advance`.
#[derive(Debug)]
pub struct TargetBuffer {
    generator: SequenceGenerator,
    pending: VecDeque<Unit>,
}

impl TargetBuffer {
    pub fn new(generator: SequenceGenerator) -> Self {
        let mut buffer = Self {
            generator,
            pending: VecDeque::new(),
        };
        buffer.ensure_minimum_length(MIN_PENDING_CHARS);
        buffer
    }

    /// Appends freshly generated units until the concatenated pending length
    /// reaches `min_chars`.
    pub fn ensure_minimum_length(&mut self, min_chars: usize) {
        while self.pending_len() < min_chars {
            let unit = self.generator.generate_unit();
            self.pending.push_back(unit);
        }
    }

    /// Total symbol count across all pending units.
    pub fn pending_len(&self) -> usize {
        self.pending.iter().map(Unit::len).sum()
    }

    /// Concatenated text of all pending units, head first.
    pub fn pending_text(&self) -> String {
        self.pending.iter().map(Unit::text).join("")
    }

    /// The unit currently being typed.
    pub fn current_unit(&self) -> Result<&Unit, EmptyBufferError> {
        self.pending.front().ok_or(EmptyBufferError)
    }

    /// Removes the completed head unit and replenishes the buffer back to
    /// the minimum length.
    pub fn advance(&mut self) {
        self.pending.pop_front();
        self.ensure_minimum_length(MIN_PENDING_CHARS);
    }

    /// Drops all pending units and refills from scratch. Used on restart.
    pub fn regenerate(&mut self) {
        self.pending.clear();
        self.ensure_minimum_length(MIN_PENDING_CHARS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_glyphs() {
        assert_eq!(Symbol::Old.glyph(), '古');
        assert_eq!(Symbol::Rice.glyph(), '米');
        assert_eq!(Symbol::Old.to_string(), "古");
    }

    #[test]
    fn unit_shape() {
        let unit = Unit::new(3);
        assert_eq!(unit.len(), 4);
        assert_eq!(unit.symbol_at(0), Some(Symbol::Old));
        assert_eq!(unit.symbol_at(2), Some(Symbol::Old));
        assert_eq!(unit.symbol_at(3), Some(Symbol::Rice));
        assert_eq!(unit.symbol_at(4), None);
        assert_eq!(unit.text(), "古古古米");
    }

    #[test]
    fn smallest_unit_is_two_symbols() {
        let unit = Unit::smallest();
        assert_eq!(unit.len(), 2);
        assert_eq!(unit.text(), "古米");
    }

    #[test]
    fn generated_units_stay_in_bounds() {
        let mut generator = SequenceGenerator::seeded(7);
        for _ in 0..500 {
            let unit = generator.generate_unit();
            assert!(unit.old_run() >= MIN_OLD_RUN);
            assert!(unit.old_run() <= MAX_OLD_RUN);
            // the cap is always exactly one 米
            assert_eq!(unit.symbol_at(unit.len() - 1), Some(Symbol::Rice));
            assert_eq!(unit.symbol_at(unit.len()), None);
        }
    }

    #[test]
    fn seeded_generators_are_reproducible() {
        let mut a = SequenceGenerator::seeded(42);
        let mut b = SequenceGenerator::seeded(42);
        for _ in 0..100 {
            assert_eq!(a.generate_unit(), b.generate_unit());
        }
    }

    #[test]
    fn new_buffer_satisfies_minimum_length() {
        let buffer = TargetBuffer::new(SequenceGenerator::seeded(1));
        assert!(buffer.pending_len() >= MIN_PENDING_CHARS);
        assert_eq!(
            buffer.pending_text().chars().count(),
            buffer.pending_len()
        );
    }

    #[test]
    fn advance_keeps_minimum_length() {
        let mut buffer = TargetBuffer::new(SequenceGenerator::seeded(2));
        for _ in 0..50 {
            let head_len = buffer.current_unit().unwrap().len();
            let text = buffer.pending_text();
            buffer.advance();
            assert!(buffer.pending_len() >= MIN_PENDING_CHARS);
            // the head's symbols and nothing else left the front of the text
            assert_eq!(
                buffer.pending_text().chars().take(3).collect::<String>(),
                text.chars().skip(head_len).take(3).collect::<String>()
            );
        }
    }

    #[test]
    fn current_unit_fails_on_drained_buffer() {
        let mut buffer = TargetBuffer::new(SequenceGenerator::seeded(3));
        buffer.pending.clear();
        assert_eq!(buffer.current_unit(), Err(EmptyBufferError));
        assert_eq!(
            EmptyBufferError.to_string(),
            "target buffer exhausted"
        );
    }

    #[test]
    fn regenerate_refills_from_scratch() {
        let mut buffer = TargetBuffer::new(SequenceGenerator::seeded(4));
        buffer.pending.clear();
        buffer.regenerate();
        assert!(buffer.pending_len() >= MIN_PENDING_CHARS);
        assert!(buffer.current_unit().is_ok());
    }

    #[test]
    fn pending_text_matches_unit_order() {
        let mut buffer = TargetBuffer::new(SequenceGenerator::seeded(5));
        let head = buffer.current_unit().unwrap().text();
        assert!(buffer.pending_text().starts_with(&head));
        buffer.advance();
        assert!(!buffer.pending_text().is_empty());
    }
}
