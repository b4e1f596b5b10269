/// Mistakes allowed before the session ends.
pub const DEFAULT_MAX_ERRORS: u32 = 3;

/// Input lockout after a mistake: 3 seconds worth of ticks at the nominal
/// 60 Hz simulation rate.
pub const LOCKOUT_TICKS: u32 = 180;

/// Tracks mistakes and the two penalties they carry: a temporary input
/// lockout and a permanent (per-session) consumption speed-up.
#[derive(Clone, Debug)]
pub struct Penalty {
    active: bool,
    ticks_remaining: u32,
    error_count: u32,
    max_errors: u32,
    speed_multiplier: f64,
    lockout_ticks: u32,
}

impl Penalty {
    pub fn new(max_errors: u32, lockout_ticks: u32) -> Self {
        Self {
            active: false,
            ticks_remaining: 0,
            error_count: 0,
            max_errors,
            speed_multiplier: 1.0,
            lockout_ticks,
        }
    }

    /// Registers a mistake: bumps the error count, raises the consumption
    /// multiplier by 1.0 and arms the lockout. Returns true when the error
    /// budget is now exhausted and the session must end.
    pub fn on_error(&mut self) -> bool {
        self.error_count += 1;
        self.speed_multiplier += 1.0;
        self.active = true;
        self.ticks_remaining = self.lockout_ticks;
        self.error_count >= self.max_errors
    }

    /// Advances an active lockout by one tick. Returns true on exactly the
    /// tick the lockout expires; the session clears typed input then.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        if self.ticks_remaining == 0 {
            self.active = false;
            return true;
        }
        false
    }

    pub fn is_locked(&self) -> bool {
        self.active
    }

    pub fn ticks_remaining(&self) -> u32 {
        self.ticks_remaining
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn max_errors(&self) -> u32 {
        self.max_errors
    }

    /// Never decreases within a session; reset only by building a fresh
    /// penalty state on restart.
    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }
}

impl Default for Penalty {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ERRORS, LOCKOUT_TICKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clean() {
        let penalty = Penalty::default();
        assert!(!penalty.is_locked());
        assert_eq!(penalty.error_count(), 0);
        assert_eq!(penalty.speed_multiplier(), 1.0);
    }

    #[test]
    fn error_arms_lockout_and_raises_multiplier() {
        let mut penalty = Penalty::default();
        let exhausted = penalty.on_error();

        assert!(!exhausted);
        assert!(penalty.is_locked());
        assert_eq!(penalty.ticks_remaining(), LOCKOUT_TICKS);
        assert_eq!(penalty.error_count(), 1);
        assert_eq!(penalty.speed_multiplier(), 2.0);
    }

    #[test]
    fn lockout_expires_exactly_once() {
        let mut penalty = Penalty::new(DEFAULT_MAX_ERRORS, 3);
        penalty.on_error();

        assert!(!penalty.tick());
        assert!(!penalty.tick());
        assert!(penalty.tick());
        assert!(!penalty.is_locked());
        assert!(!penalty.tick());
    }

    #[test]
    fn tick_without_lockout_is_a_noop() {
        let mut penalty = Penalty::default();
        assert!(!penalty.tick());
        assert_eq!(penalty.ticks_remaining(), 0);
    }

    #[test]
    fn budget_exhausts_at_max_errors() {
        let mut penalty = Penalty::new(3, 2);

        assert!(!penalty.on_error());
        assert!(!penalty.on_error());
        assert!(penalty.on_error());
        assert_eq!(penalty.error_count(), 3);
        assert_eq!(penalty.speed_multiplier(), 4.0);
    }

    #[test]
    fn multiplier_survives_lockout_expiry() {
        let mut penalty = Penalty::new(DEFAULT_MAX_ERRORS, 1);
        penalty.on_error();
        penalty.tick();

        assert!(!penalty.is_locked());
        assert_eq!(penalty.speed_multiplier(), 2.0);
    }

    #[test]
    fn repeat_error_rearms_a_running_lockout() {
        let mut penalty = Penalty::new(5, 10);
        penalty.on_error();
        penalty.tick();
        penalty.tick();
        assert_eq!(penalty.ticks_remaining(), 8);

        penalty.on_error();
        assert_eq!(penalty.ticks_remaining(), 10);
        assert_eq!(penalty.speed_multiplier(), 3.0);
    }
}
