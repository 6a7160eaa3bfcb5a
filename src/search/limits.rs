//! Search limits and the clock that enforces them.
//!
//! Handles:
//! - Fixed depth search
//! - Fixed time budget
//! - Clock-derived budgets (time left with increment)

use crate::types::{Depth, MAX_DEPTH};
use std::time::{Duration, Instant};

/// Moves assumed left in the game when the clock gives no `movestogo`
pub const DEFAULT_MOVES_TO_GO: u64 = 30;

/// Search limits configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Deepest iteration to run
    pub max_depth: Depth,
    /// Wall-clock budget; `None` searches until `max_depth` completes
    pub time_budget: Option<Duration>,
}

impl SearchLimits {
    pub fn new(max_depth: Depth, time_budget: Option<Duration>) -> Self {
        Self {
            max_depth: Depth::new(max_depth.raw().clamp(1, MAX_DEPTH)),
            time_budget,
        }
    }

    /// Fixed depth, no time limit
    pub fn depth(depth: i32) -> Self {
        Self::new(Depth::new(depth), None)
    }

    /// Time budget with the deepest allowed depth
    pub fn movetime(budget: Duration) -> Self {
        Self::new(Depth::MAX, Some(budget))
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::new(Depth::MAX, None)
    }
}

/// Budget for one move from a running clock.
///
/// Uses time_left / moves_to_go plus three quarters of the increment, and
/// never more than a third of what is left.
pub fn clock_budget(time_left_ms: u64, increment_ms: u64, moves_to_go: Option<u64>) -> Duration {
    let moves_to_go = moves_to_go.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
    let base_time = time_left_ms / moves_to_go;
    let inc_bonus = increment_ms * 3 / 4;
    let max = time_left_ms / 3;
    Duration::from_millis((base_time + inc_bonus).min(max))
}

/// Wall clock for one search.
#[derive(Debug, Clone, Copy)]
pub struct SearchClock {
    start: Instant,
    budget: Option<Duration>,
}

impl SearchClock {
    pub fn start(budget: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Whether the budget is used up
    #[inline]
    pub fn expired(&self) -> bool {
        match self.budget {
            Some(budget) => self.start.elapsed() >= budget,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_budget() {
        // 60s left, no increment: a thirtieth of the clock
        assert_eq!(clock_budget(60_000, 0, None), Duration::from_millis(2_000));
        // Increment adds three quarters
        assert_eq!(clock_budget(60_000, 1_000, Some(30)), Duration::from_millis(2_750));
        // Never more than a third of the clock
        assert_eq!(clock_budget(3_000, 0, Some(1)), Duration::from_millis(1_000));
    }

    #[test]
    fn test_depth_is_clamped() {
        assert_eq!(SearchLimits::depth(0).max_depth, Depth::ONE);
        assert_eq!(SearchLimits::depth(1000).max_depth, Depth::MAX);
    }

    #[test]
    fn test_clock_without_budget_never_expires() {
        let clock = SearchClock::start(None);
        assert!(!clock.expired());
        let clock = SearchClock::start(Some(Duration::ZERO));
        assert!(clock.expired());
    }
}
