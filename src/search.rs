// Time-bounded search control shared by the minimax and alpha-beta engines
//
// Cancellation is the `Err(SearchTimeout)` arm of every value function's
// result. It is raised by `SearchTimer::check` at the top of each call and
// travels back up with `?`; only the top-level `search` of a player catches it.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use crate::types::Move;

/// Raised when fewer than `timer_threshold_ms` milliseconds remain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTimeout;

impl fmt::Display for SearchTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "search timed out")
    }
}

impl Error for SearchTimeout {}

/// Polls the caller's time-remaining query against a fixed threshold
pub struct SearchTimer<'a> {
    time_left: &'a dyn Fn() -> f64,
    threshold_ms: f64,
}

impl<'a> SearchTimer<'a> {
    /// # Arguments
    /// * `time_left` - Milliseconds remaining in the current turn
    /// * `threshold_ms` - Minimum remaining time required to keep searching
    pub fn new(time_left: &'a dyn Fn() -> f64, threshold_ms: f64) -> Self {
        SearchTimer {
            time_left,
            threshold_ms,
        }
    }

    pub fn check(&self) -> Result<(), SearchTimeout> {
        if (self.time_left)() < self.threshold_ms {
            Err(SearchTimeout)
        } else {
            Ok(())
        }
    }
}

/// Wall-clock turn budget, the usual source of a time-remaining query
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget_ms: u64,
}

impl Deadline {
    /// Starts the clock now
    pub fn new(budget_ms: u64) -> Self {
        Deadline {
            start: Instant::now(),
            budget_ms,
        }
    }

    /// Milliseconds left before the budget runs out (negative once overrun)
    pub fn time_left(&self) -> f64 {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        self.budget_ms as f64 - elapsed_ms
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

/// Node and cutoff counters for one or more search passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Value-function calls, root included
    pub nodes: u64,
    /// Alpha-beta prunes
    pub cutoffs: u64,
}

impl SearchStats {
    pub fn add(&mut self, other: SearchStats) {
        self.nodes += other.nodes;
        self.cutoffs += other.cutoffs;
    }
}

/// Result of one fully completed search pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Root value from the searching player's viewpoint
    pub score: f64,
    pub best_move: Move,
    pub stats: SearchStats,
}

/// Summary of one `get_move` call
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub best_move: Move,
    /// Root value of the last completed pass, `None` if none completed
    pub score: Option<f64>,
    /// Depth of the last completed pass, `None` if none completed
    pub depth: Option<u32>,
    /// Totals over every pass, including the cancelled one
    pub stats: SearchStats,
    pub timed_out: bool,
    pub elapsed_ms: u128,
}

/// Per-pass state threaded through the recursion
pub struct SearchContext<'a> {
    timer: SearchTimer<'a>,
    pub stats: SearchStats,
}

impl<'a> SearchContext<'a> {
    pub fn new(time_left: &'a dyn Fn() -> f64, threshold_ms: f64) -> Self {
        SearchContext {
            timer: SearchTimer::new(time_left, threshold_ms),
            stats: SearchStats::default(),
        }
    }

    /// Time check without counting a node
    pub fn check(&self) -> Result<(), SearchTimeout> {
        self.timer.check()
    }

    /// Counts a node, then checks the clock before any work on it
    pub fn enter_node(&mut self) -> Result<(), SearchTimeout> {
        self.stats.nodes += 1;
        self.timer.check()
    }

    pub fn record_cutoff(&mut self) {
        self.stats.cutoffs += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_timer_threshold() {
        let plenty = || 100.0;
        let low = || 9.99;
        let exact = || 10.0;

        assert!(SearchTimer::new(&plenty, 10.0).check().is_ok());
        assert_eq!(SearchTimer::new(&low, 10.0).check(), Err(SearchTimeout));
        assert!(SearchTimer::new(&exact, 10.0).check().is_ok());
    }

    #[test]
    fn test_timer_polls_every_check() {
        let calls = Cell::new(0u32);
        let time_left = || {
            calls.set(calls.get() + 1);
            if calls.get() > 2 {
                0.0
            } else {
                50.0
            }
        };

        let timer = SearchTimer::new(&time_left, 5.0);
        assert!(timer.check().is_ok());
        assert!(timer.check().is_ok());
        assert!(timer.check().is_err());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_enter_node_counts_before_checking() {
        let expired = || 0.0;
        let mut ctx = SearchContext::new(&expired, 1.0);
        assert!(ctx.enter_node().is_err());
        assert_eq!(ctx.stats.nodes, 1);
        ctx.record_cutoff();
        assert_eq!(ctx.stats.cutoffs, 1);
    }

    #[test]
    fn test_deadline_counts_down() {
        let deadline = Deadline::new(1_000);
        let left = deadline.time_left();
        assert!(left <= 1_000.0);
        assert!(left > 500.0);
    }

    #[test]
    fn test_stats_add() {
        let mut total = SearchStats { nodes: 3, cutoffs: 1 };
        total.add(SearchStats { nodes: 4, cutoffs: 2 });
        assert_eq!(total, SearchStats { nodes: 7, cutoffs: 3 });
    }
}
