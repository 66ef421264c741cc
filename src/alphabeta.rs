// Iterative-deepening alpha-beta player
//
// Searches depth 0, 1, 2, ... until the clock runs low, keeping the move of
// the last fully completed depth (anytime behaviour). Scores are always from
// this player's own side, fixed at construction, for every node of a pass.

use log::{debug, info};
use std::time::Instant;

use crate::config::SearchConfig;
use crate::game::GameState;
use crate::heuristics::Heuristic;
use crate::player::Agent;
use crate::search::{SearchContext, SearchOutcome, SearchReport, SearchTimeout};
use crate::types::{Move, Side};

/// Alpha-beta minimax with iterative deepening and a cooperative time budget
#[derive(Debug, Clone)]
pub struct AlphaBetaPlayer {
    config: SearchConfig,
    side: Side,
}

impl AlphaBetaPlayer {
    /// # Arguments
    /// * `config` - Heuristic, timer threshold and optional depth cap
    /// * `side` - The player this agent moves for; all scores use its viewpoint
    pub fn new(config: SearchConfig, side: Side) -> Self {
        AlphaBetaPlayer { config, side }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// One depth-limited alpha-beta pass rooted at `game`
    ///
    /// # Returns
    /// * `Ok(Move::NONE)` - At depth 0, at a decided root, or without legal moves
    /// * `Err(SearchTimeout)` - The clock ran low during the pass
    pub fn alphabeta<G: GameState>(
        &self,
        game: &G,
        depth: u32,
        time_left: &dyn Fn() -> f64,
    ) -> Result<Move, SearchTimeout> {
        self.evaluate(game, depth, time_left).map(|outcome| outcome.best_move)
    }

    /// Like `alphabeta`, also returning the root value and node counts
    pub fn evaluate<G: GameState>(
        &self,
        game: &G,
        depth: u32,
        time_left: &dyn Fn() -> f64,
    ) -> Result<SearchOutcome, SearchTimeout> {
        let mut ctx = SearchContext::new(time_left, self.config.timer_threshold_ms);
        let (score, best_move) = self.pass(&mut ctx, game, depth)?;
        Ok(SearchOutcome {
            score,
            best_move,
            stats: ctx.stats,
        })
    }

    fn pass<G: GameState>(
        &self,
        ctx: &mut SearchContext,
        game: &G,
        depth: u32,
    ) -> Result<(f64, Move), SearchTimeout> {
        ctx.check()?;
        self.max_value(ctx, game, depth, f64::NEG_INFINITY, f64::INFINITY)
    }

    fn max_value<G: GameState>(
        &self,
        ctx: &mut SearchContext,
        game: &G,
        depth: u32,
        mut alpha: f64,
        beta: f64,
    ) -> Result<(f64, Move), SearchTimeout> {
        ctx.enter_node()?;

        let utility = game.utility(self.side);
        if utility != 0.0 {
            return Ok((utility, Move::NONE));
        }
        if depth == 0 {
            return Ok((self.config.heuristic.score(game, self.side), Move::NONE));
        }

        let mut value = f64::NEG_INFINITY;
        let mut best_move = Move::NONE;
        for mv in game.legal_moves() {
            let (child, _) = self.min_value(ctx, &game.forecast_move(mv), depth - 1, alpha, beta)?;
            // Strict comparison keeps the first of equal moves; all -inf leaves Move::NONE
            if child > value {
                value = child;
                best_move = mv;
            }
            if value >= beta {
                ctx.record_cutoff();
                return Ok((value, best_move));
            }
            alpha = alpha.max(value);
        }

        Ok((value, best_move))
    }

    fn min_value<G: GameState>(
        &self,
        ctx: &mut SearchContext,
        game: &G,
        depth: u32,
        alpha: f64,
        mut beta: f64,
    ) -> Result<(f64, Move), SearchTimeout> {
        ctx.enter_node()?;

        let utility = game.utility(self.side);
        if utility != 0.0 {
            return Ok((utility, Move::NONE));
        }
        if depth == 0 {
            return Ok((self.config.heuristic.score(game, self.side), Move::NONE));
        }

        let mut value = f64::INFINITY;
        let mut best_move = Move::NONE;
        for mv in game.legal_moves() {
            let (child, _) = self.max_value(ctx, &game.forecast_move(mv), depth - 1, alpha, beta)?;
            if child < value {
                value = child;
                best_move = mv;
            }
            if value <= alpha {
                ctx.record_cutoff();
                return Ok((value, best_move));
            }
            beta = beta.min(value);
        }

        Ok((value, best_move))
    }
}

impl<G: GameState> Agent<G> for AlphaBetaPlayer {
    /// Iterative deepening from depth 0 until cancelled or `max_depth` is done
    fn search(&self, game: &G, time_left: &dyn Fn() -> f64) -> SearchReport {
        let start = Instant::now();
        let mut report = SearchReport {
            best_move: Move::NONE,
            score: None,
            depth: None,
            stats: Default::default(),
            timed_out: false,
            elapsed_ms: 0,
        };

        let mut depth = 0;
        loop {
            if let Some(max_depth) = self.config.max_depth {
                if depth > max_depth {
                    debug!("Stopping search: reached max depth ({})", max_depth);
                    break;
                }
            }

            let mut ctx = SearchContext::new(time_left, self.config.timer_threshold_ms);
            let result = self.pass(&mut ctx, game, depth);
            report.stats.add(ctx.stats);

            match result {
                Ok((score, best_move)) => {
                    debug!(
                        "Depth {} complete: {} (score: {}, nodes: {})",
                        depth, best_move, score, ctx.stats.nodes
                    );
                    report.best_move = best_move;
                    report.score = Some(score);
                    report.depth = Some(depth);
                }
                Err(SearchTimeout) => {
                    debug!("Depth {} cancelled, keeping depth {:?}", depth, report.depth);
                    report.timed_out = true;
                    break;
                }
            }

            depth += 1;
        }

        report.elapsed_ms = start.elapsed().as_millis();
        if report.depth.is_none() {
            info!("Search cancelled before completing depth 0");
        }
        report
    }

    fn name(&self) -> &str {
        "alpha_beta"
    }

    fn heuristic(&self) -> Option<Heuristic> {
        Some(self.config.heuristic)
    }
}
