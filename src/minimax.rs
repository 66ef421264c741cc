// Fixed-depth minimax player
//
// Every node is scored from the viewpoint of the player to move at the root
// (the reference player), on max and min layers alike. The reference player
// is fixed by the root call and threaded unchanged through the recursion.

use std::time::Instant;

use crate::config::SearchConfig;
use crate::game::GameState;
use crate::heuristics::Heuristic;
use crate::player::Agent;
use crate::search::{SearchContext, SearchOutcome, SearchReport, SearchTimeout};
use crate::types::{Move, Side};

/// Depth-limited minimax search to exactly `search_depth` plies
#[derive(Debug, Clone)]
pub struct MinimaxPlayer {
    config: SearchConfig,
}

impl MinimaxPlayer {
    pub fn new(config: SearchConfig) -> Self {
        MinimaxPlayer { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Best move for the active player searching `depth` plies
    ///
    /// # Returns
    /// * `Ok(Move::NONE)` - The active player has no legal move
    /// * `Err(SearchTimeout)` - The clock ran low; no partial result survives
    pub fn minimax<G: GameState>(
        &self,
        game: &G,
        depth: u32,
        time_left: &dyn Fn() -> f64,
    ) -> Result<Move, SearchTimeout> {
        self.evaluate(game, depth, time_left).map(|outcome| outcome.best_move)
    }

    /// Like `minimax`, also returning the root value and node counts
    pub fn evaluate<G: GameState>(
        &self,
        game: &G,
        depth: u32,
        time_left: &dyn Fn() -> f64,
    ) -> Result<SearchOutcome, SearchTimeout> {
        let mut ctx = SearchContext::new(time_left, self.config.timer_threshold_ms);
        let (score, best_move) = self.root(&mut ctx, game, depth)?;
        Ok(SearchOutcome {
            score,
            best_move,
            stats: ctx.stats,
        })
    }

    /// Root layer: a max layer that also remembers the first best move
    ///
    /// A depth of 0 is treated as 1 so the root always looks at its children.
    fn root<G: GameState>(
        &self,
        ctx: &mut SearchContext,
        game: &G,
        depth: u32,
    ) -> Result<(f64, Move), SearchTimeout> {
        ctx.enter_node()?;

        let player = game.active_player();
        let moves = game.legal_moves();
        if moves.is_empty() {
            return Ok((game.utility(player), Move::NONE));
        }

        let mut best = (f64::NEG_INFINITY, Move::NONE);
        for mv in moves {
            let value = self.min_value(
                ctx,
                &game.forecast_move(mv),
                player,
                depth.saturating_sub(1),
            )?;
            if best.1.is_none() || value > best.0 {
                best = (value, mv);
            }
        }

        Ok(best)
    }

    fn max_value<G: GameState>(
        &self,
        ctx: &mut SearchContext,
        game: &G,
        player: Side,
        depth: u32,
    ) -> Result<f64, SearchTimeout> {
        ctx.enter_node()?;

        let utility = game.utility(player);
        if utility != 0.0 {
            return Ok(utility);
        }
        if depth == 0 {
            return Ok(self.config.heuristic.score(game, player));
        }

        let mut value = f64::NEG_INFINITY;
        for mv in game.legal_moves() {
            value = value.max(self.min_value(ctx, &game.forecast_move(mv), player, depth - 1)?);
        }
        Ok(value)
    }

    fn min_value<G: GameState>(
        &self,
        ctx: &mut SearchContext,
        game: &G,
        player: Side,
        depth: u32,
    ) -> Result<f64, SearchTimeout> {
        ctx.enter_node()?;

        let utility = game.utility(player);
        if utility != 0.0 {
            return Ok(utility);
        }
        if depth == 0 {
            return Ok(self.config.heuristic.score(game, player));
        }

        let mut value = f64::INFINITY;
        for mv in game.legal_moves() {
            value = value.min(self.max_value(ctx, &game.forecast_move(mv), player, depth - 1)?);
        }
        Ok(value)
    }
}

impl<G: GameState> Agent<G> for MinimaxPlayer {
    /// Runs one fixed-depth pass at `search_depth`
    ///
    /// A timeout is absorbed here: the report carries `Move::NONE`.
    fn search(&self, game: &G, time_left: &dyn Fn() -> f64) -> SearchReport {
        let start = Instant::now();
        let depth = self.config.search_depth;
        let mut ctx = SearchContext::new(time_left, self.config.timer_threshold_ms);

        let result = self.root(&mut ctx, game, depth);
        let mut report = SearchReport {
            best_move: Move::NONE,
            score: None,
            depth: None,
            stats: ctx.stats,
            timed_out: false,
            elapsed_ms: 0,
        };

        match result {
            Ok((score, best_move)) => {
                report.best_move = best_move;
                report.score = Some(score);
                report.depth = Some(depth);
            }
            Err(SearchTimeout) => {
                log::debug!("Minimax timed out at depth {}", depth);
                report.timed_out = true;
            }
        }

        report.elapsed_ms = start.elapsed().as_millis();
        report
    }

    fn name(&self) -> &str {
        "minimax"
    }

    fn heuristic(&self) -> Option<Heuristic> {
        Some(self.config.heuristic)
    }
}
