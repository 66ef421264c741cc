// Player interface exposed to drivers, plus the random baseline player

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::time::Instant;

use crate::alphabeta::AlphaBetaPlayer;
use crate::board::Board;
use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::game::GameState;
use crate::heuristics::Heuristic;
use crate::minimax::MinimaxPlayer;
use crate::search::{Deadline, SearchReport};
use crate::types::{Move, Side};

/// Something that can pick a move for the active player of a position
pub trait Agent<G: GameState> {
    /// Runs a full search and reports how it went; never fails
    ///
    /// # Arguments
    /// * `game` - Position to move in
    /// * `time_left` - Milliseconds remaining in the current turn
    fn search(&self, game: &G, time_left: &dyn Fn() -> f64) -> SearchReport;

    /// Short identifier used in logs and decision records
    fn name(&self) -> &str;

    /// Evaluation policy behind the search, if the agent uses one
    fn heuristic(&self) -> Option<Heuristic> {
        None
    }

    /// Entry point for drivers: the chosen move, `Move::NONE` if there is none
    fn get_move(&self, game: &G, time_left: &dyn Fn() -> f64) -> Move {
        let report = self.search(game, time_left);

        info!(
            "{}: Chose {} (score: {:?}, depth: {:?}, nodes: {}, time: {}ms{})",
            self.name(),
            report.best_move,
            report.score,
            report.depth,
            report.stats.nodes,
            report.elapsed_ms,
            if report.timed_out { ", timed out" } else { "" }
        );

        report.best_move
    }
}

/// Agent implementations selectable from configuration
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    AlphaBeta,
    Minimax,
    Random,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::AlphaBeta => "alpha_beta",
            AgentKind::Minimax => "minimax",
            AgentKind::Random => "random",
        }
    }

    pub fn parse(s: &str) -> Result<AgentKind, String> {
        match s.trim().to_lowercase().as_str() {
            "alpha_beta" | "alphabeta" => Ok(AgentKind::AlphaBeta),
            "minimax" => Ok(AgentKind::Minimax),
            "random" => Ok(AgentKind::Random),
            _ => Err(format!("Unknown agent kind: {}", s)),
        }
    }
}

/// Builds the configured agent to move for `side`
pub fn build_agent<G: GameState + 'static>(
    kind: AgentKind,
    config: &Config,
    side: Side,
) -> Box<dyn Agent<G>> {
    match kind {
        AgentKind::AlphaBeta => Box::new(AlphaBetaPlayer::new(config.search.clone(), side)),
        AgentKind::Minimax => Box::new(MinimaxPlayer::new(config.search.clone())),
        AgentKind::Random => Box::new(RandomPlayer::new(config.agent.random_seed)),
    }
}

/// Picks uniformly among the legal moves; a baseline opponent
pub struct RandomPlayer {
    rng: RefCell<StdRng>,
}

impl RandomPlayer {
    /// Seeded players repeat the same choices for the same positions
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        RandomPlayer {
            rng: RefCell::new(rng),
        }
    }
}

impl<G: GameState> Agent<G> for RandomPlayer {
    fn search(&self, game: &G, _time_left: &dyn Fn() -> f64) -> SearchReport {
        let start = Instant::now();
        let moves = game.legal_moves();
        let best_move = moves
            .choose(&mut *self.rng.borrow_mut())
            .copied()
            .unwrap_or(Move::NONE);

        SearchReport {
            best_move,
            score: None,
            depth: None,
            stats: Default::default(),
            timed_out: false,
            elapsed_ms: start.elapsed().as_millis(),
        }
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// How a finished match was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The player to move had no legal move left, or resigned with `Move::NONE`
    Forfeit,
    /// The player to move answered with a move that is not legal
    IllegalMove,
    /// The player to move overran its turn clock
    Timeout,
}

/// Result of `play_match`
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub winner: Side,
    pub outcome: MatchOutcome,
    /// Moves applied, in order
    pub history: Vec<Move>,
    pub final_board: Board,
}

/// Plays `board` to the end with `agents[side.index()]` moving for each side
///
/// Each turn gets a fresh `turn_time_limit_ms` clock; answering after it has
/// run out loses the match even if the move is legal.
pub fn play_match(
    mut board: Board,
    agents: [&dyn Agent<Board>; 2],
    turn_time_limit_ms: u64,
    logger: &DebugLogger,
) -> MatchResult {
    let mut history = Vec::new();

    loop {
        let side = board.active_player();
        let agent = agents[side.index()];
        let legal_moves = board.legal_moves();

        let deadline = Deadline::new(turn_time_limit_ms);
        let time_left = || deadline.time_left();
        let report = agent.search(&board, &time_left);
        logger.log_decision(&board, agent, &report);

        let outcome = if deadline.time_left() < 0.0 {
            Some(MatchOutcome::Timeout)
        } else if legal_moves.is_empty() || report.best_move.is_none() {
            Some(MatchOutcome::Forfeit)
        } else if !legal_moves.contains(&report.best_move) {
            Some(MatchOutcome::IllegalMove)
        } else {
            None
        };

        if let Some(outcome) = outcome {
            info!(
                "Match over after {} moves: {} wins ({:?})",
                history.len(),
                side.opponent().as_str(),
                outcome
            );
            return MatchResult {
                winner: side.opponent(),
                outcome,
                history,
                final_board: board,
            };
        }

        debug!(
            "Turn {}: {} ({}) plays {}",
            board.move_count(),
            side.as_str(),
            agent.name(),
            report.best_move
        );
        board = board.forecast_move(report.best_move);
        history.push(report.best_move);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unlimited() -> f64 {
        f64::INFINITY
    }

    #[test]
    fn test_random_player_picks_legal_moves() {
        let board = Board::new(7, 7)
            .forecast_move(Move::new(3, 3))
            .forecast_move(Move::new(0, 0));
        let player = RandomPlayer::new(Some(7));

        for _ in 0..20 {
            let mv = player.get_move(&board, &unlimited);
            assert!(board.legal_moves().contains(&mv));
        }
    }

    #[test]
    fn test_random_player_is_reproducible_with_seed() {
        let board = Board::new(7, 7);
        let a: Vec<Move> = {
            let player = RandomPlayer::new(Some(42));
            (0..5).map(|_| player.get_move(&board, &unlimited)).collect()
        };
        let b: Vec<Move> = {
            let player = RandomPlayer::new(Some(42));
            (0..5).map(|_| player.get_move(&board, &unlimited)).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_player_without_moves() {
        let board = Board::new(3, 3)
            .forecast_move(Move::new(1, 1))
            .forecast_move(Move::new(0, 0));
        let player = RandomPlayer::new(None);
        assert_eq!(player.get_move(&board, &unlimited), Move::NONE);
    }

    #[test]
    fn test_agent_kind_parse() {
        assert_eq!(AgentKind::parse("alpha_beta").unwrap(), AgentKind::AlphaBeta);
        assert_eq!(AgentKind::parse("AlphaBeta").unwrap(), AgentKind::AlphaBeta);
        assert_eq!(AgentKind::parse("minimax").unwrap(), AgentKind::Minimax);
        assert!(AgentKind::parse("mcts").is_err());
    }

    /// Always answers with the same cell
    struct Stubborn(Move);

    impl Agent<Board> for Stubborn {
        fn search(&self, _game: &Board, _time_left: &dyn Fn() -> f64) -> SearchReport {
            SearchReport {
                best_move: self.0,
                score: None,
                depth: None,
                stats: Default::default(),
                timed_out: false,
                elapsed_ms: 0,
            }
        }

        fn name(&self) -> &str {
            "stubborn"
        }
    }

    #[test]
    fn test_random_match_runs_to_a_forfeit() {
        let first = RandomPlayer::new(Some(1));
        let second = RandomPlayer::new(Some(2));
        let result = play_match(
            Board::new(5, 5),
            [&first, &second],
            10_000,
            &DebugLogger::disabled(),
        );

        assert_eq!(result.outcome, MatchOutcome::Forfeit);
        assert!(result.final_board.legal_moves().is_empty());
        assert_eq!(result.winner, result.final_board.inactive_player());
        assert_eq!(result.final_board.move_count() as usize, result.history.len());

        // The history replays onto a fresh board
        let mut board = Board::new(5, 5);
        for mv in &result.history {
            board.apply_move(*mv).unwrap();
        }
        assert_eq!(board, result.final_board);
    }

    #[test]
    fn test_illegal_answer_loses_the_match() {
        let first = Stubborn(Move::new(0, 0));
        let second = Stubborn(Move::new(0, 0));
        let result = play_match(
            Board::new(5, 5),
            [&first, &second],
            10_000,
            &DebugLogger::disabled(),
        );

        assert_eq!(result.outcome, MatchOutcome::IllegalMove);
        assert_eq!(result.winner, Side::First);
        assert_eq!(result.history, vec![Move::new(0, 0)]);
    }

    #[test]
    fn test_resigning_with_sentinel_is_a_forfeit() {
        let first = Stubborn(Move::NONE);
        let second = Stubborn(Move::NONE);
        let result = play_match(
            Board::new(5, 5),
            [&first, &second],
            10_000,
            &DebugLogger::disabled(),
        );

        assert_eq!(result.outcome, MatchOutcome::Forfeit);
        assert_eq!(result.winner, Side::Second);
        assert!(result.history.is_empty());
        assert!(!result.final_board.legal_moves().is_empty());
    }

    #[test]
    fn test_alphabeta_resigns_a_proven_loss() {
        let board = Board::new(4, 4)
            .forecast_move(Move::new(1, 0))
            .forecast_move(Move::new(2, 0))
            .forecast_move(Move::new(2, 2))
            .forecast_move(Move::new(3, 2));
        let mut config = Config::default_hardcoded();
        config.search.max_depth = Some(3);
        let first = AlphaBetaPlayer::new(config.search.clone(), Side::First);
        let second = RandomPlayer::new(Some(3));

        let result = play_match(board.clone(), [&first, &second], 10_000, &DebugLogger::disabled());
        assert_eq!(result.outcome, MatchOutcome::Forfeit);
        assert_eq!(result.winner, Side::Second);
        assert!(result.history.is_empty());
        assert_eq!(result.final_board, board);
    }

    #[test]
    fn test_build_agent_names() {
        let config = Config::default_hardcoded();
        for kind in &[AgentKind::AlphaBeta, AgentKind::Minimax, AgentKind::Random] {
            let agent = build_agent::<Board>(*kind, &config, Side::First);
            assert_eq!(agent.name(), kind.as_str());
        }
    }
}
