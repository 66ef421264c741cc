//! Search Equivalence Tests
//!
//! Fixed-depth minimax and depth-limited alpha-beta must agree on the root
//! value, and on the chosen move unless the root is lost, with alpha-beta
//! never expanding more nodes.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use isolation_agent::alphabeta::AlphaBetaPlayer;
use isolation_agent::board::Board;
use isolation_agent::config::SearchConfig;
use isolation_agent::game::GameState;
use isolation_agent::heuristics::Heuristic;
use isolation_agent::minimax::MinimaxPlayer;
use isolation_agent::types::{Move, Side};

fn unlimited() -> f64 {
    f64::INFINITY
}

fn search_config(heuristic: Heuristic) -> SearchConfig {
    SearchConfig {
        heuristic,
        ..SearchConfig::default()
    }
}

/// 9x9 midgame: First at (5,4) to move, Second at (3,6), ten blocked cells
fn scenario() -> Board {
    let mut state = vec![0i64; 81];
    for idx in &[22, 29, 31, 38, 40, 41, 47, 49, 50, 56, 57, 58] {
        state[*idx] = 1;
    }
    state.extend_from_slice(&[0, 57, 41]);
    Board::from_flat_state(9, 9, &state).expect("scenario state is valid")
}

#[test]
fn test_scenario_position() {
    let board = scenario();
    assert_eq!(board.active_player(), Side::First);
    assert_eq!(board.player_location(Side::First), Some(Move::new(5, 4)));
    assert_eq!(board.player_location(Side::Second), Some(Move::new(3, 6)));
    assert_eq!(board.blank_spaces().len(), 69);
    assert_eq!(
        board.legal_moves(),
        vec![
            Move::new(3, 3),
            Move::new(3, 5),
            Move::new(6, 2),
            Move::new(6, 6),
            Move::new(7, 3),
            Move::new(7, 5),
        ]
    );
}

#[test]
fn test_scenario_minimax_moves_by_depth() {
    let board = scenario();
    let expected = [
        (1, Move::new(6, 2)),
        (2, Move::new(6, 2)),
        (3, Move::new(3, 3)),
        (4, Move::new(3, 5)),
    ];

    for heuristic in &[
        Heuristic::Mobility,
        Heuristic::WeightedMobility,
        Heuristic::DistanceRatio,
    ] {
        let player = MinimaxPlayer::new(search_config(*heuristic));
        for (depth, mv) in &expected {
            let chosen = player.minimax(&board, *depth, &unlimited).unwrap();
            assert_eq!(chosen, *mv, "{:?} at depth {}", heuristic, depth);
        }
    }

    let blend = MinimaxPlayer::new(search_config(Heuristic::FreeSpaceBlend));
    for depth in 1..=4 {
        assert_eq!(blend.minimax(&board, depth, &unlimited).unwrap(), Move::new(6, 2));
    }
}

#[test]
fn test_scenario_alphabeta_values_by_depth() {
    let board = scenario();
    let mobility = AlphaBetaPlayer::new(search_config(Heuristic::Mobility), Side::First);
    let blend = AlphaBetaPlayer::new(search_config(Heuristic::FreeSpaceBlend), Side::First);

    let expected_mobility = [1.0, 1.0, 2.0, 2.0, 1.0];
    let expected_blend = [
        0.5740740740740741,
        7.296296296296296,
        7.376543209876543,
        21.22222222222222,
        20.47530864197531,
    ];

    for depth in 0..=4u32 {
        let outcome = mobility.evaluate(&board, depth, &unlimited).unwrap();
        assert_eq!(outcome.score, expected_mobility[depth as usize], "depth {}", depth);

        let outcome = blend.evaluate(&board, depth, &unlimited).unwrap();
        assert!(
            (outcome.score - expected_blend[depth as usize]).abs() < 1e-9,
            "depth {}: {}",
            depth,
            outcome.score
        );
        if depth == 0 {
            assert_eq!(outcome.best_move, Move::NONE);
        } else {
            assert_eq!(outcome.best_move, Move::new(6, 2));
        }
    }
}

#[test]
fn test_scenario_engines_agree() {
    let board = scenario();
    for heuristic in &Heuristic::all() {
        let minimax = MinimaxPlayer::new(search_config(*heuristic));
        let alphabeta = AlphaBetaPlayer::new(search_config(*heuristic), Side::First);

        for depth in 1..=4 {
            let full = minimax.evaluate(&board, depth, &unlimited).unwrap();
            let pruned = alphabeta.evaluate(&board, depth, &unlimited).unwrap();
            assert_eq!(full.best_move, pruned.best_move, "{:?} depth {}", heuristic, depth);
            assert_eq!(full.score, pruned.score, "{:?} depth {}", heuristic, depth);
            assert!(pruned.stats.nodes <= full.stats.nodes);
        }
    }
}

#[test]
fn test_pruning_happens_on_scenario() {
    let board = scenario();
    let minimax = MinimaxPlayer::new(search_config(Heuristic::Mobility));
    let alphabeta = AlphaBetaPlayer::new(search_config(Heuristic::Mobility), Side::First);

    let full = minimax.evaluate(&board, 4, &unlimited).unwrap();
    let pruned = alphabeta.evaluate(&board, 4, &unlimited).unwrap();
    assert!(pruned.stats.cutoffs > 0);
    assert!(pruned.stats.nodes < full.stats.nodes);
    assert_eq!(full.stats.cutoffs, 0);
}

/// Plays random moves from an empty board, stopping early if the game ends
fn random_position(rng: &mut StdRng, width: usize, height: usize, plies: usize) -> Board {
    let mut board = Board::new(width, height);
    for _ in 0..plies {
        match board.legal_moves().choose(rng) {
            Some(mv) => board = board.forecast_move(*mv),
            None => break,
        }
    }
    board
}

#[test]
fn test_random_positions_engines_agree() {
    let mut rng = StdRng::seed_from_u64(2017);

    for _ in 0..40 {
        let width = rng.random_range(4..=7);
        let height = rng.random_range(4..=7);
        let plies = rng.random_range(2..=10);
        let board = random_position(&mut rng, width, height, plies);
        let side = board.active_player();

        for heuristic in &Heuristic::all() {
            let minimax = MinimaxPlayer::new(search_config(*heuristic));
            let alphabeta = AlphaBetaPlayer::new(search_config(*heuristic), side);

            for depth in 1..=3 {
                let full = minimax.evaluate(&board, depth, &unlimited).unwrap();
                let pruned = alphabeta.evaluate(&board, depth, &unlimited).unwrap();

                assert_eq!(full.score, pruned.score, "{:?} depth {}\n{}", heuristic, depth, board);
                assert!(pruned.stats.nodes <= full.stats.nodes);

                if full.score == f64::NEG_INFINITY {
                    // Minimax still names its first move, alpha-beta gives up
                    assert_eq!(pruned.best_move, Move::NONE);
                    if !board.legal_moves().is_empty() {
                        assert_eq!(full.best_move, board.legal_moves()[0]);
                    }
                } else {
                    assert_eq!(full.best_move, pruned.best_move, "{:?} depth {}\n{}", heuristic, depth, board);
                    assert!(board.legal_moves().contains(&pruned.best_move));
                }
            }
        }
    }
}

#[test]
fn test_no_legal_moves_for_either_engine() {
    // First takes the center of a 3x3 board, Second the corner: First is stuck
    let board = Board::new(3, 3)
        .forecast_move(Move::new(1, 1))
        .forecast_move(Move::new(0, 0));
    assert!(board.legal_moves().is_empty());

    let minimax = MinimaxPlayer::new(search_config(Heuristic::DistanceRatio));
    let outcome = minimax.evaluate(&board, 3, &unlimited).unwrap();
    assert_eq!(outcome.best_move, Move::NONE);
    assert_eq!(outcome.score, f64::NEG_INFINITY);

    let alphabeta = AlphaBetaPlayer::new(search_config(Heuristic::DistanceRatio), Side::First);
    for depth in 0..3 {
        let outcome = alphabeta.evaluate(&board, depth, &unlimited).unwrap();
        assert_eq!(outcome.best_move, Move::NONE);
        assert_eq!(outcome.score, f64::NEG_INFINITY);
    }
}
