// Heuristic evaluation of non-terminal cutoff positions
//
// All scores are from the point of view of `player`. Every heuristic first
// checks for a decided game and returns +inf / -inf so cutoff scores agree
// with the exact terminal values used by the search engines.

use serde::{Deserialize, Serialize};

use crate::game::GameState;
use crate::types::{Move, Side};

/// Center ratio above which the board counts as "still open"
pub const OPEN_BOARD_CENTER_RATIO: f64 = 0.6;

/// Weight of a move into the center region
pub const CENTER_MOVE_WEIGHT: f64 = 2.0;

/// Weight of a move into one of the four corners
pub const CORNER_MOVE_WEIGHT: f64 = 0.5;

/// Weight of any other move
pub const DEFAULT_MOVE_WEIGHT: f64 = 1.0;

/// The closed set of evaluation policies a player can be configured with
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Own mobility minus opponent mobility
    Mobility,
    /// Center-weighted mobility while the center is open, plain mobility after
    WeightedMobility,
    /// Distance between players while the center is open, plain mobility after
    DistanceRatio,
    /// Free-space weighted blend of center distance and mobility
    FreeSpaceBlend,
}

impl Heuristic {
    pub fn all() -> [Heuristic; 4] {
        [
            Heuristic::Mobility,
            Heuristic::WeightedMobility,
            Heuristic::DistanceRatio,
            Heuristic::FreeSpaceBlend,
        ]
    }

    /// Scores `game` for `player` with this policy
    pub fn score<G: GameState>(&self, game: &G, player: Side) -> f64 {
        match self {
            Heuristic::Mobility => mobility_score(game, player),
            Heuristic::WeightedMobility => weighted_mobility_score(game, player),
            Heuristic::DistanceRatio => distance_ratio_score(game, player),
            Heuristic::FreeSpaceBlend => free_space_blend_score(game, player),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Heuristic::Mobility => "mobility",
            Heuristic::WeightedMobility => "weighted_mobility",
            Heuristic::DistanceRatio => "distance_ratio",
            Heuristic::FreeSpaceBlend => "free_space_blend",
        }
    }

    pub fn parse(s: &str) -> Result<Heuristic, String> {
        Heuristic::all()
            .iter()
            .find(|h| h.as_str() == s.trim().to_lowercase())
            .copied()
            .ok_or_else(|| format!("Unknown heuristic: {}", s))
    }
}

/// Exact score for a decided game, `None` while it is still running
fn decided_score<G: GameState>(game: &G, player: Side) -> Option<f64> {
    if game.is_winner(player) {
        Some(f64::INFINITY)
    } else if game.is_loser(player) {
        Some(f64::NEG_INFINITY)
    } else {
        None
    }
}

fn mobility_difference<G: GameState>(game: &G, player: Side) -> f64 {
    let own = game.legal_moves_for(player).len() as f64;
    let theirs = game.legal_moves_for(game.opponent(player)).len() as f64;
    own - theirs
}

/// `|moves(player)| - |moves(opponent)|`
pub fn mobility_score<G: GameState>(game: &G, player: Side) -> f64 {
    if let Some(score) = decided_score(game, player) {
        return score;
    }

    mobility_difference(game, player)
}

/// Weighted move score difference while the center is open, mobility otherwise
pub fn weighted_mobility_score<G: GameState>(game: &G, player: Side) -> f64 {
    if let Some(score) = decided_score(game, player) {
        return score;
    }

    if center_space_ratio(game) > OPEN_BOARD_CENTER_RATIO {
        let (height, width) = (game.height(), game.width());
        let own = weighted_move_score(&game.legal_moves_for(player), height, width);
        let theirs = weighted_move_score(
            &game.legal_moves_for(game.opponent(player)),
            height,
            width,
        );
        own - theirs
    } else {
        mobility_difference(game, player)
    }
}

/// Distance between the players while the center is open, mobility otherwise
pub fn distance_ratio_score<G: GameState>(game: &G, player: Side) -> f64 {
    if let Some(score) = decided_score(game, player) {
        return score;
    }

    if center_space_ratio(game) > OPEN_BOARD_CENTER_RATIO {
        distance_between_players(game)
    } else {
        mobility_difference(game, player)
    }
}

/// `free * distance_from_center + (1 - free) * mobility`
///
/// Early in the game (mostly free board) the position relative to the
/// center dominates; as the board fills up mobility takes over.
pub fn free_space_blend_score<G: GameState>(game: &G, player: Side) -> f64 {
    if let Some(score) = decided_score(game, player) {
        return score;
    }

    let free = free_space_ratio(game);
    free * distance_from_center(game, player) + (1.0 - free) * mobility_difference(game, player)
}

/// Fraction of all cells that are still blank
pub fn free_space_ratio<G: GameState>(game: &G) -> f64 {
    let total = (game.width() * game.height()) as f64;
    game.blank_spaces().len() as f64 / total
}

/// Fraction of all cells that are blank and inside the center region
pub fn center_space_ratio<G: GameState>(game: &G) -> f64 {
    let (height, width) = (game.height(), game.width());
    let center = game
        .blank_spaces()
        .iter()
        .filter(|cell| is_center_cell(**cell, height, width))
        .count();
    center as f64 / (width * height) as f64
}

/// Center region: more than two cells in from every edge
pub fn is_center_cell(cell: Move, height: usize, width: usize) -> bool {
    let (h, w) = (height as i32, width as i32);
    2 < cell.row && cell.row < w - 2 && 2 < cell.col && cell.col < h - 2
}

fn is_corner_cell(cell: Move, height: usize, width: usize) -> bool {
    let (h, w) = (height as i32, width as i32);
    (cell.row == 0 || cell.row == w - 1) && (cell.col == 0 || cell.col == h - 1)
}

/// Weight of a single move: center 2.0, corner 0.5, anything else 1.0
pub fn move_weight(mv: Move, height: usize, width: usize) -> f64 {
    if is_center_cell(mv, height, width) {
        CENTER_MOVE_WEIGHT
    } else if is_corner_cell(mv, height, width) {
        CORNER_MOVE_WEIGHT
    } else {
        DEFAULT_MOVE_WEIGHT
    }
}

/// Sum of `move_weight` over a move list
pub fn weighted_move_score(moves: &[Move], height: usize, width: usize) -> f64 {
    moves.iter().map(|mv| move_weight(*mv, height, width)).sum()
}

/// Euclidean distance between the active and inactive players
///
/// 0.0 while either player is still unplaced.
pub fn distance_between_players<G: GameState>(game: &G) -> f64 {
    match (
        game.player_location(game.active_player()),
        game.player_location(game.inactive_player()),
    ) {
        (Some(a), Some(b)) => {
            let dr = (a.row - b.row) as f64;
            let dc = (a.col - b.col) as f64;
            (dr * dr + dc * dc).sqrt()
        }
        _ => 0.0,
    }
}

/// Squared distance from `player` to the geometric center (width/2, height/2)
///
/// 0.0 while the player is unplaced.
pub fn distance_from_center<G: GameState>(game: &G, player: Side) -> f64 {
    let (cx, cy) = (game.width() as f64 / 2.0, game.height() as f64 / 2.0);
    match game.player_location(player) {
        Some(loc) => {
            let dy = cy - loc.row as f64;
            let dx = cx - loc.col as f64;
            dy * dy + dx * dx
        }
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn midgame() -> Board {
        Board::new(7, 7)
            .forecast_move(Move::new(3, 3))
            .forecast_move(Move::new(0, 0))
    }

    #[test]
    fn test_move_weights() {
        assert_eq!(move_weight(Move::new(3, 3), 7, 7), 2.0);
        assert_eq!(move_weight(Move::new(4, 4), 9, 9), 2.0);
        for corner in &[(0, 0), (0, 6), (6, 0), (6, 6)] {
            assert_eq!(move_weight(Move::from(*corner), 7, 7), 0.5);
        }
        assert_eq!(move_weight(Move::new(1, 2), 7, 7), 1.0);
        assert_eq!(move_weight(Move::new(2, 3), 7, 7), 1.0);
    }

    #[test]
    fn test_weighted_move_score_sums_weights() {
        let moves = vec![Move::new(3, 3), Move::new(0, 0), Move::new(1, 2)];
        assert_eq!(weighted_move_score(&moves, 7, 7), 3.5);
        assert_eq!(weighted_move_score(&[], 7, 7), 0.0);
    }

    #[test]
    fn test_ratios_on_empty_board() {
        let board = Board::new(7, 7);
        assert_eq!(free_space_ratio(&board), 1.0);
        // Rows and columns 3 and 4 qualify on a 7x7 board
        assert_eq!(center_space_ratio(&board), 4.0 / 49.0);
    }

    #[test]
    fn test_open_board_uses_weighted_moves() {
        // 30x30: a 25x25 center, ratio 625/900 > 0.6
        let board = Board::new(30, 30)
            .forecast_move(Move::new(10, 10))
            .forecast_move(Move::new(20, 20));
        assert!(center_space_ratio(&board) > OPEN_BOARD_CENTER_RATIO);

        // Both players have eight center moves
        assert_eq!(weighted_mobility_score(&board, Side::First), 0.0);
        let expected = (200.0f64).sqrt();
        assert!((distance_ratio_score(&board, Side::First) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_crowded_board_falls_back_to_mobility() {
        let board = midgame();
        assert!(center_space_ratio(&board) <= OPEN_BOARD_CENTER_RATIO);

        // First at (3,3) has 8 jumps, Second in the corner has 2
        assert_eq!(mobility_score(&board, Side::First), 6.0);
        assert_eq!(weighted_mobility_score(&board, Side::First), 6.0);
        assert_eq!(distance_ratio_score(&board, Side::Second), -6.0);
    }

    #[test]
    fn test_free_space_blend() {
        let board = midgame();
        let free = 47.0 / 49.0;
        // First sits at (3,3), center is (3.5, 3.5)
        let expected = free * 0.5 + (1.0 - free) * 6.0;
        assert!((free_space_blend_score(&board, Side::First) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unplaced_players_have_zero_distance() {
        let board = Board::new(7, 7);
        assert_eq!(distance_between_players(&board), 0.0);
        assert_eq!(distance_from_center(&board, Side::First), 0.0);
    }

    #[test]
    fn test_decided_game_short_circuits() {
        let board = Board::new(3, 3)
            .forecast_move(Move::new(1, 1))
            .forecast_move(Move::new(0, 0));

        for heuristic in Heuristic::all().iter() {
            assert_eq!(heuristic.score(&board, Side::Second), f64::INFINITY);
            assert_eq!(heuristic.score(&board, Side::First), f64::NEG_INFINITY);
        }
    }

    #[test]
    fn test_parse_heuristic() {
        assert_eq!(Heuristic::parse("distance_ratio").unwrap(), Heuristic::DistanceRatio);
        assert_eq!(Heuristic::parse("Mobility").unwrap(), Heuristic::Mobility);
        assert!(Heuristic::parse("material").is_err());
    }
}
