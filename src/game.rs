// Game state contract consumed by the heuristics and the search engines
//
// The engines never look inside a board: everything they need (dimensions,
// blank cells, player locations, move generation, forecasting and terminal
// tests) goes through this trait.

use crate::types::{Move, Side};

/// Immutable-per-ply view of an isolation position
///
/// Implementations must produce legal moves in a fixed, deterministic order:
/// the engines break score ties by keeping the first move seen.
pub trait GameState: Sized {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Player to move in this position
    fn active_player(&self) -> Side;

    fn inactive_player(&self) -> Side {
        self.active_player().opponent()
    }

    fn opponent(&self, player: Side) -> Side {
        player.opponent()
    }

    /// Current cell of `player`, `None` before their first move
    fn player_location(&self, player: Side) -> Option<Move>;

    /// Cells not yet occupied or visited
    fn blank_spaces(&self) -> Vec<Move>;

    /// Legal moves for `player` in generation order
    fn legal_moves_for(&self, player: Side) -> Vec<Move>;

    /// Legal moves for the active player
    fn legal_moves(&self) -> Vec<Move> {
        self.legal_moves_for(self.active_player())
    }

    /// Returns a new state with `mv` applied and the players swapped
    ///
    /// # Panics
    /// When `mv` is not a legal move for the active player. Searches only
    /// forecast moves they just obtained from `legal_moves`.
    fn forecast_move(&self, mv: Move) -> Self;

    fn is_winner(&self, player: Side) -> bool {
        player == self.inactive_player() && self.legal_moves().is_empty()
    }

    fn is_loser(&self, player: Side) -> bool {
        player == self.active_player() && self.legal_moves().is_empty()
    }

    /// Exact value of a finished game for `player`
    ///
    /// `+inf` for a win, `-inf` for a loss, `0.0` while the game is undecided.
    fn utility(&self, player: Side) -> f64 {
        if !self.legal_moves().is_empty() {
            return 0.0;
        }

        if player == self.inactive_player() {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        }
    }
}
