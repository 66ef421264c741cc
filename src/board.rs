// Reference Isolation board
//
// Knight-move isolation on a width x height grid. Every move blocks the
// destination cell for the rest of the game; a player with no legal move on
// their turn loses. Boards are immutable per ply: `forecast_move` returns a
// new board and the cell bitset is shared behind an `Arc` until written.

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::sync::Arc;

use crate::game::GameState;
use crate::types::{Move, Side};

/// Knight jumps in generation order
const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Isolation position with copy-on-write cell storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BoardSnapshot", try_from = "BoardSnapshot")]
pub struct Board {
    width: usize,
    height: usize,
    /// One bit per cell, index `row + col * height`, set when blocked
    blocked: Arc<Vec<u64>>,
    locations: [Option<Move>; 2],
    active: Side,
    move_count: u32,
}

impl Board {
    /// Creates an empty board with the first player to move
    ///
    /// # Panics
    /// In debug builds, if either dimension is zero. Use the snapshot or
    /// `from_flat_state` constructors for dimensions read from input.
    pub fn new(width: usize, height: usize) -> Self {
        debug_assert!(
            width > 0 && height > 0,
            "board dimensions must be positive, got {}x{}",
            width,
            height
        );
        let words = (width * height + 63) / 64;
        Board {
            width,
            height,
            blocked: Arc::new(vec![0; words]),
            locations: [None, None],
            active: Side::First,
            move_count: 0,
        }
    }

    /// Number of moves applied since the position was created
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Cell index for an in-bounds coordinate
    fn index(&self, cell: Move) -> Option<usize> {
        if cell.row < 0 || cell.col < 0 {
            return None;
        }

        let (row, col) = (cell.row as usize, cell.col as usize);
        if row >= self.height || col >= self.width {
            return None;
        }

        Some(row + col * self.height)
    }

    fn cell_at(&self, idx: usize) -> Move {
        Move::new((idx % self.height) as i32, (idx / self.height) as i32)
    }

    fn is_set(&self, idx: usize) -> bool {
        (self.blocked[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// True when `cell` is on the board and not blocked
    pub fn is_blank(&self, cell: Move) -> bool {
        self.index(cell).map_or(false, |idx| !self.is_set(idx))
    }

    /// Marks a cell as blocked without moving a player
    pub fn block_cell(&mut self, cell: Move) -> Result<(), String> {
        let idx = self
            .index(cell)
            .ok_or_else(|| format!("Cell {} is outside the {}x{} board", cell, self.width, self.height))?;

        Arc::make_mut(&mut self.blocked)[idx / 64] |= 1u64 << (idx % 64);
        Ok(())
    }

    /// Applies a move for the active player in place
    pub fn apply_move(&mut self, mv: Move) -> Result<(), String> {
        if !self.legal_moves().contains(&mv) {
            return Err(format!(
                "Illegal move {} for {} player",
                mv,
                self.active.as_str()
            ));
        }

        self.block_cell(mv)?;
        self.locations[self.active.index()] = Some(mv);
        self.active = self.active.opponent();
        self.move_count += 1;
        Ok(())
    }

    /// Non-panicking variant of `forecast_move` for drivers
    pub fn try_forecast_move(&self, mv: Move) -> Result<Board, String> {
        let mut next = self.clone();
        next.apply_move(mv)?;
        Ok(next)
    }

    /// Imports the legacy flat layout
    ///
    /// `width * height` cell flags (non-zero = blocked, index
    /// `row + col * height`) followed by the initiative flag (0 = first
    /// player to move), the second player's cell index and the first
    /// player's cell index. A negative index means "not moved yet".
    pub fn from_flat_state(width: usize, height: usize, state: &[i64]) -> Result<Board, String> {
        let cells = width * height;
        if width == 0 || height == 0 {
            return Err("Board dimensions must be positive".to_string());
        }
        if state.len() != cells + 3 {
            return Err(format!(
                "Flat state for a {}x{} board needs {} entries, got {}",
                width,
                height,
                cells + 3,
                state.len()
            ));
        }

        let mut board = Board::new(width, height);
        for (idx, flag) in state[..cells].iter().enumerate() {
            if *flag != 0 {
                let cell = board.cell_at(idx);
                board.block_cell(cell)?;
            }
        }

        let decode = |raw: i64| -> Result<Option<Move>, String> {
            if raw < 0 {
                return Ok(None);
            }
            let idx = raw as usize;
            if idx >= cells {
                return Err(format!("Player cell index {} is outside the board", raw));
            }
            Ok(Some(board.cell_at(idx)))
        };

        let second = decode(state[cells + 1])?;
        let first = decode(state[cells + 2])?;
        board.locations = [first, second];
        board.active = if state[cells] == 0 {
            Side::First
        } else {
            Side::Second
        };

        for cell in board.locations.iter().flatten().copied().collect::<Vec<_>>() {
            board.block_cell(cell)?;
        }

        Ok(board)
    }
}

impl GameState for Board {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn active_player(&self) -> Side {
        self.active
    }

    fn player_location(&self, player: Side) -> Option<Move> {
        self.locations[player.index()]
    }

    fn blank_spaces(&self) -> Vec<Move> {
        (0..self.width * self.height)
            .filter(|&idx| !self.is_set(idx))
            .map(|idx| self.cell_at(idx))
            .collect()
    }

    fn legal_moves_for(&self, player: Side) -> Vec<Move> {
        let loc = match self.player_location(player) {
            Some(loc) => loc,
            None => return self.blank_spaces(),
        };

        KNIGHT_OFFSETS
            .iter()
            .map(|(dr, dc)| Move::new(loc.row + dr, loc.col + dc))
            .filter(|&target| self.is_blank(target))
            .collect()
    }

    fn forecast_move(&self, mv: Move) -> Self {
        match self.try_forecast_move(mv) {
            Ok(next) => next,
            Err(e) => panic!("forecast_move contract violation: {}", e),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [first, second] = self.locations;
        for row in 0..self.height {
            write!(f, " |")?;
            for col in 0..self.width {
                let cell = Move::new(row as i32, col as i32);
                let symbol = if first == Some(cell) {
                    '1'
                } else if second == Some(cell) {
                    '2'
                } else if self.is_blank(cell) {
                    ' '
                } else {
                    '-'
                };
                write!(f, " {} |", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Serialized form of a board, used by config files and decision logs
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub blocked: Vec<Move>,
    #[serde(default)]
    pub first: Option<Move>,
    #[serde(default)]
    pub second: Option<Move>,
    pub active: Side,
    #[serde(default)]
    pub move_count: u32,
}

impl From<Board> for BoardSnapshot {
    fn from(board: Board) -> Self {
        let blocked = (0..board.width * board.height)
            .filter(|&idx| board.is_set(idx))
            .map(|idx| board.cell_at(idx))
            .collect();

        BoardSnapshot {
            width: board.width,
            height: board.height,
            blocked,
            first: board.locations[0],
            second: board.locations[1],
            active: board.active,
            move_count: board.move_count,
        }
    }
}

impl TryFrom<BoardSnapshot> for Board {
    type Error = String;

    /// Player cells are always blocked, whether or not the snapshot lists them
    fn try_from(snapshot: BoardSnapshot) -> Result<Self, Self::Error> {
        if snapshot.width == 0 || snapshot.height == 0 {
            return Err("Board dimensions must be positive".to_string());
        }

        let mut board = Board::new(snapshot.width, snapshot.height);
        for cell in snapshot.blocked {
            board.block_cell(cell)?;
        }
        for cell in snapshot.first.iter().chain(snapshot.second.iter()) {
            board.block_cell(*cell)?;
        }

        board.locations = [snapshot.first, snapshot.second];
        board.active = snapshot.active;
        board.move_count = snapshot.move_count;
        Ok(board)
    }
}
