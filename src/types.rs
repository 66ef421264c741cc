// Core value types shared by the board, the heuristics and the search engines

use serde::{Deserialize, Serialize};
use std::fmt;

/// A board cell as (row, column)
///
/// `Move::NONE` is the `(-1, -1)` sentinel returned when no legal move exists.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Move {
    pub row: i32,
    pub col: i32,
}

impl Move {
    pub const NONE: Move = Move { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Self {
        Move { row, col }
    }

    /// True for the `(-1, -1)` "no legal move" sentinel
    pub fn is_none(&self) -> bool {
        *self == Move::NONE
    }

    /// Parses `"row,col"` (whitespace tolerant)
    pub fn parse(s: &str) -> Result<Move, String> {
        let parts: Vec<&str> = s.trim().split(',').collect();
        if parts.len() != 2 {
            return Err(format!("Invalid move '{}'. Expected 'row,col'", s));
        }

        let row = parts[0]
            .trim()
            .parse::<i32>()
            .map_err(|e| format!("Invalid row '{}': {}", parts[0], e))?;
        let col = parts[1]
            .trim()
            .parse::<i32>()
            .map_err(|e| format!("Invalid column '{}': {}", parts[1], e))?;

        Ok(Move { row, col })
    }
}

impl From<(i32, i32)> for Move {
    fn from((row, col): (i32, i32)) -> Self {
        Move { row, col }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Identity of one of the two players
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// Returns both sides in turn order
    pub fn all() -> [Side; 2] {
        [Side::First, Side::Second]
    }

    pub fn opponent(&self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::First => "first",
            Side::Second => "second",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_sentinel() {
        assert!(Move::NONE.is_none());
        assert!(!Move::new(0, 0).is_none());
        assert_eq!(Move::NONE, Move::from((-1, -1)));
    }

    #[test]
    fn test_parse_move() {
        assert_eq!(Move::parse("3,5").unwrap(), Move::new(3, 5));
        assert_eq!(Move::parse(" 6 , 2 ").unwrap(), Move::new(6, 2));
        assert!(Move::parse("3").is_err());
        assert!(Move::parse("a,b").is_err());
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::First.opponent(), Side::Second);
        assert_eq!(Side::Second.opponent(), Side::First);
        assert_eq!(Side::Second.index(), 1);
    }
}
