// Core value types shared by the board, the search and the turn driver

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D coordinate on the grid, row 0 is the top row
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const fn new(row: i32, col: i32) -> Self {
        Coord { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Represents the four possible movement directions on the grid
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all directions in enumeration order
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Calculates the adjacent coordinate when moving in this direction
    pub fn apply(&self, coord: &Coord) -> Coord {
        match self {
            Direction::Up => Coord { row: coord.row - 1, col: coord.col },
            Direction::Down => Coord { row: coord.row + 1, col: coord.col },
            Direction::Left => Coord { row: coord.row, col: coord.col - 1 },
            Direction::Right => Coord { row: coord.row, col: coord.col + 1 },
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which movement rule applies to a mover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoverKind {
    Seeker,
    Pursuer,
}

/// Identifies a single mover on the board
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mover {
    Seeker,
    /// Index into the board's stable pursuer ordering
    Pursuer(usize),
}

impl Mover {
    pub fn kind(&self) -> MoverKind {
        match self {
            Mover::Seeker => MoverKind::Seeker,
            Mover::Pursuer(_) => MoverKind::Pursuer,
        }
    }
}

/// One entry of the game's move history.
///
/// `direction` is `None` when the mover had no legal move and stayed put.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnRecord {
    pub mover: Mover,
    pub direction: Option<Direction>,
    pub resulting_score: i32,
}
