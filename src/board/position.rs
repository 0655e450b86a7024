//! Grid coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Offsets of the 8-neighborhood, row by row.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// An integer coordinate on the board.
///
/// Ordered row-major (`y` first) so ordered collections of positions iterate
/// the board top to bottom.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub y: i32,
    pub x: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The 8 surrounding coordinates. Not bounds-checked.
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(dx, dy)| Position::new(self.x + dx, self.y + dy))
    }

    /// True if `other` is one of the 8 surrounding coordinates.
    pub fn is_adjacent(self, other: Position) -> bool {
        self != other && (self.x - other.x).abs() <= 1 && (self.y - other.y).abs() <= 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
