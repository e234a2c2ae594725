use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// A cell of the maze, addressed by row and column.
///
/// Bounds are not checked here; the grid decides whether a cell exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The cell one step away in `direction`, or `None` below index zero.
    pub fn step(self, direction: Direction) -> Option<Cell> {
        let (dr, dc) = direction.offset();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Cell { row, col })
    }

    /// Direction leading from `self` to `other` when they are 4-neighbours.
    pub fn direction_to(self, other: Cell) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&d| self.step(d) == Some(other))
    }

    pub fn is_adjacent(self, other: Cell) -> bool {
        self.direction_to(other).is_some()
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
