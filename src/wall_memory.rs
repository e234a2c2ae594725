//! Accumulated wall observations for one run.
//!
//! Wraps the [`MazeMap`] and records which directions of each cell have been
//! observed. Knowledge only grows: walls are added, never removed.

use tracing::debug;

use crate::cell::Cell;
use crate::direction::Direction;
use crate::error::Result;
use crate::map::MazeMap;
use crate::walls::{merge_wall, WallState, Walls};

/// A wall that became present, as the edge between two adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockedEdge {
    pub from: Cell,
    pub to: Cell,
}

impl BlockedEdge {
    /// True if this edge joins `a` and `b`, in either orientation.
    pub fn joins(&self, a: Cell, b: Cell) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

#[derive(Debug, Clone)]
pub struct WallMemory {
    map: MazeMap,
    /// Per cell, bit set for every direction observed at least once.
    observed: Vec<u8>,
}

impl WallMemory {
    pub fn new(map: MazeMap) -> Self {
        let observed = vec![0; map.cell_count()];
        Self { map, observed }
    }

    pub fn map(&self) -> &MazeMap {
        &self.map
    }

    /// Folds a sensor reading taken at `cell` into the map.
    ///
    /// Directions reported `Unknown` are left untouched. Returns the edges that
    /// became present because of this reading.
    pub fn observe(&mut self, cell: Cell, reading: &Walls) -> Result<Vec<BlockedEdge>> {
        let current = *self.map.walls(cell)?;
        let mut blocked = Vec::new();

        for (direction, seen) in reading.known() {
            self.mark_observed(cell, direction);

            let old = current.get(direction);
            let merged = merge_wall(old, seen);
            if merged == old {
                continue;
            }
            if !self.map.set_wall(cell, direction, merged) {
                continue;
            }
            if merged == WallState::Present {
                if let Some(to) = self.map.neighbor(cell, direction) {
                    debug!("Wall discovered between {} and {}", cell, to);
                    blocked.push(BlockedEdge { from: cell, to });
                }
            }
        }

        Ok(blocked)
    }

    fn mark_observed(&mut self, cell: Cell, direction: Direction) {
        let idx = cell.row * self.map.width() + cell.col;
        self.observed[idx] |= direction.bit();
        if let Some(other) = self.map.neighbor(cell, direction) {
            let idx = other.row * self.map.width() + other.col;
            self.observed[idx] |= direction.opposite().bit();
        }
    }

    /// All four directions of `cell` have been observed.
    pub fn is_fully_explored(&self, cell: Cell) -> bool {
        self.map.contains(cell)
            && self.observed[cell.row * self.map.width() + cell.col] == 0b1111
    }

    pub fn explored_count(&self) -> usize {
        self.observed.iter().filter(|&&m| m == 0b1111).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(width: usize, height: usize) -> WallMemory {
        WallMemory::new(MazeMap::new(width, height).unwrap())
    }

    #[test]
    fn test_observe_is_symmetric() {
        let mut mem = memory(3, 3);
        let a = Cell::new(1, 1);
        let b = Cell::new(0, 1);
        let mut reading = Walls::default();
        reading.set(Direction::North, WallState::Present);

        let blocked = mem.observe(a, &reading).unwrap();
        assert_eq!(blocked, vec![BlockedEdge { from: a, to: b }]);
        assert_eq!(mem.map().wall_between(b, a).unwrap(), WallState::Present);
    }

    #[test]
    fn test_silence_is_not_absence() {
        let mut mem = memory(3, 3);
        let a = Cell::new(1, 1);
        let mut reading = Walls::default();
        reading.set(Direction::East, WallState::Absent);
        mem.observe(a, &reading).unwrap();

        assert_eq!(mem.map().wall(a, Direction::East).unwrap(), WallState::Absent);
        assert_eq!(mem.map().wall(a, Direction::South).unwrap(), WallState::Unknown);
        assert!(!mem.is_fully_explored(a));
    }

    #[test]
    fn test_walls_are_never_removed() {
        let mut mem = memory(2, 1);
        let a = Cell::new(0, 0);
        let present = Walls::from_present(|_| true);
        let open = Walls::from_present(|_| false);

        assert_eq!(mem.observe(a, &present).unwrap().len(), 1);
        assert!(mem.observe(a, &open).unwrap().is_empty());
        assert_eq!(mem.map().wall(a, Direction::East).unwrap(), WallState::Present);
    }

    #[test]
    fn test_absent_then_present_is_reported() {
        let mut mem = memory(2, 1);
        let a = Cell::new(0, 0);
        mem.observe(a, &Walls::from_present(|_| false)).unwrap();
        let blocked = mem.observe(a, &Walls::from_present(|_| true)).unwrap();
        assert_eq!(blocked.len(), 1);
        assert!(blocked[0].joins(Cell::new(0, 1), a));
    }

    #[test]
    fn test_fully_explored_from_both_sides() {
        let mut mem = memory(2, 1);
        let left = Cell::new(0, 0);
        let right = Cell::new(0, 1);
        mem.observe(left, &Walls::from_present(|d| d != Direction::East))
            .unwrap();
        assert!(mem.is_fully_explored(left));
        // West of `right` was seen from `left`; the rest is still unobserved.
        assert!(!mem.is_fully_explored(right));

        mem.observe(right, &Walls::from_present(|d| d != Direction::West))
            .unwrap();
        assert!(mem.is_fully_explored(right));
        assert_eq!(mem.explored_count(), 2);
    }
}
