//! Depth-first search planner with an explicit stack.
//!
//! The stack (the search path) runs from the start cell to the frontier. The
//! planner is re-entrant: the controller asks for one step at a time and may
//! truncate the path between calls when a newly discovered wall cuts it.

use std::collections::HashSet;

use tracing::debug;

use crate::cell::Cell;
use crate::error::Result;
use crate::map::MazeMap;
use crate::wall_memory::BlockedEdge;
use crate::walls::WallState;

/// Outcome of one planning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStep {
    /// Advance to a newly pushed, adjacent cell.
    Move(Cell),
    /// The frontier was a dead end; return to the new top of the stack.
    Backtrack(Cell),
    /// The stack emptied: nothing left to explore.
    SearchExhausted,
}

#[derive(Debug, Clone)]
pub struct DfsPlanner {
    path: Vec<Cell>,
    visited: HashSet<Cell>,
}

impl DfsPlanner {
    pub fn new(start: Cell) -> Self {
        let mut planner = Self {
            path: Vec::new(),
            visited: HashSet::new(),
        };
        planner.initialize(start);
        planner
    }

    /// Resets the search for a fresh run.
    pub fn initialize(&mut self, start: Cell) {
        self.path.clear();
        self.visited.clear();
        self.path.push(start);
        self.visited.insert(start);
    }

    /// Current frontier (top of the stack).
    pub fn frontier(&self) -> Option<Cell> {
        self.path.last().copied()
    }

    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    pub fn visited(&self) -> &HashSet<Cell> {
        &self.visited
    }

    pub fn is_visited(&self, cell: Cell) -> bool {
        self.visited.contains(&cell)
    }

    /// Computes the next step from the frontier.
    ///
    /// Neighbours are tried in North, East, South, West order; the first one
    /// neither walled off nor visited is pushed.
    pub fn next_move(&mut self, map: &MazeMap) -> Result<PlanStep> {
        let Some(frontier) = self.frontier() else {
            return Ok(PlanStep::SearchExhausted);
        };

        for candidate in map.neighbors(frontier) {
            if map.wall_between(frontier, candidate)? == WallState::Present {
                continue;
            }
            if self.visited.contains(&candidate) {
                continue;
            }
            self.visited.insert(candidate);
            self.path.push(candidate);
            return Ok(PlanStep::Move(candidate));
        }

        self.path.pop();
        match self.frontier() {
            Some(previous) => {
                debug!("Dead end at {}, backtracking to {}", frontier, previous);
                Ok(PlanStep::Backtrack(previous))
            }
            None => Ok(PlanStep::SearchExhausted),
        }
    }

    /// Cuts the path at the first blocked edge found walking back from the frontier.
    ///
    /// The cell before the blocked edge becomes the frontier. Visited cells are
    /// kept. Returns the new frontier if the path was cut.
    pub fn truncate_at_blocked(&mut self, blocked: &[BlockedEdge]) -> Option<Cell> {
        if blocked.is_empty() || self.path.len() < 2 {
            return None;
        }
        let cut = (0..self.path.len() - 1).rev().find(|&i| {
            let (a, b) = (self.path[i], self.path[i + 1]);
            blocked.iter().any(|edge| edge.joins(a, b))
        })?;
        self.path.truncate(cut + 1);
        self.frontier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;

    fn edge(from: Cell, to: Cell) -> BlockedEdge {
        BlockedEdge { from, to }
    }

    #[test]
    fn test_initialize() {
        let planner = DfsPlanner::new(Cell::new(0, 0));
        assert_eq!(planner.path(), &[Cell::new(0, 0)]);
        assert!(planner.is_visited(Cell::new(0, 0)));
    }

    #[test]
    fn test_first_move_prefers_east_from_corner() {
        let map = MazeMap::new(3, 3).unwrap();
        let mut planner = DfsPlanner::new(Cell::new(0, 0));
        assert_eq!(
            planner.next_move(&map).unwrap(),
            PlanStep::Move(Cell::new(0, 1))
        );
    }

    #[test]
    fn test_north_has_priority() {
        let map = MazeMap::new(3, 3).unwrap();
        let mut planner = DfsPlanner::new(Cell::new(1, 1));
        assert_eq!(
            planner.next_move(&map).unwrap(),
            PlanStep::Move(Cell::new(0, 1))
        );
    }

    #[test]
    fn test_selection_is_deterministic() {
        let mut map = MazeMap::new(4, 4).unwrap();
        map.set_wall(Cell::new(1, 1), Direction::North, WallState::Present);
        let base = DfsPlanner::new(Cell::new(1, 1));

        let mut a = base.clone();
        let mut b = base.clone();
        assert_eq!(a.next_move(&map).unwrap(), b.next_move(&map).unwrap());
        assert_eq!(a.path(), b.path());
    }

    #[test]
    fn test_walls_and_visited_are_skipped() {
        let mut map = MazeMap::new(3, 3).unwrap();
        map.set_wall(Cell::new(1, 1), Direction::North, WallState::Present);
        let mut planner = DfsPlanner::new(Cell::new(1, 1));
        planner.visited.insert(Cell::new(1, 2));
        assert_eq!(
            planner.next_move(&map).unwrap(),
            PlanStep::Move(Cell::new(2, 1))
        );
    }

    #[test]
    fn test_dead_end_backtracks_then_exhausts() {
        let mut map = MazeMap::new(2, 1).unwrap();
        let start = Cell::new(0, 0);
        let mut planner = DfsPlanner::new(start);

        assert_eq!(planner.next_move(&map).unwrap(), PlanStep::Move(Cell::new(0, 1)));
        map.set_wall(start, Direction::East, WallState::Present);
        assert_eq!(planner.next_move(&map).unwrap(), PlanStep::Backtrack(start));
        assert_eq!(planner.next_move(&map).unwrap(), PlanStep::SearchExhausted);
        assert!(planner.frontier().is_none());
    }

    #[test]
    fn test_truncate_stops_at_first_blocked_edge_from_frontier() {
        let mut planner = DfsPlanner::new(Cell::new(0, 0));
        planner.path.extend([
            Cell::new(0, 1),
            Cell::new(0, 2),
            Cell::new(1, 2),
            Cell::new(2, 2),
        ]);

        let blocked = [
            edge(Cell::new(0, 1), Cell::new(0, 0)),
            edge(Cell::new(1, 2), Cell::new(0, 2)),
        ];
        let frontier = planner.truncate_at_blocked(&blocked);

        assert_eq!(frontier, Some(Cell::new(0, 2)));
        assert_eq!(
            planner.path(),
            &[Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2)]
        );
    }

    #[test]
    fn test_truncate_keeps_visited() {
        let mut planner = DfsPlanner::new(Cell::new(0, 0));
        let map = MazeMap::new(3, 1).unwrap();
        planner.next_move(&map).unwrap();
        planner.next_move(&map).unwrap();

        planner.truncate_at_blocked(&[edge(Cell::new(0, 0), Cell::new(0, 1))]);
        assert_eq!(planner.path(), &[Cell::new(0, 0)]);
        assert!(planner.is_visited(Cell::new(0, 1)));
        assert!(planner.is_visited(Cell::new(0, 2)));
    }

    #[test]
    fn test_truncate_ignores_edges_off_path() {
        let mut planner = DfsPlanner::new(Cell::new(0, 0));
        planner.path.push(Cell::new(0, 1));
        assert_eq!(
            planner.truncate_at_blocked(&[edge(Cell::new(1, 0), Cell::new(1, 1))]),
            None
        );
        assert_eq!(planner.path().len(), 2);
    }

    #[test]
    fn test_single_edge_truncation_then_exhaustion() {
        let mut map = MazeMap::new(2, 1).unwrap();
        let start = Cell::new(0, 0);
        let mut planner = DfsPlanner::new(start);
        planner.next_move(&map).unwrap();

        map.set_wall(start, Direction::East, WallState::Present);
        assert_eq!(
            planner.truncate_at_blocked(&[edge(start, Cell::new(0, 1))]),
            Some(start)
        );
        assert_eq!(planner.next_move(&map).unwrap(), PlanStep::SearchExhausted);
    }
}
