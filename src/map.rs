use std::collections::{HashMap, VecDeque};

use crate::cell::Cell;
use crate::direction::Direction;
use crate::error::{NavError, Result};
use crate::walls::{WallState, Walls};

/// Fixed-size maze grid holding what is known about every wall.
///
/// Cells are stored row-major. Boundary walls are known present from the start,
/// every interior wall starts `Unknown`.
#[derive(Debug, Clone)]
pub struct MazeMap {
    width: usize,
    height: usize,
    cells: Vec<Walls>,
}

impl MazeMap {
    /// Creates a `width` x `height` grid with only the boundary known.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(NavError::InvalidDimensions { width, height });
        }
        let mut map = Self {
            width,
            height,
            cells: vec![Walls::default(); width * height],
        };
        for row in 0..height {
            for col in 0..width {
                let cell = Cell::new(row, col);
                for direction in Direction::ALL {
                    if map.neighbor(cell, direction).is_none() {
                        let idx = map.index(cell);
                        map.cells[idx].set(direction, WallState::Present);
                    }
                }
            }
        }
        Ok(map)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    fn index(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    fn check(&self, cell: Cell) -> Result<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(NavError::OutOfBounds(cell))
        }
    }

    /// Walls of one cell.
    pub fn walls(&self, cell: Cell) -> Result<&Walls> {
        self.check(cell)?;
        Ok(&self.cells[self.index(cell)])
    }

    /// State of the wall on the `direction` side of `cell`.
    pub fn wall(&self, cell: Cell, direction: Direction) -> Result<WallState> {
        Ok(self.walls(cell)?.get(direction))
    }

    /// In-grid neighbour in `direction`.
    pub fn neighbor(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        cell.step(direction).filter(|n| self.contains(*n))
    }

    /// In-grid neighbours in North, East, South, West order.
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.neighbor(cell, d))
            .collect()
    }

    /// State of the wall separating two adjacent cells.
    pub fn wall_between(&self, a: Cell, b: Cell) -> Result<WallState> {
        let direction = a
            .direction_to(b)
            .ok_or(NavError::InvalidAdjacency { from: a, to: b })?;
        self.check(b)?;
        self.wall(a, direction)
    }

    /// Sets a wall on both of its sides.
    ///
    /// Returns `false` without touching anything when the cell or its neighbour
    /// lies outside the grid (boundary walls are already present).
    pub fn set_wall(&mut self, cell: Cell, direction: Direction, state: WallState) -> bool {
        if !self.contains(cell) {
            return false;
        }
        let Some(other) = self.neighbor(cell, direction) else {
            return false;
        };
        let (a, b) = (self.index(cell), self.index(other));
        self.cells[a].set(direction, state);
        self.cells[b].set(direction.opposite(), state);
        true
    }

    /// Shortest route from `from` to `to` through walls not known present.
    ///
    /// The returned cells exclude `from` and end with `to`.
    pub fn route(&self, from: Cell, to: Cell) -> Option<Vec<Cell>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        if from == to {
            return Some(Vec::new());
        }

        let mut parents: HashMap<Cell, Cell> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        parents.insert(from, from);

        while let Some(current) = queue.pop_front() {
            for direction in Direction::ALL {
                let Some(next) = self.neighbor(current, direction) else {
                    continue;
                };
                if parents.contains_key(&next) {
                    continue;
                }
                if self.cells[self.index(current)].get(direction) == WallState::Present {
                    continue;
                }
                parents.insert(next, current);
                if next == to {
                    let mut route = vec![to];
                    let mut at = current;
                    while at != from {
                        route.push(at);
                        at = parents[&at];
                    }
                    route.reverse();
                    return Some(route);
                }
                queue.push_back(next);
            }
        }
        None
    }
}
