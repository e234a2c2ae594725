//! Simulated maze and mouse.
//!
//! [`Labyrinth`] is the ground truth: which walls really exist. It can be parsed
//! from the ASCII format produced by [`crate::ascii_utils`] or generated from a
//! seed. [`SimulatedMouse`] drives through it and implements [`MouseRobot`].

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tracing::{debug, trace};

use crate::cell::Cell;
use crate::direction::{Direction, Relative};
use crate::error::{NavError, Result};
use crate::mouse::MouseState;
use crate::robot::MouseRobot;
use crate::walls::{WallState, Walls};

/// Ground-truth maze: one wall bitmask per cell, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labyrinth {
    width: usize,
    height: usize,
    walls: Vec<u8>,
}

impl Labyrinth {
    /// A maze with only its outer boundary.
    pub fn open(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(NavError::InvalidDimensions { width, height });
        }
        let mut labyrinth = Self {
            width,
            height,
            walls: vec![0; width * height],
        };
        labyrinth.seal_boundary();
        Ok(labyrinth)
    }

    /// A perfect maze carved by a randomized depth-first backtracker.
    ///
    /// The same seed and dimensions always give the same maze.
    pub fn generate(width: usize, height: usize, seed: u64) -> Result<Self> {
        let mut labyrinth = Self::open(width, height)?;
        labyrinth.walls.fill(0b1111);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut carved = vec![false; width * height];
        let mut stack = vec![Cell::new(0, 0)];
        carved[0] = true;

        while let Some(&current) = stack.last() {
            let candidates: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|&d| {
                    labyrinth
                        .neighbor(current, d)
                        .is_some_and(|n| !carved[labyrinth.index(n)])
                })
                .collect();

            match candidates.choose(&mut rng) {
                Some(&direction) => {
                    labyrinth.remove_wall(current, direction);
                    if let Some(next) = labyrinth.neighbor(current, direction) {
                        let idx = labyrinth.index(next);
                        carved[idx] = true;
                        stack.push(next);
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }

        debug!("Generated {}x{} maze from seed {}", width, height, seed);
        Ok(labyrinth)
    }

    /// Parses the ASCII maze format.
    ///
    /// `2 * height + 1` lines of `3 * width + 1` columns: even lines carry `--`
    /// for horizontal walls, odd lines carry `|` for vertical walls. Anything
    /// else counts as an opening. The outer boundary is always closed.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<Vec<char>> = text
            .lines()
            .map(|l| l.trim_end().chars().collect())
            .filter(|l: &Vec<char>| !l.is_empty())
            .collect();

        if lines.len() < 3 || lines.len() % 2 == 0 {
            return Err(NavError::Config(format!(
                "maze text must have an odd number (>= 3) of lines, got {}",
                lines.len()
            )));
        }
        let columns = lines[0].len();
        if columns < 4 || (columns - 1) % 3 != 0 {
            return Err(NavError::Config(format!(
                "maze text lines must be 3 * width + 1 wide, got {}",
                columns
            )));
        }

        let height = (lines.len() - 1) / 2;
        let width = (columns - 1) / 3;
        let mut labyrinth = Self::open(width, height)?;

        let at = |line: usize, col: usize| lines[line].get(col).copied().unwrap_or(' ');

        for row in 0..height {
            for col in 0..width {
                let cell = Cell::new(row, col);
                if at(2 * row + 2, 3 * col + 1) == '-' {
                    labyrinth.add_wall(cell, Direction::South);
                }
                if at(2 * row + 1, 3 * col + 3) == '|' {
                    labyrinth.add_wall(cell, Direction::East);
                }
            }
        }
        Ok(labyrinth)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read maze file: {}", e)))?;
        Self::parse(&content)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    fn index(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    fn neighbor(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        cell.step(direction).filter(|n| self.contains(*n))
    }

    fn seal_boundary(&mut self) {
        for row in 0..self.height {
            for col in 0..self.width {
                let cell = Cell::new(row, col);
                for direction in Direction::ALL {
                    if self.neighbor(cell, direction).is_none() {
                        let idx = self.index(cell);
                        self.walls[idx] |= direction.bit();
                    }
                }
            }
        }
    }

    pub fn has_wall(&self, cell: Cell, direction: Direction) -> bool {
        !self.contains(cell) || self.walls[self.index(cell)] & direction.bit() != 0
    }

    /// Adds a wall on both of its sides.
    pub fn add_wall(&mut self, cell: Cell, direction: Direction) {
        if let Some(other) = self.neighbor(cell, direction) {
            let (a, b) = (self.index(cell), self.index(other));
            self.walls[a] |= direction.bit();
            self.walls[b] |= direction.opposite().bit();
        }
    }

    /// Removes an interior wall on both of its sides. Boundary walls stay.
    pub fn remove_wall(&mut self, cell: Cell, direction: Direction) {
        if let Some(other) = self.neighbor(cell, direction) {
            let (a, b) = (self.index(cell), self.index(other));
            self.walls[a] &= !direction.bit();
            self.walls[b] &= !direction.opposite().bit();
        }
    }

    /// Number of cells reachable from `from`, `from` included.
    pub fn reachable_from(&self, from: Cell) -> usize {
        if !self.contains(from) {
            return 0;
        }
        let mut seen = vec![false; self.width * self.height];
        let mut stack = vec![from];
        seen[self.index(from)] = true;
        let mut count = 0;
        while let Some(cell) = stack.pop() {
            count += 1;
            for direction in Direction::ALL {
                if self.has_wall(cell, direction) {
                    continue;
                }
                if let Some(next) = self.neighbor(cell, direction) {
                    let idx = self.index(next);
                    if !seen[idx] {
                        seen[idx] = true;
                        stack.push(next);
                    }
                }
            }
        }
        count
    }
}

/// Counters shared with whoever created the mouse.
#[derive(Debug, Default)]
pub struct SimStats {
    moves: AtomicUsize,
    move_commands: AtomicUsize,
    senses: AtomicUsize,
}

impl SimStats {
    /// Confirmed moves.
    pub fn moves(&self) -> usize {
        self.moves.load(Ordering::Acquire)
    }

    /// Every `move_to` call, failed ones included.
    pub fn move_commands(&self) -> usize {
        self.move_commands.load(Ordering::Acquire)
    }

    pub fn senses(&self) -> usize {
        self.senses.load(Ordering::Acquire)
    }
}

/// A wall that appears once the mouse has made a number of moves.
#[derive(Debug, Clone, Copy)]
struct PendingWall {
    after_moves: usize,
    cell: Cell,
    direction: Direction,
}

/// Simulated mouse driving through a [`Labyrinth`].
///
/// Its sensors read front/right/back/left relative to the heading, like the
/// real robot; readings are converted to absolute directions before they are
/// returned.
#[derive(Debug)]
pub struct SimulatedMouse {
    labyrinth: Labyrinth,
    state: MouseState,
    move_delay: Duration,
    failures_pending: usize,
    slip_to: Option<Cell>,
    pending_walls: Vec<PendingWall>,
    stats: Arc<SimStats>,
}

impl SimulatedMouse {
    pub fn new(labyrinth: Labyrinth, start: Cell) -> Result<Self> {
        if !labyrinth.contains(start) {
            return Err(NavError::OutOfBounds(start));
        }
        Ok(Self {
            labyrinth,
            state: MouseState::new(start, Direction::North),
            move_delay: Duration::ZERO,
            failures_pending: 0,
            slip_to: None,
            pending_walls: Vec::new(),
            stats: Arc::new(SimStats::default()),
        })
    }

    /// Time every confirmed move takes.
    pub fn with_move_delay(mut self, delay: Duration) -> Self {
        self.move_delay = delay;
        self
    }

    /// The next `count` move commands fail without moving.
    pub fn fail_next_moves(&mut self, count: usize) {
        self.failures_pending = count;
    }

    /// The next move command ends on `cell` and still reports a failure.
    ///
    /// `cell` may be the commanded one (an unconfirmed move) or anywhere else
    /// in the maze (the mouse got lost). Cells outside the maze are ignored.
    pub fn slip_next_move(&mut self, cell: Cell) {
        self.slip_to = Some(cell).filter(|&c| self.labyrinth.contains(c));
    }

    /// Raises a wall once `after_moves` moves have been confirmed.
    pub fn inject_wall_after(&mut self, after_moves: usize, cell: Cell, direction: Direction) {
        self.pending_walls.push(PendingWall {
            after_moves,
            cell,
            direction,
        });
    }

    pub fn stats(&self) -> Arc<SimStats> {
        Arc::clone(&self.stats)
    }

    pub fn labyrinth(&self) -> &Labyrinth {
        &self.labyrinth
    }

    fn raise_pending_walls(&mut self) {
        let moves = self.stats.moves();
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending_walls
            .drain(..)
            .partition(|w| w.after_moves <= moves);
        self.pending_walls = waiting;
        for wall in due {
            debug!("Raising wall {} of {}", wall.direction, wall.cell);
            self.labyrinth.add_wall(wall.cell, wall.direction);
        }
    }
}

impl MouseRobot for SimulatedMouse {
    fn sense_walls(&mut self, cell: Cell) -> Result<Walls> {
        self.stats.senses.fetch_add(1, Ordering::AcqRel);
        if cell != self.state.position {
            return Err(NavError::ActuationFailure(format!(
                "cannot sense {} while standing on {}",
                cell, self.state.position
            )));
        }

        let mut walls = Walls::default();
        for relative in [Relative::Front, Relative::Right, Relative::Back, Relative::Left] {
            let direction = self.state.heading.relative_to_absolute(relative);
            let state = if self.labyrinth.has_wall(cell, direction) {
                WallState::Present
            } else {
                WallState::Absent
            };
            walls.set(direction, state);
        }
        Ok(walls)
    }

    fn move_to(&mut self, cell: Cell) -> Result<()> {
        self.stats.move_commands.fetch_add(1, Ordering::AcqRel);

        if self.failures_pending > 0 {
            self.failures_pending -= 1;
            return Err(NavError::ActuationFailure("wheel slip".to_string()));
        }
        if let Some(to) = self.slip_to.take() {
            let from = self.state.position;
            if self.state.advance(to).is_none() {
                self.state.position = to;
            }
            debug!("Slipped {} -> {} while heading for {}", from, to, cell);
            return Err(NavError::ActuationFailure(format!(
                "move to {} not confirmed",
                cell
            )));
        }
        let from = self.state.position;
        let Some(direction) = from.direction_to(cell) else {
            return Err(NavError::ActuationFailure(format!(
                "{} is not adjacent to {}",
                cell, from
            )));
        };
        if self.labyrinth.has_wall(from, direction) {
            return Err(NavError::ActuationFailure(format!(
                "wall between {} and {}",
                from, cell
            )));
        }

        if !self.move_delay.is_zero() {
            std::thread::sleep(self.move_delay);
        }
        let turn = self.state.advance(cell);
        trace!("Moved {} -> {} ({:?})", from, cell, turn);
        self.stats.moves.fetch_add(1, Ordering::AcqRel);
        self.raise_pending_walls();
        Ok(())
    }

    fn current_position(&mut self) -> Result<Cell> {
        Ok(self.state.position)
    }
}
