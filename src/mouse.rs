use crate::cell::Cell;
use crate::direction::{Direction, Relative};

/// Pose of the mouse: the cell it stands on and the way it faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseState {
    pub position: Cell,
    pub heading: Direction,
}

impl Default for MouseState {
    fn default() -> Self {
        Self {
            position: Cell::new(0, 0),
            heading: Direction::North,
        }
    }
}

impl MouseState {
    pub fn new(position: Cell, heading: Direction) -> Self {
        Self { position, heading }
    }

    /// Moves to an adjacent cell, turning to face the direction of travel.
    ///
    /// Returns the turn taken relative to the previous heading, or `None` if
    /// `to` is not adjacent (the state is left unchanged).
    pub fn advance(&mut self, to: Cell) -> Option<Relative> {
        let direction = self.position.direction_to(to)?;
        let turn = self.heading.absolute_to_relative(direction);
        self.position = to;
        self.heading = direction;
        Some(turn)
    }
}
