use crate::cell::Cell;
use crate::error::Result;
use crate::walls::Walls;

/// Sensing and actuation interface of the physical (or simulated) mouse.
///
/// Implementations report ground truth. Failures and timeouts are returned as
/// [`NavError::ActuationFailure`](crate::error::NavError::ActuationFailure).
pub trait MouseRobot: Send {
    /// Walls around `cell`, in absolute directions. `Unknown` marks a
    /// direction the sensors could not read.
    fn sense_walls(&mut self, cell: Cell) -> Result<Walls>;

    /// Drives to an adjacent cell. `Ok` only once the move is confirmed.
    fn move_to(&mut self, cell: Cell) -> Result<()>;

    /// Cell the mouse currently occupies.
    fn current_position(&mut self) -> Result<Cell>;
}

impl<R: MouseRobot + ?Sized> MouseRobot for Box<R> {
    fn sense_walls(&mut self, cell: Cell) -> Result<Walls> {
        (**self).sense_walls(cell)
    }

    fn move_to(&mut self, cell: Cell) -> Result<()> {
        (**self).move_to(cell)
    }

    fn current_position(&mut self) -> Result<Cell> {
        (**self).current_position()
    }
}
