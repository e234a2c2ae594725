use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// Knowledge about one wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallState {
    #[default]
    Unknown,
    Absent,
    Present,
}

/// The four walls around a cell.
///
/// Also used as a sensor reading, where `Unknown` means the direction was not observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Walls {
    pub north: WallState,
    pub east: WallState,
    pub south: WallState,
    pub west: WallState,
}

impl Walls {
    /// All four directions observed, walls where `present` says so.
    pub fn from_present(present: impl Fn(Direction) -> bool) -> Self {
        let state = |d| {
            if present(d) {
                WallState::Present
            } else {
                WallState::Absent
            }
        };
        Self {
            north: state(Direction::North),
            east: state(Direction::East),
            south: state(Direction::South),
            west: state(Direction::West),
        }
    }

    pub fn get(&self, direction: Direction) -> WallState {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    pub fn set(&mut self, direction: Direction, state: WallState) {
        match direction {
            Direction::North => self.north = state,
            Direction::East => self.east = state,
            Direction::South => self.south = state,
            Direction::West => self.west = state,
        }
    }

    /// Directions whose state is known, in N, E, S, W order.
    pub fn known(&self) -> impl Iterator<Item = (Direction, WallState)> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |d| (d, self.get(d)))
            .filter(|(_, s)| *s != WallState::Unknown)
    }
}

/// Folds a new observation into the stored state.
///
/// Walls are only ever added: a present wall stays present, and an observed
/// wall overrides an earlier "absent".
pub fn merge_wall(old: WallState, new: WallState) -> WallState {
    match (old, new) {
        (WallState::Present, _) => WallState::Present,
        (_, WallState::Present) => WallState::Present,
        (WallState::Absent, _) => WallState::Absent,
        (WallState::Unknown, new) => new,
    }
}
