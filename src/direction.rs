use serde::{Deserialize, Serialize};

/// Absolute direction in the maze.
///
/// Row 0 is the top row: North decreases the row index, South increases it,
/// East increases the column index, West decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

/// Direction relative to the mouse heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relative {
    Front,
    Right,
    Back,
    Left,
}

impl Direction {
    /// Neighbour priority order. Every traversal tie-break follows it.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Turn left (North -> West)
    pub fn turn_left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    /// Turn right (North -> East)
    pub fn turn_right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// Half turn (North -> South)
    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// (row, col) offset of one step in this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    /// Bit used for this direction in per-cell masks.
    pub fn bit(self) -> u8 {
        match self {
            Direction::North => 0b0001,
            Direction::East => 0b0010,
            Direction::South => 0b0100,
            Direction::West => 0b1000,
        }
    }

    /// Converts a direction relative to `self` (the heading) into an absolute one.
    pub fn relative_to_absolute(self, relative: Relative) -> Self {
        match relative {
            Relative::Front => self,
            Relative::Right => self.turn_right(),
            Relative::Back => self.opposite(),
            Relative::Left => self.turn_left(),
        }
    }

    /// Inverse of [`Direction::relative_to_absolute`].
    pub fn absolute_to_relative(self, absolute: Direction) -> Relative {
        if absolute == self {
            Relative::Front
        } else if absolute == self.turn_right() {
            Relative::Right
        } else if absolute == self.opposite() {
            Relative::Back
        } else {
            Relative::Left
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_round_trip_for_every_heading() {
        let relatives = [Relative::Front, Relative::Right, Relative::Back, Relative::Left];
        for heading in Direction::ALL {
            for rel in relatives {
                let abs = heading.relative_to_absolute(rel);
                assert_eq!(heading.absolute_to_relative(abs), rel);
            }
        }
    }

    #[test]
    fn test_east_heading() {
        assert_eq!(Direction::East.relative_to_absolute(Relative::Right), Direction::South);
        assert_eq!(Direction::East.relative_to_absolute(Relative::Left), Direction::North);
    }

    #[test]
    fn test_bits_are_distinct() {
        let mask = Direction::ALL.iter().fold(0u8, |acc, d| acc | d.bit());
        assert_eq!(mask, 0b1111);
    }
}
