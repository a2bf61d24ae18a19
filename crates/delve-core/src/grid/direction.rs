//! Movement directions
//!
//! Directions are numbered like a keypad (7 8 9 / 4 5 6 / 1 2 3), which is
//! the numbering the run heuristic's rotation tables are written against.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::Pos2DVec;

/// One of the 8 compass directions, no direction, or "at the current target"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Direction {
    SouthWest,
    South,
    SouthEast,
    West,
    None,
    East,
    NorthWest,
    North,
    NorthEast,
    Target,
}

/// The 8 compass directions, orthogonals first
pub const DIRECTIONS_8: [Direction; 8] = [
    Direction::South,
    Direction::North,
    Direction::East,
    Direction::West,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::NorthEast,
    Direction::NorthWest,
];

/// Directions in clockwise order starting at north
const CLOCKWISE: [Direction; 8] = [
    Direction::North,
    Direction::NorthEast,
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
];

impl Direction {
    /// Keypad number (5 for no direction, 0 for target)
    pub const fn keypad(self) -> u8 {
        match self {
            Direction::SouthWest => 1,
            Direction::South => 2,
            Direction::SouthEast => 3,
            Direction::West => 4,
            Direction::None => 5,
            Direction::East => 6,
            Direction::NorthWest => 7,
            Direction::North => 8,
            Direction::NorthEast => 9,
            Direction::Target => 0,
        }
    }

    /// Direction for a keypad number; anything unknown is `None`
    pub const fn from_keypad(key: u8) -> Self {
        match key {
            1 => Direction::SouthWest,
            2 => Direction::South,
            3 => Direction::SouthEast,
            4 => Direction::West,
            6 => Direction::East,
            7 => Direction::NorthWest,
            8 => Direction::North,
            9 => Direction::NorthEast,
            0 => Direction::Target,
            _ => Direction::None,
        }
    }

    /// Unit displacement; zero for `None` and `Target`
    pub const fn vec(self) -> Pos2DVec {
        match self {
            Direction::SouthWest => Pos2DVec::new(1, -1),
            Direction::South => Pos2DVec::new(1, 0),
            Direction::SouthEast => Pos2DVec::new(1, 1),
            Direction::West => Pos2DVec::new(0, -1),
            Direction::East => Pos2DVec::new(0, 1),
            Direction::NorthWest => Pos2DVec::new(-1, -1),
            Direction::North => Pos2DVec::new(-1, 0),
            Direction::NorthEast => Pos2DVec::new(-1, 1),
            Direction::None | Direction::Target => Pos2DVec::new(0, 0),
        }
    }

    /// Direction of a unit displacement (components are clamped to -1..=1)
    pub fn from_vec(v: Pos2DVec) -> Self {
        match (v.y.signum(), v.x.signum()) {
            (1, -1) => Direction::SouthWest,
            (1, 0) => Direction::South,
            (1, 1) => Direction::SouthEast,
            (0, -1) => Direction::West,
            (0, 1) => Direction::East,
            (-1, -1) => Direction::NorthWest,
            (-1, 0) => Direction::North,
            (-1, 1) => Direction::NorthEast,
            _ => Direction::None,
        }
    }

    /// True for the 8 compass directions
    pub const fn is_compass(self) -> bool {
        !matches!(self, Direction::None | Direction::Target)
    }

    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::SouthWest
                | Direction::SouthEast
                | Direction::NorthWest
                | Direction::NorthEast
        )
    }

    /// Rotate clockwise by `steps` × 45°
    pub fn rotate_cw(self, steps: i32) -> Self {
        match CLOCKWISE.iter().position(|&d| d == self) {
            Some(i) => CLOCKWISE[(i as i32 + steps).rem_euclid(8) as usize],
            None => self,
        }
    }

    /// Rotate counter-clockwise by `steps` × 45°
    pub fn rotate_ccw(self, steps: i32) -> Self {
        self.rotate_cw(-steps)
    }

    pub fn opposite(self) -> Self {
        self.rotate_cw(4)
    }
}
