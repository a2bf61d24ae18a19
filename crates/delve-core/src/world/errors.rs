//! Boundary errors
//!
//! Simulation outcomes (blocked moves, missing targets) are never errors; the
//! types here cover construction and configuration failures only.

use thiserror::Error;

use crate::grid::Pos2D;

/// Failures building or populating a floor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FloorError {
    #[error("invalid floor dimensions {height}x{width}")]
    InvalidDimensions { height: i32, width: i32 },

    #[error("position {0:?} is outside the floor")]
    OutOfBounds(Pos2D),

    #[error("position {0:?} is already occupied by a monster")]
    Occupied(Pos2D),

    #[error("monster pool is full")]
    MonsterPoolFull,

    #[error("item pool is full")]
    ItemPoolFull,
}

/// Failures reading game options
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[cfg(feature = "std")]
    #[error("could not parse options: {0}")]
    Parse(#[from] serde_json::Error),
}
