//! Grid and floor model

mod cell;
mod direction;
mod floor;
mod pos;
mod terrain;

pub use cell::{FlowKind, Grid, GridFlags};
pub use direction::{Direction, DIRECTIONS_8};
pub use floor::Floor;
pub use pos::{Pos2D, Pos2DVec};
pub use terrain::{TerrainFlags, TerrainKind};
