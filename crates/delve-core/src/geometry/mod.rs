//! Geometry and visibility: sight lines, projection paths, blast shapes and
//! monster lighting

mod lite;
mod los;
mod path;
mod shape;

pub use lite::update_mon_lite;
pub use los::{cave_stop_disintegration, in_disintegration_range, los, los_with};
pub use path::{get_project_point, projectable, projectable_within, ProjectFlags, ProjectionPath};
pub use shape::{ball_shape, breath_shape, BlastBlock, BlastShape};

use crate::grid::Pos2D;

/// Game distance: the long axis plus half the short one
pub fn distance(a: Pos2D, b: Pos2D) -> i32 {
    a.distance(b)
}
