//! Line of sight

use crate::grid::{Floor, Grid, Pos2D, TerrainFlags};

/// Grid stops disintegration: not projectable and not dissolvable
pub fn cave_stop_disintegration(grid: &Grid) -> bool {
    !grid.has(TerrainFlags::PROJECT)
        && (!grid.has(TerrainFlags::HURT_DISI) || grid.has(TerrainFlags::PERMANENT))
}

/// Can `from` see `to`?
///
/// Adjacent grids always see each other. Lines that exactly graze a corner
/// are allowed through. The result is not symmetric: swapping the ends can
/// change the answer around some wall corners.
pub fn los(floor: &Floor, from: Pos2D, to: Pos2D) -> bool {
    los_with(floor, from, to, Grid::has_los)
}

/// Would a disintegration effect at `from` reach `to`?
pub fn in_disintegration_range(floor: &Floor, from: Pos2D, to: Pos2D) -> bool {
    los_with(floor, from, to, |g| !cave_stop_disintegration(g))
}

/// Line of sight with an arbitrary "lets the line through" predicate
pub fn los_with(floor: &Floor, from: Pos2D, to: Pos2D, passes: impl Fn(&Grid) -> bool) -> bool {
    let clear = |y: i32, x: i32| {
        let pos = Pos2D::new(y, x);
        floor.contains(pos) && passes(floor.grid(pos))
    };

    let (y1, x1) = (from.y, from.x);
    let (y2, x2) = (to.y, to.x);
    let dy = y2 - y1;
    let dx = x2 - x1;
    let ay = dy.abs();
    let ax = dx.abs();

    if ax < 2 && ay < 2 {
        return true;
    }

    // Straight north/south
    if dx == 0 {
        let sy = dy.signum();
        let mut ty = y1 + sy;
        while ty != y2 {
            if !clear(ty, x1) {
                return false;
            }
            ty += sy;
        }
        return true;
    }

    // Straight east/west
    if dy == 0 {
        let sx = dx.signum();
        let mut tx = x1 + sx;
        while tx != x2 {
            if !clear(y1, tx) {
                return false;
            }
            tx += sx;
        }
        return true;
    }

    let sx = dx.signum();
    let sy = dy.signum();

    // Knight's moves pass if the grid beside the start on the long axis is open
    if ax == 1 && ay == 2 && clear(y1 + sy, x1) {
        return true;
    }
    if ay == 1 && ax == 2 && clear(y1, x1 + sx) {
        return true;
    }

    let f2 = ax * ay;
    let f1 = f2 << 1;

    if ax >= ay {
        let mut qy = ay * ay;
        let m = qy << 1;
        let mut tx = x1 + sx;
        let mut ty = if qy == f2 {
            qy -= f1;
            y1 + sy
        } else {
            y1
        };

        while x2 - tx != 0 {
            if !clear(ty, tx) {
                return false;
            }
            qy += m;
            if qy < f2 {
                tx += sx;
            } else if qy > f2 {
                ty += sy;
                if !clear(ty, tx) {
                    return false;
                }
                qy -= f1;
                tx += sx;
            } else {
                // Exactly on a corner: slip through
                ty += sy;
                qy -= f1;
                tx += sx;
            }
        }
        return true;
    }

    let mut qx = ax * ax;
    let m = qx << 1;
    let mut ty = y1 + sy;
    let mut tx = if qx == f2 {
        qx -= f1;
        x1 + sx
    } else {
        x1
    };

    while y2 - ty != 0 {
        if !clear(ty, tx) {
            return false;
        }
        qx += m;
        if qx < f2 {
            ty += sy;
        } else if qx > f2 {
            tx += sx;
            if !clear(ty, tx) {
                return false;
            }
            qx -= f1;
            ty += sy;
        } else {
            tx += sx;
            qx -= f1;
            ty += sy;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TerrainKind;
    use proptest::prelude::*;

    fn open_floor() -> Floor {
        Floor::new(12, 12).unwrap()
    }

    #[test]
    fn test_straight_lines() {
        let mut floor = open_floor();
        assert!(los(&floor, Pos2D::new(5, 1), Pos2D::new(5, 9)));
        floor.set_feat(Pos2D::new(5, 5), TerrainKind::Granite);
        assert!(!los(&floor, Pos2D::new(5, 1), Pos2D::new(5, 9)));
        // The blocking grid itself is visible
        assert!(los(&floor, Pos2D::new(5, 1), Pos2D::new(5, 5)));
    }

    #[test]
    fn test_asymmetric_corner() {
        let mut floor = open_floor();
        let a = Pos2D::new(2, 2);
        let b = Pos2D::new(4, 3);
        floor.set_feat(Pos2D::new(3, 2), TerrainKind::Granite);
        assert!(!los(&floor, a, b));
        assert!(los(&floor, b, a));
    }

    #[test]
    fn test_glass_wall_is_transparent_but_stops_disintegration_of_permanent() {
        let mut floor = open_floor();
        floor.set_feat(Pos2D::new(5, 5), TerrainKind::GlassWall);
        assert!(los(&floor, Pos2D::new(5, 2), Pos2D::new(5, 8)));
        assert!(in_disintegration_range(&floor, Pos2D::new(5, 2), Pos2D::new(5, 8)));
        floor.set_feat(Pos2D::new(5, 5), TerrainKind::PermanentWall);
        assert!(!in_disintegration_range(&floor, Pos2D::new(5, 2), Pos2D::new(5, 8)));
    }

    proptest! {
        #[test]
        fn test_adjacent_always_visible(
            y in 1i32..11, x in 1i32..11, dy in -1i32..=1, dx in -1i32..=1, walls in any::<u64>()
        ) {
            let mut floor = open_floor();
            for bit in 0..64 {
                if walls & (1 << bit) != 0 {
                    let pos = Pos2D::new(1 + (bit / 8) as i32, 1 + (bit % 8) as i32);
                    floor.set_feat(pos, TerrainKind::Granite);
                }
            }
            let a = Pos2D::new(y, x);
            let b = Pos2D::new(y + dy, x + dx);
            prop_assert!(los(&floor, a, b));
        }
    }
}
