//! Projection paths for bolts, beams, balls, breaths and missiles

use bitflags::bitflags;

use super::los::cave_stop_disintegration;
use crate::grid::{Floor, Pos2D, TerrainFlags};
use crate::MAX_RANGE;

bitflags! {
    /// How a projection travels and what it affects
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ProjectFlags: u32 {
        /// Start at the target instead of travelling to it
        const JUMP = 0x0000_0001;
        /// Affect every grid along the path
        const BEAM = 0x0000_0002;
        /// Keep going past the target
        const THRU = 0x0000_0004;
        /// Stop at the first creature
        const STOP = 0x0000_0008;
        const GRID = 0x0000_0010;
        const ITEM = 0x0000_0020;
        const KILL = 0x0000_0040;
        /// Not drawn
        const HIDE = 0x0000_0080;
        /// Travels through anything disintegration can dissolve
        const DISI = 0x0000_0100;
        /// Blocked only by what blocks sight
        const LOS = 0x0000_0200;
        /// Ignore terrain entirely (the caller checks it per step)
        const PATH = 0x0000_0400;
        /// Stop at mirrors
        const MIRROR = 0x0000_0800;
        /// Aimed at one creature only
        const AIMED = 0x0000_1000;
        /// Widening cone from the source
        const BREATH = 0x0000_2000;
        const PLAYER = 0x0000_4000;
    }
}

bits_serde!(ProjectFlags, u32);

/// Ordered grids a projection passes through, excluding the source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionPath {
    positions: Vec<Pos2D>,
}

impl ProjectionPath {
    /// Trace from `src` toward `dst`
    ///
    /// The dominant axis advances every step while the other axis
    /// accumulates error; each step on the minor axis costs half a step of
    /// range, and a grid that would overrun the range is never added. A
    /// pure diagonal costs one step per grid. `player_pos` is
    /// where the player stands, for [`ProjectFlags::STOP`].
    pub fn new(
        floor: &Floor,
        range: i32,
        player_pos: Pos2D,
        src: Pos2D,
        dst: Pos2D,
        flags: ProjectFlags,
    ) -> Self {
        let mut positions = Vec::new();
        if src == dst {
            return Self { positions };
        }

        let (y1, x1, y2, x2) = (src.y, src.x, dst.y, dst.x);
        let ay = (y2 - y1).abs();
        let ax = (x2 - x1).abs();
        let sy = if y2 < y1 { -1 } else { 1 };
        let sx = if x2 < x1 { -1 } else { 1 };
        let half = ay * ax;
        let full = half << 1;

        // True when the trace must end at `pos`
        let stops_at = |pos: Pos2D| -> bool {
            if !flags.contains(ProjectFlags::THRU) && pos == dst {
                return true;
            }
            if !floor.contains(pos) {
                return true;
            }
            let grid = floor.grid(pos);
            if flags.contains(ProjectFlags::DISI) {
                if cave_stop_disintegration(grid) {
                    return true;
                }
            } else if flags.contains(ProjectFlags::LOS) {
                if !grid.has_los() {
                    return true;
                }
            } else if !flags.contains(ProjectFlags::PATH) && !grid.has(TerrainFlags::PROJECT) {
                return true;
            }
            if flags.contains(ProjectFlags::MIRROR) && grid.is_mirror() {
                return true;
            }
            if flags.contains(ProjectFlags::STOP) && (pos == player_pos || grid.has_monster()) {
                return true;
            }
            !floor.in_bounds(pos)
        };

        let mut n = 0;
        // Half-steps taken on the minor axis
        let mut k = 0;

        if ay > ax {
            let m = ax * ax * 2;
            let mut y = y1 + sy;
            let mut x = x1;
            let mut frac = m;
            if m != 0 && frac > half {
                x += sx;
                frac -= full;
                k += 1;
            }
            loop {
                let pos = Pos2D::new(y, x);
                if n + 1 + (k >> 1) > range {
                    break;
                }
                positions.push(pos);
                n += 1;
                if n + (k >> 1) >= range || stops_at(pos) {
                    break;
                }
                if m != 0 {
                    frac += m;
                    if frac > half {
                        x += sx;
                        frac -= full;
                        k += 1;
                    }
                }
                y += sy;
            }
        } else if ax > ay {
            let m = ay * ay * 2;
            let mut y = y1;
            let mut x = x1 + sx;
            let mut frac = m;
            if m != 0 && frac > half {
                y += sy;
                frac -= full;
                k += 1;
            }
            loop {
                let pos = Pos2D::new(y, x);
                if n + 1 + (k >> 1) > range {
                    break;
                }
                positions.push(pos);
                n += 1;
                if n + (k >> 1) >= range || stops_at(pos) {
                    break;
                }
                if m != 0 {
                    frac += m;
                    if frac > half {
                        y += sy;
                        frac -= full;
                        k += 1;
                    }
                }
                x += sx;
            }
        } else {
            let mut y = y1 + sy;
            let mut x = x1 + sx;
            loop {
                let pos = Pos2D::new(y, x);
                positions.push(pos);
                n += 1;
                if n >= range || stops_at(pos) {
                    break;
                }
                y += sy;
                x += sx;
            }
        }

        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn last(&self) -> Option<Pos2D> {
        self.positions.last().copied()
    }

    pub fn get(&self, i: usize) -> Option<Pos2D> {
        self.positions.get(i).copied()
    }

    pub fn positions(&self) -> &[Pos2D] {
        &self.positions
    }

    pub fn iter(&self) -> impl Iterator<Item = Pos2D> + '_ {
        self.positions.iter().copied()
    }

    pub fn contains(&self, pos: Pos2D) -> bool {
        self.positions.contains(&pos)
    }
}

impl<'a> IntoIterator for &'a ProjectionPath {
    type Item = Pos2D;
    type IntoIter = core::iter::Copied<core::slice::Iter<'a, Pos2D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter().copied()
    }
}

/// Can a projection from `from` reach `to` unobstructed?
pub fn projectable(floor: &Floor, from: Pos2D, to: Pos2D) -> bool {
    projectable_within(floor, MAX_RANGE, from, to)
}

/// [`projectable`] with an explicit range
pub fn projectable_within(floor: &Floor, range: i32, from: Pos2D, to: Pos2D) -> bool {
    // The player position is irrelevant without STOP
    let path = ProjectionPath::new(floor, range, from, from, to, ProjectFlags::empty());
    match path.last() {
        None => true,
        Some(end) => end == to,
    }
}

/// Where a monster projection aimed at `to` actually stops
pub fn get_project_point(
    floor: &Floor,
    player_pos: Pos2D,
    from: Pos2D,
    to: Pos2D,
    flags: ProjectFlags,
) -> Pos2D {
    let path = ProjectionPath::new(floor, floor.max_range(), player_pos, from, to, flags);
    path.last().unwrap_or(from)
}
