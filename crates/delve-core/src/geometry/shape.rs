//! Blast and breath shapes

use super::los::{in_disintegration_range, los};
use super::path::{projectable, ProjectionPath};
use crate::grid::{Floor, Pos2D};

/// What stops a blast from spreading into a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlastBlock {
    /// Light goes wherever sight goes
    Los,
    /// Disintegration is stopped only by permanent walls
    Disintegrate,
    /// Everything else needs a clear projection
    Project,
}

impl BlastBlock {
    pub fn reaches(self, floor: &Floor, center: Pos2D, pos: Pos2D) -> bool {
        match self {
            BlastBlock::Los => los(floor, center, pos),
            BlastBlock::Disintegrate => in_disintegration_range(floor, center, pos),
            BlastBlock::Project => projectable(floor, center, pos),
        }
    }
}

/// Grids painted by a blast, grouped in rings by distance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlastShape {
    pub grids: Vec<Pos2D>,
    /// `grids[ring_start[d]..ring_start[d + 1]]` lie at blast distance `d`
    pub ring_start: Vec<usize>,
    /// Breath cone radius used at each ring (all equal for a ball)
    pub radii: Vec<i32>,
}

impl BlastShape {
    /// Blast distance of the outermost ring
    pub fn gm_rad(&self) -> i32 {
        self.radii.len() as i32 - 1
    }

    pub fn contains(&self, pos: Pos2D) -> bool {
        self.grids.contains(&pos)
    }

    /// Grids at blast distance `d`
    pub fn ring(&self, d: usize) -> &[Pos2D] {
        match (self.ring_start.get(d), self.ring_start.get(d + 1)) {
            (Some(&a), Some(&b)) => &self.grids[a..b],
            _ => &[],
        }
    }
}

/// Every grid within `rad` of `center` that the blast can reach
pub fn ball_shape(floor: &Floor, center: Pos2D, rad: i32, block: BlastBlock) -> BlastShape {
    let mut shape = BlastShape {
        ring_start: vec![0],
        ..Default::default()
    };
    for dist in 0..=rad {
        for y in center.y - dist..=center.y + dist {
            for x in center.x - dist..=center.x + dist {
                let pos = Pos2D::new(y, x);
                if !floor.in_bounds(pos) && pos != center {
                    continue;
                }
                if center.distance(pos) != dist {
                    continue;
                }
                if !block.reaches(floor, center, pos) {
                    continue;
                }
                shape.grids.push(pos);
            }
        }
        shape.ring_start.push(shape.grids.len());
        shape.radii.push(rad);
    }
    shape
}

/// Cone of a breath travelling along `path` from `source` to `target`
///
/// The cone's center follows the path as the blast front advances. Its
/// radius starts at 0 at the source and reaches `rad` once the whole path
/// has been consumed.
pub fn breath_shape(
    floor: &Floor,
    path: &ProjectionPath,
    rad: i32,
    source: Pos2D,
    target: Pos2D,
    block: BlastBlock,
) -> BlastShape {
    let dist = path.len() as i32;
    if dist == 0 {
        return ball_shape(floor, source, rad, block);
    }

    let mut shape = BlastShape {
        ring_start: vec![0],
        ..Default::default()
    };
    let brev = rad * rad / dist;
    let mdis = source.distance(target) + rad;
    let mut center = source;
    let mut bdis = 0;
    let mut path_n = 0;

    while bdis <= mdis {
        if path_n < dist {
            if let Some(next) = path.get(path_n as usize) {
                if bdis >= next.distance(source) {
                    center = next;
                    path_n += 1;
                }
            }
        }
        let brad = if bdis == 0 {
            0
        } else {
            rad * (path_n + brev) / (dist + brev)
        };

        for cdis in 0..=brad {
            for y in center.y - cdis..=center.y + cdis {
                for x in center.x - cdis..=center.x + cdis {
                    let pos = Pos2D::new(y, x);
                    if !floor.in_bounds(pos) {
                        continue;
                    }
                    if source.distance(pos) != bdis || center.distance(pos) != cdis {
                        continue;
                    }
                    if !block.reaches(floor, center, pos) {
                        continue;
                    }
                    shape.grids.push(pos);
                }
            }
        }

        shape.ring_start.push(shape.grids.len());
        shape.radii.push(brad);
        bdis += 1;
    }
    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ProjectFlags;
    use crate::grid::TerrainKind;
    use crate::MAX_RANGE;
    use proptest::prelude::*;

    fn floor() -> Floor {
        Floor::new(40, 40).unwrap()
    }

    fn breath(floor: &Floor, src: Pos2D, dst: Pos2D, rad: i32) -> (ProjectionPath, BlastShape) {
        let path = ProjectionPath::new(floor, MAX_RANGE, src, src, dst, ProjectFlags::empty());
        let shape = breath_shape(floor, &path, rad, src, dst, BlastBlock::Project);
        (path, shape)
    }

    #[test]
    fn test_ball_rings() {
        let floor = floor();
        let center = Pos2D::new(20, 20);
        let shape = ball_shape(&floor, center, 2, BlastBlock::Project);
        assert_eq!(shape.ring(0), &[center]);
        assert_eq!(shape.ring(1).len(), 8);
        assert!(shape.grids.iter().all(|p| center.distance(*p) <= 2));
        assert_eq!(shape.gm_rad(), 2);
    }

    #[test]
    fn test_ball_blocked_by_wall() {
        let mut floor = floor();
        let center = Pos2D::new(20, 20);
        for y in 15..26 {
            floor.set_feat(Pos2D::new(y, 21), TerrainKind::Granite);
        }
        let shape = ball_shape(&floor, center, 3, BlastBlock::Project);
        assert!(shape.contains(Pos2D::new(20, 21)));
        assert!(!shape.contains(Pos2D::new(20, 22)));
        let disi = ball_shape(&floor, center, 3, BlastBlock::Disintegrate);
        assert!(disi.contains(Pos2D::new(20, 22)));
    }

    #[test]
    fn test_breath_cone_radius_profile() {
        let floor = floor();
        let src = Pos2D::new(20, 5);
        let dst = Pos2D::new(20, 15);
        let rad = 3;
        let (path, shape) = breath(&floor, src, dst, rad);
        assert_eq!(shape.radii[0], 0);
        for w in shape.radii.windows(2) {
            assert!(w[0] <= w[1]);
        }
        assert_eq!(path.last(), Some(dst));
        let d = src.distance(dst) as usize;
        assert_eq!(shape.radii[d], rad);
        assert!(shape.radii[..d].iter().all(|&r| r < rad));
        assert!(shape.contains(dst));
    }

    #[test]
    fn test_breath_is_narrow_near_and_wide_far() {
        let floor = floor();
        let src = Pos2D::new(20, 5);
        let dst = Pos2D::new(20, 15);
        let (_, shape) = breath(&floor, src, dst, 3);
        assert!(shape.ring(1).len() <= 3);
        assert!(shape.ring(10).len() > shape.ring(2).len());
        assert!(!shape.contains(Pos2D::new(23, 6)));
    }

    proptest! {
        #[test]
        fn test_breath_radius_grows_to_nominal(
            dy in -10i32..=10, dx in -10i32..=10, rad in 1i32..=4
        ) {
            let floor = floor();
            let src = Pos2D::new(20, 20);
            let dst = Pos2D::new(20 + dy, 20 + dx);
            prop_assume!(src.distance(dst) >= 2);
            let (_, shape) = breath(&floor, src, dst, rad);
            let d = src.distance(dst) as usize;
            prop_assert_eq!(shape.radii[0], 0);
            prop_assert_eq!(shape.radii[d], rad);
            for w in shape.radii.windows(2) {
                prop_assert!(w[0] <= w[1]);
            }
        }
    }
}
