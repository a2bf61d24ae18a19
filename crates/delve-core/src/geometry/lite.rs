//! Light and darkness shed by monsters

use hashbrown::HashSet;
use log::trace;

use crate::grid::{Floor, GridFlags, Pos2D, TerrainFlags};
use crate::monster::RaceTable;
use crate::world::RecalcFlags;
use crate::MAX_SIGHT;

/// One emitter being spread this pass
struct Emitter {
    pos: Pos2D,
    /// The emitter's own grid is out of the player's view
    invisible: bool,
    dark: bool,
}

/// Rebuild monster light and darkness around every monster
///
/// Light reaches up to 3 grids and is shaped by the walls next to the
/// emitter. A wall grid lying between the emitter and the player is only
/// touched when its shadow corner toward the player lets sight through, so
/// light never wraps around a corner onto the player's side. Returns the
/// grids whose lighting changed since the previous pass.
pub fn update_mon_lite(floor: &mut Floor, races: &RaceTable, player_pos: Pos2D) -> Vec<Pos2D> {
    let previous: HashSet<(Pos2D, bool)> = floor
        .mon_lite
        .iter()
        .map(|&pos| {
            let lit = floor.grid(pos).info.contains(GridFlags::MONLITE);
            (pos, lit)
        })
        .collect();
    for pos in std::mem::take(&mut floor.mon_lite) {
        floor.grid_mut(pos).info.remove(GridFlags::MONLITE | GridFlags::MONDARK);
    }

    let dis_lim = MAX_SIGHT + 3;
    let mut points = Vec::new();
    for m_idx in floor.monster_indices() {
        let monster = floor.monster(m_idx);
        let race = races.get(monster.r_idx);
        if monster.pos.distance(player_pos) > dis_lim {
            continue;
        }
        let self_rad = race.feature.light_radius(true);
        let mut rad = race.feature.light_radius(false) + self_rad;
        if rad == 0 {
            continue;
        }
        let carried_only = self_rad == 0;
        if rad > 0 {
            if carried_only
                && (monster.is_asleep() || (floor.dun_level == 0 && floor.is_daytime))
            {
                continue;
            }
        } else {
            if carried_only
                && (monster.is_asleep() || (floor.dun_level == 0 && !floor.is_daytime))
            {
                continue;
            }
            rad = -rad;
        }
        let rad = rad.min(crate::MAX_MONSTER_LITE);
        let emitter = Emitter {
            pos: monster.pos,
            invisible: !floor.grid(monster.pos).info.contains(GridFlags::VIEW),
            dark: race.feature.light_radius(false) + self_rad < 0,
        };
        spread(floor, &emitter, rad, player_pos, &mut points);
    }

    let current: HashSet<(Pos2D, bool)> = points
        .iter()
        .map(|&pos| (pos, floor.grid(pos).info.contains(GridFlags::MONLITE)))
        .collect();
    let mut changed: Vec<Pos2D> = previous
        .symmetric_difference(&current)
        .map(|&(pos, _)| pos)
        .collect();
    changed.sort_by_key(|p| (p.y, p.x));
    changed.dedup();

    trace!(
        "monster light: {} grids, {} changed",
        points.len(),
        changed.len()
    );
    floor.mon_lite = points;
    floor.recalc.remove(RecalcFlags::MONSTER_LITE);
    changed
}

fn spread(floor: &mut Floor, e: &Emitter, rad: i32, player: Pos2D, points: &mut Vec<Pos2D>) {
    // Light needs open sight lines, darkness needs projection
    let opens = |floor: &Floor, dy: i32, dx: i32| {
        let pos = Pos2D::new(e.pos.y + dy, e.pos.x + dx);
        let flag = if e.dark {
            TerrainFlags::PROJECT
        } else {
            TerrainFlags::LOS
        };
        floor.contains(pos) && floor.grid(pos).has(flag)
    };

    for dy in -1..=1 {
        for dx in -1..=1 {
            add_point(floor, e, player, Pos2D::new(e.pos.y + dy, e.pos.x + dx), points);
        }
    }
    if rad < 2 {
        return;
    }

    // Straight arms, out to 3 grids
    for (uy, ux) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
        if !opens(floor, uy, ux) {
            continue;
        }
        // Perpendicular unit
        let (py, px) = (ux, uy);
        for side in -1..=1 {
            let pos = Pos2D::new(e.pos.y + 2 * uy + side * py, e.pos.x + 2 * ux + side * px);
            add_point(floor, e, player, pos, points);
        }
        if rad == 3 && opens(floor, 2 * uy, 2 * ux) {
            for side in -1..=1 {
                let pos = Pos2D::new(e.pos.y + 3 * uy + side * py, e.pos.x + 3 * ux + side * px);
                add_point(floor, e, player, pos, points);
            }
        }
    }
    if rad != 3 {
        return;
    }

    // Diagonal corners
    for (dy, dx) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        if opens(floor, dy, dx) {
            add_point(floor, e, player, Pos2D::new(e.pos.y + 2 * dy, e.pos.x + 2 * dx), points);
        }
    }
}

fn los_at(floor: &Floor, y: i32, x: i32) -> bool {
    let pos = Pos2D::new(y, x);
    floor.contains(pos) && floor.grid(pos).has_los()
}

/// Is a wall grid hidden from the player behind its shadow corner?
fn in_shadow(floor: &Floor, e: &Emitter, player: Pos2D, pos: Pos2D) -> bool {
    let m = e.pos;
    if (pos.y < player.y && pos.y > m.y) || (pos.y > player.y && pos.y < m.y) {
        let dpf = player.y - m.y;
        let d = pos.y - m.y;
        let midpoint = m.x + ((player.x - m.x) * d.abs()) / dpf.abs();
        if pos.x < midpoint {
            if !los_at(floor, pos.y, pos.x + 1) {
                return true;
            }
        } else if pos.x > midpoint {
            if !los_at(floor, pos.y, pos.x - 1) {
                return true;
            }
        } else if e.invisible {
            return true;
        }
    }
    if (pos.x < player.x && pos.x > m.x) || (pos.x > player.x && pos.x < m.x) {
        let dpf = player.x - m.x;
        let d = pos.x - m.x;
        let midpoint = m.y + ((player.y - m.y) * d.abs()) / dpf.abs();
        if pos.y < midpoint {
            if !los_at(floor, pos.y + 1, pos.x) {
                return true;
            }
        } else if pos.y > midpoint {
            if !los_at(floor, pos.y - 1, pos.x) {
                return true;
            }
        } else if e.invisible {
            return true;
        }
    }
    false
}

fn add_point(floor: &mut Floor, e: &Emitter, player: Pos2D, pos: Pos2D, points: &mut Vec<Pos2D>) {
    if !floor.contains(pos) {
        return;
    }
    let grid = floor.grid(pos);
    let blocks = if e.dark {
        !grid.has_los() && !grid.has(TerrainFlags::PROJECT)
    } else {
        !grid.has_los()
    };
    if blocks && in_shadow(floor, e, player, pos) {
        return;
    }

    let grid = floor.grid_mut(pos);
    if e.dark {
        if grid.info.intersects(GridFlags::MONLITE | GridFlags::MONDARK) {
            return;
        }
        grid.info.insert(GridFlags::MONDARK);
    } else {
        if grid.info.contains(GridFlags::MONLITE) {
            return;
        }
        // Light wins over darkness on the same grid
        let was_dark = grid.info.contains(GridFlags::MONDARK);
        grid.info.remove(GridFlags::MONDARK);
        grid.info.insert(GridFlags::MONLITE);
        if was_dark {
            return;
        }
    }
    points.push(pos);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TerrainKind;
    use crate::monster::{FeatureFlags, MonraceDefinition, MonsterEntity};

    fn setup(feature: FeatureFlags) -> (Floor, RaceTable, usize) {
        let mut races = RaceTable::new();
        let mut race = MonraceDefinition::new("torchbearer", 'p', 5);
        race.feature = feature;
        let r_idx = races.push(race);
        let floor = Floor::new(20, 20).unwrap();
        (floor, races, r_idx)
    }

    #[test]
    fn test_radius_three_light() {
        let (mut floor, races, r_idx) =
            setup(FeatureFlags::SELF_LITE_1 | FeatureFlags::SELF_LITE_2);
        let pos = Pos2D::new(10, 10);
        floor.place_monster(MonsterEntity::new(r_idx, pos, 10)).unwrap();
        let changed = update_mon_lite(&mut floor, &races, Pos2D::new(1, 1));
        assert!(floor.grid(Pos2D::new(13, 10)).info.contains(GridFlags::MONLITE));
        assert!(floor.grid(Pos2D::new(12, 12)).info.contains(GridFlags::MONLITE));
        assert!(!floor.grid(Pos2D::new(13, 13)).info.contains(GridFlags::MONLITE));
        assert!(!changed.is_empty());
        // Nothing moved: nothing changes
        let again = update_mon_lite(&mut floor, &races, Pos2D::new(1, 1));
        assert!(again.is_empty());
    }

    #[test]
    fn test_carried_light_off_while_asleep() {
        let (mut floor, races, r_idx) = setup(FeatureFlags::HAS_LITE_1);
        let mut m = MonsterEntity::new(r_idx, Pos2D::new(10, 10), 10);
        m.timed.sleep = 10;
        floor.place_monster(m).unwrap();
        update_mon_lite(&mut floor, &races, Pos2D::new(1, 1));
        assert!(!floor.grid(Pos2D::new(10, 10)).info.contains(GridFlags::MONLITE));
    }

    #[test]
    fn test_wall_arm_blocks_light() {
        let (mut floor, races, r_idx) = setup(FeatureFlags::SELF_LITE_2);
        floor.set_feat(Pos2D::new(11, 10), TerrainKind::Granite);
        floor.place_monster(MonsterEntity::new(r_idx, Pos2D::new(10, 10), 10)).unwrap();
        update_mon_lite(&mut floor, &races, Pos2D::new(1, 1));
        assert!(floor.grid(Pos2D::new(11, 10)).info.contains(GridFlags::MONLITE));
        assert!(!floor.grid(Pos2D::new(12, 10)).info.contains(GridFlags::MONLITE));
        assert!(floor.grid(Pos2D::new(8, 10)).info.contains(GridFlags::MONLITE));
    }

    #[test]
    fn test_light_removed_when_monster_leaves() {
        let (mut floor, races, r_idx) = setup(FeatureFlags::SELF_LITE_1);
        let m = floor.place_monster(MonsterEntity::new(r_idx, Pos2D::new(10, 10), 10)).unwrap();
        update_mon_lite(&mut floor, &races, Pos2D::new(1, 1));
        floor.delete_monster(m);
        let changed = update_mon_lite(&mut floor, &races, Pos2D::new(1, 1));
        assert_eq!(changed.len(), 9);
        assert!(!floor.grid(Pos2D::new(10, 10)).info.contains(GridFlags::MONLITE));
    }
}
