//! Noise flow and scent
//!
//! Monsters hunt the player by following the flow costs laid out from the
//! player's grid, or failing that the freshest scent nearby. Flow is only
//! rebuilt when [`RecalcFlags::FLOW`] says it is stale.

use std::collections::VecDeque;

use log::trace;

use crate::geometry::los;
use crate::grid::{FlowKind, Floor, Pos2D, TerrainFlags, DIRECTIONS_8};
use crate::world::RecalcFlags;
use crate::FLOW_MAX_DEPTH;

/// Scent freshness bonus around the player; `None` corners get no scent
const SCENT_ADJUST: [[Option<u32>; 5]; 5] = [
    [None, Some(0), Some(0), Some(0), None],
    [Some(0), Some(1), Some(1), Some(1), Some(0)],
    [Some(0), Some(1), Some(2), Some(1), Some(0)],
    [Some(0), Some(1), Some(1), Some(1), Some(0)],
    [None, Some(0), Some(0), Some(0), None],
];

fn can_flow(floor: &Floor, pos: Pos2D, kind: FlowKind) -> bool {
    let grid = floor.grid(pos);
    let passable = match kind {
        FlowKind::Normal => grid.has(TerrainFlags::MOVE),
        FlowKind::Flying => grid.has(TerrainFlags::MOVE) || grid.has(TerrainFlags::CAN_FLY),
    };
    passable || grid.feat.is_closed_door()
}

/// Recompute noise costs and distances from the player for both flow kinds
///
/// The player's grid gets cost 1 and distance 0; every other reached grid
/// gets its step count plus one as cost. Unreached grids keep 0. The sweep
/// stops spreading at [`FLOW_MAX_DEPTH`] steps.
pub fn update_flow(floor: &mut Floor, player_pos: Pos2D) {
    for pos in floor.positions() {
        let grid = floor.grid_mut(pos);
        grid.costs = [0; 2];
        grid.dists = [0; 2];
    }
    if !floor.contains(player_pos) {
        return;
    }

    for kind in [FlowKind::Normal, FlowKind::Flying] {
        let k = kind as usize;
        floor.grid_mut(player_pos).costs[k] = 1;
        floor.grid_mut(player_pos).dists[k] = 0;
        let mut queue = VecDeque::from([player_pos]);

        while let Some(here) = queue.pop_front() {
            let m = floor.grid(here).costs[k] + 1;
            let n = floor.grid(here).dists[k] + 1;
            for dir in DIRECTIONS_8 {
                let pos = here + dir.vec();
                if !floor.in_bounds(pos) || pos == player_pos {
                    continue;
                }
                let grid = floor.grid(pos);
                if grid.dists[k] != 0 && grid.dists[k] <= n && grid.costs[k] <= m {
                    continue;
                }
                if !can_flow(floor, pos, kind) {
                    continue;
                }
                let grid = floor.grid_mut(pos);
                if grid.costs[k] == 0 || grid.costs[k] > m {
                    grid.costs[k] = m;
                }
                if grid.dists[k] == 0 || grid.dists[k] > n {
                    grid.dists[k] = n;
                }
                if n == FLOW_MAX_DEPTH {
                    continue;
                }
                queue.push_back(pos);
            }
        }
    }
    floor.recalc.remove(RecalcFlags::FLOW);
    trace!("flow rebuilt from {player_pos:?}");
}

/// Rebuild the flow if it is stale; returns whether it was rebuilt
pub fn ensure_flow(floor: &mut Floor, player_pos: Pos2D) -> bool {
    if floor.recalc.contains(RecalcFlags::FLOW) {
        update_flow(floor, player_pos);
        true
    } else {
        false
    }
}

/// Lay fresh scent around the player
///
/// Grids within two steps that the player can see get `turn` plus a small
/// bonus that is largest under the player.
pub fn update_scent(floor: &mut Floor, player_pos: Pos2D, turn: u32) {
    for (i, row) in SCENT_ADJUST.iter().enumerate() {
        for (j, adjust) in row.iter().enumerate() {
            let Some(adjust) = adjust else {
                continue;
            };
            let pos = Pos2D::new(player_pos.y + i as i32 - 2, player_pos.x + j as i32 - 2);
            if !floor.in_bounds(pos) {
                continue;
            }
            let grid = floor.grid(pos);
            if !grid.has(TerrainFlags::MOVE) && !grid.feat.is_closed_door() {
                continue;
            }
            if !los(floor, player_pos, pos) {
                continue;
            }
            floor.grid_mut(pos).when = turn + adjust;
        }
    }
}
