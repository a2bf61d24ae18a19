//! Travel: walk to a chosen grid along a precomputed cost map
//!
//! Setting a goal floods step costs outward from the goal over terrain the
//! player could walk. Each travel step then moves to the cheapest neighbor,
//! stopping for the same kinds of trouble that stop a run.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::{debug, trace};

use super::{exe_movement, MoveOutcome, Player};
use crate::grid::{Direction, Floor, GridFlags, Pos2D, TerrainFlags, TerrainKind, DIRECTIONS_8};
use crate::state::GameState;
use crate::world::GameOptions;
use crate::{ENERGY_TURN, RUN_STEPS, TRAVEL_NOT_STARTED, TRAVEL_UNABLE};

/// Extra cost of wading through deep water
const DEEP_WATER_COST: i32 = 4;
/// Extra cost of a closed door that has to be opened first
const DOOR_COST: i32 = 1;

/// Why travel ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelStop {
    /// Standing on the goal
    Arrived,
    /// The goal cannot be reached from here
    NoRoute,
    /// Something worth the player's attention came up
    Interrupted,
}

/// Travel goal, progress and the cost map towards the goal
#[derive(Debug, Clone)]
pub struct Travel {
    pub goal: Option<Pos2D>,
    /// Steps left; `TRAVEL_NOT_STARTED` before the first step, 0 when idle
    pub run: i32,
    /// Direction of the last step
    pub dir: Direction,
    height: i32,
    width: i32,
    cost: Vec<i32>,
}

impl Travel {
    pub fn new(floor: &Floor) -> Self {
        Self {
            goal: None,
            run: 0,
            dir: Direction::None,
            height: floor.height,
            width: floor.width,
            cost: vec![TRAVEL_UNABLE; (floor.height * floor.width) as usize],
        }
    }

    pub fn is_traveling(&self) -> bool {
        self.run > 0
    }

    /// Stop travelling; the goal stays on record
    pub fn halt(&mut self) {
        self.run = 0;
    }

    /// Mark every grid unreachable
    pub fn forget_flow(&mut self) {
        self.cost.fill(TRAVEL_UNABLE);
    }

    fn index(&self, pos: Pos2D) -> Option<usize> {
        (pos.y >= 0 && pos.x >= 0 && pos.y < self.height && pos.x < self.width)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    /// Cost of walking from `pos` to the goal
    pub fn cost_at(&self, pos: Pos2D) -> i32 {
        self.index(pos).map_or(TRAVEL_UNABLE, |i| self.cost[i])
    }
}

/// Extra cost of entering `feat` on the way to the goal, or `None` if the
/// route may not pass it
fn step_cost(feat: TerrainKind, player: &Player, options: &GameOptions) -> Option<i32> {
    if feat.has(TerrainFlags::TRAP) {
        return None;
    }
    if feat.is_closed_door() {
        return options.easy_open.then_some(1 + DOOR_COST);
    }
    let enterable = feat.has(TerrainFlags::MOVE)
        || (feat.has(TerrainFlags::CAN_FLY) && player.levitation)
        || (player.pass_wall && feat.has(TerrainFlags::WALL) && !feat.has(TerrainFlags::PERMANENT));
    if !enterable {
        return None;
    }
    if feat.has(TerrainFlags::LAVA) && !player.immune_lava && !player.levitation {
        return None;
    }
    if feat.has(TerrainFlags::WATER)
        && feat.has(TerrainFlags::DEEP)
        && !player.levitation
        && !player.can_swim
    {
        return Some(1 + DEEP_WATER_COST);
    }
    Some(1)
}

impl Travel {
    /// Flood step costs outward from `goal` over the terrain as it looks
    pub fn compute_flow(
        &mut self,
        floor: &Floor,
        player: &Player,
        options: &GameOptions,
        goal: Pos2D,
    ) {
        if self.height != floor.height || self.width != floor.width {
            *self = Travel::new(floor);
        }
        self.forget_flow();
        let Some(start) = self.index(goal) else {
            return;
        };
        self.cost[start] = 0;
        let mut queue = BinaryHeap::new();
        queue.push(Reverse((0, goal.y, goal.x)));
        while let Some(Reverse((cost, y, x))) = queue.pop() {
            let pos = Pos2D::new(y, x);
            if self.cost_at(pos) < cost {
                continue;
            }
            for dir in DIRECTIONS_8 {
                let next = pos + dir.vec();
                if !floor.in_bounds(next) {
                    continue;
                }
                let Some(extra) = step_cost(floor.grid(next).perceived(), player, options) else {
                    continue;
                };
                let next_cost = cost + extra;
                let Some(i) = self.index(next) else {
                    continue;
                };
                if next_cost < self.cost[i] {
                    self.cost[i] = next_cost;
                    queue.push(Reverse((next_cost, next.y, next.x)));
                }
            }
        }
        trace!("travel flow to {goal:?}: cost here {}", self.cost_at(player.pos));
    }

    /// Choose a new goal and rebuild the cost map
    pub fn set_goal(&mut self, floor: &Floor, player: &Player, options: &GameOptions, goal: Pos2D) {
        self.compute_flow(floor, player, options, goal);
        self.goal = Some(goal);
        self.run = TRAVEL_NOT_STARTED;
        self.dir = Direction::None;
        debug!("travel goal set to {goal:?}");
    }

    /// Neighbor direction that gets closer to the goal, or `None`
    fn next_direction(&self, floor: &Floor, from: Pos2D) -> Direction {
        let here = self.cost_at(from);
        let mut best = (here, Direction::None);
        for dir in DIRECTIONS_8 {
            let next = from + dir.vec();
            if !floor.in_bounds(next) {
                continue;
            }
            let cost = self.cost_at(next);
            if cost < best.0 {
                best = (cost, dir);
            }
        }
        best.1
    }
}

/// Should travel stop instead of stepping in `dir`?
pub fn travel_test(state: &mut GameState, dir: Direction) -> bool {
    if !dir.is_compass() {
        return true;
    }
    if state.player.is_blind()
        || (state.player.cur_lite <= 0 && !state.floor.grid(state.player.pos).is_lit())
    {
        state.message("You cannot see!");
        return true;
    }
    let here = state.player.pos;
    let next = here + dir.vec();
    let Some(grid) = state.floor.get_grid(next) else {
        return true;
    };
    if state.floor.grid(here).info.contains(GridFlags::IN_DETECT)
        && !grid.info.contains(GridFlags::IN_DETECT)
        && (state.options.disturb_trap_detect || state.options.alert_trap_detect)
    {
        if state.options.alert_trap_detect {
            state.message("*Leaving trap detect region!*");
        }
        if state.options.disturb_trap_detect {
            return true;
        }
    }

    let max = if dir.is_diagonal() { 2 } else { 1 };
    for i in -max..=max {
        let pos = here + dir.rotate_ccw(i).vec();
        let Some(g) = state.floor.get_grid(pos) else {
            continue;
        };
        if g.m_idx != 0
            && state.floor.monster_is_valid(g.m_idx)
            && state.floor.monster(g.m_idx).ml
        {
            return true;
        }
    }
    if state.any_newly_seen_monster() {
        return true;
    }

    let grid = state.floor.grid(next);
    let perceived = grid.perceived();
    if !state.options.easy_open && perceived.is_closed_door() {
        return true;
    }
    perceived.has(TerrainFlags::TRAP)
}

/// Take one travel step towards the goal
///
/// Returns `None` while travel continues, or why it stopped. A stop on the
/// very first step means there was never a route, which is reported and
/// clears the goal.
pub fn travel_step(state: &mut GameState) -> Option<TravelStop> {
    let Some(goal) = state.travel.goal else {
        return Some(TravelStop::NoRoute);
    };
    if state.player.pos == goal {
        state.travel.goal = None;
        state.travel.halt();
        return Some(TravelStop::Arrived);
    }
    let first = state.travel.run == TRAVEL_NOT_STARTED;
    if !first && !state.travel.is_traveling() {
        return Some(TravelStop::Interrupted);
    }
    let dir = state.travel.next_direction(&state.floor, state.player.pos);
    if travel_test(state, dir) {
        let stop = if first {
            state.message("No route is found!");
            state.travel.goal = None;
            TravelStop::NoRoute
        } else {
            TravelStop::Interrupted
        };
        state.disturb();
        return Some(stop);
    }

    state.travel.run = if first { RUN_STEPS } else { state.travel.run - 1 };
    state.travel.dir = dir;
    state.player.energy_use = ENERGY_TURN;
    let always_pickup = state.options.always_pickup;
    let outcome = exe_movement(state, dir, always_pickup, false);
    if !matches!(
        outcome,
        MoveOutcome::Moved | MoveOutcome::OpenedDoor | MoveOutcome::PushedPast(_)
    ) {
        state.disturb();
        return Some(TravelStop::Interrupted);
    }
    if state.player.pos == goal {
        state.travel.goal = None;
        state.travel.halt();
        return Some(TravelStop::Arrived);
    }
    if !state.travel.is_traveling() {
        return Some(TravelStop::Interrupted);
    }
    None
}
