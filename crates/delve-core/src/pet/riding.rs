//! Getting on and off a pet mount
//!
//! A ridden monster shares the player's grid: the grid records the mount and
//! the player stands on top of it, and moving the player moves the mount.

use log::debug;

use crate::grid::{Direction, TerrainFlags};
use crate::monster::{monster_can_cross_terrain, BehaviorFlags};
use crate::state::GameState;
use crate::ENERGY_TURN;

/// Result of a mount or dismount attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideOutcome {
    Mounted(usize),
    Dismounted,
    /// Tried and failed; the turn is spent
    Failed,
    /// Not possible at all; no time passes
    Refused,
}

/// Is the monster at `m_idx` a pet the player could ride?
pub fn can_ride(state: &GameState, m_idx: usize) -> bool {
    if !state.floor.monster_is_valid(m_idx) {
        return false;
    }
    let m = state.floor.monster(m_idx);
    m.is_pet() && state.races.get(m.r_idx).behavior.contains(BehaviorFlags::RIDING)
}

fn refuse(state: &mut GameState, msg: &str) -> RideOutcome {
    state.message(msg);
    state.player.energy_use = 0;
    RideOutcome::Refused
}

/// Climb onto the pet next to the player in `dir`
pub fn mount(state: &mut GameState, dir: Direction) -> RideOutcome {
    if state.player.is_riding() {
        return refuse(state, "You are already riding.");
    }
    if state.player.is_confused() {
        return refuse(state, "You are too confused!");
    }
    let pos = state.player.pos + dir.vec();
    let Some(grid) = state.floor.get_grid(pos).filter(|_| dir.is_compass()) else {
        return refuse(state, "There is no monster here.");
    };
    let m_idx = grid.m_idx;
    let feat = grid.feat;
    if m_idx == 0 || !state.floor.monster(m_idx).ml {
        return refuse(state, "There is no monster here.");
    }
    if !state.floor.monster(m_idx).is_pet() {
        return refuse(state, "That monster is not a pet.");
    }
    if !can_ride(state, m_idx) {
        return refuse(state, "This monster doesn't seem suitable for riding.");
    }
    let race = state.races.get(state.floor.monster(m_idx).r_idx);
    if !monster_can_cross_terrain(feat, race) {
        return refuse(state, "This monster is in the wall.");
    }
    let level = race.level;

    state.player.energy_use = ENERGY_TURN;
    if state.floor.monster(m_idx).is_asleep() {
        let name = state.monster_name(m_idx);
        state.message(format!("You have woken {name} up."));
        if let Some(m) = state.floor.monster_mut(m_idx) {
            m.timed.sleep = 0;
        }
    }
    let skill = state.player.skill_riding / 50 + state.player.lev / 2 + 20;
    if level > state.rng.randint1(skill) {
        state.message("You failed to ride.");
        return RideOutcome::Failed;
    }

    let name = state.monster_name(m_idx);
    state.player.riding = m_idx;
    state.relocate_player(pos);
    state.message(format!("You mount {name}."));
    debug!("riding monster {m_idx}");
    RideOutcome::Mounted(m_idx)
}

/// Step off the mount onto the grid in `dir`
pub fn dismount(state: &mut GameState, dir: Direction) -> RideOutcome {
    if !state.player.is_riding() {
        return refuse(state, "You are not riding.");
    }
    let to = state.player.pos + dir.vec();
    let open = dir.is_compass()
        && state.floor.in_bounds(to)
        && !state.floor.grid(to).has_monster()
        && (state.floor.grid(to).has(TerrainFlags::MOVE)
            || (state.player.levitation && state.floor.grid(to).has(TerrainFlags::CAN_FLY)));
    if !open {
        return refuse(state, "You cannot go that direction.");
    }
    state.player.energy_use = ENERGY_TURN;
    state.player.riding = 0;
    state.relocate_player(to);
    state.message("You dismount.");
    RideOutcome::Dismounted
}
