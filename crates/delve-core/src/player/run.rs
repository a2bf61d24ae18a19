//! Running: repeat a step along a corridor or across a room until something
//! interesting shows up
//!
//! The heuristic looks at the grids ahead of the player, to the left and right
//! of the previous direction. In a corridor it follows single openings and
//! turns corners; in an open area it keeps going until a wall pattern beside
//! the player changes.

use log::debug;

use super::{exe_movement, MoveOutcome};
use crate::grid::{Direction, GridFlags, Pos2D, TerrainFlags};
use crate::monster::MonsterMFlags;
use crate::state::GameState;
use crate::world::SoundHook;
use crate::{ENERGY_TURN, RUN_STEPS};

/// Progress of the current run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    /// Steps left; zero when not running
    pub running: i32,
    /// Direction of the next step
    current: Direction,
    /// Direction of the last step, the axis the heuristic looks around
    prev_dir: Direction,
    /// Running through a room rather than a corridor
    open_area: bool,
    /// A wall was seen to the right (or left) while in the open
    break_right: bool,
    break_left: bool,
    /// The first step may start next to lava or deep water
    ignore_avoid_run: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            running: 0,
            current: Direction::None,
            prev_dir: Direction::None,
            open_area: true,
            break_right: false,
            break_left: false,
            ignore_avoid_run: false,
        }
    }
}

impl RunState {
    pub fn is_running(&self) -> bool {
        self.running > 0
    }

    pub fn cancel(&mut self) {
        self.running = 0;
    }

    /// Direction the next step will take
    pub fn direction(&self) -> Direction {
        self.current
    }
}

/// Does the player know what is at `pos`?
fn is_known(state: &GameState, pos: Pos2D) -> bool {
    state.floor.grid(pos).is_mark() || state.player_can_see(pos)
}

/// Is there a known wall (or something the run avoids) one step from `pos`?
fn see_wall(state: &GameState, dir: Direction, pos: Pos2D) -> bool {
    let pos = pos + dir.vec();
    if !state.floor.contains(pos) || !is_known(state, pos) {
        return false;
    }
    let feat = state.floor.grid(pos).perceived();
    let player = &state.player;
    let walkable = feat.has(TerrainFlags::MOVE)
        || (feat.has(TerrainFlags::CAN_FLY) && player.levitation)
        || (player.pass_wall && feat.has(TerrainFlags::WALL) && !feat.has(TerrainFlags::PERMANENT));
    if !walkable {
        return !feat.has(TerrainFlags::DOOR);
    }
    if feat.has(TerrainFlags::AVOID_RUN) && !state.run.ignore_avoid_run {
        return true;
    }
    feat.requires_flight() && !player.levitation
}

/// Is the grid one step from `pos` unknown?
fn see_nothing(state: &GameState, dir: Direction, pos: Pos2D) -> bool {
    let pos = pos + dir.vec();
    !state.floor.in_bounds(pos) || !is_known(state, pos)
}

/// Set up a run in `dir`: decide between corridor and open-area mode from
/// the walls beside the player and beside the first grid
pub fn run_init(state: &mut GameState, dir: Direction) {
    let here = state.player.pos;
    let ahead = here + dir.vec();
    let left = dir.rotate_ccw(1);
    let right = dir.rotate_cw(1);

    let mut run = RunState {
        running: state.run.running.max(1),
        current: dir,
        prev_dir: dir,
        open_area: true,
        break_right: false,
        break_left: false,
        ignore_avoid_run: state.run.ignore_avoid_run,
    };
    let (mut short_left, mut deep_left) = (false, false);
    let (mut short_right, mut deep_right) = (false, false);
    if see_wall(state, left, here) {
        run.break_left = true;
        short_left = true;
    } else if see_wall(state, left, ahead) {
        run.break_left = true;
        deep_left = true;
    }
    if see_wall(state, right, here) {
        run.break_right = true;
        short_right = true;
    } else if see_wall(state, right, ahead) {
        run.break_right = true;
        deep_right = true;
    }

    if run.break_left && run.break_right {
        run.open_area = false;
        if dir.is_diagonal() {
            if deep_left && !deep_right {
                run.prev_dir = right;
            } else if deep_right && !deep_left {
                run.prev_dir = left;
            }
        } else if see_wall(state, dir, ahead) {
            if short_left && !short_right {
                run.prev_dir = dir.rotate_cw(2);
            } else if short_right && !short_left {
                run.prev_dir = dir.rotate_ccw(2);
            }
        }
    }
    debug!("run {dir} starts, open area: {}", run.open_area);
    state.run = run;
}

/// Known terrain at `pos` worth stopping for, after the ignore options
fn notices(state: &GameState, pos: Pos2D) -> bool {
    let feat = state.floor.grid(pos).perceived();
    if !feat.has(TerrainFlags::NOTICE) {
        return false;
    }
    if !feat.has(TerrainFlags::MOVE) {
        return true;
    }
    let opts = &state.options;
    let player = &state.player;
    if feat.has(TerrainFlags::DOOR) {
        !opts.find_ignore_doors
    } else if feat.has(TerrainFlags::STAIRS) {
        !opts.find_ignore_stairs
    } else if feat.has(TerrainFlags::LAVA) {
        !player.immune_lava
    } else if feat.has(TerrainFlags::WATER) && feat.has(TerrainFlags::DEEP) {
        !(player.levitation || player.can_swim)
    } else {
        true
    }
}

/// Something on the grid makes the run stop: a monster the player sees or
/// just spotted, or an item they noticed
fn is_distraction(state: &GameState, pos: Pos2D) -> bool {
    let grid = state.floor.grid(pos);
    if grid.m_idx != 0 && state.floor.monster_is_valid(grid.m_idx) {
        let m = state.floor.monster(grid.m_idx);
        if m.ml || m.mflag.contains(MonsterMFlags::NEWLY_SEEN) {
            return true;
        }
    }
    grid.o_idx_list
        .iter()
        .filter_map(|&o_idx| state.floor.item(o_idx))
        .any(|item| item.marked || state.player_can_see(pos))
}

/// Look around and pick the next run direction; true means stop
pub fn run_test(state: &mut GameState) -> bool {
    let here = state.player.pos;
    let prev_dir = state.run.prev_dir;
    let max = if prev_dir.is_diagonal() { 2 } else { 1 };

    let mut option = Direction::None;
    let mut option2 = Direction::None;
    let mut check_dir = Direction::None;

    for i in -max..=max {
        let new_dir = prev_dir.rotate_ccw(i);
        let pos = here + new_dir.vec();
        if !state.floor.contains(pos) {
            continue;
        }
        if is_distraction(state, pos) {
            return true;
        }

        let mut invisible = true;
        if is_known(state, pos) {
            if notices(state, pos) {
                return true;
            }
            invisible = false;
        }

        if invisible || !see_wall(state, Direction::None, pos) {
            if state.run.open_area {
                // Nothing to follow in a room
            } else if option == Direction::None {
                option = new_dir;
            } else if option2 != Direction::None {
                return true;
            } else if option != prev_dir.rotate_ccw(i - 1) {
                return true;
            } else if new_dir.is_diagonal() {
                check_dir = prev_dir.rotate_ccw(i - 2);
                option2 = new_dir;
            } else {
                check_dir = prev_dir.rotate_ccw(i + 1);
                option2 = option;
                option = new_dir;
            }
        } else if state.run.open_area {
            if i < 0 {
                state.run.break_right = true;
            } else if i > 0 {
                state.run.break_left = true;
            }
        }
    }

    if state.run.open_area {
        return open_area_changed(state, prev_dir, max);
    }
    if option == Direction::None {
        return true;
    }
    if option2 == Direction::None {
        state.run.current = option;
        state.run.prev_dir = option;
    } else if !state.options.find_cut {
        state.run.current = option;
        state.run.prev_dir = option2;
    } else {
        let corner = here + option.vec();
        if !see_wall(state, option, corner) || !see_wall(state, check_dir, corner) {
            if see_nothing(state, option, corner) && see_nothing(state, option2, corner) {
                state.run.current = option;
                state.run.prev_dir = option2;
            } else {
                return true;
            }
        } else {
            state.run.current = option2;
            state.run.prev_dir = option2;
        }
    }
    see_wall(state, state.run.current, here)
}

/// In the open, stop when the walls beside the player stop matching what
/// was seen when the run started
fn open_area_changed(state: &GameState, prev_dir: Direction, max: i32) -> bool {
    let here = state.player.pos;
    let run = &state.run;
    for i in -max..0 {
        if see_wall(state, prev_dir.rotate_ccw(i), here) {
            if run.break_left {
                return true;
            }
        } else if run.break_right {
            return true;
        }
    }
    for i in (1..=max).rev() {
        if see_wall(state, prev_dir.rotate_ccw(i), here) {
            if run.break_right {
                return true;
            }
        } else if run.break_left {
            return true;
        }
    }
    false
}

/// Take one running step
///
/// A compass `dir` starts a new run in that direction; `Direction::None`
/// continues the current one. Returns whether the run goes on.
pub fn run_step(state: &mut GameState, dir: Direction) -> bool {
    if dir.is_compass() {
        state.run.ignore_avoid_run = true;
        if see_wall(state, dir, state.player.pos) {
            state.sound(SoundHook::WallHit);
            state.message("You cannot run in that direction.");
            state.disturb();
            return false;
        }
        if !state.run.is_running() {
            state.run.running = RUN_STEPS;
        }
        run_init(state, dir);
    } else if !state.run.is_running() || run_test(state) {
        state.disturb();
        return false;
    }

    state.run.running -= 1;
    if state.run.running <= 0 {
        return false;
    }

    let next = state.player.pos + state.run.current.vec();
    if leaves_detected_zone(state, next) {
        if state.options.alert_trap_detect {
            state.message("*Leaving trap detect region!*");
        }
        if state.options.disturb_trap_detect {
            state.disturb();
            return false;
        }
    }

    state.player.energy_use = ENERGY_TURN;
    let dir = state.run.current;
    let outcome = exe_movement(state, dir, false, false);
    state.run.ignore_avoid_run = false;
    if outcome != MoveOutcome::Moved {
        state.disturb();
    }
    state.run.is_running()
}

/// Stepping from a trap-detected grid onto one outside the detected area
fn leaves_detected_zone(state: &GameState, next: Pos2D) -> bool {
    let Some(to) = state.floor.get_grid(next) else {
        return false;
    };
    state
        .floor
        .grid(state.player.pos)
        .info
        .contains(GridFlags::IN_DETECT)
        && !to.info.contains(GridFlags::IN_DETECT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Floor;
    use crate::monster::{MonraceDefinition, MonsterEntity, RaceTable};
    use crate::player::Player;
    use crate::GameRng;

    const CORRIDOR: [&str; 5] = [
        "###########",
        "###########",
        "#.........#",
        "###########",
        "###########",
    ];

    const BEND: [&str; 6] = [
        "#######",
        "#######",
        "#....##",
        "####.##",
        "####.##",
        "#######",
    ];

    fn state_on(map: &[&str], pos: Pos2D) -> GameState {
        let floor = Floor::from_ascii(map).unwrap();
        let mut races = RaceTable::new();
        races.push(MonraceDefinition::new("kobold", 'k', 2));
        GameState::new(floor, Player::new(pos), races, GameRng::new(11))
    }

    /// Run until the engine stops, with a safety cap
    fn run_out(state: &mut GameState, dir: Direction) {
        let mut go = run_step(state, dir);
        let mut steps = 0;
        while go && steps < 100 {
            go = run_step(state, Direction::None);
            steps += 1;
        }
    }

    #[test]
    fn test_run_to_corridor_end() {
        let mut state = state_on(&CORRIDOR, Pos2D::new(2, 1));
        run_out(&mut state, Direction::East);
        assert_eq!(state.player.pos, Pos2D::new(2, 9));
        assert!(!state.run.is_running());
    }

    #[test]
    fn test_run_follows_bend() {
        let mut state = state_on(&BEND, Pos2D::new(2, 1));
        run_out(&mut state, Direction::East);
        assert_eq!(state.player.pos, Pos2D::new(4, 4));
    }

    #[test]
    fn test_run_stops_when_monster_comes_into_view() {
        let mut state = state_on(&CORRIDOR, Pos2D::new(2, 1));
        state
            .floor
            .place_monster(MonsterEntity::new(1, Pos2D::new(2, 7), 5))
            .unwrap();
        state.update_monsters();
        run_out(&mut state, Direction::East);
        assert_eq!(state.player.pos, Pos2D::new(2, 6));
        assert!(!state.run.is_running());
    }

    #[test]
    fn test_run_stops_when_lantern_reveals_monster_ahead() {
        let mut state = state_on(&CORRIDOR, Pos2D::new(2, 1));
        state.player.cur_lite = 3;
        let m = state
            .floor
            .place_monster(MonsterEntity::new(1, Pos2D::new(2, 8), 5))
            .unwrap();
        state.update_monsters();
        assert!(!state.floor.monster(m).ml);
        run_out(&mut state, Direction::East);
        assert_eq!(state.player.pos, Pos2D::new(2, 5));
        assert!(state.floor.monster(m).ml);
        assert!(!state.run.is_running());
    }

    #[test]
    fn test_run_stops_before_stairs() {
        let mut state = state_on(&CORRIDOR, Pos2D::new(2, 1));
        state.floor.set_feat(Pos2D::new(2, 5), crate::grid::TerrainKind::DownStair);
        run_out(&mut state, Direction::East);
        assert_eq!(state.player.pos, Pos2D::new(2, 4));

        let mut state = state_on(&CORRIDOR, Pos2D::new(2, 1));
        state.options.find_ignore_stairs = true;
        state.floor.set_feat(Pos2D::new(2, 5), crate::grid::TerrainKind::DownStair);
        run_out(&mut state, Direction::East);
        assert_eq!(state.player.pos, Pos2D::new(2, 9));
    }

    #[test]
    fn test_cannot_run_into_wall() {
        let mut state = state_on(&CORRIDOR, Pos2D::new(2, 1));
        assert!(!run_step(&mut state, Direction::North));
        assert_eq!(state.messages, vec!["You cannot run in that direction.".to_owned()]);
        assert_eq!(state.player.pos, Pos2D::new(2, 1));
    }
}
