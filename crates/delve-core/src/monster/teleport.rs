//! Teleportation of monsters and the player

use log::debug;

use crate::grid::{Pos2D, TerrainFlags};
use crate::monster::ResistFlags;
use crate::world::RedrawFlags;
use crate::GameState;

/// Attempts at one radius before the search widens
const TRIES_PER_RADIUS: i32 = 500;

/// Can a teleporting creature land on `pos`?
fn landing_ok(state: &GameState, pos: Pos2D) -> bool {
    let floor = &state.floor;
    if !floor.in_bounds(pos) || pos == state.player.pos {
        return false;
    }
    let grid = floor.grid(pos);
    floor.is_empty_floor(pos)
        && !grid.has(TerrainFlags::TRAP)
        && !grid.is_rune_protection()
}

/// Random landing spot between `dis / 4` and `dis` away from `center`,
/// widening the search when the floor is crowded
fn random_landing(state: &mut GameState, center: Pos2D, dis: i32) -> Option<Pos2D> {
    let mut dis = dis.max(1);
    let mut min = dis / 4;
    let limit = state.floor.height.max(state.floor.width);
    loop {
        for _ in 0..TRIES_PER_RADIUS {
            let pos = Pos2D::new(
                center.y + state.rng.randint0(2 * dis + 1) - dis,
                center.x + state.rng.randint0(2 * dis + 1) - dis,
            );
            let d = center.distance(pos);
            if d < min || d > dis {
                continue;
            }
            if landing_ok(state, pos) {
                return Some(pos);
            }
        }
        if dis > limit {
            return None;
        }
        dis *= 2;
        min /= 2;
    }
}

/// Blink or teleport a monster up to `dis` grids away
pub fn teleport_away(state: &mut GameState, m_idx: usize, dis: i32) -> bool {
    if !state.floor.monster_is_valid(m_idx) {
        return false;
    }
    let from = state.floor.monster(m_idx).pos;
    let Some(to) = random_landing(state, from, dis) else {
        return false;
    };
    if state.player.riding == m_idx {
        state.relocate_player(to);
    } else {
        state.floor.move_monster(m_idx, to);
        state.update_monster(m_idx);
    }
    state.set_redraw(RedrawFlags::MAP);
    debug!("monster {m_idx} teleports {from:?} -> {to:?}");
    true
}

/// Pull a monster next to `near`
pub fn teleport_monster_to(state: &mut GameState, m_idx: usize, near: Pos2D) -> bool {
    if !state.floor.monster_is_valid(m_idx) {
        return false;
    }
    let race = state.races.get(state.floor.monster(m_idx).r_idx);
    if race.resist.contains(ResistFlags::RES_TELEPORT) && !state.rng.one_in(3) {
        return false;
    }
    let Some(to) = random_landing(state, near, 2) else {
        return false;
    };
    state.floor.move_monster(m_idx, to);
    state.update_monster(m_idx);
    state.set_redraw(RedrawFlags::MAP);
    true
}

/// Teleport the player up to `dis` grids away
pub fn teleport_player(state: &mut GameState, dis: i32) -> bool {
    let from = state.player.pos;
    let Some(to) = random_landing(state, from, dis) else {
        return false;
    };
    state.relocate_player(to);
    state.disturb();
    true
}

/// Pull the player next to `near`
pub fn teleport_player_to(state: &mut GameState, near: Pos2D) -> bool {
    let Some(to) = random_landing(state, near, 2) else {
        return false;
    };
    state.relocate_player(to);
    state.disturb();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Floor;
    use crate::monster::{MonraceDefinition, MonsterEntity, RaceTable};
    use crate::player::Player;
    use crate::GameRng;

    fn state() -> (GameState, usize) {
        let mut races = RaceTable::new();
        let r_idx = races.push(MonraceDefinition::new("imp", 'u', 10));
        let mut rows = vec!["####################"; 1];
        rows.extend(std::iter::repeat_n("#..................#", 10));
        rows.push("####################");
        let floor = Floor::from_ascii(&rows).unwrap();
        let state = GameState::new(floor, Player::new(Pos2D::new(1, 1)), races, GameRng::new(9));
        (state, r_idx)
    }

    #[test]
    fn test_teleport_away_moves_within_range() {
        let (mut state, r_idx) = state();
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(5, 10), 10))
            .unwrap();
        assert!(teleport_away(&mut state, m, 8));
        let pos = state.floor.monster(m).pos;
        assert_ne!(pos, Pos2D::new(5, 10));
        assert_eq!(state.floor.grid(pos).m_idx, m);
        assert_eq!(state.floor.grid(Pos2D::new(5, 10)).m_idx, 0);
    }

    #[test]
    fn test_teleport_to_lands_near() {
        let (mut state, r_idx) = state();
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(9, 18), 10))
            .unwrap();
        assert!(teleport_monster_to(&mut state, m, Pos2D::new(1, 1)));
        assert!(state.floor.monster(m).pos.distance(Pos2D::new(1, 1)) <= 2);
    }

    #[test]
    fn test_player_teleport_carries_mount() {
        let (mut state, r_idx) = state();
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(1, 1), 10))
            .unwrap();
        state.player.riding = m;
        assert!(teleport_player(&mut state, 10));
        assert_eq!(state.floor.monster(m).pos, state.player.pos);
        assert_ne!(state.player.pos, Pos2D::new(1, 1));
    }
}
