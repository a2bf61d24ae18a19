//! Deciding when a monster runs, and where it runs or hides

use crate::geometry::{projectable, ProjectFlags, ProjectionPath};
use crate::grid::{Floor, Pos2D, Pos2DVec};
use crate::monster::{flow_kind_for, monster_can_enter, MonsterMFlags};
use crate::world::PetFollow;
use crate::{GameState, MAX_SIGHT};

/// Rings searched by the safety and hiding sweeps
const SAFETY_RINGS: i32 = 9;

/// Closest distance a hiding spot may be to the player
const MIN_HIDING_DISTANCE: i32 = 2;

/// Offsets at exactly approximate distance `d` from the origin
fn ring_offsets(d: i32) -> impl Iterator<Item = Pos2DVec> {
    (-d..=d).flat_map(move |dy| {
        (-d..=d).filter_map(move |dx| {
            let v = Pos2DVec::new(dy, dx);
            (Pos2D::default().distance(Pos2D::default() + v) == d).then_some(v)
        })
    })
}

/// Level comparison for fleeing: `Some(true)` flee, `Some(false)` stand,
/// `None` when the levels are too close to call
pub fn level_verdict(m_lev: i32, p_lev: i32) -> Option<bool> {
    if m_lev > p_lev + 4 {
        Some(false)
    } else if m_lev + 4 <= p_lev {
        Some(true)
    } else {
        None
    }
}

/// Level a monster weighs itself at when deciding to flee
pub fn effective_level(race_level: i32, m_idx: usize) -> i32 {
    race_level + (m_idx & 0x08) as i32 + 25
}

/// Should this monster run from the player?
pub fn mon_will_run(state: &GameState, m_idx: usize) -> bool {
    let m = state.floor.monster(m_idx);
    let player = &state.player;
    let cdis = m.pos.distance(player.pos);

    if m.is_pet() {
        return match player.pet_follow {
            PetFollow::StayAway(d) => cdis <= d,
            PetFollow::Near(_) => false,
        };
    }
    if cdis > MAX_SIGHT + 5 {
        return false;
    }
    if m.is_fearful() {
        return true;
    }
    if cdis <= 5 {
        return false;
    }

    let m_lev = effective_level(state.races.get(m.r_idx).level, m_idx);
    if let Some(verdict) = level_verdict(m_lev, player.lev) {
        return verdict;
    }

    let p_val = i64::from(player.lev) * i64::from(player.mhp) + (i64::from(player.chp) << 2);
    let m_val = i64::from(m_lev) * i64::from(m.maxhp) + (i64::from(m.hp) << 2);
    p_val * i64::from(m.maxhp) > m_val * i64::from(player.mhp)
}

/// Nearest grid out of the player's line of fire that the monster can reach
/// without doubling back toward the player
pub fn find_safety(state: &GameState, m_idx: usize) -> Option<Pos2D> {
    let floor = &state.floor;
    let m = floor.monster(m_idx);
    let race = state.races.get(m.r_idx);
    let kind = flow_kind_for(race);
    let follows_flow = !m.mflag.contains(MonsterMFlags::NO_FLOW);
    let here_dist = i32::from(floor.grid(m.pos).get_distance(kind));
    let player_pos = state.player.pos;

    for d in 1..=SAFETY_RINGS {
        let mut best: Option<(Pos2D, i32)> = None;
        for v in ring_offsets(d) {
            let pos = m.pos + v;
            if !floor.in_bounds(pos) || !monster_can_enter(floor, race, pos, player_pos) {
                continue;
            }
            if follows_flow {
                let dist = i32::from(floor.grid(pos).get_distance(kind));
                if dist == 0 || dist > here_dist + 2 * d {
                    continue;
                }
            }
            if projectable(floor, player_pos, pos) {
                continue;
            }
            let dis = pos.distance(player_pos);
            if best.is_none_or(|(_, gdis)| dis > gdis) {
                best = Some((pos, dis));
            }
        }
        if let Some((pos, _)) = best {
            return Some(pos);
        }
    }
    None
}

/// Closest grid at least two steps from the player that the player cannot
/// shoot into but the monster can reach in a straight line
pub fn find_hiding(state: &GameState, m_idx: usize) -> Option<Pos2D> {
    let floor = &state.floor;
    let m = floor.monster(m_idx);
    let race = state.races.get(m.r_idx);
    let player_pos = state.player.pos;

    for d in 1..=SAFETY_RINGS {
        let mut best: Option<(Pos2D, i32)> = None;
        for v in ring_offsets(d) {
            let pos = m.pos + v;
            if !floor.in_bounds(pos) || !monster_can_enter(floor, race, pos, player_pos) {
                continue;
            }
            if projectable(floor, player_pos, pos)
                || !clean_shot(floor, player_pos, m.pos, pos, false)
            {
                continue;
            }
            let dis = pos.distance(player_pos);
            if dis >= MIN_HIDING_DISTANCE && best.is_none_or(|(_, gdis)| dis < gdis) {
                best = Some((pos, dis));
            }
        }
        if let Some((pos, _)) = best {
            return Some(pos);
        }
    }
    None
}

/// Does a bolt from `from` reach `to` without hitting anyone on the
/// shooter's side?
///
/// A friendly shooter (`is_friend`) must also keep the player out of the
/// line; a hostile one must not hit other hostiles.
pub fn clean_shot(
    floor: &Floor,
    player_pos: Pos2D,
    from: Pos2D,
    to: Pos2D,
    is_friend: bool,
) -> bool {
    let path =
        ProjectionPath::new(floor, floor.max_range(), player_pos, from, to, ProjectFlags::empty());
    if path.last() != Some(to) {
        return false;
    }
    for pos in &path {
        let m_idx = floor.grid(pos).m_idx;
        if m_idx != 0 && pos != to && is_friend == floor.monster(m_idx).is_pet() {
            return false;
        }
        if pos == player_pos && is_friend {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Floor;
    use crate::monster::{Allegiance, MonraceDefinition, MonsterEntity, RaceTable};
    use crate::player::Player;
    use crate::GameRng;

    fn state_with(rows: &[&str], player: Pos2D, level: i32) -> (GameState, usize) {
        let mut races = RaceTable::new();
        let r_idx = races.push(MonraceDefinition::new("kobold", 'k', level));
        let floor = Floor::from_ascii(rows).unwrap();
        let mut state = GameState::new(floor, Player::new(player), races, GameRng::new(1));
        state.ensure_flow();
        (state, r_idx)
    }

    #[test]
    fn test_level_band_boundary() {
        // At exactly +4 the level comparison does not decide
        assert_eq!(level_verdict(14, 10), None);
        // One more level and it does
        assert_eq!(level_verdict(15, 10), Some(false));
        assert_eq!(level_verdict(6, 10), Some(true));
        assert_eq!(level_verdict(7, 10), None);
    }

    #[test]
    fn test_effective_level_salt() {
        assert_eq!(effective_level(10, 1), 35);
        assert_eq!(effective_level(10, 8), 43);
    }

    #[test]
    fn test_afraid_monster_runs() {
        let rows = [
            "####################",
            "#..................#",
            "#..................#",
            "####################",
        ];
        let (mut state, r_idx) = state_with(&rows, Pos2D::new(1, 1), 30);
        let mut m = MonsterEntity::new(r_idx, Pos2D::new(1, 12), 10);
        m.timed.monfear = 5;
        let m_idx = state.floor.place_monster(m).unwrap();
        assert!(mon_will_run(&state, m_idx));
    }

    #[test]
    fn test_close_monster_never_runs() {
        let rows = ["#######", "#.....#", "#######"];
        let (mut state, r_idx) = state_with(&rows, Pos2D::new(1, 1), 1);
        state.player.lev = 50;
        let m_idx = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(1, 4), 10))
            .unwrap();
        assert!(!mon_will_run(&state, m_idx));
    }

    #[test]
    fn test_pet_stay_away() {
        let rows = ["##########", "#........#", "##########"];
        let (mut state, r_idx) = state_with(&rows, Pos2D::new(1, 1), 1);
        let m_idx = state
            .floor
            .place_monster(
                MonsterEntity::new(r_idx, Pos2D::new(1, 4), 10).with_allegiance(Allegiance::Pet),
            )
            .unwrap();
        assert!(!mon_will_run(&state, m_idx));
        state.player.pet_follow = PetFollow::StayAway(5);
        assert!(mon_will_run(&state, m_idx));
    }

    #[test]
    fn test_find_safety_behind_pillar() {
        let rows = [
            "##########",
            "#........#",
            "#....#...#",
            "#........#",
            "##########",
        ];
        let (mut state, r_idx) = state_with(&rows, Pos2D::new(2, 2), 1);
        let m_idx = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(2, 4), 10))
            .unwrap();
        let safe = find_safety(&state, m_idx).unwrap();
        assert!(!projectable(&state.floor, state.player.pos, safe));
    }

    #[test]
    fn test_clean_shot_blocked_by_ally() {
        let rows = ["##########", "#........#", "##########"];
        let (mut state, r_idx) = state_with(&rows, Pos2D::new(1, 8), 1);
        state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(1, 4), 10))
            .unwrap();
        let from = Pos2D::new(1, 2);
        assert!(!clean_shot(&state.floor, state.player.pos, from, Pos2D::new(1, 6), false));
        assert!(clean_shot(&state.floor, state.player.pos, from, Pos2D::new(1, 3), false));
    }
}
