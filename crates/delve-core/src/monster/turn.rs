//! A monster's whole turn, and the per-tick loop over every monster

use log::{debug, trace};

use crate::geometry::los;
use crate::monster::spell::{make_attack_spell, monst_spell_monst};
use crate::monster::{
    decide_movement_dirs, flow_kind_for, mon_will_run, process_monster_movement, MonsterMFlags,
    TurnFlags,
};
use crate::{GameState, ENERGY_TURN, MAX_SIGHT};

/// Energy gained per game tick, indexed by speed (110 is normal)
#[rustfmt::skip]
const EXTRACT_ENERGY: [u8; 200] = [
    /* Slow */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* Slow */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* Slow */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* Slow */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* Slow */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* Slow */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* S-50 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* S-40 */ 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    /* S-30 */ 2, 2, 2, 2, 2, 2, 2, 3, 3, 3,
    /* S-20 */ 3, 3, 3, 3, 3, 4, 4, 4, 4, 4,
    /* S-10 */ 5, 5, 5, 5, 6, 6, 7, 7, 8, 9,
    /* Norm */ 10, 11, 12, 13, 14, 15, 16, 17, 18, 19,
    /* F+10 */ 20, 21, 22, 23, 24, 25, 26, 27, 28, 29,
    /* F+20 */ 30, 31, 32, 33, 34, 35, 36, 36, 37, 37,
    /* F+30 */ 38, 38, 39, 39, 40, 40, 40, 41, 41, 41,
    /* F+40 */ 42, 42, 42, 43, 43, 43, 44, 44, 44, 44,
    /* F+50 */ 45, 45, 45, 45, 45, 46, 46, 46, 46, 46,
    /* F+60 */ 47, 47, 47, 47, 47, 48, 48, 48, 48, 48,
    /* F+70 */ 49, 49, 49, 49, 49, 49, 49, 49, 49, 49,
    /* Fast */ 49, 49, 49, 49, 49, 49, 49, 49, 49, 49,
];

/// Monsters further than this from the player never act
const MAX_PROCESS_DIST: i32 = 100;

/// Energy gained per game tick at `speed`
pub fn speed_to_energy(speed: i16) -> i16 {
    let idx = usize::try_from(speed).unwrap_or(0).min(EXTRACT_ENERGY.len() - 1);
    i16::from(EXTRACT_ENERGY[idx])
}

/// Current speed including haste and slowness, clamped to the energy table
pub fn monster_speed(state: &GameState, m_idx: usize) -> i16 {
    state.floor.monster(m_idx).get_temporary_speed().clamp(0, 199)
}

/// Count down timed effects, announcing the ones the player cares about
fn process_timed(state: &mut GameState, m_idx: usize) {
    let Some(m) = state.floor.monster_mut(m_idx) else {
        return;
    };
    let was_afraid = m.is_fearful();
    let was_confused = m.is_confused();
    m.timed.decrement();
    let (afraid, confused, seen) = (m.is_fearful(), m.is_confused(), m.ml);
    if !seen {
        return;
    }
    if was_afraid && !afraid {
        let msg = format!("{} recovers its courage.", state.monster_name_cap(m_idx));
        state.message(msg);
    }
    if was_confused && !confused {
        let msg = format!("{} is no longer confused.", state.monster_name_cap(m_idx));
        state.message(msg);
    }
}

/// Let a sleeping monster stir; returns `true` while it sleeps on
fn process_sleep(state: &mut GameState, m_idx: usize) -> bool {
    let m = state.floor.monster(m_idx);
    if !m.is_asleep() {
        return false;
    }
    let aaf = state.races.get(m.r_idx).aaf;
    let near = (aaf - m.cdis).max(0) / 2;
    let Some(m) = state.floor.monster_mut(m_idx) else {
        return false;
    };
    m.timed.sleep = (m.timed.sleep - 1 - near as i16).max(0);
    if m.timed.sleep > 0 {
        return true;
    }
    if m.ml {
        let msg = format!("{} wakes up.", state.monster_name_cap(m_idx));
        state.message(msg);
    }
    debug!("monster {m_idx} wakes");
    false
}

/// Track the flee/fight transition and say so when it is visible
fn update_fleeing(state: &mut GameState, m_idx: usize) {
    let running = mon_will_run(state, m_idx);
    let Some(m) = state.floor.monster_mut(m_idx) else {
        return;
    };
    let was = m.mflag.contains(MonsterMFlags::FLEEING);
    m.mflag.set(MonsterMFlags::FLEEING, running);
    if running == was || !m.ml || m.is_pet() {
        return;
    }
    let name = state.monster_name_cap(m_idx);
    if running {
        state.message(format!("{name} turns to flee!"));
    } else {
        state.message(format!("{name} turns to fight!"));
    }
}

/// Roll for a spell this turn; `true` if one was cast
fn try_cast(state: &mut GameState, m_idx: usize) -> bool {
    let m = state.floor.monster(m_idx);
    let freq = state.races.get(m.r_idx).freq_spell;
    if freq == 0 || state.rng.randint1(100) > freq {
        return false;
    }
    if state.floor.monster(m_idx).is_hostile() && make_attack_spell(state, m_idx) {
        return true;
    }
    state.floor.monster_is_valid(m_idx) && monst_spell_monst(state, m_idx)
}

/// Run one monster's turn: timers, waking, spells, then a step
pub fn process_monster(state: &mut GameState, m_idx: usize) {
    if !state.floor.monster_is_valid(m_idx) {
        return;
    }
    process_timed(state, m_idx);
    if process_sleep(state, m_idx) {
        return;
    }
    if state.floor.monster(m_idx).is_stunned() && state.rng.one_in(2) {
        trace!("monster {m_idx} is too dazed to act");
        return;
    }

    update_fleeing(state, m_idx);
    if try_cast(state, m_idx) || !state.floor.monster_is_valid(m_idx) {
        return;
    }
    if state.player.is_dead || state.player.leaving {
        return;
    }

    state.ensure_flow();
    let dirs = decide_movement_dirs(state, m_idx);
    let turn = process_monster_movement(state, m_idx, &dirs);
    if turn.contains(TurnFlags::DIED) || !state.floor.monster_is_valid(m_idx) {
        return;
    }

    // cornered and afraid: fight back instead
    let m = state.floor.monster(m_idx);
    if !turn.contains(TurnFlags::DO_TURN) && m.is_fearful() && m.cdis <= 1 {
        let seen = m.ml;
        if let Some(m) = state.floor.monster_mut(m_idx) {
            m.timed.monfear = 0;
            m.mflag.remove(MonsterMFlags::FLEEING);
        }
        if seen {
            let msg = format!("{} turns to fight!", state.monster_name_cap(m_idx));
            state.message(msg);
        }
    }
}

/// Can this monster sense the player well enough to bother acting?
fn is_awake_to_player(state: &GameState, m_idx: usize) -> bool {
    let m = state.floor.monster(m_idx);
    if m.cdis >= MAX_PROCESS_DIST {
        return false;
    }
    if m.is_pet() || m.cdis <= state.races.get(m.r_idx).aaf {
        return true;
    }
    if m.cdis <= MAX_SIGHT && los(&state.floor, m.pos, state.player.pos) {
        return true;
    }
    // heard through the noise flow
    let race = state.races.get(m.r_idx);
    let grid = state.floor.grid(m.pos);
    let kind = flow_kind_for(race);
    grid.get_cost(kind) > 0 && i32::from(grid.get_distance(kind)) <= race.aaf
}

/// One game tick: every monster gains energy and acts if it has enough
///
/// Monsters are processed from the highest index down, so anything summoned
/// this tick waits for the next one.
pub fn process_monsters(state: &mut GameState) {
    state.ensure_mon_lite();
    let top = state.floor.monster_max();
    for m_idx in (1..top).rev() {
        if state.player.is_dead || state.player.leaving {
            break;
        }
        if !state.floor.monster_is_valid(m_idx) {
            continue;
        }
        let gain = speed_to_energy(monster_speed(state, m_idx));
        let Some(m) = state.floor.monster_mut(m_idx) else {
            continue;
        };
        m.energy_need -= gain;
        if m.energy_need > 0 {
            continue;
        }
        m.energy_need += ENERGY_TURN as i16;
        if state.player.riding == m_idx {
            continue;
        }
        if !is_awake_to_player(state, m_idx) {
            continue;
        }
        process_monster(state, m_idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Floor, Pos2D};
    use crate::monster::{MonraceDefinition, MonsterEntity, RaceTable};
    use crate::player::Player;
    use crate::GameRng;

    fn arena() -> (GameState, usize) {
        let mut races = RaceTable::new();
        let r_idx = races.push(MonraceDefinition::new("snaga", 'o', 3));
        let floor = Floor::new(14, 14).unwrap();
        let player = Player::new(Pos2D::new(7, 7));
        (GameState::new(floor, player, races, GameRng::new(8)), r_idx)
    }

    #[test]
    fn test_speed_to_energy() {
        assert_eq!(speed_to_energy(110), 10);
        assert_eq!(speed_to_energy(120), 20);
        assert_eq!(speed_to_energy(100), 5);
        assert_eq!(speed_to_energy(-20), 1);
        assert_eq!(speed_to_energy(250), 49);
    }

    #[test]
    fn test_energy_scheduling_by_speed() {
        let (mut state, r_idx) = arena();
        let mut slow = MonsterEntity::new(r_idx, Pos2D::new(2, 2), 10);
        slow.timed.sleep = 30_000;
        let mut fast = MonsterEntity::new(r_idx, Pos2D::new(2, 11), 10);
        fast.timed.sleep = 30_000;
        fast.speed = 120;
        let slow = state.floor.place_monster(slow).unwrap();
        let fast = state.floor.place_monster(fast).unwrap();
        state.update_monsters();

        process_monsters(&mut state);
        assert_eq!(state.floor.monster(slow).energy_need, 90);
        assert_eq!(state.floor.monster(fast).energy_need, 80);
        for _ in 0..4 {
            process_monsters(&mut state);
        }
        assert_eq!(state.floor.monster(slow).energy_need, 50);
        assert_eq!(state.floor.monster(fast).energy_need, 100);
    }

    #[test]
    fn test_nearby_sleeper_wakes() {
        let (mut state, r_idx) = arena();
        let mut m = MonsterEntity::new(r_idx, Pos2D::new(7, 8), 10);
        m.timed.sleep = 5;
        let m = state.floor.place_monster(m).unwrap();
        state.update_monsters();
        process_monster(&mut state, m);
        assert!(!state.floor.monster(m).is_asleep());
        assert_eq!(state.messages.first().map(String::as_str), Some("The snaga wakes up."));
    }

    #[test]
    fn test_courage_returns() {
        let (mut state, r_idx) = arena();
        let mut m = MonsterEntity::new(r_idx, Pos2D::new(7, 8), 10);
        m.timed.monfear = 1;
        let m = state.floor.place_monster(m).unwrap();
        state.update_monsters();
        process_monster(&mut state, m);
        assert!(!state.floor.monster(m).is_fearful());
        assert!(state.messages.iter().any(|s| s == "The snaga recovers its courage."));
    }
}
