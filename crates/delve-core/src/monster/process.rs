//! Carrying out a monster's step: walls, doors, runes, fights, and what
//! happens on arrival

use bitflags::bitflags;
use log::{debug, trace};

use crate::combat::{monster_attack_monster, monster_attack_player};
use crate::effect::{destroy_terrain, project, EffectSource, EffectType};
use crate::geometry::{projectable, ProjectFlags};
use crate::grid::{Direction, GridFlags, Pos2D, TerrainFlags};
use crate::monster::{
    monster_can_cross_terrain, monster_can_pass_wall, BehaviorFlags, FeatureFlags, KindFlags,
    MonsterMFlags,
};
use crate::world::{PetPermissions, RecalcFlags, SoundHook};
use crate::{GameState, BREAK_RUNE_EXPLOSION, BREAK_RUNE_PROTECTION, ENERGY_TURN};

/// One in this many wall digs is loud enough to hear
const GRIND_NOISE: i32 = 20;

bitflags! {
    /// What a monster's step attempt did this turn
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TurnFlags: u16 {
        const DO_MOVE = 0x0001;
        /// The turn is spent, whether or not the monster moved
        const DO_TURN = 0x0002;
        const DID_OPEN_DOOR = 0x0004;
        const DID_BASH_DOOR = 0x0008;
        const DID_KILL_WALL = 0x0010;
        const DID_PASS_WALL = 0x0020;
        const DID_KILL_BODY = 0x0040;
        const DID_MOVE_BODY = 0x0080;
        const DID_TAKE_ITEM = 0x0100;
        const DID_KILL_ITEM = 0x0200;
        /// The mover did not survive its own step
        const DIED = 0x0400;
    }
}

impl TurnFlags {
    /// Did the monster end up somewhere new?
    pub fn moved(self) -> bool {
        self.contains(TurnFlags::DO_MOVE) && self.contains(TurnFlags::DO_TURN)
    }
}

/// Decide whether the monster can get into `to` by walking, phasing or
/// digging
pub fn process_wall(
    state: &GameState,
    m_idx: usize,
    to: Pos2D,
    can_cross: bool,
    turn: &mut TurnFlags,
) {
    let grid = state.floor.grid(to);
    let m = state.floor.monster(m_idx);
    let race = state.races.get(m.r_idx);
    let ridden = state.player.riding == m_idx;

    if to == state.player.pos || grid.has_monster() || can_cross {
        turn.insert(TurnFlags::DO_MOVE);
        return;
    }
    if monster_can_pass_wall(grid.feat, race) && (!ridden || state.player.pass_wall) {
        turn.insert(TurnFlags::DO_MOVE | TurnFlags::DID_PASS_WALL);
        return;
    }
    let diggable = grid.has(TerrainFlags::HURT_DISI) && !grid.has(TerrainFlags::PERMANENT);
    // glass only gives way to something sturdy enough to survive the shards
    let sturdy = !grid.has(TerrainFlags::GLASS)
        || race.behavior.contains(BehaviorFlags::STUPID)
        || m.hp >= (m.maxhp / 3).max(200);
    if race.feature.contains(FeatureFlags::KILL_WALL)
        && (!ridden || state.player.kill_wall)
        && diggable
        && sturdy
    {
        turn.insert(TurnFlags::DO_MOVE | TurnFlags::DID_KILL_WALL);
    }
}

/// Open, unlock or bash a closed door in the way
pub fn process_door(state: &mut GameState, m_idx: usize, to: Pos2D, turn: &mut TurnFlags) {
    let feat = state.floor.grid(to).feat;
    if turn.contains(TurnFlags::DO_MOVE) || !feat.is_closed_door() {
        return;
    }
    let m = state.floor.monster(m_idx);
    let (hp, pet, ml) = (m.hp, m.is_pet(), m.ml);
    let behavior = state.races.get(m.r_idx).behavior;
    let allowed = !pet || state.player.pet_permissions.contains(PetPermissions::OPEN_DOORS);
    let lock_power = i32::from(state.floor.grid(to).lock_power);

    let mut may_bash = true;
    if behavior.contains(BehaviorFlags::OPEN_DOOR) && feat.has(TerrainFlags::OPEN) && allowed {
        if lock_power == 0 {
            state.floor.set_feat(to, feat.opened());
            turn.insert(TurnFlags::DID_OPEN_DOOR | TurnFlags::DO_TURN);
            if state.floor.grid(to).info.contains(GridFlags::VIEW) {
                state.sound(SoundHook::OpenDoor);
            }
            trace!("monster {m_idx} opens door at {to:?}");
            return;
        }
        if state.rng.randint0(hp / 10) > lock_power {
            state.floor.grid_mut(to).lock_power = 0;
            turn.insert(TurnFlags::DO_TURN);
            if ml {
                state.message("You hear a click.");
            }
            may_bash = false;
        }
    }

    if may_bash
        && behavior.contains(BehaviorFlags::BASH_DOOR)
        && feat.has(TerrainFlags::BASH)
        && allowed
        && state.rng.randint0(hp / 10) > lock_power
    {
        state.message("You hear a door burst open!");
        state.sound(SoundHook::BashDoor);
        state.disturb();
        turn.insert(TurnFlags::DID_BASH_DOOR | TurnFlags::DO_MOVE);
        debug!("monster {m_idx} bashes door at {to:?}");
    }
}

/// Try to break a rune of protection in the way; clears `DO_MOVE` while
/// the rune holds
fn break_protection_rune(state: &mut GameState, m_idx: usize, to: Pos2D, turn: &mut TurnFlags) {
    if !turn.contains(TurnFlags::DO_MOVE) || !state.floor.grid(to).is_rune_protection() {
        return;
    }
    let m = state.floor.monster(m_idx);
    let pet = m.is_pet();
    // the player standing on the rune can still be attacked
    if !pet && to == state.player.pos {
        return;
    }
    turn.remove(TurnFlags::DO_MOVE);
    if pet {
        return;
    }
    let level = state.races.get(m.r_idx).level;
    if state.rng.randint1(BREAK_RUNE_PROTECTION as i32) < level {
        if state.floor.grid(to).is_mark() {
            state.message("The rune of protection is broken!");
        }
        let grid = state.floor.grid_mut(to);
        grid.info.remove(GridFlags::PROTECTION_RUNE | GridFlags::MARK);
        state.floor.recalc |= RecalcFlags::FLOW;
        turn.insert(TurnFlags::DO_MOVE);
        debug!("monster {m_idx} breaks protection rune at {to:?}");
    }
}

/// Set off or disarm an explosive rune in the way
///
/// Returns `false` when the blast killed the monster.
fn trip_explosive_rune(
    state: &mut GameState,
    m_idx: usize,
    to: Pos2D,
    turn: &mut TurnFlags,
) -> bool {
    if !turn.contains(TurnFlags::DO_MOVE) || !state.floor.grid(to).is_rune_explosion() {
        return true;
    }
    let m = state.floor.monster(m_idx);
    if m.is_pet() {
        turn.remove(TurnFlags::DO_MOVE);
        return true;
    }
    let level = state.races.get(m.r_idx).level;
    if state.rng.randint1(BREAK_RUNE_EXPLOSION as i32) >= level {
        return true;
    }

    if state.floor.grid(to).is_mark() {
        state.message("The rune explodes!");
        let dam = 2 * (state.player.lev + state.rng.dice(7, 7));
        let flags =
            ProjectFlags::GRID | ProjectFlags::ITEM | ProjectFlags::KILL | ProjectFlags::JUMP;
        project(state, EffectSource::Floor, 2, to, dam, EffectType::Mana, flags);
    } else {
        state.message("An explosive rune was disarmed.");
    }
    let grid = state.floor.grid_mut(to);
    grid.info.remove(GridFlags::EXPLOSIVE_RUNE | GridFlags::MARK);
    state.floor.recalc |= RecalcFlags::FLOW;

    if !state.floor.monster_is_valid(m_idx) {
        debug!("monster {m_idx} killed by explosive rune");
        return false;
    }
    true
}

/// Attack the player if they are in the way; `true` ends the step
fn attack_player_in_way(
    state: &mut GameState,
    m_idx: usize,
    to: Pos2D,
    turn: &mut TurnFlags,
) -> bool {
    if !turn.contains(TurnFlags::DO_MOVE) || to != state.player.pos {
        return false;
    }
    let m = state.floor.monster(m_idx);
    let race = state.races.get(m.r_idx);
    if race.behavior.contains(BehaviorFlags::NEVER_BLOW) {
        if state.is_original_ap_and_seen(m_idx) {
            if let Some(race) = state.races.get_mut(m.r_idx) {
                race.lore.behavior |= BehaviorFlags::NEVER_BLOW;
            }
        }
        turn.remove(TurnFlags::DO_MOVE);
        return false;
    }
    if !m.is_hostile() || state.player.riding == m_idx {
        turn.remove(TurnFlags::DO_MOVE);
        return false;
    }
    monster_attack_player(state, m_idx);
    turn.remove(TurnFlags::DO_MOVE);
    turn.insert(TurnFlags::DO_TURN);
    true
}

/// Is race `a` stronger than race `b` by experience times level?
fn outranks(state: &GameState, a: usize, b: usize) -> bool {
    let ra = state.races.get(state.floor.monster(a).r_idx);
    let rb = state.races.get(state.floor.monster(b).r_idx);
    ra.exp * ra.level > rb.exp * rb.level
}

/// Deal with another monster in the way; `true` ends the step
fn handle_monster_in_way(
    state: &mut GameState,
    m_idx: usize,
    to: Pos2D,
    can_cross: bool,
    turn: &mut TurnFlags,
) -> bool {
    let t_idx = state.floor.grid(to).m_idx;
    if !turn.contains(TurnFlags::DO_MOVE) || t_idx == 0 || t_idx == m_idx {
        return false;
    }
    turn.remove(TurnFlags::DO_MOVE);

    let m = state.floor.monster(m_idx);
    let from = m.pos;
    let confused = m.is_confused();
    let behavior = state.races.get(m.r_idx).behavior;
    let occupant = state.floor.monster(t_idx);
    let occupant_race = state.races.get(occupant.r_idx);
    let riding = state.player.riding;

    if state.are_enemies(m_idx, t_idx) || confused {
        if behavior.contains(BehaviorFlags::NEVER_BLOW) {
            return false;
        }
        if monster_attack_monster(state, m_idx, t_idx) {
            turn.insert(TurnFlags::DO_TURN);
            return true;
        }
        return false;
    }

    let stronger = outranks(state, m_idx, t_idx);
    if behavior.contains(BehaviorFlags::KILL_BODY)
        && !behavior.contains(BehaviorFlags::NEVER_MOVE)
        && stronger
        && can_cross
        && t_idx != riding
        && !occupant_race.behavior.contains(BehaviorFlags::UNIQUE)
    {
        turn.insert(TurnFlags::DO_MOVE | TurnFlags::DID_KILL_BODY);
        return false;
    }
    if behavior.contains(BehaviorFlags::MOVE_BODY)
        && !behavior.contains(BehaviorFlags::NEVER_MOVE)
        && stronger
        && can_cross
        && t_idx != riding
        && monster_can_cross_terrain(state.floor.grid(from).feat, occupant_race)
    {
        turn.insert(TurnFlags::DO_MOVE | TurnFlags::DID_MOVE_BODY);
        if let Some(t) = state.floor.monster_mut(t_idx) {
            t.timed.sleep = 0;
        }
    }
    false
}

/// Finish digging through the wall at `to`
///
/// Returns `false` when the monster did not survive the collapse (shattering
/// glass can kill it), in which case the caller must stop touching it.
pub fn process_post_dig_wall(
    state: &mut GameState,
    m_idx: usize,
    to: Pos2D,
    turn: TurnFlags,
) -> bool {
    if !turn.contains(TurnFlags::DID_KILL_WALL) || !turn.contains(TurnFlags::DO_MOVE) {
        return true;
    }
    if state.rng.one_in(GRIND_NOISE) {
        if state.floor.grid(to).has(TerrainFlags::GLASS) {
            state.message("You hear glass breaking.");
        } else {
            state.message("There is a grinding sound.");
        }
    }
    state.sound(SoundHook::Dig);
    destroy_terrain(state, to);
    state.floor.recalc |= RecalcFlags::FLOW;
    if !state.floor.monster_is_valid(m_idx) {
        debug!("monster {m_idx} died digging at {to:?}");
        return false;
    }
    true
}

/// A bashed door ends up open or broken
fn settle_bashed_door(state: &mut GameState, m_idx: usize, to: Pos2D) -> bool {
    let feat = state.floor.grid(to).feat;
    if feat.has(TerrainFlags::GLASS) || state.rng.one_in(2) {
        destroy_terrain(state, to);
    } else {
        state.floor.set_feat(to, feat.opened());
    }
    state.floor.monster_is_valid(m_idx)
}

/// Step onto `to`, trampling or swapping with an occupant as decided
fn step_into(state: &mut GameState, m_idx: usize, to: Pos2D, turn: TurnFlags) {
    let t_idx = state.floor.grid(to).m_idx;
    if t_idx != 0 && turn.contains(TurnFlags::DID_KILL_BODY) {
        if state.floor.monster(m_idx).ml {
            let msg = format!(
                "{} tramples over {}.",
                state.monster_name_cap(m_idx),
                state.monster_name(t_idx)
            );
            state.message(msg);
        }
        state.monster_death(t_idx, false);
    }

    let t_idx = state.floor.grid(to).m_idx;
    if t_idx != 0 && turn.contains(TurnFlags::DID_MOVE_BODY) {
        state.floor.swap_monsters(m_idx, t_idx);
        state.update_monster(t_idx);
    } else if state.player.riding == m_idx {
        state.relocate_player(to);
    } else {
        state.floor.move_monster(m_idx, to);
    }
    state.update_monster(m_idx);

    let m = state.floor.monster(m_idx);
    if m.ml
        && m.is_hostile()
        && m.mflag.contains(MonsterMFlags::VIEW)
        && state.options.disturb_near
        && projectable(&state.floor, state.player.pos, to)
    {
        state.disturb();
    }
}

/// Trees slow down anything that is not at home in them
fn forest_surcharge(state: &mut GameState, m_idx: usize, to: Pos2D) {
    if !state.floor.grid(to).has(TerrainFlags::TREE) {
        return;
    }
    let race = state.races.get(state.floor.monster(m_idx).r_idx);
    if race.kind.contains(KindFlags::ANIMAL)
        || race.feature.intersects(FeatureFlags::PASS_TREE | FeatureFlags::CAN_FLY)
    {
        return;
    }
    if let Some(m) = state.floor.monster_mut(m_idx) {
        m.energy_need += ENERGY_TURN as i16;
    }
}

/// Pick up or destroy what lies on `to`
fn process_items(state: &mut GameState, m_idx: usize, to: Pos2D, turn: &mut TurnFlags) {
    let m = state.floor.monster(m_idx);
    let behavior = state.races.get(m.r_idx).behavior;
    let takes = behavior.contains(BehaviorFlags::TAKE_ITEM);
    if !takes && !behavior.contains(BehaviorFlags::KILL_ITEM) {
        return;
    }
    if m.is_pet() && !state.player.pet_permissions.contains(PetPermissions::PICKUP_ITEMS) {
        return;
    }
    let seen = m.ml;

    for o_idx in state.floor.items_at(to).to_vec() {
        let Some(item) = state.floor.item(o_idx) else {
            continue;
        };
        let (name, artifact) = (item.name.clone(), item.is_fixed_artifact);
        if takes {
            if state.floor.hand_item_to_monster(o_idx, m_idx) {
                turn.insert(TurnFlags::DID_TAKE_ITEM);
                if seen {
                    let msg = format!("{} picks up {name}.", state.monster_name_cap(m_idx));
                    state.message(msg);
                }
            }
        } else if !artifact {
            state.floor.delete_item(o_idx);
            turn.insert(TurnFlags::DID_KILL_ITEM);
            if seen {
                let msg = format!("{} destroys {name}.", state.monster_name_cap(m_idx));
                state.message(msg);
            }
        }
    }
}

/// Try each direction in order until the monster moves or spends its turn
///
/// Every side effect that can kill the mover is followed by a validity
/// check; a dead mover comes back with [`TurnFlags::DIED`].
pub fn process_monster_movement(
    state: &mut GameState,
    m_idx: usize,
    dirs: &[Direction],
) -> TurnFlags {
    let mut turn = TurnFlags::empty();
    for &dir in dirs {
        if !dir.is_compass() {
            continue;
        }
        let from = state.floor.monster(m_idx).pos;
        let to = from + dir.vec();
        if !state.floor.in_bounds(to) {
            continue;
        }

        turn = TurnFlags::empty();
        let race = state.races.get(state.floor.monster(m_idx).r_idx);
        let can_cross = monster_can_cross_terrain(state.floor.grid(to).feat, race);
        let never_move = race.behavior.contains(BehaviorFlags::NEVER_MOVE);

        process_wall(state, m_idx, to, can_cross, &mut turn);
        process_door(state, m_idx, to, &mut turn);
        break_protection_rune(state, m_idx, to, &mut turn);
        if !trip_explosive_rune(state, m_idx, to, &mut turn) {
            return turn | TurnFlags::DIED;
        }
        if attack_player_in_way(state, m_idx, to, &mut turn) {
            break;
        }
        if handle_monster_in_way(state, m_idx, to, can_cross, &mut turn) {
            break;
        }
        if !state.floor.monster_is_valid(m_idx) {
            return turn | TurnFlags::DIED;
        }

        if state.player.riding == m_idx && !state.floor.monster(m_idx).is_confused() {
            turn.remove(TurnFlags::DO_MOVE);
        }
        if turn.contains(TurnFlags::DO_MOVE) && never_move {
            if state.is_original_ap_and_seen(m_idx) {
                let r_idx = state.floor.monster(m_idx).r_idx;
                if let Some(race) = state.races.get_mut(r_idx) {
                    race.lore.behavior |= BehaviorFlags::NEVER_MOVE;
                }
            }
            turn.remove(TurnFlags::DO_MOVE);
        }
        if !turn.contains(TurnFlags::DO_MOVE) {
            if turn.contains(TurnFlags::DO_TURN) {
                break;
            }
            continue;
        }

        turn.insert(TurnFlags::DO_TURN);
        if !process_post_dig_wall(state, m_idx, to, turn) {
            return turn | TurnFlags::DIED;
        }
        if turn.contains(TurnFlags::DID_BASH_DOOR) && !settle_bashed_door(state, m_idx, to) {
            return turn | TurnFlags::DIED;
        }

        step_into(state, m_idx, to, turn);
        trace!("monster {m_idx} steps {from:?} -> {to:?}");
        forest_surcharge(state, m_idx, to);
        process_items(state, m_idx, to, &mut turn);
        break;
    }
    turn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Floor, TerrainKind};
    use crate::item::{ItemEntity, ItemKind};
    use crate::monster::{MonraceDefinition, MonsterEntity, RaceTable};
    use crate::player::Player;
    use crate::GameRng;

    const HALL: [&str; 5] = [
        "##########",
        "#...#....#",
        "#...G....#",
        "#...+..T.#",
        "##########",
    ];

    fn setup(race: MonraceDefinition, at: Pos2D) -> (GameState, usize) {
        let mut races = RaceTable::new();
        let r_idx = races.push(race);
        let floor = Floor::from_ascii(&HALL).unwrap();
        let mut state =
            GameState::new(floor, Player::new(Pos2D::new(1, 8)), races, GameRng::new(11));
        let m_idx = state.floor.place_monster(MonsterEntity::new(r_idx, at, 40)).unwrap();
        (state, m_idx)
    }

    #[test]
    fn test_wall_killer_digs_and_moves_same_turn() {
        let mut race = MonraceDefinition::new("umber hulk", 'X', 16);
        race.feature |= FeatureFlags::KILL_WALL;
        let (mut state, m) = setup(race, Pos2D::new(1, 3));
        let turn = process_monster_movement(&mut state, m, &[Direction::East]);
        assert!(turn.contains(TurnFlags::DID_KILL_WALL));
        assert!(turn.moved());
        assert_eq!(state.floor.monster(m).pos, Pos2D::new(1, 4));
        assert_eq!(state.floor.grid(Pos2D::new(1, 4)).feat, TerrainKind::Floor);
    }

    #[test]
    fn test_frail_digger_leaves_glass_alone() {
        let mut race = MonraceDefinition::new("rock lizard", 'R', 1);
        race.feature |= FeatureFlags::KILL_WALL;
        let (mut state, m) = setup(race, Pos2D::new(2, 3));
        let turn = process_monster_movement(&mut state, m, &[Direction::East]);
        assert!(!turn.moved());
        assert_eq!(state.floor.grid(Pos2D::new(2, 4)).feat, TerrainKind::GlassWall);
    }

    #[test]
    fn test_digger_killed_by_glass_is_not_touched_again() {
        let mut race = MonraceDefinition::new("mindless digger", 'w', 1);
        race.feature |= FeatureFlags::KILL_WALL;
        race.behavior |= BehaviorFlags::STUPID;
        let (mut state, m) = setup(race, Pos2D::new(2, 3));
        state.floor.monster_mut(m).unwrap().hp = 1;
        let turn = process_monster_movement(&mut state, m, &[Direction::East]);
        assert!(turn.contains(TurnFlags::DIED));
        assert!(!state.floor.monster_is_valid(m));
        assert_eq!(state.floor.grid(Pos2D::new(2, 4)).feat, TerrainKind::Floor);
        assert_eq!(state.floor.grid(Pos2D::new(2, 4)).m_idx, 0);
    }

    #[test]
    fn test_door_opener_spends_turn_without_moving() {
        let mut race = MonraceDefinition::new("kobold", 'k', 2);
        race.behavior |= BehaviorFlags::OPEN_DOOR;
        let (mut state, m) = setup(race, Pos2D::new(3, 3));
        let turn = process_monster_movement(&mut state, m, &[Direction::East]);
        assert!(turn.contains(TurnFlags::DID_OPEN_DOOR | TurnFlags::DO_TURN));
        assert_eq!(state.floor.monster(m).pos, Pos2D::new(3, 3));
        assert_eq!(state.floor.grid(Pos2D::new(3, 4)).feat, TerrainKind::OpenDoor);
    }

    #[test]
    fn test_pet_stays_behind_protection_rune() {
        let race = MonraceDefinition::new("dog", 'C', 5);
        let (mut state, m) = setup(race, Pos2D::new(1, 1));
        state.floor.monster_mut(m).unwrap().allegiance = crate::monster::Allegiance::Pet;
        state.floor.grid_mut(Pos2D::new(1, 2)).info |= GridFlags::PROTECTION_RUNE;
        let turn = process_monster_movement(&mut state, m, &[Direction::East]);
        assert!(!turn.moved());
        assert!(state.floor.grid(Pos2D::new(1, 2)).is_rune_protection());
    }

    #[test]
    fn test_never_move_monster_stays_put() {
        let race = {
            let mut r = MonraceDefinition::new("floating eye", 'e', 1);
            r.behavior |= BehaviorFlags::NEVER_MOVE;
            r
        };
        let (mut state, m) = setup(race, Pos2D::new(1, 6));
        let turn = process_monster_movement(&mut state, m, &[Direction::West, Direction::East]);
        assert!(!turn.moved());
        assert_eq!(state.floor.monster(m).pos, Pos2D::new(1, 6));
    }

    #[test]
    fn test_item_taker_picks_up_on_arrival() {
        let mut race = MonraceDefinition::new("cutpurse", 'p', 2);
        race.behavior |= BehaviorFlags::TAKE_ITEM;
        let (mut state, m) = setup(race, Pos2D::new(1, 1));
        let o = state
            .floor
            .place_item(ItemEntity::new(ItemKind::Arrow, "an arrow"), Pos2D::new(1, 2))
            .unwrap();
        let turn = process_monster_movement(&mut state, m, &[Direction::East]);
        assert!(turn.contains(TurnFlags::DID_TAKE_ITEM));
        assert!(state.floor.monster(m).held_items.contains(&o));
        assert!(state.floor.items_at(Pos2D::new(1, 2)).is_empty());
    }

    #[test]
    fn test_trees_cost_extra_energy() {
        let race = MonraceDefinition::new("orc", 'o', 5);
        let (mut state, m) = setup(race, Pos2D::new(3, 6));
        let before = state.floor.monster(m).energy_need;
        let turn = process_monster_movement(&mut state, m, &[Direction::East]);
        assert!(turn.moved());
        assert_eq!(state.floor.monster(m).energy_need, before + ENERGY_TURN as i16);
    }
}
