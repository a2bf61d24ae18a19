//! One step of the player: bump-attacks, pushing past friends, wall
//! dissolving, trap disarming, door opening and plain walking

use log::debug;

use super::{Player, PlayerClass};
use crate::combat::py_attack;
use crate::effect::destroy_terrain;
use crate::grid::{Direction, GridFlags, Pos2D, TerrainFlags, TerrainKind};
use crate::monster::{monster_can_cross_terrain, BehaviorFlags, FeatureFlags, ResistFlags};
use crate::state::{capitalize, GameState};
use crate::world::{RecalcFlags, SoundHook};
use crate::ENERGY_TURN;

/// Difficulty of disarming a floor trap
const TRAP_POWER: i32 = 5;

/// What a step attempt ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Walked onto the destination
    Moved,
    /// Stepped off the edge of a wilderness region
    RegionChange,
    /// Fought the monster in the way
    Attacked(usize),
    /// Traded places with a non-hostile monster
    PushedPast(usize),
    /// Tried to disarm the trap ahead; true on success
    Disarm(bool),
    /// Opened (or tried to open) the door ahead
    OpenedDoor,
    /// Nothing happened besides any messages; see `Player::energy_use`
    Blocked,
}

/// Can the player (or the mount) stand on this terrain?
fn player_can_enter(state: &GameState, feat: TerrainKind) -> bool {
    let player = &state.player;
    if player.is_riding() && state.floor.monster_is_valid(player.riding) {
        let race = state.races.get(state.floor.monster(player.riding).r_idx);
        return monster_can_cross_terrain(feat, race);
    }
    if feat.has(TerrainFlags::CAN_FLY) && player.levitation {
        return true;
    }
    if feat.has(TerrainFlags::WATER) && player.can_swim {
        return true;
    }
    if player.pass_wall
        && feat.flags().intersects(TerrainFlags::WALL | TerrainFlags::DOOR)
        && !feat.has(TerrainFlags::PERMANENT)
    {
        return true;
    }
    feat.has(TerrainFlags::MOVE)
}

/// Prefix a terrain name with an indefinite article
fn with_article(name: &str) -> String {
    match name.chars().next() {
        Some(c) if "aeiouAEIOU".contains(c) => format!("an {name}"),
        _ => format!("a {name}"),
    }
}

/// Where the player arrives after crossing a wilderness edge at `to`
fn wilderness_entry(state: &GameState, to: Pos2D) -> Pos2D {
    let (h, w) = (state.floor.height, state.floor.width);
    let y = if to.y <= 0 {
        h - 2
    } else if to.y >= h - 1 {
        1
    } else {
        to.y
    };
    let x = if to.x <= 0 {
        w - 2
    } else if to.x >= w - 1 {
        1
    } else {
        to.x
    };
    Pos2D::new(y, x)
}

/// Can the mount carry the player onto `feat`? Complains if not
fn mount_cooperates(state: &mut GameState, feat: TerrainKind) -> bool {
    let mount = state.player.riding;
    if mount == 0 || !state.floor.monster_is_valid(mount) {
        return true;
    }
    let m = state.floor.monster(mount);
    let race = state.races.get(m.r_idx);
    let name = state.monster_name(mount);
    let flies = race.feature.contains(FeatureFlags::CAN_FLY);
    let swims = race.feature.intersects(FeatureFlags::CAN_SWIM | FeatureFlags::AQUATIC);

    let complaint = if race.behavior.contains(BehaviorFlags::NEVER_MOVE) {
        Some("Can't move!".to_owned())
    } else if m.is_fearful() {
        Some(format!("{} is too scared to control.", capitalize(&name)))
    } else if flies && feat.has(TerrainFlags::CAN_FLY) {
        None
    } else if swims && feat.has(TerrainFlags::WATER) {
        None
    } else if feat.has(TerrainFlags::WATER) && feat.has(TerrainFlags::DEEP) {
        Some("Can't swim.".to_owned())
    } else if !feat.has(TerrainFlags::WATER) && race.feature.contains(FeatureFlags::AQUATIC) {
        Some("Can't land.".to_owned())
    } else if feat.has(TerrainFlags::LAVA)
        && !race.feature.contains(FeatureFlags::IM_LAVA)
        && !race.resist.contains(ResistFlags::IM_FIRE)
    {
        Some("Too hot to go through.".to_owned())
    } else {
        None
    };
    let complaint = match complaint {
        Some(c) => Some(c),
        None if m.is_stunned() && state.rng.one_in(2) => {
            Some(format!("You cannot control stunned {name}!"))
        }
        None => None,
    };
    match complaint {
        Some(msg) => {
            state.message(msg);
            state.disturb();
            false
        }
        None => true,
    }
}

/// Try to disarm the known trap at `pos`; a botched try springs it
fn disarm_trap(state: &mut GameState, pos: Pos2D) -> MoveOutcome {
    let name = state.floor.grid(pos).feat.name();
    let chance = (state.player.skill_dis - TRAP_POWER).max(2);
    if state.rng.randint0(100) < chance {
        state.message(format!("You have disarmed the {name}."));
        state.floor.set_feat(pos, TerrainKind::Floor);
        MoveOutcome::Disarm(true)
    } else if state.rng.randint0(100) < chance {
        state.disturb();
        state.message(format!("You failed to disarm the {name}."));
        MoveOutcome::Disarm(false)
    } else {
        state.message(format!("You set off the {name}!"));
        state.relocate_player(pos);
        MoveOutcome::Disarm(false)
    }
}

/// Open the closed door at `pos` on bump; locked doors need picking
fn easy_open_door(state: &mut GameState, pos: Pos2D) -> MoveOutcome {
    let grid = state.floor.grid(pos);
    if grid.info.contains(GridFlags::JAMMED) {
        state.message("The door appears to be stuck.");
        return MoveOutcome::OpenedDoor;
    }
    let feat = grid.feat;
    let lock = i32::from(grid.lock_power);
    if lock > 0 {
        let chance = (state.player.skill_dis - lock * 4).max(2);
        if state.rng.randint0(100) >= chance {
            state.message("You failed to pick the lock.");
            return MoveOutcome::OpenedDoor;
        }
        state.message("You have picked the lock.");
    }
    state.floor.set_feat(pos, feat.opened());
    state.sound(SoundHook::OpenDoor);
    MoveOutcome::OpenedDoor
}

/// Is the monster in the way someone the player would rather not hit?
fn wants_to_push_past(player: &Player, hostile: bool, visible: bool) -> bool {
    !hostile && visible && !player.is_disoriented() && !player.is_berserk()
}

/// Move the player one step in `dir`
///
/// `do_pickup` is the pickup policy of the command; when it differs from
/// the `easy_disarm` option a known trap ahead is disarmed instead of
/// entered. `break_trap` destroys a trap the player walks onto. The energy
/// the attempt cost is left in `state.player.energy_use`.
pub fn exe_movement(
    state: &mut GameState,
    dir: Direction,
    do_pickup: bool,
    break_trap: bool,
) -> MoveOutcome {
    state.player.energy_use = ENERGY_TURN;
    if !dir.is_compass() {
        state.player.energy_use = 0;
        return MoveOutcome::Blocked;
    }
    let from = state.player.pos;
    let to = from + dir.vec();

    if state.floor.is_wilderness && !state.floor.in_bounds(to) {
        let entry = wilderness_entry(state, to);
        debug!("leaving the wilderness region at {to:?}, entering at {entry:?}");
        state.relocate_player(entry);
        return MoveOutcome::RegionChange;
    }
    let Some(grid) = state.floor.get_grid(to) else {
        state.player.energy_use = 0;
        return MoveOutcome::Blocked;
    };
    let feat = grid.feat;
    let m_idx = grid.m_idx;
    let can_enter = player_can_enter(state, feat);
    let can_kill_wall = state.player.kill_wall
        && feat.has(TerrainFlags::HURT_DISI)
        && (!can_enter || !feat.has(TerrainFlags::LOS))
        && !feat.has(TerrainFlags::PERMANENT);

    let mut push_past = false;
    if m_idx != 0 && state.floor.monster_is_valid(m_idx) {
        let m = state.floor.monster(m_idx);
        let visible = m.ml;
        if visible || can_enter || can_kill_wall {
            if wants_to_push_past(&state.player, m.is_hostile(), visible)
                && (can_enter || can_kill_wall)
            {
                if let Some(m) = state.floor.monster_mut(m_idx) {
                    m.timed.sleep = 0;
                }
                let name = state.monster_name(m_idx);
                let race = state.races.get(state.floor.monster(m_idx).r_idx);
                let stays_put = race.behavior.contains(BehaviorFlags::NEVER_MOVE);
                let bloodthirsty = state.player.bloodthirsty_weapon
                    || state.player.class == PlayerClass::Berserker;
                if bloodthirsty && state.rng.randint1(1000) > 666 {
                    py_attack(state, m_idx);
                    return MoveOutcome::Attacked(m_idx);
                }
                if !stays_put && monster_can_cross_terrain(state.floor.grid(from).feat, race) {
                    push_past = true;
                } else {
                    // The bump still costs the full turn
                    state.message(format!("{} is in your way!", capitalize(&name)));
                    return MoveOutcome::Blocked;
                }
            } else {
                py_attack(state, m_idx);
                return MoveOutcome::Attacked(m_idx);
            }
        }
    }

    if state.player.is_riding() && !mount_cooperates(state, feat) {
        return MoveOutcome::Blocked;
    }

    if feat.requires_flight() && !state.player.levitation && !can_kill_wall {
        state.message(format!("You need to fly to go through the {}.", feat.name()));
        if !state.player.is_disoriented() {
            state.player.energy_use = 0;
        }
        state.disturb();
        return MoveOutcome::Blocked;
    }
    if feat.has(TerrainFlags::TREE) && !can_kill_wall {
        if !tree_walker(state) {
            state.player.energy_use *= 2;
        }
    } else if do_pickup != state.options.easy_disarm
        && feat.has(TerrainFlags::DISARM)
        && state.floor.grid(to).is_known_trap()
    {
        return disarm_trap(state, to);
    } else if !can_enter && !can_kill_wall {
        return bump_into_terrain(state, to);
    }

    if can_kill_wall {
        destroy_terrain(state, to);
        state.floor.recalc |= RecalcFlags::FLOW;
        if state.player.is_dead {
            return MoveOutcome::Blocked;
        }
    }

    if push_past {
        let name = state.monster_name(m_idx);
        state.message(format!("You push past {name}."));
        if state.player.is_riding() {
            state.floor.swap_monsters(state.player.riding, m_idx);
        } else {
            state.floor.move_monster(m_idx, from);
        }
    }

    state.relocate_player(to);
    after_step(state, to, do_pickup, break_trap);
    if push_past {
        MoveOutcome::PushedPast(m_idx)
    } else {
        MoveOutcome::Moved
    }
}

/// Rangers, fliers and riders of forest creatures cross trees at full speed
fn tree_walker(state: &GameState) -> bool {
    let player = &state.player;
    if player.class == PlayerClass::Ranger || player.levitation {
        return true;
    }
    player.is_riding()
        && state.floor.monster_is_valid(player.riding)
        && state
            .races
            .get(state.floor.monster(player.riding).r_idx)
            .feature
            .intersects(FeatureFlags::PASS_TREE | FeatureFlags::CAN_FLY)
}

/// The player walked into terrain they cannot enter
///
/// Boundary walls block silently. Anything else makes a noise and is
/// remembered; bumping a closed door opens it when `easy_open` is set. The
/// attempt only costs a turn if the player was disoriented.
fn bump_into_terrain(state: &mut GameState, to: Pos2D) -> MoveOutcome {
    let grid = state.floor.grid(to);
    let perceived = grid.perceived();
    let seen = grid.is_mark() || state.player_can_see(to);
    if seen && state.options.easy_open && perceived.is_closed_door() {
        return easy_open_door(state, to);
    }

    if !state.player.is_disoriented() {
        state.player.energy_use = 0;
    }
    state.disturb();
    if perceived.has(TerrainFlags::BOUNDARY) {
        return MoveOutcome::Blocked;
    }
    let what = with_article(perceived.name());
    if seen {
        state.message(format!("There is {what} blocking your way."));
    } else {
        state.message(format!("You feel {what} blocking your way."));
        state.floor.grid_mut(to).info |= GridFlags::MARK;
    }
    state.sound(SoundHook::WallHit);
    MoveOutcome::Blocked
}

/// Aftermath of arriving on `pos`: traps and items
fn after_step(state: &mut GameState, pos: Pos2D, do_pickup: bool, break_trap: bool) {
    let grid = state.floor.grid(pos);
    if grid.has(TerrainFlags::TRAP) {
        let hidden = grid.mimic.is_some();
        state.disturb();
        if break_trap {
            state.message("You destroy the trap.");
            state.floor.set_feat(pos, TerrainKind::Floor);
        } else {
            if hidden {
                state.message("You found a trap!");
                state.floor.grid_mut(pos).mimic = None;
            }
            debug!("player triggers the trap at {pos:?}");
        }
    }

    let o_idxs = state.floor.items_at(pos).to_vec();
    for o_idx in o_idxs {
        let Some(item) = state.floor.item(o_idx) else {
            continue;
        };
        let stacks_with = state
            .player
            .quiver
            .iter()
            .position(|q| q.kind == item.kind && q.name == item.name);
        let wanted = do_pickup || state.options.always_pickup;
        if !(wanted && item.kind.is_ammo()) {
            let what = if item.number > 1 {
                format!("{} {}s", item.number, item.name)
            } else {
                with_article(&item.name)
            };
            state.message(format!("You see {what}."));
            continue;
        }
        let Some(item) = state.floor.take_item(o_idx) else {
            continue;
        };
        let total = match stacks_with {
            Some(slot) => {
                state.player.quiver[slot].number += item.number;
                state.player.quiver[slot].number
            }
            None => {
                let n = item.number;
                state.player.quiver.push(item.clone());
                n
            }
        };
        state.message(format!("You have {} ({total}).", item.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Floor;
    use crate::item::{ItemEntity, ItemKind};
    use crate::monster::{Allegiance, MonraceDefinition, MonsterEntity, RaceTable};
    use crate::GameRng;

    const ROOM: [&str; 6] = [
        "##########",
        "#........#",
        "#..#..T..#",
        "#..+.....#",
        "#..^.....#",
        "##########",
    ];

    fn state_at(pos: Pos2D) -> (GameState, usize) {
        let mut races = RaceTable::new();
        let r_idx = races.push(MonraceDefinition::new("cave orc", 'o', 7));
        let floor = Floor::from_ascii(&ROOM).unwrap();
        let player = Player::new(pos);
        (GameState::new(floor, player, races, GameRng::new(5)), r_idx)
    }

    fn place(state: &mut GameState, r_idx: usize, pos: Pos2D, allegiance: Allegiance) -> usize {
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, pos, 30).with_allegiance(allegiance))
            .unwrap();
        state.update_monsters();
        m
    }

    #[test]
    fn test_plain_step() {
        let (mut state, _) = state_at(Pos2D::new(1, 1));
        assert_eq!(exe_movement(&mut state, Direction::East, false, false), MoveOutcome::Moved);
        assert_eq!(state.player.pos, Pos2D::new(1, 2));
        assert_eq!(state.player.energy_use, ENERGY_TURN);
    }

    #[test]
    fn test_wall_killer_moves_through_wall_in_one_action() {
        let (mut state, _) = state_at(Pos2D::new(2, 2));
        state.player.kill_wall = true;
        state.floor.recalc = RecalcFlags::empty();
        let outcome = exe_movement(&mut state, Direction::East, false, false);
        assert_eq!(outcome, MoveOutcome::Moved);
        assert_eq!(state.player.pos, Pos2D::new(2, 3));
        assert_eq!(state.floor.grid(Pos2D::new(2, 3)).feat, TerrainKind::Floor);
        assert!(state.floor.recalc.contains(RecalcFlags::FLOW));
        assert_eq!(state.player.energy_use, ENERGY_TURN);
    }

    #[test]
    fn test_hostile_monster_blocks_and_costs_one_turn() {
        let (mut state, r_idx) = state_at(Pos2D::new(1, 1));
        let m = place(&mut state, r_idx, Pos2D::new(1, 2), Allegiance::Hostile);
        let outcome = exe_movement(&mut state, Direction::East, false, false);
        assert_eq!(outcome, MoveOutcome::Attacked(m));
        assert_eq!(state.player.pos, Pos2D::new(1, 1));
        assert_eq!(state.player.energy_use, ENERGY_TURN);
    }

    #[test]
    fn test_push_past_friendly_monster() {
        let (mut state, r_idx) = state_at(Pos2D::new(1, 1));
        let m = place(&mut state, r_idx, Pos2D::new(1, 2), Allegiance::Pet);
        let outcome = exe_movement(&mut state, Direction::East, false, false);
        assert_eq!(outcome, MoveOutcome::PushedPast(m));
        assert_eq!(state.player.pos, Pos2D::new(1, 2));
        assert_eq!(state.floor.monster(m).pos, Pos2D::new(1, 1));
        assert_eq!(state.floor.grid(Pos2D::new(1, 1)).m_idx, m);
    }

    #[test]
    fn test_berserker_sometimes_hits_a_friend_in_the_way() {
        for (draw, attacks) in [(666, true), (665, false)] {
            let (mut state, r_idx) = state_at(Pos2D::new(1, 1));
            state.player.class = PlayerClass::Berserker;
            let m = place(&mut state, r_idx, Pos2D::new(1, 2), Allegiance::Pet);
            state.rng = GameRng::scripted(vec![draw]);
            let outcome = exe_movement(&mut state, Direction::East, false, false);
            if attacks {
                assert_eq!(outcome, MoveOutcome::Attacked(m));
                assert_eq!(state.player.pos, Pos2D::new(1, 1));
            } else {
                assert_eq!(outcome, MoveOutcome::PushedPast(m));
            }
        }
    }

    #[test]
    fn test_rooted_friend_is_in_the_way() {
        let (mut state, r_idx) = state_at(Pos2D::new(1, 1));
        state.races.get_mut(r_idx).unwrap().behavior |= BehaviorFlags::NEVER_MOVE;
        place(&mut state, r_idx, Pos2D::new(1, 2), Allegiance::Friendly);
        let outcome = exe_movement(&mut state, Direction::East, false, false);
        assert_eq!(outcome, MoveOutcome::Blocked);
        assert_eq!(state.player.pos, Pos2D::new(1, 1));
        assert!(state.messages.iter().any(|m| m.ends_with("is in your way!")));
        assert_eq!(state.player.energy_use, ENERGY_TURN);
    }

    #[test]
    fn test_bumping_walls() {
        let (mut state, _) = state_at(Pos2D::new(2, 2));
        state.player.cur_lite = 0;
        assert_eq!(exe_movement(&mut state, Direction::East, false, false), MoveOutcome::Blocked);
        assert_eq!(state.messages, vec!["You feel a granite wall blocking your way.".to_owned()]);
        assert_eq!(state.player.energy_use, 0);
        assert!(state.floor.grid(Pos2D::new(2, 3)).is_mark());

        state.clear_messages();
        state.player.timed.confused = 3;
        exe_movement(&mut state, Direction::East, false, false);
        assert_eq!(state.messages, vec!["There is a granite wall blocking your way.".to_owned()]);
        assert_eq!(state.player.energy_use, ENERGY_TURN);
    }

    #[test]
    fn test_boundary_blocks_silently() {
        let (mut state, _) = state_at(Pos2D::new(1, 1));
        assert_eq!(exe_movement(&mut state, Direction::North, false, false), MoveOutcome::Blocked);
        assert!(state.messages.is_empty());
        assert!(state.sounds.is_empty());
        assert_eq!(state.player.energy_use, 0);
    }

    #[test]
    fn test_bump_opens_door() {
        let (mut state, _) = state_at(Pos2D::new(3, 2));
        let outcome = exe_movement(&mut state, Direction::East, false, false);
        assert_eq!(outcome, MoveOutcome::OpenedDoor);
        assert_eq!(state.floor.grid(Pos2D::new(3, 3)).feat, TerrainKind::OpenDoor);
        assert_eq!(state.player.pos, Pos2D::new(3, 2));
        assert_eq!(state.player.energy_use, ENERGY_TURN);
    }

    #[test]
    fn test_trees_slow_all_but_rangers() {
        let (mut state, _) = state_at(Pos2D::new(2, 5));
        exe_movement(&mut state, Direction::East, false, false);
        assert_eq!(state.player.energy_use, 2 * ENERGY_TURN);

        let (mut state, _) = state_at(Pos2D::new(2, 5));
        state.player.class = PlayerClass::Ranger;
        exe_movement(&mut state, Direction::East, false, false);
        assert_eq!(state.player.energy_use, ENERGY_TURN);
    }

    #[test]
    fn test_walking_into_known_trap_disarms() {
        let (mut state, _) = state_at(Pos2D::new(4, 2));
        state.rng = GameRng::scripted(vec![0]);
        let outcome = exe_movement(&mut state, Direction::East, false, false);
        assert_eq!(outcome, MoveOutcome::Disarm(true));
        assert_eq!(state.floor.grid(Pos2D::new(4, 3)).feat, TerrainKind::Floor);
        assert_eq!(state.player.pos, Pos2D::new(4, 2));
    }

    #[test]
    fn test_walking_onto_trap_without_disarm() {
        let (mut state, _) = state_at(Pos2D::new(4, 2));
        let outcome = exe_movement(&mut state, Direction::East, true, true);
        assert_eq!(outcome, MoveOutcome::Moved);
        assert_eq!(state.floor.grid(Pos2D::new(4, 3)).feat, TerrainKind::Floor);
    }

    #[test]
    fn test_wilderness_edge_changes_region() {
        let (mut state, _) = state_at(Pos2D::new(1, 4));
        state.floor.is_wilderness = true;
        let outcome = exe_movement(&mut state, Direction::North, false, false);
        assert_eq!(outcome, MoveOutcome::RegionChange);
        assert_eq!(state.player.pos, Pos2D::new(4, 4));
    }

    #[test]
    fn test_picks_up_matching_ammo() {
        let (mut state, _) = state_at(Pos2D::new(1, 1));
        state.player.quiver = vec![ItemEntity::new(ItemKind::Arrow, "arrow").with_number(5)];
        let arrows = ItemEntity::new(ItemKind::Arrow, "arrow").with_number(3);
        state.floor.place_item(arrows, Pos2D::new(1, 2)).unwrap();
        exe_movement(&mut state, Direction::East, true, false);
        assert_eq!(state.player.quiver[0].number, 8);
        assert!(state.floor.items_at(Pos2D::new(1, 2)).is_empty());
    }
}
