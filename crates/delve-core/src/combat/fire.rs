//! Firing missiles from a launcher, including the sniper's special shots

use log::{debug, warn};
use strum::{Display, EnumIter};

use crate::effect::{destroy_terrain, project, EffectSource, EffectType};
use crate::geometry::{ProjectFlags, ProjectionPath};
use crate::grid::{GridFlags, Pos2D, TerrainFlags, TerrainKind};
use crate::item::ItemEntity;
use crate::monster::{Allegiance, BehaviorFlags, ResistFlags};
use crate::player::{PlayerClass, Personality};
use crate::world::{RecalcFlags, RedrawFlags, SoundHook};
use crate::{GameState, BTH_PLUS_ADJ, MAX_RANGE, WEAPON_EXP_MASTER};

use super::critical::{critical_shot, fires_bolts};
use super::slay::calc_shot_damage_with_slay;

/// Special shots a sniper can line up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum SniperMode {
    #[default]
    None,
    /// Lights every grid along the flight
    Lite,
    /// Disarms traps along the flight
    KillTrap,
    Fire,
    /// Shatters the first breakable wall in the way
    KillWall,
    Cold,
    Elec,
    /// Keeps going through monsters while concentration lasts
    Pierce,
    /// Darkens grids along the flight; hurts good monsters
    Evilness,
    Holyness,
    /// Bursts at the impact point
    Explode,
    /// Two shots for one action
    Double,
    /// Knocks the target back along the line of fire
    Rush,
    /// Tiny damage, small chance of an instant kill
    Needle,
    Final,
}

/// What came of a fire command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    /// Nothing was fired and no time passed
    CannotFire,
    Fired {
        /// Monsters struck, in order
        hits: Vec<usize>,
        /// Where the last missile ended its flight
        landed: Pos2D,
    },
}

/// Launcher multiplier in hundredths, with extra might and strength
pub fn fire_multiplier(state: &GameState, bow: &ItemEntity) -> i32 {
    let mut tmul = bow.kind.launcher_multiplier();
    if state.player.xtra_might {
        tmul += 1;
    }
    tmul * (100 + state.player.str_td - 128)
}

/// Base to-hit chance of a missile
pub fn shot_chance(state: &GameState, bow: &ItemEntity, ammo: &ItemEntity) -> i32 {
    let player = &state.player;
    let bonus = player.to_h_b + ammo.to_h + bow.to_h;
    if fires_bolts(player) {
        player.skill_thb + (player.launcher_exp / 400 + bonus) * BTH_PLUS_ADJ
    } else {
        let exp = (player.launcher_exp - WEAPON_EXP_MASTER / 2) / 200;
        player.skill_thb + (exp + bonus) * BTH_PLUS_ADJ
    }
}

/// How far a shot with multiplier `tmul` can fly
pub fn shot_range(state: &GameState, tmul: i32) -> i32 {
    let mut tdis = 13 + tmul / 80;
    if fires_bolts(&state.player) && state.player.concent > 0 {
        tdis -= 5 - (state.player.concent + 1) / 2;
    }
    tdis.clamp(1, MAX_RANGE)
}

/// Does a missile strike monster `m_idx`?
///
/// Five percent of rolls always miss and five always hit; concentration
/// shifts the roll and thins the target's armour.
pub fn test_hit_fire(
    state: &mut GameState,
    chance: i32,
    m_idx: usize,
    visible: bool,
    ammo_name: &str,
) -> bool {
    let k = state.rng.randint1(100) + state.player.concent;
    if k <= 5 {
        return false;
    }
    if k > 95 {
        return true;
    }
    if state.player.personality == Personality::Lazy && state.rng.one_in(20) {
        return false;
    }
    if chance <= 0 {
        return false;
    }

    let m = state.floor.monster(m_idx);
    let race = state.races.get(m.r_idx);
    let cutter = race.behavior.contains(BehaviorFlags::ARROW_CUTTER) && !m.is_asleep();
    let mut ac = race.ac * (8 - state.player.concent) / 8;
    if cutter {
        ac *= 3;
    }
    let chance = if visible { chance } else { (chance + 1) / 2 };
    if state.rng.randint0(chance) < ac * 3 / 4 {
        if cutter {
            let msg = format!("{} cuts down {ammo_name}!", state.monster_name_cap(m_idx));
            state.message(msg);
        }
        return false;
    }
    true
}

/// Fire the missile stack in quiver slot `slot` at `target`
///
/// A double shot needs two missiles in the stack. Concentration is spent
/// by any shot, hit or miss.
pub fn exe_fire(
    state: &mut GameState,
    slot: usize,
    target: Pos2D,
    snipe: SniperMode,
) -> FireOutcome {
    let Some(bow) = state.player.launcher.clone().filter(|b| b.kind.is_launcher()) else {
        state.message("You have nothing to fire with.");
        return FireOutcome::CannotFire;
    };
    let Some(ammo) = state.player.quiver.get(slot) else {
        state.message("You have nothing to fire.");
        return FireOutcome::CannotFire;
    };
    if bow.kind.ammo() != Some(ammo.kind) {
        state.message("You cannot fire that with your launcher.");
        return FireOutcome::CannotFire;
    }
    let shots = if snipe == SniperMode::Double { 2 } else { 1 };
    if ammo.number < shots {
        state.message("You need two missiles for that.");
        return FireOutcome::CannotFire;
    }

    let mut hits = Vec::new();
    let mut landed = state.player.pos;
    for _ in 0..shots {
        let Some(missile) = take_missile(state, slot) else {
            break;
        };
        landed = fire_one(state, &bow, missile, target, snipe, &mut hits);
        if state.player.is_dead {
            break;
        }
    }

    state.player.energy_use = bow.kind.launcher_energy() / state.player.num_fire.max(1);
    if state.player.concent > 0 {
        state.player.concent = 0;
        state.set_redraw(RedrawFlags::STATUS);
    }
    FireOutcome::Fired { hits, landed }
}

fn take_missile(state: &mut GameState, slot: usize) -> Option<ItemEntity> {
    let stack = state.player.quiver.get_mut(slot)?;
    if stack.number <= 0 {
        return None;
    }
    let one = stack.split_one();
    if stack.number == 0 {
        state.player.quiver.remove(slot);
    }
    Some(one)
}

/// Side effects a sniper's shot leaves on each grid it crosses
fn sniper_trail(state: &mut GameState, pos: Pos2D, snipe: SniperMode) {
    match snipe {
        SniperMode::Lite => {
            state.floor.grid_mut(pos).info |= GridFlags::GLOW | GridFlags::MARK;
            state.set_redraw(RedrawFlags::MAP);
        }
        SniperMode::Evilness => {
            state.floor.grid_mut(pos).info.remove(GridFlags::GLOW | GridFlags::MARK);
            state.set_redraw(RedrawFlags::MAP);
        }
        SniperMode::KillTrap if state.floor.grid(pos).feat == TerrainKind::Trap => {
            if state.floor.grid(pos).is_mark() {
                state.message("The trap is destroyed.");
            }
            state.floor.set_feat(pos, TerrainKind::Floor);
        }
        _ => {}
    }
}

/// Fly one missile; returns where it came to rest
fn fire_one(
    state: &mut GameState,
    bow: &ItemEntity,
    missile: ItemEntity,
    target: Pos2D,
    snipe: SniperMode,
    hits: &mut Vec<usize>,
) -> Pos2D {
    let tmul = fire_multiplier(state, bow);
    let chance = shot_chance(state, bow, &missile);
    let tdam_base = (state.rng.dice(missile.dd, missile.ds) + missile.to_d + bow.to_d) * tmul / 100;
    let tdis = shot_range(state, tmul);
    state.sound(SoundHook::Shoot);

    let origin = state.player.pos;
    let path = ProjectionPath::new(&state.floor, tdis, origin, origin, target, ProjectFlags::PATH);
    let mut landed = origin;
    let mut hit_body = false;
    let mut stuck_in = None;

    for (step, pos) in path.iter().enumerate() {
        let cur_dis = step as i32 + 1;
        let grid = state.floor.grid(pos);
        if snipe == SniperMode::KillWall
            && !grid.has_monster()
            && grid.has(TerrainFlags::TUNNEL)
            && !grid.has(TerrainFlags::PERMANENT)
        {
            if grid.is_mark() {
                state.message("Wall rocks were shattered.");
            }
            state.floor.grid_mut(pos).info.remove(GridFlags::MARK);
            destroy_terrain(state, pos);
            state.floor.recalc |= RecalcFlags::FLOW;
            hit_body = true;
            break;
        }
        if !grid.is_projectable() && !grid.has_monster() {
            state.sound(SoundHook::WallHit);
            break;
        }
        landed = pos;
        sniper_trail(state, pos, snipe);

        let m_idx = state.floor.grid(pos).m_idx;
        if m_idx == 0 || m_idx == state.player.riding {
            continue;
        }
        hit_body = true;
        let visible = state.floor.monster(m_idx).ml;
        if !test_hit_fire(state, chance - cur_dis, m_idx, visible, &missile.name) {
            break;
        }
        hits.push(m_idx);
        let alive = resolve_hit(state, bow, &missile, tdam_base, m_idx, pos, snipe);
        if alive && snipe == SniperMode::Rush {
            rush(state, m_idx, origin, target, tdis);
        }
        if alive && missile.is_fixed_artifact && state.player.concent == 0 {
            stuck_in = Some(m_idx);
        }
        if snipe == SniperMode::Pierce && state.player.concent > 0 {
            state.player.concent -= 1;
            continue;
        }
        break;
    }

    settle_missile(state, missile, landed, hit_body, stuck_in, snipe);
    landed
}

/// Damage monsters that shrug off nearly everything take
fn mon_damage_mod(state: &mut GameState, m_idx: usize, dam: i32) -> i32 {
    let race = state.races.get(state.floor.monster(m_idx).r_idx);
    if race.resist.contains(ResistFlags::RES_ALL) && dam > 0 {
        let dam = dam / 100;
        if dam == 0 && state.rng.one_in(3) {
            return 1;
        }
        return dam;
    }
    dam
}

/// Apply a landed missile; returns whether the target survived
fn resolve_hit(
    state: &mut GameState,
    bow: &ItemEntity,
    missile: &ItemEntity,
    tdam_base: i32,
    m_idx: usize,
    pos: Pos2D,
    snipe: SniperMode,
) -> bool {
    let seen = state.floor.monster(m_idx).ml;
    let r_idx = state.floor.monster(m_idx).r_idx;

    let tdam = if snipe == SniperMode::Needle {
        let race = state.races.get(r_idx);
        let (level, unique) = (race.level, race.is_unique());
        let warded = race.resist.contains(ResistFlags::NO_INSTA_DEATH);
        let concent = state.player.concent;
        let spread = state.rng.randint1(level / (3 + concent));
        if state.rng.randint1(spread + 8 - concent) == 1 && !unique && !warded {
            if seen {
                let msg =
                    format!("The needle pierces a vital spot of {}!", state.monster_name(m_idx));
                state.message(msg);
            }
            state.floor.monster(m_idx).hp + 1
        } else {
            if warded && state.is_original_ap_and_seen(m_idx) {
                if let Some(race) = state.races.get_mut(r_idx) {
                    race.lore.resists |= ResistFlags::NO_INSTA_DEATH;
                }
            }
            1
        }
    } else {
        let dam = calc_shot_damage_with_slay(state, bow, missile, tdam_base, m_idx, snipe);
        let dam = critical_shot(state, missile.weight, missile.to_h, bow.to_h, dam);
        mon_damage_mod(state, m_idx, dam)
    };

    if snipe == SniperMode::Explode {
        let rad = (state.player.concent + 1) / 2 + 1;
        let flags =
            ProjectFlags::JUMP | ProjectFlags::GRID | ProjectFlags::ITEM | ProjectFlags::KILL;
        project(state, EffectSource::Player, rad, pos, tdam, EffectType::Missile, flags);
        return state.floor.monster_is_valid(m_idx);
    }

    let msg = if seen {
        format!("The {} hits {}.", missile.name, state.monster_name(m_idx))
    } else {
        format!("The {} finds a mark.", missile.name)
    };
    state.message(msg);

    let angered = match state.floor.monster_mut(m_idx) {
        Some(m) => {
            m.timed.sleep = 0;
            let was_ally = !m.is_hostile();
            m.allegiance = Allegiance::Hostile;
            was_ally
        }
        None => false,
    };
    if angered && seen {
        let msg = format!("{} gets angry!", state.monster_name_cap(m_idx));
        state.message(msg);
    }
    debug!("missile hits monster {m_idx} for {tdam}");
    !state.damage_monster(m_idx, tdam, true)
}

/// Knock a monster further along the line of fire
fn rush(state: &mut GameState, m_idx: usize, origin: Pos2D, target: Pos2D, tdis: i32) {
    let flags = ProjectFlags::PATH | ProjectFlags::THRU;
    let line = ProjectionPath::new(&state.floor, tdis, origin, origin, target, flags);
    let at = state.floor.monster(m_idx).pos;
    let Some(start) = line.positions().iter().position(|&p| p == at) else {
        return;
    };
    let mut pushes = state.rng.randint1(5) + 3;
    for &next in &line.positions()[start + 1..] {
        if pushes == 0 || next == state.player.pos || !state.floor.is_empty_floor(next) {
            break;
        }
        state.floor.move_monster(m_idx, next);
        state.update_monster(m_idx);
        pushes -= 1;
    }
    state.set_redraw(RedrawFlags::MAP);
}

/// Percent chance a missile that struck something breaks
fn breakage_chance(state: &GameState, missile: &ItemEntity, snipe: SniperMode) -> i32 {
    if matches!(snipe, SniperMode::Explode | SniperMode::KillWall | SniperMode::Final) {
        return 100;
    }
    let base = missile.kind.breakage_chance();
    if state.player.class != PlayerClass::Archer || !missile.kind.is_ammo() {
        return base;
    }
    let bonus = (state.player.lev - 1) / 7 + 4;
    let reduced = if missile.kind == crate::item::ItemKind::Arrow {
        base - bonus * 2
    } else {
        base - bonus
    };
    reduced.max(0)
}

/// Leave the missile stuck in its target, broken, or on the floor
fn settle_missile(
    state: &mut GameState,
    missile: ItemEntity,
    landed: Pos2D,
    hit_body: bool,
    stuck_in: Option<usize>,
    snipe: SniperMode,
) {
    if let Some(m_idx) = stuck_in.filter(|&m| state.floor.monster_is_valid(m)) {
        let msg = format!("The {} sticks into {}!", missile.name, state.monster_name(m_idx));
        state.message(msg);
        if let Err(e) = state.floor.give_item(missile, m_idx) {
            warn!("stuck missile lost: {e}");
        }
        return;
    }
    let chance = if hit_body { breakage_chance(state, &missile, snipe) } else { 0 };
    if state.rng.randint0(100) < chance {
        debug!("missile breaks at {landed:?}");
        return;
    }
    if !state.floor.grid(landed).has(TerrainFlags::MOVE) {
        debug!("missile lost at {landed:?}");
        return;
    }
    if let Err(e) = state.floor.place_item(missile, landed) {
        warn!("missile dropped: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Floor;
    use crate::item::ItemKind;
    use crate::monster::{MonraceDefinition, MonsterEntity, RaceTable};
    use crate::player::Player;
    use crate::GameRng;

    const RANGE: [&str; 5] = [
        "############",
        "#..........#",
        "#.......#..#",
        "#..........#",
        "############",
    ];

    fn archer_state() -> (GameState, usize) {
        let mut races = RaceTable::new();
        let r_idx = races.push(MonraceDefinition::new("training dummy", 'd', 5));
        let floor = Floor::from_ascii(&RANGE).unwrap();
        let mut player = Player::new(Pos2D::new(1, 1));
        player.skill_thb = 200;
        player.launcher = Some(ItemEntity::new(ItemKind::LongBow, "long bow"));
        player.quiver =
            vec![ItemEntity::new(ItemKind::Arrow, "arrow").with_dice(1, 4).with_number(12)];
        (GameState::new(floor, player, races, GameRng::new(9)), r_idx)
    }

    #[test]
    fn test_cannot_fire_without_launcher() {
        let (mut state, _) = archer_state();
        state.player.launcher = None;
        assert_eq!(
            exe_fire(&mut state, 0, Pos2D::new(1, 5), SniperMode::None),
            FireOutcome::CannotFire
        );
        assert_eq!(state.player.quiver[0].number, 12);
    }

    #[test]
    fn test_double_shot_needs_two_missiles() {
        let (mut state, _) = archer_state();
        state.player.quiver[0].number = 1;
        let outcome = exe_fire(&mut state, 0, Pos2D::new(1, 5), SniperMode::Double);
        assert_eq!(outcome, FireOutcome::CannotFire);
        assert_eq!(state.player.quiver[0].number, 1);
    }

    #[test]
    fn test_missile_lands_on_empty_target() {
        let (mut state, _) = archer_state();
        state.player.concent = 2;
        let target = Pos2D::new(1, 6);
        let outcome = exe_fire(&mut state, 0, target, SniperMode::None);
        assert_eq!(outcome, FireOutcome::Fired { hits: vec![], landed: target });
        assert_eq!(state.floor.items_at(target).len(), 1);
        assert_eq!(state.player.quiver[0].number, 11);
        assert_eq!(state.player.energy_use, 100);
        assert_eq!(state.player.concent, 0);
    }

    #[test]
    fn test_volley_wounds_target() {
        let (mut state, r_idx) = archer_state();
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(1, 5), 10_000))
            .unwrap();
        let mut landed = 0;
        for _ in 0..10 {
            let outcome = exe_fire(&mut state, 0, Pos2D::new(1, 5), SniperMode::None);
            if let FireOutcome::Fired { hits, .. } = outcome {
                landed += hits.len();
            }
        }
        assert!(landed > 0);
        assert!(state.floor.monster(m).hp < 10_000);
        assert_eq!(state.player.quiver[0].number, 2);
    }

    #[test]
    fn test_kill_wall_shot_breaks_rock() {
        let (mut state, _) = archer_state();
        state.player.pos = Pos2D::new(2, 5);
        state.floor.recalc = RecalcFlags::empty();
        exe_fire(&mut state, 0, Pos2D::new(2, 10), SniperMode::KillWall);
        assert_eq!(state.floor.grid(Pos2D::new(2, 8)).feat, TerrainKind::Floor);
        assert!(state.floor.recalc.contains(RecalcFlags::FLOW));
    }

    #[test]
    fn test_range_grows_with_multiplier() {
        let (state, _) = archer_state();
        assert_eq!(shot_range(&state, 300), 16);
        assert_eq!(shot_range(&state, 2000), MAX_RANGE);
    }
}
