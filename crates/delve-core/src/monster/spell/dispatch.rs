//! Carrying out a chosen monster spell

use log::{debug, trace};

use crate::effect::{project, EffectSource, EffectType, ProjectResult};
use crate::geometry::{los, ProjectFlags};
use crate::grid::{GridFlags, Pos2D, TerrainKind};
use crate::item::ItemKind;
use crate::monster::{
    teleport_away, teleport_monster_to, teleport_player, teleport_player_to, ResistFlags,
    SpecialAbility,
};
use crate::player::PlayerResist;
use crate::world::{RecalcFlags, RedrawFlags, SoundHook};
use crate::{GameState, ENERGY_TURN, MAX_SIGHT};

use super::judgement::{check_melee_spell_set, choose_attack_spell};
use super::summon::{summon_for_ability, summon_specific, SummonKind};
use super::{spell_damage, MonsterAbility, SpellShape};

use MonsterAbility as A;

/// Who a spell is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellTarget {
    Player,
    Monster(usize),
}

impl SpellTarget {
    fn pos(self, state: &GameState) -> Option<Pos2D> {
        match self {
            SpellTarget::Player => Some(state.player.pos),
            SpellTarget::Monster(t) if state.floor.monster_is_valid(t) => {
                Some(state.floor.monster(t).pos)
            }
            SpellTarget::Monster(_) => None,
        }
    }

    fn hp(self, state: &GameState) -> i32 {
        match self {
            SpellTarget::Player => state.player.chp,
            SpellTarget::Monster(t) => state.floor.monster(t).hp,
        }
    }
}

/// Single-target missile that stops at the first creature in line
pub fn bolt(
    state: &mut GameState,
    m_idx: usize,
    to: Pos2D,
    typ: EffectType,
    dam: i32,
) -> ProjectResult {
    let flags = ProjectFlags::STOP | ProjectFlags::KILL | ProjectFlags::PLAYER;
    project(state, EffectSource::Monster(m_idx), 0, to, dam, typ, flags)
}

/// Line that hits everything along its path
pub fn beam(
    state: &mut GameState,
    m_idx: usize,
    to: Pos2D,
    typ: EffectType,
    dam: i32,
) -> ProjectResult {
    let flags = ProjectFlags::BEAM | ProjectFlags::KILL | ProjectFlags::THRU | ProjectFlags::PLAYER;
    project(state, EffectSource::Monster(m_idx), 0, to, dam, typ, flags)
}

/// Ball exploding where the projection ends
pub fn ball(
    state: &mut GameState,
    m_idx: usize,
    to: Pos2D,
    typ: EffectType,
    dam: i32,
    rad: i32,
) -> ProjectResult {
    let flags = ProjectFlags::KILL | ProjectFlags::GRID | ProjectFlags::ITEM | ProjectFlags::PLAYER;
    project(state, EffectSource::Monster(m_idx), rad, to, dam, typ, flags)
}

/// Cone widening from the breather toward `to`
pub fn breath(
    state: &mut GameState,
    m_idx: usize,
    to: Pos2D,
    typ: EffectType,
    dam: i32,
    rad: i32,
) -> ProjectResult {
    let flags = ProjectFlags::BREATH
        | ProjectFlags::KILL
        | ProjectFlags::GRID
        | ProjectFlags::ITEM
        | ProjectFlags::PLAYER;
    project(state, EffectSource::Monster(m_idx), rad, to, dam, typ, flags)
}

/// Missile that explodes at the first creature it meets
pub fn rocket(state: &mut GameState, m_idx: usize, to: Pos2D, dam: i32) -> ProjectResult {
    let flags = ProjectFlags::STOP | ProjectFlags::KILL | ProjectFlags::PLAYER;
    project(state, EffectSource::Monster(m_idx), 2, to, dam, EffectType::Rocket, flags)
}

/// Effect landing on the target directly
pub fn pointed(
    state: &mut GameState,
    m_idx: usize,
    to: Pos2D,
    typ: EffectType,
    dam: i32,
) -> ProjectResult {
    let flags =
        ProjectFlags::JUMP | ProjectFlags::AIMED | ProjectFlags::KILL | ProjectFlags::PLAYER;
    project(state, EffectSource::Monster(m_idx), 0, to, dam, typ, flags)
}

/// Abilities whose message names the target
fn names_target(ability: MonsterAbility) -> bool {
    ability.effect().is_some()
        || matches!(ability, A::TeleTo | A::TeleAway | A::TeleLevel | A::Dispel | A::Special)
}

fn announce(state: &mut GameState, m_idx: usize, ability: MonsterAbility, target: SpellTarget) {
    let seen = state.floor.monster(m_idx).ml;
    let caster = state.monster_name_cap(m_idx);
    let verb = ability.verb();
    let msg = match target {
        SpellTarget::Player if seen => format!("{caster} {verb}."),
        SpellTarget::Player if ability.is_breath() => "You hear a roar.".to_owned(),
        SpellTarget::Player => "Something mumbles.".to_owned(),
        SpellTarget::Monster(t) => {
            if !seen && !state.floor.monster(t).ml {
                return;
            }
            if names_target(ability) {
                format!("{caster} {verb} at {}.", state.monster_name(t))
            } else {
                format!("{caster} {verb}.")
            }
        }
    };
    state.message(msg);
}

/// The player learns what a visible caster can do
fn remember_cast(state: &mut GameState, m_idx: usize, ability: MonsterAbility) {
    if !state.is_original_ap_and_seen(m_idx) {
        return;
    }
    let r_idx = state.floor.monster(m_idx).r_idx;
    if let Some(race) = state.races.get_mut(r_idx) {
        race.lore.abilities.set(ability);
        race.lore.cast_spell = race.lore.cast_spell.saturating_add(1);
    }
}

/// Cast `ability` at `target`
///
/// Returns false if the caster or target is gone and nothing happened.
pub fn cast_ability(
    state: &mut GameState,
    m_idx: usize,
    ability: MonsterAbility,
    target: SpellTarget,
) -> bool {
    if !state.floor.monster_is_valid(m_idx) {
        return false;
    }
    let Some(to) = target.pos(state) else {
        return false;
    };
    trace!("monster {m_idx} casts {ability} at {target:?}");
    announce(state, m_idx, ability, target);
    remember_cast(state, m_idx, ability);

    if ability == A::DrainMana {
        drain_mana(state, m_idx, target);
        return true;
    }
    if let Some((typ, shape)) = ability.effect() {
        let target_hp = target.hp(state);
        let m = state.floor.monster(m_idx);
        let race = state.races.get(m.r_idx);
        let dam = spell_damage(ability, m, race, target_hp, &mut state.rng);
        let breath_rad = if race.is_powerful() { 3 } else { 2 };
        if ability == A::Shoot {
            state.sound(SoundHook::Shoot);
        }
        match shape {
            SpellShape::Bolt => bolt(state, m_idx, to, typ, dam),
            SpellShape::Beam => beam(state, m_idx, to, typ, dam),
            SpellShape::Ball(rad) => ball(state, m_idx, to, typ, dam, rad),
            SpellShape::Breath => breath(state, m_idx, to, typ, dam, breath_rad),
            SpellShape::Rocket => rocket(state, m_idx, to, dam),
            SpellShape::Pointed => pointed(state, m_idx, to, typ, dam),
        };
        return true;
    }

    let caster_pos = state.floor.monster(m_idx).pos;
    match ability {
        A::Shriek => aggravate(state, m_idx),
        A::Haste => haste_self(state, m_idx),
        A::Heal => heal_self(state, m_idx),
        A::Invulner => {
            let turns = (state.rng.randint1(4) + 4) as i16;
            if let Some(m) = state.floor.monster_mut(m_idx) {
                if m.timed.invuln == 0 {
                    m.timed.invuln = turns;
                }
            }
        }
        A::Blink => {
            teleport_away(state, m_idx, 10);
        }
        A::Tport => {
            teleport_away(state, m_idx, MAX_SIGHT * 2 + 5);
        }
        A::World => {
            if let Some(m) = state.floor.monster_mut(m_idx) {
                m.energy_need -= (ENERGY_TURN * 2) as i16;
            }
        }
        A::TeleTo => {
            match target {
                SpellTarget::Player => teleport_player_to(state, caster_pos),
                SpellTarget::Monster(t) => teleport_monster_to(state, t, caster_pos),
            };
        }
        A::TeleAway => {
            match target {
                SpellTarget::Player => teleport_player(state, 100),
                SpellTarget::Monster(t) => teleport_away(state, t, MAX_SIGHT * 2 + 5),
            };
        }
        A::TeleLevel => tele_level(state, target),
        A::Darkness => darken_area(state, to, target),
        A::Traps => create_traps(state, to),
        A::Forget => forget(state),
        A::Dispel => dispel(state, target),
        A::RaiseDead => {
            raise_dead(state, m_idx);
        }
        A::Special => special(state, m_idx, target, to),
        a if a.is_summon() => {
            let arrived = summon_for_ability(state, m_idx, to, a);
            debug!("{arrived} creatures answer monster {m_idx}");
        }
        _ => {}
    }
    true
}

fn drain_mana(state: &mut GameState, m_idx: usize, target: SpellTarget) {
    let rlev = state.races.get(state.floor.monster(m_idx).r_idx).level.max(1);
    let r = state.rng.randint1(rlev) / 2 + 1;
    let drained = match target {
        SpellTarget::Player => {
            if state.player.csp <= 0 {
                return;
            }
            let drained = r.min(state.player.csp);
            state.player.csp -= drained;
            state.message("Your psychic energy is drained!");
            state.set_redraw(RedrawFlags::MANA);
            drained
        }
        SpellTarget::Monster(t) => {
            let t_race = state.races.get(state.floor.monster(t).r_idx);
            if !t_race.abilities.has_any(|a| !a.is_innate()) {
                return;
            }
            r
        }
    };
    heal_by(state, m_idx, drained * 6);
}

fn heal_by(state: &mut GameState, m_idx: usize, amount: i32) {
    let Some(m) = state.floor.monster_mut(m_idx) else {
        return;
    };
    m.hp = (m.hp + amount).min(m.maxhp);
    let full = m.hp == m.maxhp;
    let was_afraid = m.timed.monfear > 0;
    m.timed.monfear = 0;
    if !state.floor.monster(m_idx).ml {
        return;
    }
    let name = state.monster_name_cap(m_idx);
    if full {
        state.message(format!("{name} looks completely healed!"));
    } else {
        state.message(format!("{name} looks healthier."));
    }
    if was_afraid {
        state.message(format!("{name} recovers its courage."));
    }
    state.set_redraw(RedrawFlags::HEALTH);
}

fn heal_self(state: &mut GameState, m_idx: usize) {
    let rlev = state.races.get(state.floor.monster(m_idx).r_idx).level.max(1);
    heal_by(state, m_idx, rlev * 6);
}

fn haste_self(state: &mut GameState, m_idx: usize) {
    let Some(m) = state.floor.monster_mut(m_idx) else {
        return;
    };
    let was_fast = m.is_accelerated();
    m.timed.fast = m.timed.fast.saturating_add(100);
    if !was_fast && state.floor.monster(m_idx).ml {
        let name = state.monster_name_cap(m_idx);
        state.message(format!("{name} starts moving faster."));
    }
}

/// Wake everything within earshot of the shrieker
fn aggravate(state: &mut GameState, m_idx: usize) {
    let from = state.floor.monster(m_idx).pos;
    for i in state.floor.monster_indices() {
        if i == m_idx || from.distance(state.floor.monster(i).pos) > MAX_SIGHT * 2 {
            continue;
        }
        if let Some(m) = state.floor.monster_mut(i) {
            m.timed.sleep = 0;
        }
    }
    state.disturb();
}

fn tele_level(state: &mut GameState, target: SpellTarget) {
    match target {
        SpellTarget::Player => {
            if state.player.resist.contains(PlayerResist::NEXUS)
                || state.rng.randint0(100) < state.player.skill_sav
            {
                state.message("You resist the effects!");
                return;
            }
            state.message("You sink through the floor.");
            state.player.leaving = true;
            state.disturb();
        }
        SpellTarget::Monster(t) => {
            let seen = state.floor.monster(t).ml;
            let name = state.monster_name_cap(t);
            let race = state.races.get(state.floor.monster(t).r_idx);
            let resists = race.resist.contains(ResistFlags::RES_TELEPORT)
                || (race.is_unique() && state.rng.randint0(100) < race.level);
            if resists || t == state.player.riding {
                if seen {
                    state.message(format!("{name} is unaffected!"));
                }
                return;
            }
            if seen {
                state.message(format!("{name} disappears!"));
            }
            let r_idx = state.floor.monster(t).r_idx;
            if let Some(race) = state.races.get_mut(r_idx) {
                race.cur_num = race.cur_num.saturating_sub(1);
            }
            state.floor.delete_monster(t);
            state.set_redraw(RedrawFlags::MAP);
        }
    }
}

/// Unlight the area around `center`
fn darken_area(state: &mut GameState, center: Pos2D, target: SpellTarget) {
    let floor = &mut state.floor;
    for y in center.y - 3..=center.y + 3 {
        for x in center.x - 3..=center.x + 3 {
            let pos = Pos2D::new(y, x);
            if !floor.contains(pos) || center.distance(pos) > 3 || !los(floor, center, pos) {
                continue;
            }
            floor.grid_mut(pos).info.remove(GridFlags::GLOW | GridFlags::MARK);
        }
    }
    floor.recalc |= RecalcFlags::VIEW | RecalcFlags::MONSTER_LITE;
    state.set_redraw(RedrawFlags::MAP);

    if target == SpellTarget::Player && !state.player.resist.contains(PlayerResist::DARK) {
        let turns = (3 + state.rng.randint1(5)) as i16;
        if state.player.timed.blind == 0 {
            state.message("You are blind!");
        }
        state.player.timed.blind += turns;
    }
}

/// Scatter traps on the empty floor around `center`
fn create_traps(state: &mut GameState, center: Pos2D) {
    for y in center.y - 1..=center.y + 1 {
        for x in center.x - 1..=center.x + 1 {
            let pos = Pos2D::new(y, x);
            if pos == state.player.pos || !state.floor.is_empty_floor(pos) {
                continue;
            }
            if state.floor.grid(pos).feat == TerrainKind::Floor
                && state.floor.items_at(pos).is_empty()
            {
                state.floor.set_feat(pos, TerrainKind::Trap);
            }
        }
    }
    state.set_redraw(RedrawFlags::MAP);
}

/// The player forgets the map
fn forget(state: &mut GameState) {
    if state.rng.randint0(100) < state.player.skill_sav {
        state.message("You resist the effects!");
        return;
    }
    state.message("Your memories fade away.");
    for pos in state.floor.positions() {
        state.floor.grid_mut(pos).info.remove(GridFlags::MARK);
    }
    state.set_redraw(RedrawFlags::MAP);
}

fn dispel(state: &mut GameState, target: SpellTarget) {
    match target {
        SpellTarget::Player => {
            state.player.dispel();
            state.set_redraw(RedrawFlags::STATUS);
        }
        SpellTarget::Monster(t) => {
            if let Some(m) = state.floor.monster_mut(t) {
                m.timed.fast = 0;
                m.timed.invuln = 0;
            }
            if t == state.player.riding {
                state.player.dispel();
                state.set_redraw(RedrawFlags::STATUS);
            }
        }
    }
}

/// Corpses in sight of the caster rise as undead; returns how many did
fn raise_dead(state: &mut GameState, m_idx: usize) -> i32 {
    let from = state.floor.monster(m_idx).pos;
    let mut raised = 0;
    for y in from.y - 5..=from.y + 5 {
        for x in from.x - 5..=from.x + 5 {
            let pos = Pos2D::new(y, x);
            if !state.floor.in_bounds(pos)
                || from.distance(pos) > 5
                || !los(&state.floor, from, pos)
            {
                continue;
            }
            let corpses: Vec<usize> = state
                .floor
                .items_at(pos)
                .iter()
                .copied()
                .filter(|&o| state.floor.item(o).is_some_and(|i| i.kind == ItemKind::Corpse))
                .collect();
            for o_idx in corpses {
                if summon_specific(state, m_idx, pos, SummonKind::Undead).is_some() {
                    state.floor.delete_item(o_idx);
                    raised += 1;
                }
            }
        }
    }
    raised
}

/// Hand-coded race abilities
fn special(state: &mut GameState, m_idx: usize, target: SpellTarget, to: Pos2D) {
    let r_idx = state.floor.monster(m_idx).r_idx;
    match state.races.get(r_idx).special {
        SpecialAbility::Grenadier => {
            let count = state.rng.randint1(3);
            for _ in 0..count {
                summon_specific(state, m_idx, to, SummonKind::Grenade);
            }
        }
        SpecialAbility::Bird => {
            let dam = state.rng.dice(4, 8);
            pointed(state, m_idx, to, EffectType::Missile, dam);
            if !state.floor.monster_is_valid(m_idx) {
                return;
            }
            let caster_pos = state.floor.monster(m_idx).pos;
            match target {
                SpellTarget::Player if !state.player.is_dead => {
                    state.message("You are snatched up and dropped!");
                    teleport_player_to(state, caster_pos);
                }
                SpellTarget::Monster(t) if state.floor.monster_is_valid(t) => {
                    teleport_monster_to(state, t, caster_pos);
                }
                _ => {}
            }
        }
        SpecialAbility::None => {}
    }
}

/// Does a non-innate spell fizzle?
fn spell_fails(state: &mut GameState, m_idx: usize, ability: MonsterAbility) -> bool {
    let m = state.floor.monster(m_idx);
    let race = state.races.get(m.r_idx);
    if ability.is_innate() || race.is_stupid() {
        return false;
    }
    let mut failrate = 25 - (race.level + 3) / 4;
    if m.is_stunned() {
        failrate += 20;
    }
    state.rng.randint0(100) < failrate
}

fn report_failure(state: &mut GameState, m_idx: usize) {
    if state.floor.monster(m_idx).ml {
        let name = state.monster_name_cap(m_idx);
        state.message(format!("{name} tries to cast a spell, but fails."));
    }
}

/// A hostile monster tries a spell on the player; true if it used its turn
pub fn make_attack_spell(state: &mut GameState, m_idx: usize) -> bool {
    let Some(ability) = choose_attack_spell(state, m_idx) else {
        return false;
    };
    state.disturb();
    if spell_fails(state, m_idx, ability) {
        report_failure(state, m_idx);
        return true;
    }
    cast_ability(state, m_idx, ability, SpellTarget::Player);
    if state.floor.monster_is_valid(m_idx) {
        let r_idx = state.floor.monster(m_idx).r_idx;
        debug!("{} casts {ability} at the player", state.races.get(r_idx).name);
    }
    true
}

/// A monster tries a spell on another monster; true if it used its turn
pub fn monst_spell_monst(state: &mut GameState, m_idx: usize) -> bool {
    let Some((ability, t_idx)) = check_melee_spell_set(state, m_idx) else {
        return false;
    };
    if spell_fails(state, m_idx, ability) {
        report_failure(state, m_idx);
        return true;
    }
    cast_ability(state, m_idx, ability, SpellTarget::Monster(t_idx));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Floor;
    use crate::item::ItemEntity;
    use crate::monster::{Allegiance, AbilitySet, MonraceDefinition, MonsterEntity, RaceTable};
    use crate::player::Player;
    use crate::GameRng;

    const ROOM: [&str; 7] = [
        "##############",
        "#............#",
        "#............#",
        "#............#",
        "#............#",
        "#............#",
        "##############",
    ];

    fn setup(race: MonraceDefinition, player: Pos2D) -> (GameState, usize) {
        let mut races = RaceTable::new();
        let r_idx = races.push(race);
        let floor = Floor::from_ascii(&ROOM).unwrap();
        let state = GameState::new(floor, Player::new(player), races, GameRng::new(3));
        (state, r_idx)
    }

    fn caster(abilities: &[MonsterAbility]) -> MonraceDefinition {
        let mut race = MonraceDefinition::new("orc shaman", 'o', 8);
        race.abilities = AbilitySet::from_slice(abilities);
        race
    }

    #[test]
    fn test_bolt_hits_player() {
        let (mut state, r_idx) = setup(caster(&[A::BoFire]), Pos2D::new(3, 2));
        state.player.chp = 500;
        state.player.mhp = 500;
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(3, 8), 30))
            .unwrap();
        assert!(cast_ability(&mut state, m, A::BoFire, SpellTarget::Player));
        assert!(state.player.chp < 500);
    }

    #[test]
    fn test_breath_hurts_monster_target() {
        let (mut state, r_idx) = setup(caster(&[A::BrCold]), Pos2D::new(1, 1));
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(3, 3), 300))
            .unwrap();
        let t = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(3, 8), 500))
            .unwrap();
        assert!(cast_ability(&mut state, m, A::BrCold, SpellTarget::Monster(t)));
        // hp / 3 on the axis
        assert_eq!(state.floor.monster(t).hp, 400);
    }

    #[test]
    fn test_heal_restores_and_calms() {
        let (mut state, r_idx) = setup(caster(&[A::Heal]), Pos2D::new(1, 1));
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(3, 3), 100))
            .unwrap();
        let mon = state.floor.monster_mut(m).unwrap();
        mon.hp = 10;
        mon.timed.monfear = 5;
        cast_ability(&mut state, m, A::Heal, SpellTarget::Monster(m));
        assert_eq!(state.floor.monster(m).hp, 58);
        assert_eq!(state.floor.monster(m).timed.monfear, 0);
    }

    #[test]
    fn test_dispel_strips_speed() {
        let (mut state, r_idx) = setup(caster(&[A::Dispel]), Pos2D::new(1, 1));
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(3, 3), 100))
            .unwrap();
        let t = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(3, 6), 100))
            .unwrap();
        state.floor.monster_mut(t).unwrap().timed.fast = 20;
        cast_ability(&mut state, m, A::Dispel, SpellTarget::Monster(t));
        assert!(!state.floor.monster(t).is_accelerated());
    }

    #[test]
    fn test_tele_level_removes_monster() {
        let (mut state, r_idx) = setup(caster(&[A::TeleLevel]), Pos2D::new(1, 1));
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(3, 3), 100))
            .unwrap();
        let t = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(3, 6), 100))
            .unwrap();
        cast_ability(&mut state, m, A::TeleLevel, SpellTarget::Monster(t));
        assert!(!state.floor.monster_is_valid(t));
    }

    #[test]
    fn test_raise_dead_consumes_corpse() {
        let mut undead = MonraceDefinition::new("zombified orc", 'z', 5);
        undead.kind = crate::monster::KindFlags::UNDEAD;
        let (mut state, r_idx) = setup(caster(&[A::RaiseDead]), Pos2D::new(1, 1));
        state.races.push(undead);
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(3, 3), 100))
            .unwrap();
        let corpse = state
            .floor
            .place_item(ItemEntity::new(ItemKind::Corpse, "orc corpse"), Pos2D::new(3, 6))
            .unwrap();
        assert_eq!(raise_dead(&mut state, m), 1);
        assert!(state.floor.item(corpse).is_none());
        assert_eq!(state.floor.monster_indices().len(), 2);
    }

    #[test]
    fn test_stupid_caster_never_fails() {
        let mut race = caster(&[A::BoFire]);
        race.behavior |= crate::monster::BehaviorFlags::STUPID;
        let (mut state, r_idx) = setup(race, Pos2D::new(1, 1));
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(3, 3), 100))
            .unwrap();
        for _ in 0..50 {
            assert!(!spell_fails(&mut state, m, A::BoFire));
        }
    }

    #[test]
    fn test_pet_spell_at_hostile() {
        let (mut state, r_idx) = setup(caster(&[A::Missile]), Pos2D::new(5, 1));
        let p = state
            .floor
            .place_monster(
                MonsterEntity::new(r_idx, Pos2D::new(1, 3), 30).with_allegiance(Allegiance::Pet),
            )
            .unwrap();
        state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(1, 10), 30))
            .unwrap();
        assert!(monst_spell_monst(&mut state, p));
    }
}
