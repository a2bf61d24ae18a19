//! Which spell, if any, a monster casts this turn

use log::trace;

use crate::effect::EffectType;
use crate::geometry::{
    breath_shape, cave_stop_disintegration, get_project_point, los, projectable,
    projectable_within, ProjectFlags, ProjectionPath,
};
use crate::grid::{Floor, Pos2D, TerrainFlags};
use crate::item::ItemKind;
use crate::monster::{clean_shot, BehaviorFlags, KindFlags, ResistFlags, SpecialAbility};
use crate::player::PlayerClass;
use crate::world::PetPermissions;
use crate::{GameState, MAX_RANGE};

use super::{AbilitySet, MonsterAbility};

use MonsterAbility as A;

/// Ball radius the caster's breath is checked with
fn breath_radius(powerful: bool) -> i32 {
    if powerful { 3 } else { 2 }
}

/// Does a beam from `from` reach `to`? A friendly caster must also keep
/// the player out of it.
pub fn direct_beam(
    floor: &Floor,
    player_pos: Pos2D,
    from: Pos2D,
    to: Pos2D,
    is_friend: bool,
) -> bool {
    let path =
        ProjectionPath::new(floor, floor.max_range(), player_pos, from, to, ProjectFlags::THRU);
    if path.is_empty() {
        return false;
    }
    let mut hit = false;
    for pos in &path {
        if pos == to {
            hit = true;
        } else if is_friend && pos == player_pos {
            return false;
        }
    }
    hit
}

/// Does a breath of `typ` from `from` with radius `rad` paint `to`? A
/// friendly breather must also keep the player out of the cone.
pub fn breath_direct(
    floor: &Floor,
    player_pos: Pos2D,
    from: Pos2D,
    to: Pos2D,
    rad: i32,
    typ: Option<EffectType>,
    is_friend: bool,
) -> bool {
    let flags = match typ {
        Some(EffectType::Light) => ProjectFlags::LOS,
        Some(EffectType::Disintegrate) => ProjectFlags::DISI,
        _ => ProjectFlags::empty(),
    };
    let path = ProjectionPath::new(floor, floor.max_range(), player_pos, from, to, flags);

    let mut hit = false;
    let mut hit_player = false;
    for pos in &path {
        let grid = floor.grid(pos);
        let blocked = if flags.contains(ProjectFlags::DISI) {
            cave_stop_disintegration(grid)
        } else if flags.contains(ProjectFlags::LOS) {
            !grid.has_los()
        } else {
            !grid.has(TerrainFlags::PROJECT)
        };
        if blocked {
            break;
        }
        hit |= pos == to;
        hit_player |= pos == player_pos;
    }

    let center = path.last().unwrap_or(from);
    let block = typ.unwrap_or(EffectType::Mana).blast_block();
    let shape = breath_shape(floor, &path, rad, from, center, block);
    hit |= shape.contains(to);
    hit_player |= shape.contains(player_pos);

    hit && !(is_friend && hit_player)
}

/// Is there an empty grid near `at` for a summoned monster to appear in?
pub fn summon_possible(floor: &Floor, player_pos: Pos2D, at: Pos2D) -> bool {
    for y in at.y - 2..=at.y + 2 {
        for x in at.x - 2..=at.x + 2 {
            let pos = Pos2D::new(y, x);
            if !floor.in_bounds(pos) || at.distance(pos) > 2 || pos == player_pos {
                continue;
            }
            if floor.grid(pos).has(TerrainFlags::PATTERN) {
                continue;
            }
            if floor.is_empty_floor(pos)
                && projectable(floor, at, pos)
                && projectable(floor, pos, at)
            {
                return true;
            }
        }
    }
    false
}

/// Is there a corpse in sight of the caster to raise?
pub fn raise_possible(state: &GameState, m_idx: usize) -> bool {
    let floor = &state.floor;
    let from = floor.monster(m_idx).pos;
    for y in from.y - 5..=from.y + 5 {
        for x in from.x - 5..=from.x + 5 {
            let pos = Pos2D::new(y, x);
            if !floor.in_bounds(pos) || from.distance(pos) > 5 {
                continue;
            }
            if !los(floor, from, pos) || !projectable(floor, from, pos) {
                continue;
            }
            let has_corpse = floor
                .items_at(pos)
                .iter()
                .filter_map(|&o| floor.item(o))
                .any(|o| o.kind == ItemKind::Corpse);
            if has_corpse {
                return true;
            }
        }
    }
    false
}

/// Would dispelling `t_idx` take away anything worth the turn?
pub fn dispel_check_monster(state: &GameState, t_idx: usize) -> bool {
    let t = state.floor.monster(t_idx);
    if t.is_invulnerable() {
        return true;
    }
    if t.speed < 135 && t.is_accelerated() {
        return true;
    }
    t_idx == state.player.riding && state.player.has_dispellable_buff()
}

/// Enemy monster this caster will aim at, if any is in reach
fn find_spell_target(state: &mut GameState, m_idx: usize) -> Option<usize> {
    let floor = &state.floor;
    let m = floor.monster(m_idx);
    let range = floor.max_range();
    let valid = |t: usize| {
        t != m_idx
            && floor.monster_is_valid(t)
            && projectable_within(floor, range, m.pos, floor.monster(t).pos)
    };

    let pet_target = state.player.pet_target;
    if m.is_pet() && pet_target != 0 && valid(pet_target) {
        return Some(pet_target);
    }
    if let Some(target) = m.target {
        let t = floor.get_grid(target).map_or(0, |g| g.m_idx);
        if t != 0 && (t == pet_target || state.are_enemies(m_idx, t)) && valid(t) {
            return Some(t);
        }
    }

    let max = floor.monster_max() as i64;
    if max <= 1 {
        return None;
    }
    let (start, step) = if floor.is_arena {
        let start = i64::from(state.rng.randint1(max as i32 - 1)) + max;
        let step = if state.rng.randint0(2) == 0 { 1 } else { -1 };
        (start, step)
    } else {
        (max + 1, 1)
    };
    let floor = &state.floor;
    let mut i = start;
    while i < start + max && i > start - max {
        let t = (i % max) as usize;
        i += step;
        if t == 0 || !floor.monster_is_valid(t) || !state.are_enemies(m_idx, t) {
            continue;
        }
        if valid(t) {
            return Some(t);
        }
    }
    None
}

/// Castable abilities of a monster against another monster, narrowed down
/// step by step; returns the chosen ability and the target
pub fn check_melee_spell_set(
    state: &mut GameState,
    m_idx: usize,
) -> Option<(MonsterAbility, usize)> {
    if !state.floor.monster_is_valid(m_idx) || state.floor.monster(m_idx).is_confused() {
        return None;
    }
    let t_idx = find_spell_target(state, m_idx)?;

    let m = state.floor.monster(m_idx);
    let t = state.floor.monster(t_idx);
    let race = state.races.get(m.r_idx);
    let floor = &state.floor;
    let player = &state.player;
    let pet = m.is_pet();
    let ridden = player.riding == m_idx;
    let mut set = race.abilities;

    set.reset_matching(MonsterAbility::is_player_only);
    if set.has(A::BrLite) && !los(floor, m.pos, t.pos) {
        set.reset(A::BrLite);
    }
    if set.has(A::Special) && race.special == SpecialAbility::None {
        set.reset(A::Special);
    }

    // Surroundings
    if set.has(A::Darkness) {
        let vs_ninja = player.class == PlayerClass::Ninja && !t.is_hostile();
        let can_use_lite_area = vs_ninja
            && !race.kind.contains(KindFlags::UNDEAD)
            && !race.resist.contains(ResistFlags::HURT_LITE)
            && race.feature.light_radius(false) >= 0;
        if !race.is_stupid() && (floor.is_dark || (vs_ninja && !can_use_lite_area)) {
            set.reset(A::Darkness);
        }
    }
    if floor.no_magic && !race.behavior.contains(BehaviorFlags::IGNORES_ANTIMAGIC) {
        set.retain(MonsterAbility::is_innate);
    }
    if floor.is_arena {
        set.reset_matching(MonsterAbility::is_summon);
        set.reset(A::TeleLevel);
    }
    let arena = floor.is_arena;
    if ridden {
        set.reset_matching(MonsterAbility::is_riding_incompatible);
    }

    if pet {
        filter_pet_spells(state, m_idx, t_idx, &mut set);
    }
    let m = state.floor.monster(m_idx);
    let t = state.floor.monster(t_idx);
    let floor = &state.floor;

    if !race.is_stupid() {
        if set.has_any(MonsterAbility::is_bolt)
            && !clean_shot(floor, state.player.pos, m.pos, t.pos, pet)
        {
            set.reset_matching(MonsterAbility::is_bolt);
        }
        if set.has_any(MonsterAbility::is_summon)
            && !summon_possible(floor, state.player.pos, t.pos)
        {
            set.reset_matching(MonsterAbility::is_summon);
        }
        if set.has(A::Dispel) && !dispel_check_monster(state, t_idx) {
            set.reset(A::Dispel);
        }
        if set.has(A::RaiseDead) && !raise_possible(state, m_idx) {
            set.reset(A::RaiseDead);
        }
        if set.has(A::Special)
            && race.special == SpecialAbility::Grenadier
            && !summon_possible(floor, state.player.pos, t.pos)
        {
            set.reset(A::Special);
        }
    }

    let low_hp = m.hp < m.maxhp / 10;
    let smart = race.is_smart();
    let no_tele_level = floor.no_teleport || floor.is_arena || t_idx == state.player.riding;

    if arena && set.has(A::Heal) && !state.rng.one_in(3) {
        set.reset(A::Heal);
    }
    if smart {
        if low_hp && state.rng.percent(50) {
            set.retain(MonsterAbility::is_intelligent);
        }
        if no_tele_level {
            set.reset(A::TeleLevel);
        }
    }

    if state.is_original_ap_and_seen(m_idx) {
        let r_idx = state.floor.monster(m_idx).r_idx;
        if let Some(race) = state.races.get_mut(r_idx) {
            set.iter().for_each(|a| race.lore.options_seen.set(a));
        }
    }

    let choices: Vec<MonsterAbility> = set.iter().collect();
    let chosen = *state.rng.choose(&choices)?;
    trace!("monster {m_idx} picks {chosen} against monster {t_idx}");
    Some((chosen, t_idx))
}

/// Strip what the player has not allowed pets to do, and area spells that
/// could catch the player
fn filter_pet_spells(state: &GameState, m_idx: usize, t_idx: usize, set: &mut AbilitySet) {
    let floor = &state.floor;
    let player = &state.player;
    let perms = player.pet_permissions;
    let m = floor.monster(m_idx);
    let t = floor.monster(t_idx);
    let race = state.races.get(m.r_idx);

    set.reset(A::Shriek);
    set.reset(A::Darkness);
    set.reset(A::Traps);
    if !perms.contains(PetPermissions::TELEPORT) {
        set.reset_matching(MonsterAbility::is_teleport);
    }
    if !perms.contains(PetPermissions::ATTACK_SPELL) {
        set.reset_matching(MonsterAbility::is_attack);
    }
    if !perms.contains(PetPermissions::SUMMON_SPELL) {
        set.reset_matching(MonsterAbility::is_summon);
    }

    if !perms.contains(PetPermissions::BALL_SPELL) && player.riding != m_idx {
        let balls = |a: MonsterAbility| a.is_ball() && a != A::Rocket;
        if set.has_any(balls) {
            let impact = get_project_point(floor, player.pos, m.pos, t.pos, ProjectFlags::empty());
            if projectable(floor, impact, player.pos) {
                let dist = impact.distance(player.pos);
                if dist <= 2 {
                    set.reset_matching(balls);
                } else if dist <= 4 && race.is_powerful() {
                    set.reset_matching(MonsterAbility::is_big_ball);
                }
            }
        }
        if set.has(A::Rocket) {
            let impact = get_project_point(floor, player.pos, m.pos, t.pos, ProjectFlags::STOP);
            if projectable(floor, impact, player.pos) && impact.distance(player.pos) <= 2 {
                set.reset(A::Rocket);
            }
        }
        if set.has(A::PsySpear) && !direct_beam(floor, player.pos, m.pos, t.pos, true) {
            set.reset(A::PsySpear);
        }
        if set.has_any(MonsterAbility::is_breath) {
            let rad = breath_radius(race.is_powerful());
            if !breath_direct(floor, player.pos, m.pos, t.pos, rad, None, true) {
                set.reset_matching(MonsterAbility::is_breath);
            } else if set.has(A::BrLite)
                && !breath_direct(
                    floor,
                    player.pos,
                    m.pos,
                    t.pos,
                    rad,
                    Some(EffectType::Light),
                    true,
                )
            {
                set.reset(A::BrLite);
            } else if set.has(A::BrDisi)
                && !breath_direct(
                    floor,
                    player.pos,
                    m.pos,
                    t.pos,
                    rad,
                    Some(EffectType::Disintegrate),
                    true,
                )
            {
                set.reset(A::BrDisi);
            }
        }
    }

    if set.has(A::Special) {
        let needed = match race.special {
            SpecialAbility::Grenadier => {
                Some(PetPermissions::ATTACK_SPELL | PetPermissions::SUMMON_SPELL)
            }
            SpecialAbility::Bird => Some(PetPermissions::ATTACK_SPELL | PetPermissions::TELEPORT),
            SpecialAbility::None => None,
        };
        if needed.is_none_or(|n| !perms.contains(n)) {
            set.reset(A::Special);
        }
    }
}

/// Spell a hostile monster casts at the player, if any
pub fn choose_attack_spell(state: &mut GameState, m_idx: usize) -> Option<MonsterAbility> {
    if !state.floor.monster_is_valid(m_idx) {
        return None;
    }
    let m = state.floor.monster(m_idx);
    if m.is_confused() || !m.is_hostile() {
        return None;
    }
    let floor = &state.floor;
    let player_pos = state.player.pos;
    if m.pos.distance(player_pos) > MAX_RANGE || !projectable(floor, m.pos, player_pos) {
        return None;
    }
    let race = state.races.get(m.r_idx);
    let mut set = race.abilities;

    if set.has(A::Special) && race.special == SpecialAbility::None {
        set.reset(A::Special);
    }
    if floor.no_magic && !race.behavior.contains(BehaviorFlags::IGNORES_ANTIMAGIC) {
        set.retain(MonsterAbility::is_innate);
    }
    if floor.is_dark {
        set.reset(A::Darkness);
    }

    if !race.is_stupid() {
        if set.has_any(MonsterAbility::is_bolt)
            && !clean_shot(floor, player_pos, m.pos, player_pos, false)
        {
            set.reset_matching(MonsterAbility::is_bolt);
        }
        if set.has_any(MonsterAbility::is_summon)
            && !summon_possible(floor, player_pos, player_pos)
        {
            set.reset_matching(MonsterAbility::is_summon);
        }
        if set.has(A::RaiseDead) && !raise_possible(state, m_idx) {
            set.reset(A::RaiseDead);
        }
        if floor.no_teleport || floor.is_arena {
            set.reset_matching(MonsterAbility::is_floor_teleport);
        }
        if set.has(A::Dispel) && !state.player.has_dispellable_buff() {
            set.reset(A::Dispel);
        }
        if set.has(A::Special)
            && race.special == SpecialAbility::Grenadier
            && !summon_possible(floor, player_pos, player_pos)
        {
            set.reset(A::Special);
        }
    }

    let low_hp = m.hp < m.maxhp / 10;
    if race.is_smart() && low_hp && state.rng.percent(50) {
        set.retain(MonsterAbility::is_intelligent);
    }
    let choices: Vec<MonsterAbility> = set.iter().collect();
    state.rng.choose(&choices).copied()
}
