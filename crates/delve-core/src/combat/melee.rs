//! Melee: monster blows against the player or other monsters, and the
//! player's own attacks

use log::debug;

use crate::effect::{adjust_monster_damage, adjust_player_damage, EffectType};
use crate::monster::{BlowEffect, BlowMethod, MonsterBlow};
use crate::player::PlayerResist;
use crate::world::RedrawFlags;
use crate::{GameState, BTH_PLUS_ADJ};

use super::critical::critical_norm;

impl BlowMethod {
    /// Verb of a landed blow
    pub const fn verb(self) -> &'static str {
        match self {
            BlowMethod::Hit => "hits",
            BlowMethod::Bite => "bites",
            BlowMethod::Claw => "claws",
            BlowMethod::Sting => "stings",
            BlowMethod::Touch => "touches",
            BlowMethod::Crush => "crushes",
        }
    }
}

impl BlowEffect {
    /// Element carried by the blow, if any
    pub const fn element(self) -> Option<EffectType> {
        match self {
            BlowEffect::Poison => Some(EffectType::Poison),
            BlowEffect::Fire => Some(EffectType::Fire),
            BlowEffect::Cold => Some(EffectType::Cold),
            BlowEffect::Elec => Some(EffectType::Elec),
            BlowEffect::Acid => Some(EffectType::Acid),
            _ => None,
        }
    }
}

/// Does a monster blow of `power` from a level `level` monster get past `ac`?
///
/// Five percent of blows always hit and five percent always miss.
pub fn check_hit_by_monster(
    state: &mut GameState,
    power: i32,
    level: i32,
    ac: i32,
    stunned: bool,
) -> bool {
    let k = state.rng.randint0(100);
    if k < 10 {
        return k < 5;
    }
    let mut chance = power + level * 3;
    if stunned {
        chance -= chance / 4;
    }
    chance > 0 && state.rng.randint1(chance) > ac * 3 / 4
}

/// Does a player melee or missile attack with `chance` hit armor `ac`?
pub fn test_hit_norm(state: &mut GameState, chance: i32, ac: i32, visible: bool) -> bool {
    let k = state.rng.randint0(100);
    if k < 10 {
        return k < 5;
    }
    if chance <= 0 {
        return false;
    }
    let chance = if visible { chance } else { (chance + 1) / 2 };
    state.rng.randint0(chance) >= ac * 3 / 4
}

/// Armor soaks part of a plain blow
fn armor_soak(dam: i32, ac: i32) -> i32 {
    dam - dam * ac.min(150) / 250
}

/// Every blow of `m_idx` against the player; false if it has no blows
pub fn monster_attack_player(state: &mut GameState, m_idx: usize) -> bool {
    if !state.floor.monster_is_valid(m_idx) {
        return false;
    }
    let m = state.floor.monster(m_idx);
    let race = state.races.get(m.r_idx);
    let blows: Vec<MonsterBlow> = race.blows.clone();
    if blows.is_empty() {
        return false;
    }
    let level = race.level.max(1);
    let stunned = m.is_stunned();
    let name = state.monster_name_cap(m_idx);
    let seen = m.ml;

    for (i, blow) in blows.iter().enumerate() {
        if state.player.is_dead || !state.floor.monster_is_valid(m_idx) {
            break;
        }
        let ac = state.player.ac;
        if !check_hit_by_monster(state, blow.effect.power(), level, ac, stunned) {
            if seen {
                state.message(format!("{name} misses you."));
            }
            continue;
        }
        state.message(format!("{name} {} you.", blow.method.verb()));
        let dam = state.rng.dice(blow.dd, blow.ds);
        apply_blow_to_player(state, m_idx, blow.effect, dam, &name);
        if seen {
            let r_idx = state.floor.monster(m_idx).r_idx;
            if let Some(race) = state.races.get_mut(r_idx) {
                race.lore.blows_seen = race.lore.blows_seen.max(i as u8 + 1);
            }
        }
    }
    state.disturb();
    true
}

fn apply_blow_to_player(
    state: &mut GameState,
    m_idx: usize,
    effect: BlowEffect,
    dam: i32,
    name: &str,
) {
    let killer = state.monster_name(m_idx);
    match effect {
        BlowEffect::Hurt => {
            let dam = armor_soak(dam, state.player.ac);
            state.take_hit(dam, &killer);
        }
        BlowEffect::Confuse | BlowEffect::Terrify => {
            state.take_hit(dam, &killer);
            if state.player.is_dead {
                return;
            }
            let resisted = match effect {
                BlowEffect::Confuse => state.player.resist.contains(PlayerResist::CONF),
                _ => state.rng.randint0(100) < state.player.skill_sav,
            };
            if resisted {
                return;
            }
            let rlev = state.races.get(state.floor.monster(m_idx).r_idx).level.max(1);
            let turns = (3 + state.rng.randint1(rlev)) as i16;
            if effect == BlowEffect::Confuse {
                state.player.timed.confused += turns;
                state.message("You are confused!");
            } else {
                state.player.timed.afraid += turns;
                state.message("You are terrified!");
            }
            state.set_redraw(RedrawFlags::STATUS);
        }
        _ => {
            let Some(typ) = effect.element() else {
                return;
            };
            let (dam, _) = adjust_player_damage(&state.player, typ, dam, &mut state.rng);
            debug!("{name} {typ} blow for {dam}");
            state.take_hit(dam, &killer);
        }
    }
}

/// Every blow of `m_idx` against monster `t_idx`; false if none were thrown
pub fn monster_attack_monster(state: &mut GameState, m_idx: usize, t_idx: usize) -> bool {
    if !state.floor.monster_is_valid(m_idx) || !state.floor.monster_is_valid(t_idx) {
        return false;
    }
    let m = state.floor.monster(m_idx);
    let race = state.races.get(m.r_idx);
    let blows: Vec<MonsterBlow> = race.blows.clone();
    if blows.is_empty() {
        return false;
    }
    let level = race.level.max(1);
    let stunned = m.is_stunned();
    let seen = m.ml || state.floor.monster(t_idx).ml;
    let name = state.monster_name_cap(m_idx);

    if let Some(t) = state.floor.monster_mut(t_idx) {
        t.timed.sleep = 0;
    }
    for blow in blows {
        if !state.floor.monster_is_valid(m_idx) || !state.floor.monster_is_valid(t_idx) {
            break;
        }
        let t_race = state.races.get(state.floor.monster(t_idx).r_idx);
        let ac = t_race.ac;
        let t_name = state.monster_name(t_idx);
        if !check_hit_by_monster(state, blow.effect.power(), level, ac, stunned) {
            if seen {
                state.message(format!("{name} misses {t_name}."));
            }
            continue;
        }
        if seen {
            state.message(format!("{name} {} {t_name}.", blow.method.verb()));
        }
        let mut dam = state.rng.dice(blow.dd, blow.ds);
        if blow.effect == BlowEffect::Hurt {
            dam = armor_soak(dam, ac);
        } else if let Some(typ) = blow.effect.element() {
            let t_race = state.races.get(state.floor.monster(t_idx).r_idx);
            dam = adjust_monster_damage(t_race, typ, dam, &mut state.rng).0;
        }
        if state.damage_monster(t_idx, dam, false) {
            break;
        }
    }
    true
}

/// The player's melee attack on the monster at `m_idx`
pub fn py_attack(state: &mut GameState, m_idx: usize) -> bool {
    if !state.floor.monster_is_valid(m_idx) {
        return false;
    }
    let visible = state.floor.monster(m_idx).ml;
    let ac = state.races.get(state.floor.monster(m_idx).r_idx).ac;
    let name = state.monster_name(m_idx);
    let (dd, ds, to_h, to_d, weight) = match &state.player.weapon {
        Some(w) => (w.dd, w.ds, w.to_h, w.to_d, w.weight),
        None => (1, 2, 0, 0, 0),
    };
    let chance = state.player.skill_thn + to_h * BTH_PLUS_ADJ;

    if let Some(m) = state.floor.monster_mut(m_idx) {
        m.timed.sleep = 0;
    }
    for _ in 0..state.player.num_blow.max(1) {
        if !state.floor.monster_is_valid(m_idx) {
            break;
        }
        if !test_hit_norm(state, chance, ac, visible) {
            state.message(format!("You miss {name}."));
            continue;
        }
        state.message(format!("You hit {name}."));
        let dice = state.rng.dice(dd, ds);
        let dam = (critical_norm(state, weight, to_h, dice) + to_d).max(0);
        if state.damage_monster(m_idx, dam, true) {
            break;
        }
    }
    state.disturb();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Floor, Pos2D};
    use crate::monster::{MonraceDefinition, MonsterEntity, RaceTable};
    use crate::player::Player;
    use crate::GameRng;

    fn setup(blows: Vec<MonsterBlow>) -> (GameState, usize) {
        let mut races = RaceTable::new();
        let mut race = MonraceDefinition::new("cave bear", 'q', 9);
        race.blows = blows;
        let r_idx = races.push(race);
        let floor = Floor::from_ascii(&["#####", "#...#", "#...#", "#####"]).unwrap();
        let mut state =
            GameState::new(floor, Player::new(Pos2D::new(1, 1)), races, GameRng::new(21));
        state.player.ac = 0;
        state.player.chp = 1000;
        state.player.mhp = 1000;
        (state, r_idx)
    }

    #[test]
    fn test_monster_without_blows_cannot_attack() {
        let (mut state, r_idx) = setup(Vec::new());
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(1, 2), 20))
            .unwrap();
        assert!(!monster_attack_player(&mut state, m));
    }

    #[test]
    fn test_blows_wear_the_player_down() {
        let blow = MonsterBlow::new(BlowMethod::Claw, BlowEffect::Hurt, 2, 6);
        let (mut state, r_idx) = setup(vec![blow; 3]);
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(1, 2), 20))
            .unwrap();
        for _ in 0..10 {
            assert!(monster_attack_player(&mut state, m));
        }
        assert!(state.player.chp < 1000);
    }

    #[test]
    fn test_monster_fight_can_kill() {
        let blow = MonsterBlow::new(BlowMethod::Bite, BlowEffect::Hurt, 10, 10);
        let (mut state, r_idx) = setup(vec![blow; 4]);
        let a = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(1, 2), 20))
            .unwrap();
        let b = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(2, 2), 1))
            .unwrap();
        for _ in 0..20 {
            monster_attack_monster(&mut state, a, b);
        }
        assert!(!state.floor.monster_is_valid(b));
    }

    #[test]
    fn test_hit_rolls_have_floor_and_ceiling() {
        let (mut state, _) = setup(Vec::new());
        state.rng = GameRng::scripted(&[3]);
        assert!(test_hit_norm(&mut state, 0, 1000, true));
        state.rng = GameRng::scripted(&[7]);
        assert!(!test_hit_norm(&mut state, 1000, 0, true));
    }
}
