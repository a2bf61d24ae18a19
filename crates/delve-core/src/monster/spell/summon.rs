//! Calling in allies: which races answer a summons and where they appear

use log::debug;

use crate::geometry::projectable;
use crate::grid::{Pos2D, TerrainFlags};
use crate::monster::{KindFlags, MonraceDefinition, MonsterEntity};
use crate::GameState;

use super::MonsterAbility;

/// What kind of creature a summoning spell calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummonKind {
    Kin,
    Cyber,
    Monster,
    Ant,
    Spider,
    Hound,
    Hydra,
    Angel,
    Demon,
    Undead,
    Dragon,
    HiUndead,
    HiDragon,
    Amberite,
    Unique,
    /// Live grenades thrown by a grenadier
    Grenade,
}

impl SummonKind {
    /// Kind and head count of a summoning ability
    pub fn from_ability(ability: MonsterAbility) -> Option<(Self, i32)> {
        use MonsterAbility as A;
        let info = match ability {
            A::SKin => (Self::Kin, 4),
            A::SCyber => (Self::Cyber, 1),
            A::SMonster => (Self::Monster, 1),
            A::SMonsters => (Self::Monster, 6),
            A::SAnt => (Self::Ant, 4),
            A::SSpider => (Self::Spider, 4),
            A::SHound => (Self::Hound, 4),
            A::SHydra => (Self::Hydra, 4),
            A::SAngel => (Self::Angel, 1),
            A::SDemon => (Self::Demon, 1),
            A::SUndead => (Self::Undead, 1),
            A::SDragon => (Self::Dragon, 1),
            A::SHiUndead => (Self::HiUndead, 4),
            A::SHiDragon => (Self::HiDragon, 4),
            A::SAmberite => (Self::Amberite, 2),
            A::SUnique => (Self::Unique, 2),
            _ => return None,
        };
        Some(info)
    }

    fn accepts(self, summoner: &MonraceDefinition, race: &MonraceDefinition) -> bool {
        let kind = race.kind;
        let unique = race.is_unique();
        match self {
            Self::Kin => race.symbol == summoner.symbol && !unique,
            Self::Cyber => kind.contains(KindFlags::DEMON) && kind.contains(KindFlags::NONLIVING),
            Self::Monster => !unique,
            Self::Ant => race.symbol == 'a' && !unique,
            Self::Spider => race.symbol == 'S' && !unique,
            Self::Hound => matches!(race.symbol, 'C' | 'Z') && !unique,
            Self::Hydra => race.symbol == 'M' && !unique,
            Self::Angel => kind.contains(KindFlags::ANGEL) && !unique,
            Self::Demon => kind.contains(KindFlags::DEMON) && !unique,
            Self::Undead => kind.contains(KindFlags::UNDEAD) && !unique,
            Self::Dragon => kind.contains(KindFlags::DRAGON) && !unique,
            Self::HiUndead => matches!(race.symbol, 'L' | 'V' | 'W'),
            Self::HiDragon => race.symbol == 'D',
            Self::Amberite => kind.contains(KindFlags::AMBERITE) && unique,
            Self::Unique => unique && !kind.contains(KindFlags::AMBERITE),
            Self::Grenade => race.name.contains("grenade"),
        }
    }
}

/// Is `pos` a grid a fresh monster may appear in?
fn summon_spot_ok(state: &GameState, pos: Pos2D) -> bool {
    let floor = &state.floor;
    floor.in_bounds(pos)
        && pos != state.player.pos
        && floor.is_empty_floor(pos)
        && !floor.grid(pos).has(TerrainFlags::PATTERN)
}

/// Random empty grid within two steps of `at` with a clear line both ways
pub fn find_summon_spot(state: &mut GameState, at: Pos2D) -> Option<Pos2D> {
    for _ in 0..20 {
        let pos = Pos2D::new(at.y + state.rng.randint0(5) - 2, at.x + state.rng.randint0(5) - 2);
        if at.distance(pos) > 2 || !summon_spot_ok(state, pos) {
            continue;
        }
        let floor = &state.floor;
        if projectable(floor, at, pos) && projectable(floor, pos, at) {
            return Some(pos);
        }
    }
    None
}

/// Highest race level a summons may call on this floor
fn summon_level(state: &GameState, caster_level: i32) -> i32 {
    (state.floor.dun_level + caster_level) / 2 + 5
}

/// Summon one creature of `kind` near `at` on behalf of `who`
///
/// The newcomer shares its summoner's allegiance and alignment.
pub fn summon_specific(
    state: &mut GameState,
    who: usize,
    at: Pos2D,
    kind: SummonKind,
) -> Option<usize> {
    if !state.floor.monster_is_valid(who) {
        return None;
    }
    let summoner = state.floor.monster(who);
    let allegiance = summoner.allegiance;
    let sub_align = summoner.sub_align;
    let summoner_race = state.races.get(summoner.r_idx);
    let max_level = summon_level(state, summoner_race.level);
    let candidates: Vec<usize> = state
        .races
        .indices()
        .filter(|&r| {
            let race = state.races.get(r);
            race.level <= max_level
                && race.cur_num < race.max_num
                && kind.accepts(summoner_race, race)
        })
        .collect();
    let r_idx = *state.rng.choose(&candidates)?;
    let pos = find_summon_spot(state, at)?;

    let race = state.races.get(r_idx);
    let (hdice, hside, speed) = (race.hdice, race.hside, race.speed);
    let hp = state.rng.dice(hdice.max(1), hside.max(1));
    let mut monster = MonsterEntity::new(r_idx, pos, hp).with_allegiance(allegiance);
    monster.speed = speed;
    monster.sub_align = sub_align;
    monster.parent_m_idx = who;
    let m_idx = state.floor.place_monster(monster).ok()?;
    if let Some(race) = state.races.get_mut(r_idx) {
        race.cur_num += 1;
    }
    debug!("monster {who} summons {kind:?} as monster {m_idx} at {pos:?}");
    state.update_monster(m_idx);
    Some(m_idx)
}

/// Answer a summoning spell; returns how many creatures arrived
pub fn summon_for_ability(
    state: &mut GameState,
    who: usize,
    at: Pos2D,
    ability: MonsterAbility,
) -> i32 {
    let Some((kind, count)) = SummonKind::from_ability(ability) else {
        return 0;
    };
    let mut arrived = 0;
    for _ in 0..count {
        if summon_specific(state, who, at, kind).is_some() {
            arrived += 1;
        }
    }
    arrived
}

/// Call creatures sharing the summoner's symbol
pub fn summon_kin_of(state: &mut GameState, who: usize, at: Pos2D) -> i32 {
    summon_for_ability(state, who, at, MonsterAbility::SKin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Floor;
    use crate::monster::{Allegiance, RaceTable};
    use crate::player::Player;
    use crate::GameRng;

    fn state() -> (GameState, usize) {
        let mut races = RaceTable::new();
        let r_idx = races.push(MonraceDefinition::new("kobold", 'k', 5));
        races.push(MonraceDefinition::new("cave orc", 'o', 7));
        let floor = Floor::from_ascii(&[
            "#########",
            "#.......#",
            "#.......#",
            "#.......#",
            "#########",
        ])
        .unwrap();
        let state = GameState::new(floor, Player::new(Pos2D::new(1, 1)), races, GameRng::new(5));
        (state, r_idx)
    }

    #[test]
    fn test_kin_share_symbol() {
        let (mut state, r_idx) = state();
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(2, 5), 10))
            .unwrap();
        let n = summon_kin_of(&mut state, m, Pos2D::new(2, 5));
        assert!(n > 0);
        for i in state.floor.monster_indices() {
            assert_eq!(state.floor.monster(i).r_idx, r_idx);
        }
    }

    #[test]
    fn test_summons_share_allegiance() {
        let (mut state, r_idx) = state();
        let m = state
            .floor
            .place_monster(
                MonsterEntity::new(r_idx, Pos2D::new(2, 5), 10).with_allegiance(Allegiance::Pet),
            )
            .unwrap();
        let s = summon_specific(&mut state, m, Pos2D::new(2, 5), SummonKind::Monster).unwrap();
        assert!(state.floor.monster(s).is_pet());
        assert_eq!(state.floor.monster(s).parent_m_idx, m);
        assert!(state.floor.monster(s).pos.distance(Pos2D::new(2, 5)) <= 2);
    }

    #[test]
    fn test_no_matching_race() {
        let (mut state, r_idx) = state();
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(2, 5), 10))
            .unwrap();
        assert_eq!(summon_specific(&mut state, m, Pos2D::new(2, 5), SummonKind::Dragon), None);
    }
}
