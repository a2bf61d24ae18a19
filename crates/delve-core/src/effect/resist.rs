//! How resistances scale incoming damage

use crate::monster::{KindFlags, MonraceDefinition, ResistFlags, SmartLearn};
use crate::player::{Player, PlayerResist};
use crate::rng::GameRng;

use super::EffectType;

/// Flavor of a monster's reaction, for messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResistNote {
    None,
    Immune,
    ResistsALot,
    Resists,
    HitHard,
}

impl ResistNote {
    /// Message suffix after the monster's name
    pub fn text(self) -> Option<&'static str> {
        match self {
            ResistNote::None => None,
            ResistNote::Immune => Some("is unaffected!"),
            ResistNote::ResistsALot => Some("resists a lot."),
            ResistNote::Resists => Some("resists."),
            ResistNote::HitHard => Some("is hit hard."),
        }
    }
}

/// Damage a monster of this race takes, the reaction, and the resistance
/// that explains it (for lore)
pub fn adjust_monster_damage(
    race: &MonraceDefinition,
    typ: EffectType,
    dam: i32,
    rng: &mut GameRng,
) -> (i32, ResistNote, ResistFlags) {
    use EffectType as T;
    let r = race.resist;
    if r.contains(ResistFlags::RES_ALL) && !typ.is_status() {
        return (0, ResistNote::Immune, ResistFlags::RES_ALL);
    }

    let immune = |flag: ResistFlags| (dam / 9, ResistNote::ResistsALot, flag);
    let partial = |flag: ResistFlags, mult: i32, rng: &mut GameRng| {
        (dam * mult / (rng.randint1(6) + 6), ResistNote::Resists, flag)
    };
    let hurt = |flag: ResistFlags| (dam * 2, ResistNote::HitHard, flag);
    let plain = (dam, ResistNote::None, ResistFlags::empty());

    match typ {
        T::Acid if r.contains(ResistFlags::IM_ACID) => immune(ResistFlags::IM_ACID),
        T::Elec if r.contains(ResistFlags::IM_ELEC) => immune(ResistFlags::IM_ELEC),
        T::Fire if r.contains(ResistFlags::IM_FIRE) => immune(ResistFlags::IM_FIRE),
        T::Fire if r.contains(ResistFlags::HURT_FIRE) => hurt(ResistFlags::HURT_FIRE),
        T::Cold | T::Ice if r.contains(ResistFlags::IM_COLD) => immune(ResistFlags::IM_COLD),
        T::Cold | T::Ice if r.contains(ResistFlags::HURT_COLD) => hurt(ResistFlags::HURT_COLD),
        T::Poison if r.contains(ResistFlags::IM_POIS) => immune(ResistFlags::IM_POIS),
        T::Nuke if r.contains(ResistFlags::IM_POIS) => partial(ResistFlags::IM_POIS, 3, rng),
        T::Nether if race.kind.contains(KindFlags::UNDEAD) => {
            (0, ResistNote::Immune, ResistFlags::empty())
        }
        T::Nether if r.contains(ResistFlags::RES_NETH) => partial(ResistFlags::RES_NETH, 3, rng),
        T::Nether if race.kind.contains(KindFlags::EVIL) => {
            (dam / 2, ResistNote::Resists, ResistFlags::empty())
        }
        T::Light if r.contains(ResistFlags::RES_LITE) => partial(ResistFlags::RES_LITE, 2, rng),
        T::Light if r.contains(ResistFlags::HURT_LITE) => hurt(ResistFlags::HURT_LITE),
        T::Dark if r.contains(ResistFlags::RES_DARK) => partial(ResistFlags::RES_DARK, 2, rng),
        T::Water if r.contains(ResistFlags::RES_WATER) => partial(ResistFlags::RES_WATER, 3, rng),
        T::Plasma if r.contains(ResistFlags::RES_PLASMA) => {
            partial(ResistFlags::RES_PLASMA, 3, rng)
        }
        T::Shards if r.contains(ResistFlags::RES_SHARDS) => {
            partial(ResistFlags::RES_SHARDS, 3, rng)
        }
        T::Sound if r.contains(ResistFlags::RES_SOUND) => partial(ResistFlags::RES_SOUND, 2, rng),
        T::Confusion if r.contains(ResistFlags::NO_CONF) => partial(ResistFlags::NO_CONF, 3, rng),
        T::Chaos if r.contains(ResistFlags::RES_CHAOS) => partial(ResistFlags::RES_CHAOS, 3, rng),
        T::Nexus if r.contains(ResistFlags::RES_NEXUS) => partial(ResistFlags::RES_NEXUS, 3, rng),
        T::Disenchant if r.contains(ResistFlags::RES_DISEN) => {
            partial(ResistFlags::RES_DISEN, 3, rng)
        }
        T::Time if r.contains(ResistFlags::RES_TIME) => partial(ResistFlags::RES_TIME, 3, rng),
        T::Inertia if r.contains(ResistFlags::RES_INERTIA) => {
            partial(ResistFlags::RES_INERTIA, 3, rng)
        }
        T::Gravity if r.contains(ResistFlags::RES_GRAVITY) => {
            partial(ResistFlags::RES_GRAVITY, 3, rng)
        }
        T::Force if r.contains(ResistFlags::RES_FORCE) => partial(ResistFlags::RES_FORCE, 3, rng),
        T::Void if r.contains(ResistFlags::RES_VOID) => partial(ResistFlags::RES_VOID, 3, rng),
        T::Abyss if r.contains(ResistFlags::RES_ABYSS) => partial(ResistFlags::RES_ABYSS, 3, rng),
        T::Disintegrate if r.contains(ResistFlags::HURT_ROCK) => hurt(ResistFlags::HURT_ROCK),
        _ if typ.is_mental() && race.is_stupid() => (0, ResistNote::Immune, ResistFlags::empty()),
        T::DrainMana => (0, ResistNote::None, ResistFlags::empty()),
        _ => plain,
    }
}

/// Damage the player takes after resistances, and what a watching monster
/// learns from it
pub fn adjust_player_damage(
    player: &Player,
    typ: EffectType,
    dam: i32,
    rng: &mut GameRng,
) -> (i32, SmartLearn) {
    use EffectType as T;
    let res = player.resist;
    let element = |im: PlayerResist, r: PlayerResist, im_l: SmartLearn, r_l: SmartLearn| {
        if res.contains(im) {
            (0, im_l)
        } else if res.contains(r) {
            ((dam + 2) / 3, r_l)
        } else {
            (dam, SmartLearn::empty())
        }
    };
    let high = |r: PlayerResist, learn: SmartLearn, rng: &mut GameRng| {
        if res.contains(r) {
            (dam * 6 / (rng.randint1(4) + 7), learn)
        } else {
            (dam, SmartLearn::empty())
        }
    };

    match typ {
        T::Acid => element(
            PlayerResist::IM_ACID,
            PlayerResist::ACID,
            SmartLearn::IMM_ACID,
            SmartLearn::RES_ACID,
        ),
        T::Elec => element(
            PlayerResist::IM_ELEC,
            PlayerResist::ELEC,
            SmartLearn::IMM_ELEC,
            SmartLearn::RES_ELEC,
        ),
        T::Fire => element(
            PlayerResist::IM_FIRE,
            PlayerResist::FIRE,
            SmartLearn::IMM_FIRE,
            SmartLearn::RES_FIRE,
        ),
        T::Cold | T::Ice => element(
            PlayerResist::IM_COLD,
            PlayerResist::COLD,
            SmartLearn::IMM_COLD,
            SmartLearn::RES_COLD,
        ),
        T::Poison | T::Nuke if res.contains(PlayerResist::POIS) => {
            ((dam + 2) / 3, SmartLearn::RES_POIS)
        }
        T::Nether => high(PlayerResist::NETHER, SmartLearn::RES_NETH, rng),
        T::Light => high(PlayerResist::LITE, SmartLearn::RES_LITE, rng),
        T::Dark => high(PlayerResist::DARK, SmartLearn::RES_DARK, rng),
        T::Confusion => high(PlayerResist::CONF, SmartLearn::RES_CONF, rng),
        T::Sound => high(PlayerResist::SOUND, SmartLearn::RES_SOUND, rng),
        T::Shards => high(PlayerResist::SHARDS, SmartLearn::RES_SHARD, rng),
        T::Chaos => high(PlayerResist::CHAOS, SmartLearn::RES_CHAOS, rng),
        T::Disenchant => high(PlayerResist::DISEN, SmartLearn::RES_DISEN, rng),
        T::Nexus => high(PlayerResist::NEXUS, SmartLearn::RES_NEXUS, rng),
        T::DrainMana => (0, SmartLearn::empty()),
        t if t.is_status() => (0, SmartLearn::empty()),
        _ => (dam, SmartLearn::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monster_immunity() {
        let mut race = MonraceDefinition::new("fire vortex", 'v', 20);
        race.resist |= ResistFlags::IM_FIRE;
        let mut rng = GameRng::new(1);
        let (dam, note, flag) = adjust_monster_damage(&race, EffectType::Fire, 90, &mut rng);
        assert_eq!(dam, 10);
        assert_eq!(note, ResistNote::ResistsALot);
        assert_eq!(flag, ResistFlags::IM_FIRE);
        let (dam, _, _) = adjust_monster_damage(&race, EffectType::Cold, 90, &mut rng);
        assert_eq!(dam, 90);
    }

    #[test]
    fn test_undead_ignore_nether() {
        let mut race = MonraceDefinition::new("zombie", 'z', 10);
        race.kind |= KindFlags::UNDEAD;
        let mut rng = GameRng::new(1);
        assert_eq!(adjust_monster_damage(&race, EffectType::Nether, 50, &mut rng).0, 0);
    }

    #[test]
    fn test_mindless_ignore_mind_attacks() {
        let mut race = MonraceDefinition::new("jelly", 'j', 10);
        race.behavior |= crate::monster::BehaviorFlags::STUPID;
        let mut rng = GameRng::new(1);
        assert_eq!(adjust_monster_damage(&race, EffectType::MindBlast, 40, &mut rng).0, 0);
        assert_eq!(adjust_monster_damage(&race, EffectType::Fire, 40, &mut rng).0, 40);
    }

    #[test]
    fn test_partial_resist_range() {
        let mut race = MonraceDefinition::new("hound", 'Z', 10);
        race.resist |= ResistFlags::RES_SOUND;
        let mut rng = GameRng::new(9);
        for _ in 0..50 {
            let (dam, _, _) = adjust_monster_damage(&race, EffectType::Sound, 120, &mut rng);
            assert!((20..=34).contains(&dam), "{dam}");
        }
    }

    #[test]
    fn test_player_resists() {
        let mut player = Player::default();
        let mut rng = GameRng::new(1);
        assert_eq!(adjust_player_damage(&player, EffectType::Acid, 30, &mut rng).0, 30);
        player.resist |= PlayerResist::ACID;
        let (dam, learn) = adjust_player_damage(&player, EffectType::Acid, 30, &mut rng);
        assert_eq!(dam, 10);
        assert_eq!(learn, SmartLearn::RES_ACID);
        player.resist |= PlayerResist::IM_ACID;
        assert_eq!(adjust_player_damage(&player, EffectType::Acid, 30, &mut rng).0, 0);
    }
}
