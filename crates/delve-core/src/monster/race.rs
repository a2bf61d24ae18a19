//! Monster races: immutable templates plus race-global lore

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::spell::AbilitySet;
use crate::item::SlayFlags;

bitflags! {
    /// How a race behaves
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct BehaviorFlags: u32 {
        const NEVER_MOVE = 0x0000_0001;
        const NEVER_BLOW = 0x0000_0002;
        const STUPID = 0x0000_0004;
        const SMART = 0x0000_0008;
        /// Appears in groups
        const FRIENDS = 0x0000_0010;
        const RAND_25 = 0x0000_0020;
        const RAND_50 = 0x0000_0040;
        const OPEN_DOOR = 0x0000_0080;
        const BASH_DOOR = 0x0000_0100;
        /// Pushes weaker monsters aside
        const MOVE_BODY = 0x0000_0200;
        /// Kills weaker monsters in the way
        const KILL_BODY = 0x0000_0400;
        const TAKE_ITEM = 0x0000_0800;
        const KILL_ITEM = 0x0000_1000;
        const UNIQUE = 0x0000_2000;
        /// Casts normally in antimagic areas
        const IGNORES_ANTIMAGIC = 0x0000_4000;
        const POWERFUL = 0x0000_8000;
        /// Can be ridden
        const RIDING = 0x0001_0000;
        const NO_FEAR = 0x0002_0000;
        /// Counters missiles by cutting them down
        const ARROW_CUTTER = 0x0004_0000;
    }
}

bitflags! {
    /// Movement and light capabilities
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct FeatureFlags: u32 {
        const PASS_WALL = 0x0000_0001;
        const KILL_WALL = 0x0000_0002;
        const CAN_FLY = 0x0000_0004;
        const CAN_SWIM = 0x0000_0008;
        const AQUATIC = 0x0000_0010;
        /// Moves freely through trees
        const PASS_TREE = 0x0000_0020;
        const IM_LAVA = 0x0000_0040;
        const INVISIBLE = 0x0000_0080;
        /// Carried light, hidden while asleep or in daylight
        const HAS_LITE_1 = 0x0000_0100;
        const HAS_LITE_2 = 0x0000_0200;
        /// Glowing body, always shining
        const SELF_LITE_1 = 0x0000_0400;
        const SELF_LITE_2 = 0x0000_0800;
        const HAS_DARK_1 = 0x0000_1000;
        const HAS_DARK_2 = 0x0000_2000;
        const SELF_DARK_1 = 0x0000_4000;
        const SELF_DARK_2 = 0x0000_8000;
    }
}

bitflags! {
    /// What a race is
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct KindFlags: u32 {
        const ANIMAL = 0x0001;
        const EVIL = 0x0002;
        const GOOD = 0x0004;
        const UNDEAD = 0x0008;
        const DEMON = 0x0010;
        const ORC = 0x0020;
        const TROLL = 0x0040;
        const GIANT = 0x0080;
        const DRAGON = 0x0100;
        const HUMAN = 0x0200;
        const NONLIVING = 0x0400;
        const ANGEL = 0x0800;
        const AMBERITE = 0x1000;
    }
}

bitflags! {
    /// Immunities, resistances and vulnerabilities
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ResistFlags: u32 {
        const IM_ACID = 0x0000_0001;
        const IM_ELEC = 0x0000_0002;
        const IM_FIRE = 0x0000_0004;
        const IM_COLD = 0x0000_0008;
        const IM_POIS = 0x0000_0010;
        const RES_NETH = 0x0000_0020;
        const RES_LITE = 0x0000_0040;
        const RES_DARK = 0x0000_0080;
        const RES_WATER = 0x0000_0100;
        const RES_PLASMA = 0x0000_0200;
        const RES_SHARDS = 0x0000_0400;
        const RES_SOUND = 0x0000_0800;
        const RES_CHAOS = 0x0000_1000;
        const RES_NEXUS = 0x0000_2000;
        const RES_DISEN = 0x0000_4000;
        const RES_TIME = 0x0000_8000;
        const RES_INERTIA = 0x0001_0000;
        const RES_GRAVITY = 0x0002_0000;
        const RES_FORCE = 0x0004_0000;
        const RES_TELEPORT = 0x0008_0000;
        const RES_VOID = 0x0010_0000;
        const RES_ABYSS = 0x0020_0000;
        /// Immune to almost everything, instant death included
        const RES_ALL = 0x0040_0000;
        const HURT_LITE = 0x0080_0000;
        const HURT_FIRE = 0x0100_0000;
        const HURT_COLD = 0x0200_0000;
        const HURT_ROCK = 0x0400_0000;
        const NO_FEAR = 0x0800_0000;
        const NO_CONF = 0x1000_0000;
        const NO_SLEEP = 0x2000_0000;
        const NO_STUN = 0x4000_0000;
        /// Immune to instant-kill effects
        const NO_INSTA_DEATH = 0x8000_0000;
    }
}

bits_serde!(BehaviorFlags, u32);
bits_serde!(FeatureFlags, u32);
bits_serde!(KindFlags, u32);
bits_serde!(ResistFlags, u32);

impl FeatureFlags {
    /// Radius of the light this race sheds (negative for darkness)
    pub fn light_radius(self, self_only: bool) -> i32 {
        let (r1, r2, d1, d2) = if self_only {
            (
                FeatureFlags::SELF_LITE_1,
                FeatureFlags::SELF_LITE_2,
                FeatureFlags::SELF_DARK_1,
                FeatureFlags::SELF_DARK_2,
            )
        } else {
            (
                FeatureFlags::HAS_LITE_1,
                FeatureFlags::HAS_LITE_2,
                FeatureFlags::HAS_DARK_1,
                FeatureFlags::HAS_DARK_2,
            )
        };
        let mut rad = 0;
        if self.contains(r1) {
            rad += 1;
        }
        if self.contains(r2) {
            rad += 2;
        }
        if self.contains(d1) {
            rad -= 1;
        }
        if self.contains(d2) {
            rad -= 2;
        }
        rad
    }
}

/// Races with a hand-coded special ability
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum SpecialAbility {
    #[default]
    None,
    /// Throws grenades that call in allies
    Grenadier,
    /// Bird that snatches its target and drops it elsewhere
    Bird,
}

/// How a melee blow lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum BlowMethod {
    Hit,
    Bite,
    Claw,
    Sting,
    Touch,
    Crush,
}

/// What a melee blow does besides damage
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum BlowEffect {
    #[default]
    Hurt,
    Poison,
    Fire,
    Cold,
    Elec,
    Acid,
    Confuse,
    Terrify,
}

impl BlowEffect {
    /// Accuracy of the blow against armor
    pub const fn power(self) -> i32 {
        match self {
            BlowEffect::Hurt => 60,
            BlowEffect::Poison => 5,
            BlowEffect::Fire | BlowEffect::Cold | BlowEffect::Elec | BlowEffect::Acid => 10,
            BlowEffect::Confuse | BlowEffect::Terrify => 10,
        }
    }
}

/// One melee blow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterBlow {
    pub method: BlowMethod,
    pub effect: BlowEffect,
    pub dd: i32,
    pub ds: i32,
}

impl MonsterBlow {
    pub const fn new(method: BlowMethod, effect: BlowEffect, dd: i32, ds: i32) -> Self {
        Self {
            method,
            effect,
            dd,
            ds,
        }
    }
}

/// What the player has learned about a race
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonraceLore {
    pub sights: u32,
    pub kills: u32,
    pub deaths: u32,
    /// Spells seen cast
    pub cast_spell: u32,
    /// How many of the race's blows have been seen to land
    pub blows_seen: u8,
    pub abilities: AbilitySet,
    /// Abilities seen among a caster's options against other monsters
    pub options_seen: AbilitySet,
    pub resists: ResistFlags,
    pub kinds: KindFlags,
    pub behavior: BehaviorFlags,
    pub features: FeatureFlags,
}

/// A monster race template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonraceDefinition {
    pub name: String,
    pub symbol: char,
    pub level: i32,
    /// Base speed (110 is normal)
    pub speed: i16,
    pub hdice: i32,
    pub hside: i32,
    pub ac: i32,
    /// Detection range
    pub aaf: i32,
    /// Chance in percent of casting each turn
    pub freq_spell: i32,
    pub exp: i32,
    pub abilities: AbilitySet,
    pub behavior: BehaviorFlags,
    pub feature: FeatureFlags,
    pub kind: KindFlags,
    pub resist: ResistFlags,
    pub special: SpecialAbility,
    pub blows: Vec<MonsterBlow>,
    pub cur_num: u32,
    pub max_num: u32,
    pub lore: MonraceLore,
}

impl MonraceDefinition {
    pub fn new(name: impl Into<String>, symbol: char, level: i32) -> Self {
        Self {
            name: name.into(),
            symbol,
            level,
            speed: 110,
            hdice: 5,
            hside: 8,
            aaf: 20,
            max_num: 100,
            ..Default::default()
        }
    }

    pub fn is_unique(&self) -> bool {
        self.behavior.contains(BehaviorFlags::UNIQUE)
    }

    pub fn is_smart(&self) -> bool {
        self.behavior.contains(BehaviorFlags::SMART)
    }

    pub fn is_stupid(&self) -> bool {
        self.behavior.contains(BehaviorFlags::STUPID)
    }

    pub fn is_powerful(&self) -> bool {
        self.behavior.contains(BehaviorFlags::POWERFUL)
    }

    /// Does a slay on a missile or weapon apply to this race
    pub fn is_slain_by(&self, slays: SlayFlags) -> bool {
        let pairs = [
            (SlayFlags::SLAY_ANIMAL | SlayFlags::KILL_ANIMAL, KindFlags::ANIMAL),
            (SlayFlags::SLAY_EVIL | SlayFlags::KILL_EVIL, KindFlags::EVIL),
            (SlayFlags::SLAY_GOOD | SlayFlags::KILL_GOOD, KindFlags::GOOD),
            (SlayFlags::SLAY_HUMAN | SlayFlags::KILL_HUMAN, KindFlags::HUMAN),
            (SlayFlags::SLAY_UNDEAD | SlayFlags::KILL_UNDEAD, KindFlags::UNDEAD),
            (SlayFlags::SLAY_DEMON | SlayFlags::KILL_DEMON, KindFlags::DEMON),
            (SlayFlags::SLAY_ORC | SlayFlags::KILL_ORC, KindFlags::ORC),
            (SlayFlags::SLAY_TROLL | SlayFlags::KILL_TROLL, KindFlags::TROLL),
            (SlayFlags::SLAY_GIANT | SlayFlags::KILL_GIANT, KindFlags::GIANT),
            (SlayFlags::SLAY_DRAGON | SlayFlags::KILL_DRAGON, KindFlags::DRAGON),
        ];
        pairs
            .iter()
            .any(|(slay, kind)| slays.intersects(*slay) && self.kind.intersects(*kind))
    }
}

/// All monster races of a game; index 0 is the "no race" placeholder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceTable {
    races: Vec<MonraceDefinition>,
}

impl Default for RaceTable {
    fn default() -> Self {
        Self {
            races: vec![MonraceDefinition::default()],
        }
    }
}

impl RaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a race, returning its index
    pub fn push(&mut self, race: MonraceDefinition) -> usize {
        self.races.push(race);
        self.races.len() - 1
    }

    pub fn get(&self, r_idx: usize) -> &MonraceDefinition {
        self.races.get(r_idx).unwrap_or(&self.races[0])
    }

    pub fn get_mut(&mut self, r_idx: usize) -> Option<&mut MonraceDefinition> {
        if r_idx == 0 {
            return None;
        }
        self.races.get_mut(r_idx)
    }

    pub fn len(&self) -> usize {
        self.races.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices of every real race
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        1..self.races.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_radius() {
        let f = FeatureFlags::HAS_LITE_1 | FeatureFlags::HAS_LITE_2;
        assert_eq!(f.light_radius(false), 3);
        assert_eq!(f.light_radius(true), 0);
        assert_eq!(FeatureFlags::SELF_DARK_2.light_radius(true), -2);
    }

    #[test]
    fn test_slay_matching() {
        let mut orc = MonraceDefinition::new("cave orc", 'o', 7);
        orc.kind = KindFlags::ORC | KindFlags::EVIL;
        assert!(orc.is_slain_by(SlayFlags::SLAY_ORC));
        assert!(orc.is_slain_by(SlayFlags::KILL_EVIL));
        assert!(!orc.is_slain_by(SlayFlags::SLAY_DRAGON));
    }

    #[test]
    fn test_race_table_placeholder() {
        let mut table = RaceTable::new();
        assert!(table.is_empty());
        let idx = table.push(MonraceDefinition::new("jackal", 'C', 1));
        assert_eq!(idx, 1);
        assert_eq!(table.get(idx).name, "jackal");
        assert!(table.get_mut(0).is_none());
        assert_eq!(table.get(99).name, "");
    }

    #[test]
    fn test_flags_serialize_as_bits() {
        let json = serde_json::to_string(&KindFlags::ANIMAL).unwrap();
        assert_eq!(json, "1");
    }
}
