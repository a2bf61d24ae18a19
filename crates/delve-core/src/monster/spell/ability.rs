//! Monster abilities and ability sets

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// Every innate ability or spell a monster race may have
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumCount,
)]
#[repr(u8)]
pub enum MonsterAbility {
    Shriek,
    Dispel,
    Rocket,
    Shoot,
    // Breaths
    BrAcid,
    BrElec,
    BrFire,
    BrCold,
    BrPois,
    BrNether,
    BrLite,
    BrDark,
    BrConf,
    BrSound,
    BrChaos,
    BrDisen,
    BrNexus,
    BrTime,
    BrInertia,
    BrGravity,
    BrShards,
    BrPlasma,
    BrForce,
    BrMana,
    BrNuke,
    BrDisi,
    BrVoid,
    BrAbyss,
    // Balls
    BaAcid,
    BaElec,
    BaFire,
    BaCold,
    BaPois,
    BaNether,
    BaWater,
    BaMana,
    BaDark,
    BaLite,
    BaNuke,
    BaChaos,
    BaVoid,
    BaAbyss,
    // Direct attacks
    DrainMana,
    MindBlast,
    BrainSmash,
    Cause1,
    Cause2,
    Cause3,
    Cause4,
    // Bolts
    BoAcid,
    BoElec,
    BoFire,
    BoCold,
    BoPois,
    BoNether,
    BoWater,
    BoMana,
    BoPlasma,
    BoIce,
    Missile,
    BoVoid,
    BoAbyss,
    // Beams
    PsySpear,
    // Status
    Scare,
    Blind,
    Conf,
    Slow,
    Hold,
    // Self and movement
    Haste,
    HandDoom,
    Heal,
    Invulner,
    Blink,
    Tport,
    World,
    Special,
    TeleTo,
    TeleAway,
    TeleLevel,
    Darkness,
    Traps,
    Forget,
    RaiseDead,
    // Summons
    SKin,
    SCyber,
    SMonster,
    SMonsters,
    SAnt,
    SSpider,
    SHound,
    SHydra,
    SAngel,
    SDemon,
    SUndead,
    SDragon,
    SHiUndead,
    SHiDragon,
    SAmberite,
    SUnique,
}

use MonsterAbility as A;

impl MonsterAbility {
    pub const fn is_breath(self) -> bool {
        (self as u8) >= (A::BrAcid as u8) && (self as u8) <= (A::BrAbyss as u8)
    }

    /// Radius-2/4 balls (rocket included; it explodes on impact)
    pub const fn is_ball(self) -> bool {
        matches!(self, A::Rocket)
            || ((self as u8) >= (A::BaAcid as u8) && (self as u8) <= (A::BaAbyss as u8))
    }

    /// Balls of radius 4 for powerful casters
    pub const fn is_big_ball(self) -> bool {
        matches!(
            self,
            A::BaChaos | A::BaLite | A::BaDark | A::BaWater | A::BaMana | A::BaVoid | A::BaAbyss
        )
    }

    /// Single-target projectiles that stop at the first creature
    pub const fn is_bolt(self) -> bool {
        matches!(self, A::Shoot)
            || ((self as u8) >= (A::BoAcid as u8) && (self as u8) <= (A::BoAbyss as u8))
    }

    pub const fn is_beam(self) -> bool {
        matches!(self, A::PsySpear)
    }

    pub const fn is_summon(self) -> bool {
        (self as u8) >= (A::SKin as u8) && (self as u8) <= (A::SUnique as u8)
    }

    /// Abilities that hurt their target
    pub const fn is_attack(self) -> bool {
        self.is_breath()
            || self.is_ball()
            || self.is_bolt()
            || self.is_beam()
            || matches!(
                self,
                A::Dispel
                    | A::DrainMana
                    | A::MindBlast
                    | A::BrainSmash
                    | A::Cause1
                    | A::Cause2
                    | A::Cause3
                    | A::Cause4
                    | A::Scare
                    | A::Blind
                    | A::Conf
                    | A::Slow
                    | A::Hold
                    | A::HandDoom
                    | A::TeleTo
                    | A::TeleAway
                    | A::TeleLevel
                    | A::Darkness
            )
    }

    pub const fn is_teleport(self) -> bool {
        matches!(
            self,
            A::Blink | A::Tport | A::TeleTo | A::TeleAway | A::TeleLevel
        )
    }

    /// Spells a smart caster still bothers with when badly hurt
    pub const fn is_intelligent(self) -> bool {
        matches!(
            self,
            A::Dispel
                | A::Heal
                | A::Invulner
                | A::Blink
                | A::Tport
                | A::TeleLevel
                | A::TeleTo
                | A::TeleAway
                | A::World
                | A::Forget
                | A::Haste
                | A::Scare
                | A::Blind
                | A::Conf
                | A::Slow
                | A::Hold
        ) || self.is_summon()
    }

    /// Abilities a mount cannot use while ridden
    pub const fn is_riding_incompatible(self) -> bool {
        matches!(
            self,
            A::Blink | A::Tport | A::TeleLevel | A::World | A::Special | A::Shriek
        )
    }

    /// Innate (non-magical) abilities that still work in antimagic areas
    pub const fn is_innate(self) -> bool {
        self.is_breath() || matches!(self, A::Shriek | A::Rocket | A::Shoot | A::Special)
    }

    /// Abilities kept for use against the player only
    pub const fn is_player_only(self) -> bool {
        matches!(self, A::World | A::Traps | A::Forget)
    }

    /// Teleport-class abilities forbidden on floors that block teleportation
    pub const fn is_floor_teleport(self) -> bool {
        matches!(self, A::Blink | A::Tport | A::TeleLevel | A::TeleTo | A::TeleAway)
    }
}

/// A set of [`MonsterAbility`] values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilitySet(u128);

impl AbilitySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn from_slice(abilities: &[MonsterAbility]) -> Self {
        let mut set = Self::empty();
        for &a in abilities {
            set.set(a);
        }
        set
    }

    /// All abilities matching a predicate
    pub fn matching(pred: impl Fn(MonsterAbility) -> bool) -> Self {
        let mut set = Self::empty();
        for a in MonsterAbility::iter().filter(|&a| pred(a)) {
            set.set(a);
        }
        set
    }

    pub const fn has(self, ability: MonsterAbility) -> bool {
        self.0 & (1u128 << ability as u8) != 0
    }

    pub fn set(&mut self, ability: MonsterAbility) {
        self.0 |= 1u128 << ability as u8;
    }

    pub fn reset(&mut self, ability: MonsterAbility) {
        self.0 &= !(1u128 << ability as u8);
    }

    /// Remove every ability matching a predicate
    pub fn reset_matching(&mut self, pred: impl Fn(MonsterAbility) -> bool) {
        self.0 &= !Self::matching(pred).0;
    }

    /// Keep only abilities matching a predicate
    pub fn retain(&mut self, pred: impl Fn(MonsterAbility) -> bool) {
        self.0 &= Self::matching(pred).0;
    }

    pub fn has_any(self, pred: impl Fn(MonsterAbility) -> bool) -> bool {
        self.iter().any(pred)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = MonsterAbility> {
        MonsterAbility::iter().filter(move |&a| self.has(a))
    }
}

impl FromIterator<MonsterAbility> for AbilitySet {
    fn from_iter<I: IntoIterator<Item = MonsterAbility>>(iter: I) -> Self {
        let mut set = Self::empty();
        for a in iter {
            set.set(a);
        }
        set
    }
}
