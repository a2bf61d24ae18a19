//! Monster instances living on a floor

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::grid::Pos2D;

/// Standing toward the player
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Allegiance {
    #[default]
    Hostile,
    Friendly,
    Pet,
}

bitflags! {
    /// Temporary alignment, e.g. inherited from a summoner
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SubAlign: u8 {
        const EVIL = 0x01;
        const GOOD = 0x02;
    }
}

bitflags! {
    /// Player resistances this monster has seen in action
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SmartLearn: u32 {
        const RES_ACID = 0x0000_0001;
        const RES_ELEC = 0x0000_0002;
        const RES_FIRE = 0x0000_0004;
        const RES_COLD = 0x0000_0008;
        const RES_POIS = 0x0000_0010;
        const RES_NETH = 0x0000_0020;
        const RES_LITE = 0x0000_0040;
        const RES_DARK = 0x0000_0080;
        const RES_CONF = 0x0000_0100;
        const RES_SOUND = 0x0000_0200;
        const RES_SHARD = 0x0000_0400;
        const RES_CHAOS = 0x0000_0800;
        const RES_DISEN = 0x0000_1000;
        const RES_NEXUS = 0x0000_2000;
        const IMM_ACID = 0x0001_0000;
        const IMM_ELEC = 0x0002_0000;
        const IMM_FIRE = 0x0004_0000;
        const IMM_COLD = 0x0008_0000;
        const REFLECT = 0x0010_0000;
        const FREE_ACT = 0x0020_0000;
    }
}

bitflags! {
    /// Per-turn bookkeeping
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct MonsterMFlags: u8 {
        /// In the player's view
        const VIEW = 0x01;
        /// Just became visible this turn
        const NEWLY_SEEN = 0x02;
        /// Does not follow the noise flow
        const NO_FLOW = 0x04;
        /// Running from the player, as announced
        const FLEEING = 0x08;
    }
}

bits_serde!(SubAlign, u8);
bits_serde!(SmartLearn, u32);
bits_serde!(MonsterMFlags, u8);

/// Named countdowns; zero means inactive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterTimed {
    pub sleep: i16,
    pub fast: i16,
    pub slow: i16,
    pub stun: i16,
    pub confused: i16,
    pub monfear: i16,
    pub invuln: i16,
}

impl MonsterTimed {
    /// Tick every countdown down by one
    pub fn decrement(&mut self) {
        for t in [
            &mut self.fast,
            &mut self.slow,
            &mut self.stun,
            &mut self.confused,
            &mut self.monfear,
            &mut self.invuln,
        ] {
            if *t > 0 {
                *t -= 1;
            }
        }
    }
}

/// A live monster
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonsterEntity {
    /// True race (0 = empty slot)
    pub r_idx: usize,
    /// Race the player sees
    pub ap_r_idx: usize,
    pub pos: Pos2D,
    pub hp: i32,
    pub maxhp: i32,
    /// Max HP before drains and curses
    pub max_maxhp: i32,
    pub timed: MonsterTimed,
    /// Current speed (110 is normal)
    pub speed: i16,
    /// Energy still needed before the next action
    pub energy_need: i16,
    pub sub_align: SubAlign,
    pub allegiance: Allegiance,
    /// Position of the monster this one is hunting
    pub target: Option<Pos2D>,
    /// Items carried, by item index
    pub held_items: Vec<usize>,
    pub nickname: Option<String>,
    pub smart: SmartLearn,
    /// Summoner (self when unparented)
    pub parent_m_idx: usize,
    /// Distance to the player
    pub cdis: i32,
    /// Visible to the player
    pub ml: bool,
    pub mflag: MonsterMFlags,
}

impl MonsterEntity {
    pub fn new(r_idx: usize, pos: Pos2D, hp: i32) -> Self {
        Self {
            r_idx,
            ap_r_idx: r_idx,
            pos,
            hp,
            maxhp: hp,
            max_maxhp: hp,
            speed: 110,
            ..Default::default()
        }
    }

    /// Builder: allegiance
    pub fn with_allegiance(mut self, allegiance: Allegiance) -> Self {
        self.allegiance = allegiance;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.r_idx != 0
    }

    pub fn is_pet(&self) -> bool {
        self.allegiance == Allegiance::Pet
    }

    pub fn is_hostile(&self) -> bool {
        self.allegiance == Allegiance::Hostile
    }

    pub fn is_asleep(&self) -> bool {
        self.timed.sleep > 0
    }

    pub fn is_confused(&self) -> bool {
        self.timed.confused > 0
    }

    pub fn is_stunned(&self) -> bool {
        self.timed.stun > 0
    }

    pub fn is_fearful(&self) -> bool {
        self.timed.monfear > 0
    }

    pub fn is_accelerated(&self) -> bool {
        self.timed.fast > 0
    }

    pub fn is_decelerated(&self) -> bool {
        self.timed.slow > 0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.timed.invuln > 0
    }

    /// Speed after haste and slow
    pub fn get_temporary_speed(&self) -> i16 {
        let mut speed = self.speed;
        if self.is_accelerated() {
            speed += 10;
        }
        if self.is_decelerated() {
            speed -= 10;
        }
        speed
    }

    pub fn is_original_ap(&self) -> bool {
        self.r_idx == self.ap_r_idx
    }
}

/// Evil and good sub-alignments are at odds
pub fn check_hostile_align(a: SubAlign, b: SubAlign) -> bool {
    (a.contains(SubAlign::EVIL) && b.contains(SubAlign::GOOD))
        || (a.contains(SubAlign::GOOD) && b.contains(SubAlign::EVIL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_speed() {
        let mut m = MonsterEntity::new(1, Pos2D::new(1, 1), 10);
        assert_eq!(m.get_temporary_speed(), 110);
        m.timed.fast = 5;
        assert_eq!(m.get_temporary_speed(), 120);
        m.timed.slow = 5;
        assert_eq!(m.get_temporary_speed(), 110);
    }

    #[test]
    fn test_timed_decrement_stops_at_zero() {
        let mut t = MonsterTimed {
            stun: 1,
            ..Default::default()
        };
        t.decrement();
        t.decrement();
        assert_eq!(t.stun, 0);
    }

    #[test]
    fn test_hostile_align() {
        assert!(check_hostile_align(SubAlign::EVIL, SubAlign::GOOD));
        assert!(!check_hostile_align(SubAlign::EVIL, SubAlign::EVIL));
        assert!(!check_hostile_align(SubAlign::empty(), SubAlign::GOOD));
    }
}
