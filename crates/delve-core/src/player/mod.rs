//! The player: stats the core reads, plus the movement, run and travel
//! engines

mod movement;
mod run;
mod travel;

pub use movement::{exe_movement, MoveOutcome};
pub use run::{run_init, run_step, run_test, RunState};
pub use travel::{travel_step, travel_test, Travel, TravelStop};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::grid::Pos2D;
use crate::item::ItemEntity;
use crate::world::{PetFollow, PetPermissions};

/// Player classes with rules of their own in the core
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum PlayerClass {
    #[default]
    Warrior,
    Mage,
    Priest,
    Rogue,
    Ranger,
    Paladin,
    Archer,
    Berserker,
    Ninja,
    Sniper,
    Monk,
}

/// Personalities
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Personality {
    #[default]
    Ordinary,
    Mighty,
    Shrewd,
    Pious,
    Nimble,
    Fearless,
    Combat,
    /// Sometimes just misses
    Lazy,
    Lucky,
    Patient,
}

bitflags! {
    /// Player resistances monsters can learn about
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct PlayerResist: u32 {
        const ACID = 0x0001;
        const ELEC = 0x0002;
        const FIRE = 0x0004;
        const COLD = 0x0008;
        const POIS = 0x0010;
        const NETHER = 0x0020;
        const LITE = 0x0040;
        const DARK = 0x0080;
        const CONF = 0x0100;
        const SOUND = 0x0200;
        const SHARDS = 0x0400;
        const CHAOS = 0x0800;
        const DISEN = 0x1000;
        const NEXUS = 0x2000;
        const IM_ACID = 0x0001_0000;
        const IM_ELEC = 0x0002_0000;
        const IM_FIRE = 0x0004_0000;
        const IM_COLD = 0x0008_0000;
        const REFLECT = 0x0010_0000;
        const FREE_ACT = 0x0020_0000;
    }
}

bits_serde!(PlayerResist, u32);

/// Player countdowns; zero means inactive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTimed {
    pub blind: i16,
    pub confused: i16,
    pub stun: i16,
    /// Hallucination
    pub image: i16,
    pub afraid: i16,
    /// Berserk rage
    pub shero: i16,
    pub paralyzed: i16,
    pub fast: i16,
    pub slow: i16,
    pub invuln: i16,
    pub wraith_form: i16,
    pub shield: i16,
    pub magicdef: i16,
}

/// The player character, as far as the core is concerned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Pos2D,
    pub lev: i32,
    pub chp: i32,
    pub mhp: i32,
    pub csp: i32,
    pub msp: i32,
    /// Fractional mana, in 1/65536 points
    pub csp_frac: i32,
    pub ac: i32,
    pub class: PlayerClass,
    pub personality: Personality,
    pub timed: PlayerTimed,
    pub resist: PlayerResist,

    /// Energy spent by the current action
    pub energy_use: i32,

    /// Ridden monster (0 = on foot)
    pub riding: usize,
    pub levitation: bool,
    /// Walks through walls
    pub pass_wall: bool,
    /// Dissolves walls by walking into them
    pub kill_wall: bool,
    pub can_swim: bool,
    pub immune_lava: bool,
    pub see_invisible: bool,
    /// Radius of the player's own light
    pub cur_lite: i32,

    /// Missile skill
    pub skill_thb: i32,
    /// Melee skill
    pub skill_thn: i32,
    /// Saving throw, percent
    pub skill_sav: i32,
    /// Disarming and lock picking
    pub skill_dis: i32,
    /// Riding proficiency
    pub skill_riding: i32,
    /// Experience with the wielded launcher
    pub launcher_exp: i32,
    /// Missile to-hit bonus from equipment
    pub to_h_b: i32,
    /// Strength damage adjustment, 128 is neutral
    pub str_td: i32,
    pub xtra_might: bool,
    /// Shots per turn, times 100
    pub num_fire: i32,
    /// Sniper concentration
    pub concent: i32,
    /// Melee blows per turn
    pub num_blow: i32,
    /// Wielding a weapon that thirsts for any blood
    pub bloodthirsty_weapon: bool,

    pub launcher: Option<ItemEntity>,
    pub weapon: Option<ItemEntity>,
    pub quiver: Vec<ItemEntity>,

    pub pet_permissions: PetPermissions,
    pub pet_follow: PetFollow,
    /// Monster the player told the pets to attack (0 = none)
    pub pet_target: usize,

    pub is_dead: bool,
    /// Pulled off the floor by a spell; the caller changes level
    pub leaving: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Pos2D::default(),
            lev: 1,
            chp: 20,
            mhp: 20,
            csp: 0,
            msp: 0,
            csp_frac: 0,
            ac: 10,
            class: PlayerClass::default(),
            personality: Personality::default(),
            timed: PlayerTimed::default(),
            resist: PlayerResist::empty(),
            energy_use: 0,
            riding: 0,
            levitation: false,
            pass_wall: false,
            kill_wall: false,
            can_swim: false,
            immune_lava: false,
            see_invisible: false,
            cur_lite: 1,
            skill_thb: 40,
            skill_thn: 40,
            skill_sav: 30,
            skill_dis: 30,
            skill_riding: 0,
            launcher_exp: 0,
            to_h_b: 0,
            str_td: 128,
            xtra_might: false,
            num_fire: 100,
            concent: 0,
            num_blow: 1,
            bloodthirsty_weapon: false,
            launcher: None,
            weapon: None,
            quiver: Vec::new(),
            pet_permissions: PetPermissions::default(),
            pet_follow: PetFollow::default(),
            pet_target: 0,
            is_dead: false,
            leaving: false,
        }
    }
}

impl Player {
    pub fn new(pos: Pos2D) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }

    pub fn is_blind(&self) -> bool {
        self.timed.blind > 0
    }

    pub fn is_confused(&self) -> bool {
        self.timed.confused > 0
    }

    pub fn is_stunned(&self) -> bool {
        self.timed.stun > 0
    }

    pub fn is_hallucinating(&self) -> bool {
        self.timed.image > 0
    }

    pub fn is_berserk(&self) -> bool {
        self.timed.shero > 0
    }

    /// Confusion, stun or hallucination: blocked moves still cost a turn
    pub fn is_disoriented(&self) -> bool {
        self.is_confused() || self.is_stunned() || self.is_hallucinating()
    }

    pub fn is_riding(&self) -> bool {
        self.riding != 0
    }

    /// Any buff a dispel would strip
    pub fn has_dispellable_buff(&self) -> bool {
        let t = &self.timed;
        t.invuln > 0
            || t.wraith_form > 0
            || t.shield > 0
            || t.magicdef > 0
            || t.fast > 0
            || t.shero > 0
    }

    /// Strip every dispellable buff
    pub fn dispel(&mut self) {
        let t = &mut self.timed;
        t.invuln = 0;
        t.wraith_form = 0;
        t.shield = 0;
        t.magicdef = 0;
        t.fast = 0;
        t.shero = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disoriented() {
        let mut p = Player::new(Pos2D::new(2, 2));
        assert!(!p.is_disoriented());
        p.timed.image = 3;
        assert!(p.is_disoriented());
    }

    #[test]
    fn test_dispellable() {
        let mut p = Player::default();
        assert!(!p.has_dispellable_buff());
        p.timed.shield = 10;
        assert!(p.has_dispellable_buff());
    }
}
