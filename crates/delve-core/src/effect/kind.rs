//! Damage and status effect types

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geometry::BlastBlock;

/// What a projection does to whatever it touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum EffectType {
    Acid,
    Elec,
    Fire,
    Cold,
    Poison,
    Nether,
    Light,
    Dark,
    Water,
    Plasma,
    Shards,
    Sound,
    Confusion,
    Chaos,
    Nexus,
    Disenchant,
    Time,
    Inertia,
    Gravity,
    Force,
    Mana,
    Nuke,
    Disintegrate,
    Void,
    Abyss,
    Ice,
    Missile,
    Arrow,
    Rocket,
    PsySpear,
    MindBlast,
    BrainSmash,
    Cause,
    HandDoom,
    DrainMana,
    // Status only
    Terrify,
    Blind,
    OldConf,
    OldSlow,
    OldSleep,
}

impl EffectType {
    /// What stops a blast of this type from spreading
    pub fn blast_block(self) -> BlastBlock {
        match self {
            EffectType::Light => BlastBlock::Los,
            EffectType::Disintegrate => BlastBlock::Disintegrate,
            _ => BlastBlock::Project,
        }
    }

    /// Status effects deal no hit point damage
    pub fn is_status(self) -> bool {
        matches!(
            self,
            EffectType::Terrify
                | EffectType::Blind
                | EffectType::OldConf
                | EffectType::OldSlow
                | EffectType::OldSleep
        )
    }

    /// Mind attacks: they need a mind to hit
    pub fn is_mental(self) -> bool {
        matches!(
            self,
            EffectType::MindBlast | EffectType::BrainSmash | EffectType::DrainMana
        )
    }

    /// Word used in "You are hit by ..." messages
    pub fn noun(self) -> &'static str {
        match self {
            EffectType::Acid => "acid",
            EffectType::Elec => "lightning",
            EffectType::Fire => "fire",
            EffectType::Cold => "frost",
            EffectType::Poison => "poison",
            EffectType::Nether => "nether",
            EffectType::Light => "light",
            EffectType::Dark => "darkness",
            EffectType::Water => "water",
            EffectType::Plasma => "plasma",
            EffectType::Shards => "shards",
            EffectType::Sound => "sound",
            EffectType::Confusion | EffectType::OldConf => "confusion",
            EffectType::Chaos => "chaos",
            EffectType::Nexus => "nexus",
            EffectType::Disenchant => "disenchantment",
            EffectType::Time => "time",
            EffectType::Inertia => "inertia",
            EffectType::Gravity => "gravity",
            EffectType::Force => "force",
            EffectType::Mana => "pure energy",
            EffectType::Nuke => "toxic waste",
            EffectType::Disintegrate => "disintegration",
            EffectType::Void => "void",
            EffectType::Abyss => "the abyss",
            EffectType::Ice => "ice",
            EffectType::Missile => "a magic missile",
            EffectType::Arrow => "a missile",
            EffectType::Rocket => "a rocket",
            EffectType::PsySpear => "a psychic spear",
            EffectType::MindBlast | EffectType::BrainSmash => "a mental attack",
            EffectType::Cause | EffectType::HandDoom => "a curse",
            EffectType::DrainMana => "a mana drain",
            EffectType::Terrify => "fear",
            EffectType::Blind => "blindness",
            EffectType::OldSlow => "slowness",
            EffectType::OldSleep => "paralysis",
        }
    }
}
