//! Monster spells: what they are, when a monster may use them, and what
//! happens when it does

mod ability;
mod dispatch;
mod judgement;
mod summon;

pub use ability::{AbilitySet, MonsterAbility};
pub use dispatch::{
    ball, beam, bolt, breath, cast_ability, make_attack_spell, monst_spell_monst, pointed, rocket,
    SpellTarget,
};
pub use judgement::{
    breath_direct, check_melee_spell_set, choose_attack_spell, direct_beam, dispel_check_monster,
    raise_possible, summon_possible,
};
pub use summon::{find_summon_spot, summon_for_ability, summon_kin_of, summon_specific, SummonKind};

use crate::effect::EffectType;
use crate::monster::{MonraceDefinition, MonsterEntity};
use crate::rng::GameRng;

use MonsterAbility as A;

/// How an attack spell travels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellShape {
    Bolt,
    Beam,
    Ball(i32),
    Breath,
    Rocket,
    /// Hits the target directly, no projectile
    Pointed,
}

impl MonsterAbility {
    /// Effect type and delivery of a damaging or status spell
    pub fn effect(self) -> Option<(EffectType, SpellShape)> {
        use EffectType as E;
        use SpellShape::*;
        let info = match self {
            A::Shoot => (E::Arrow, Bolt),
            A::Rocket => (E::Rocket, SpellShape::Rocket),
            A::BrAcid => (E::Acid, Breath),
            A::BrElec => (E::Elec, Breath),
            A::BrFire => (E::Fire, Breath),
            A::BrCold => (E::Cold, Breath),
            A::BrPois => (E::Poison, Breath),
            A::BrNether => (E::Nether, Breath),
            A::BrLite => (E::Light, Breath),
            A::BrDark => (E::Dark, Breath),
            A::BrConf => (E::Confusion, Breath),
            A::BrSound => (E::Sound, Breath),
            A::BrChaos => (E::Chaos, Breath),
            A::BrDisen => (E::Disenchant, Breath),
            A::BrNexus => (E::Nexus, Breath),
            A::BrTime => (E::Time, Breath),
            A::BrInertia => (E::Inertia, Breath),
            A::BrGravity => (E::Gravity, Breath),
            A::BrShards => (E::Shards, Breath),
            A::BrPlasma => (E::Plasma, Breath),
            A::BrForce => (E::Force, Breath),
            A::BrMana => (E::Mana, Breath),
            A::BrNuke => (E::Nuke, Breath),
            A::BrDisi => (E::Disintegrate, Breath),
            A::BrVoid => (E::Void, Breath),
            A::BrAbyss => (E::Abyss, Breath),
            A::BaAcid => (E::Acid, Ball(2)),
            A::BaElec => (E::Elec, Ball(2)),
            A::BaFire => (E::Fire, Ball(2)),
            A::BaCold => (E::Cold, Ball(2)),
            A::BaPois => (E::Poison, Ball(2)),
            A::BaNether => (E::Nether, Ball(2)),
            A::BaNuke => (E::Nuke, Ball(2)),
            A::BaWater => (E::Water, Ball(4)),
            A::BaMana => (E::Mana, Ball(4)),
            A::BaDark => (E::Dark, Ball(4)),
            A::BaLite => (E::Light, Ball(4)),
            A::BaChaos => (E::Chaos, Ball(4)),
            A::BaVoid => (E::Void, Ball(4)),
            A::BaAbyss => (E::Abyss, Ball(4)),
            A::DrainMana => (E::DrainMana, Pointed),
            A::MindBlast => (E::MindBlast, Pointed),
            A::BrainSmash => (E::BrainSmash, Pointed),
            A::Cause1 | A::Cause2 | A::Cause3 | A::Cause4 => (E::Cause, Pointed),
            A::HandDoom => (E::HandDoom, Pointed),
            A::BoAcid => (E::Acid, Bolt),
            A::BoElec => (E::Elec, Bolt),
            A::BoFire => (E::Fire, Bolt),
            A::BoCold => (E::Cold, Bolt),
            A::BoPois => (E::Poison, Bolt),
            A::BoNether => (E::Nether, Bolt),
            A::BoWater => (E::Water, Bolt),
            A::BoMana => (E::Mana, Bolt),
            A::BoPlasma => (E::Plasma, Bolt),
            A::BoIce => (E::Ice, Bolt),
            A::Missile => (E::Missile, Bolt),
            A::BoVoid => (E::Void, Bolt),
            A::BoAbyss => (E::Abyss, Bolt),
            A::PsySpear => (E::PsySpear, Beam),
            A::Scare => (E::Terrify, Pointed),
            A::Blind => (E::Blind, Pointed),
            A::Conf => (E::OldConf, Pointed),
            A::Slow => (E::OldSlow, Pointed),
            A::Hold => (E::OldSleep, Pointed),
            _ => return None,
        };
        Some(info)
    }

    /// Verb phrase for "<caster> <verb>."
    pub fn verb(self) -> &'static str {
        match self {
            a if a.is_breath() => "breathes",
            A::Shoot => "fires a missile",
            A::Rocket => "fires a rocket",
            a if a.is_ball() => "casts a ball spell",
            a if a.is_bolt() => "casts a bolt",
            A::PsySpear => "throws a psycho-spear",
            A::DrainMana => "draws psychic energy",
            A::MindBlast | A::BrainSmash => "gazes intently",
            A::Cause1 | A::Cause2 | A::Cause3 | A::Cause4 => "points and curses",
            A::HandDoom => "invokes the Hand of Doom",
            A::Scare => "casts a fearful illusion",
            A::Blind => "casts a spell, burning eyes",
            A::Conf => "creates a mesmerising illusion",
            A::Slow => "drains power from muscles",
            A::Hold => "stares",
            A::Shriek => "makes a high pitched shriek",
            A::Haste => "concentrates on its body",
            A::Heal => "concentrates on its wounds",
            A::Invulner => "casts a Globe of Invulnerability",
            A::Blink => "blinks away",
            A::Tport => "teleports away",
            A::TeleTo => "commands a return",
            A::TeleAway => "teleports its foe away",
            A::TeleLevel => "gestures at the floor",
            A::Darkness => "gestures in shadow",
            A::Dispel => "dispels magic",
            A::RaiseDead => "casts a spell to revive corpses",
            A::Special => "does something special",
            a if a.is_summon() => "magically summons help",
            _ => "casts a spell",
        }
    }
}

/// Base damage of an attack spell cast by this monster
///
/// `target_hp` is only read by the Hand of Doom.
pub fn spell_damage(
    ability: MonsterAbility,
    caster: &MonsterEntity,
    race: &MonraceDefinition,
    target_hp: i32,
    rng: &mut GameRng,
) -> i32 {
    let rlev = race.level.max(1);
    let hp = caster.hp.max(0);
    let powerful = race.is_powerful();
    let breath = |div: i32, cap: i32| (hp / div).min(cap);
    match ability {
        A::BrAcid | A::BrElec | A::BrFire | A::BrCold => breath(3, 1600),
        A::BrPois | A::BrNuke => breath(3, 800),
        A::BrNether => breath(6, 550),
        A::BrLite | A::BrDark | A::BrConf => breath(6, 400),
        A::BrSound | A::BrDisen | A::BrShards => breath(6, 500),
        A::BrChaos => breath(6, 600),
        A::BrNexus | A::BrMana | A::BrVoid | A::BrAbyss => breath(3, 250),
        A::BrTime | A::BrPlasma | A::BrDisi => breath(6, 150),
        A::BrInertia | A::BrForce => breath(6, 200),
        A::BrGravity => breath(3, 200),
        A::Rocket => breath(4, 800),
        A::Shoot => match race.blows.first() {
            Some(b) => rng.dice(b.dd, b.ds),
            None => rng.dice(1, 6),
        },
        A::BaAcid => rng.randint1(rlev * 3) + 15,
        A::BaElec => rng.randint1(rlev * 3 / 2) + 8,
        A::BaFire => rng.randint1(rlev * 7 / 2) + 10,
        A::BaCold => rng.randint1(rlev * 3 / 2) + 10,
        A::BaPois => rng.dice(12, 2),
        A::BaNuke => rlev + rng.dice(10, 6),
        A::BaNether => 50 + rng.dice(10, 10) + rlev,
        A::BaWater => 50 + rng.randint1(rlev * 5 / 2),
        A::BaMana | A::BaDark | A::BaLite => rlev * 4 + 50 + rng.dice(10, 10),
        A::BaChaos => rlev * 2 + rng.dice(10, 10),
        A::BaVoid | A::BaAbyss => rlev * 3 + 50 + rng.dice(10, 10),
        A::BoAcid => rng.dice(7, 8) + rlev / 3,
        A::BoElec => rng.dice(4, 8) + rlev / 3,
        A::BoFire => rng.dice(9, 8) + rlev / 3,
        A::BoCold => rng.dice(6, 8) + rlev / 3,
        A::BoPois => rng.dice(6, 8) + rlev / 3,
        A::BoNether => 30 + rng.dice(5, 5) + rlev * 2,
        A::BoWater => rng.dice(10, 10) + rlev * 3 / 2,
        A::BoMana => rng.randint1(rlev * 7 / 2) + 50,
        A::BoPlasma => 10 + rng.dice(8, 7) + rlev,
        A::BoIce => rng.dice(6, 6) + rlev,
        A::Missile => rng.dice(2, 4) + rlev / 3,
        A::BoVoid | A::BoAbyss => rng.dice(10, 15) + rlev * 3 / 2,
        A::PsySpear if powerful => rng.randint1(rlev * 2) + 150,
        A::PsySpear => rng.randint1(rlev * 3 / 2) + 100,
        A::MindBlast => rng.dice(7, 8),
        A::BrainSmash => rng.dice(12, 12),
        A::Cause1 => rng.dice(3, 8),
        A::Cause2 => rng.dice(8, 8),
        A::Cause3 => rng.dice(10, 15),
        A::Cause4 => rng.dice(15, 15),
        A::HandDoom => (40 + rng.randint1(20)) * target_hp / 100,
        // Status spells: the power used for saving throws
        _ => rlev,
    }
}
