//! Slay, kill and brand multipliers for missiles

use log::trace;

use crate::item::{ItemEntity, SlayFlags};
use crate::monster::{KindFlags, ResistFlags};
use crate::world::RedrawFlags;
use crate::GameState;

use super::SniperMode;

/// Multipliers are in tenths
const MULT_BASE: i32 = 10;

/// Race-kind slays: (slay flag, kind, multiplier)
const KIND_SLAYS: [(SlayFlags, KindFlags, i32); 20] = [
    (SlayFlags::SLAY_ANIMAL, KindFlags::ANIMAL, 17),
    (SlayFlags::KILL_ANIMAL, KindFlags::ANIMAL, 27),
    (SlayFlags::SLAY_EVIL, KindFlags::EVIL, 15),
    (SlayFlags::KILL_EVIL, KindFlags::EVIL, 25),
    (SlayFlags::SLAY_GOOD, KindFlags::GOOD, 15),
    (SlayFlags::KILL_GOOD, KindFlags::GOOD, 25),
    (SlayFlags::SLAY_HUMAN, KindFlags::HUMAN, 17),
    (SlayFlags::KILL_HUMAN, KindFlags::HUMAN, 27),
    (SlayFlags::SLAY_UNDEAD, KindFlags::UNDEAD, 20),
    (SlayFlags::KILL_UNDEAD, KindFlags::UNDEAD, 30),
    (SlayFlags::SLAY_DEMON, KindFlags::DEMON, 20),
    (SlayFlags::KILL_DEMON, KindFlags::DEMON, 30),
    (SlayFlags::SLAY_ORC, KindFlags::ORC, 20),
    (SlayFlags::KILL_ORC, KindFlags::ORC, 30),
    (SlayFlags::SLAY_TROLL, KindFlags::TROLL, 20),
    (SlayFlags::KILL_TROLL, KindFlags::TROLL, 30),
    (SlayFlags::SLAY_GIANT, KindFlags::GIANT, 20),
    (SlayFlags::KILL_GIANT, KindFlags::GIANT, 30),
    (SlayFlags::SLAY_DRAGON, KindFlags::DRAGON, 20),
    (SlayFlags::KILL_DRAGON, KindFlags::DRAGON, 30),
];

/// Brands: (brand, immunity, vulnerability, multiplier)
const BRANDS: [(SlayFlags, ResistFlags, Option<ResistFlags>, i32); 5] = [
    (SlayFlags::BRAND_ACID, ResistFlags::IM_ACID, None, 17),
    (SlayFlags::BRAND_ELEC, ResistFlags::IM_ELEC, None, 17),
    (SlayFlags::BRAND_FIRE, ResistFlags::IM_FIRE, Some(ResistFlags::HURT_FIRE), 17),
    (SlayFlags::BRAND_COLD, ResistFlags::IM_COLD, Some(ResistFlags::HURT_COLD), 17),
    (SlayFlags::BRAND_POIS, ResistFlags::IM_POIS, None, 17),
];

/// Vulnerable targets take this much from a matching brand
const BRAND_HURT_MULT: i32 = 25;

/// Missile damage against `m_idx` after slays, brands and the sniper's
/// elemental shots
///
/// Brands a monster turns out to be immune to are remembered in its lore.
pub fn calc_shot_damage_with_slay(
    state: &mut GameState,
    bow: &ItemEntity,
    arrow: &ItemEntity,
    tdam: i32,
    m_idx: usize,
    snipe: SniperMode,
) -> i32 {
    let flags = bow.slays | arrow.slays;
    let r_idx = state.floor.monster(m_idx).r_idx;
    let seen = state.is_original_ap_and_seen(m_idx);
    let race = state.races.get(r_idx);
    let (kind, resist) = (race.kind, race.resist);

    let mut mult = MULT_BASE;
    let mut learned_kind = KindFlags::empty();
    let mut learned_resist = ResistFlags::empty();

    for (slay, k, m) in KIND_SLAYS {
        if flags.contains(slay) && kind.contains(k) {
            learned_kind |= k;
            mult = mult.max(m);
        }
    }
    for (brand, immunity, hurt, m) in BRANDS {
        if !flags.contains(brand) {
            continue;
        }
        if resist.contains(immunity) {
            learned_resist |= immunity;
            continue;
        }
        match hurt {
            Some(h) if resist.contains(h) => {
                learned_resist |= h;
                mult = mult.max(BRAND_HURT_MULT);
            }
            _ => mult = mult.max(m),
        }
    }

    if flags.contains(SlayFlags::FORCE_WEAPON) && state.player.csp > state.player.msp / 30 {
        state.player.csp -= 1 + state.player.msp / 30;
        state.set_redraw(RedrawFlags::MANA);
        mult = mult * 5 / 2;
    }

    mult = snipe_multiplier(snipe, kind, resist, mult, &mut learned_resist);

    if seen {
        if let Some(race) = state.races.get_mut(r_idx) {
            race.lore.kinds |= learned_kind;
            race.lore.resists |= learned_resist;
        }
    }
    trace!("shot at monster {m_idx}: x{}.{}", mult / 10, mult % 10);
    tdam * mult / MULT_BASE
}

/// Sniper shots add elemental or holy damage on top of the missile's own
fn snipe_multiplier(
    snipe: SniperMode,
    kind: KindFlags,
    resist: ResistFlags,
    mult: i32,
    learned: &mut ResistFlags,
) -> i32 {
    let element = |immunity: ResistFlags,
                   hurt: Option<ResistFlags>,
                   base: i32,
                   learned: &mut ResistFlags| {
        if resist.contains(immunity) {
            *learned |= immunity;
            mult
        } else if let Some(h) = hurt.filter(|h| resist.contains(*h)) {
            *learned |= h;
            mult.max(base * 2)
        } else {
            mult.max(base)
        }
    };
    match snipe {
        SniperMode::Lite if resist.contains(ResistFlags::HURT_LITE) => {
            *learned |= ResistFlags::HURT_LITE;
            mult.max(20)
        }
        SniperMode::Fire => {
            element(ResistFlags::IM_FIRE, Some(ResistFlags::HURT_FIRE), 15, learned)
        }
        SniperMode::Cold => {
            element(ResistFlags::IM_COLD, Some(ResistFlags::HURT_COLD), 15, learned)
        }
        SniperMode::Elec => element(ResistFlags::IM_ELEC, None, 18, learned),
        SniperMode::Evilness if kind.contains(KindFlags::GOOD) => mult.max(15),
        SniperMode::Holyness if kind.contains(KindFlags::EVIL) => {
            if resist.contains(ResistFlags::HURT_LITE) {
                *learned |= ResistFlags::HURT_LITE;
                mult.max(20)
            } else {
                mult.max(15)
            }
        }
        SniperMode::Final => mult.max(50),
        _ => mult,
    }
}
