//! Critical hits for melee blows and missiles

use crate::player::{Player, PlayerClass};
use crate::{GameState, BTH_PLUS_ADJ, WEAPON_EXP_MASTER};

/// Sides of the missile critical roll
pub const SHOT_CRIT_ROLL: i32 = 500;
/// Sides of the melee critical roll
pub const BLOW_CRIT_ROLL: i32 = 650;

/// Chance scale (out of 10000) for a missile critical
pub const SHOT_CRIT_SCALE: i32 = 10000;

/// Missile critical tiers on `weight * roll`
pub const SHOT_TIER_GOOD: i32 = 900;
pub const SHOT_TIER_GREAT: i32 = 1350;

/// Is the player firing bolts from a crossbow?
pub fn fires_bolts(player: &Player) -> bool {
    player.launcher.as_ref().is_some_and(|l| l.kind.is_crossbow())
}

/// Critical "power" of a shot, out of [`SHOT_CRIT_SCALE`]
///
/// Both the rolled and the expected critical use this same figure.
pub fn shot_power(player: &Player, plus_ammo: i32, plus_bow: i32) -> i32 {
    let bonus = player.to_h_b + plus_ammo;
    let mut i = if fires_bolts(player) {
        player.skill_thb + (player.launcher_exp / 400 + bonus) * BTH_PLUS_ADJ
    } else {
        let exp = (player.launcher_exp - WEAPON_EXP_MASTER / 2) / 200;
        player.skill_thb + (exp + bonus) * BTH_PLUS_ADJ
    };
    i += i * player.concent / 10;
    if player.class == PlayerClass::Sniper && fires_bolts(player) {
        i *= 2;
    }
    let focus = if player.concent > 0 { player.concent + 5 } else { 5 };
    i += plus_bow * 8 * focus;
    i.max(0)
}

/// Damage after a missile critical tier for `weight * roll`
pub fn shot_tier_damage(k: i32, dam: i32) -> i32 {
    if k < SHOT_TIER_GOOD {
        dam * 3 / 2
    } else if k < SHOT_TIER_GREAT {
        dam * 2
    } else {
        dam * 3
    }
}

/// Roll for a missile critical and return the (possibly raised) damage
pub fn critical_shot(
    state: &mut GameState,
    weight: i32,
    plus_ammo: i32,
    plus_bow: i32,
    dam: i32,
) -> i32 {
    let power = shot_power(&state.player, plus_ammo, plus_bow);
    if state.rng.randint1(SHOT_CRIT_SCALE) > power {
        return dam;
    }
    let k = weight * state.rng.randint1(SHOT_CRIT_ROLL);
    let msg = if k < SHOT_TIER_GOOD {
        "It was a good hit!"
    } else if k < SHOT_TIER_GREAT {
        "It was a great hit!"
    } else {
        "It was a superb hit!"
    };
    state.message(msg);
    shot_tier_damage(k, dam)
}

/// Chance scale for a melee critical
pub fn blow_crit_scale(player: &Player) -> i32 {
    if player.class == PlayerClass::Ninja { 4444 } else { 5000 }
}

/// Critical power of a melee blow
pub fn blow_power(player: &Player, weight: i32, plus: i32) -> i32 {
    (weight + plus * 5 + player.skill_thn).max(0)
}

/// Damage after a melee critical tier for `weight + roll`
pub fn blow_tier_damage(k: i32, dam: i32) -> i32 {
    match k {
        k if k < 400 => 2 * dam + 5,
        k if k < 700 => 2 * dam + 10,
        k if k < 900 => 3 * dam + 15,
        k if k < 1300 => 3 * dam + 20,
        _ => 7 * dam / 2 + 25,
    }
}

/// Roll for a melee critical
pub fn critical_norm(state: &mut GameState, weight: i32, plus: i32, dam: i32) -> i32 {
    let power = blow_power(&state.player, weight, plus);
    if state.rng.randint1(blow_crit_scale(&state.player)) > power {
        return dam;
    }
    let k = weight + state.rng.randint1(BLOW_CRIT_ROLL);
    let msg = match k {
        k if k < 400 => "It was a good hit!",
        k if k < 700 => "It was a great hit!",
        k if k < 900 => "It was a superb hit!",
        k if k < 1300 => "It was a *GREAT* hit!",
        _ => "It was a *SUPERB* hit!",
    };
    state.message(msg);
    blow_tier_damage(k, dam)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Floor, Pos2D};
    use crate::monster::RaceTable;
    use crate::GameRng;

    fn state_with(draws: Vec<u32>) -> GameState {
        let floor = Floor::from_ascii(&["###", "#.#", "###"]).unwrap();
        let mut player = Player::new(Pos2D::new(1, 1));
        player.launcher_exp = WEAPON_EXP_MASTER;
        GameState::new(floor, player, RaceTable::new(), GameRng::scripted(draws))
    }

    #[test]
    fn test_shot_power_master_archer() {
        let state = state_with(vec![]);
        // 40 + (8000 - 4000) / 200 * 3
        assert_eq!(shot_power(&state.player, 0, 0), 100);
        assert_eq!(shot_power(&state.player, 0, 2), 180);
    }

    #[test]
    fn test_critical_shot_tiers() {
        // weight 10: rolls 89/90 straddle 900, 134/135 straddle 1350
        let cases = [(88, 30), (89, 40), (133, 40), (134, 60)];
        for (draw, want) in cases {
            let mut state = state_with(vec![0, draw]);
            assert_eq!(critical_shot(&mut state, 10, 0, 0, 20), want, "roll {}", draw + 1);
        }
    }

    #[test]
    fn test_critical_shot_can_miss_the_crit() {
        let mut state = state_with(vec![9999]);
        assert_eq!(critical_shot(&mut state, 10, 0, 0, 20), 20);
        assert!(state.messages.is_empty());
    }

    #[test]
    fn test_blow_tiers() {
        assert_eq!(blow_tier_damage(399, 10), 25);
        assert_eq!(blow_tier_damage(400, 10), 30);
        assert_eq!(blow_tier_damage(1300, 10), 60);
    }
}
