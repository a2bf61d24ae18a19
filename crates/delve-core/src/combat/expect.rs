//! Closed-form damage expectations
//!
//! These walk the same critical tables the dice use, so the numbers shown
//! to the player never drift from what actually happens.

use crate::item::ItemEntity;
use crate::player::Player;
use crate::GameState;

use super::critical::{
    blow_crit_scale, blow_power, blow_tier_damage, shot_power, shot_tier_damage, BLOW_CRIT_ROLL,
    SHOT_CRIT_ROLL, SHOT_CRIT_SCALE,
};
use super::fire::fire_multiplier;

/// Expected melee damage once criticals are folded in
pub fn calc_expect_crit(player: &Player, weight: i32, plus: i32, dam: i32) -> i32 {
    let scale = blow_crit_scale(player);
    let chance = blow_power(player, weight, plus).min(scale);
    let total: i64 = (1..=BLOW_CRIT_ROLL)
        .map(|roll| i64::from(blow_tier_damage(weight + roll, dam)))
        .sum();
    let crit_avg = total / i64::from(BLOW_CRIT_ROLL);
    let plain = i64::from(dam) * i64::from(scale - chance);
    let expect = (crit_avg * i64::from(chance) + plain) / i64::from(scale);
    expect as i32
}

/// Expected melee damage of a dice roll scaled by a slay multiplier
///
/// `mult / div` is the slay, `force` the mana-fuelled bonus.
pub fn calc_expect_dice(
    player: &Player,
    dam: i32,
    mult: i32,
    div: i32,
    force: bool,
    weight: i32,
    plus: i32,
) -> i32 {
    let mut dam = dam * mult / div.max(1);
    if force {
        dam = dam * 5 / 2;
    }
    calc_expect_crit(player, weight, plus, dam)
}

/// Missile critical chance out of 10000
pub fn calc_crit_ratio_shot(player: &Player, plus_ammo: i32, plus_bow: i32) -> i32 {
    shot_power(player, plus_ammo, plus_bow).min(SHOT_CRIT_SCALE)
}

/// Expected missile damage once criticals are folded in
pub fn calc_expect_crit_shot(
    player: &Player,
    weight: i32,
    plus_ammo: i32,
    plus_bow: i32,
    dam: i32,
) -> i32 {
    let weight = weight.max(1);
    let chance = i64::from(calc_crit_ratio_shot(player, plus_ammo, plus_bow));
    let total: i64 = (1..=SHOT_CRIT_ROLL)
        .map(|roll| i64::from(shot_tier_damage(weight * roll, dam)))
        .sum();
    let scale = i64::from(SHOT_CRIT_SCALE);
    let expect = (total * chance + i64::from(dam) * i64::from(SHOT_CRIT_ROLL) * (scale - chance))
        / (i64::from(SHOT_CRIT_ROLL) * scale);
    expect as i32
}

/// Expected damage of one missile fired from `bow`, before slays
pub fn calc_expect_shot(state: &GameState, bow: &ItemEntity, ammo: &ItemEntity) -> i32 {
    let base =
        (ammo.dd * (ammo.ds + 1) / 2 + ammo.to_d + bow.to_d) * fire_multiplier(state, bow) / 100;
    calc_expect_crit_shot(&state.player, ammo.weight, ammo.to_h, bow.to_h, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::critical_shot;
    use crate::grid::{Floor, Pos2D};
    use crate::monster::RaceTable;
    use crate::{GameRng, WEAPON_EXP_MASTER};

    fn archer() -> Player {
        let mut p = Player::new(Pos2D::new(1, 1));
        p.skill_thb = 1200;
        p.launcher_exp = WEAPON_EXP_MASTER;
        p
    }

    #[test]
    fn test_no_crit_chance_means_plain_damage() {
        let mut p = archer();
        p.skill_thb = 0;
        p.launcher_exp = 0;
        assert_eq!(calc_crit_ratio_shot(&p, 0, 0), 0);
        assert_eq!(calc_expect_crit_shot(&p, 10, 0, 0, 20), 20);
    }

    #[test]
    fn test_heavier_missiles_crit_harder() {
        let p = archer();
        let light = calc_expect_crit_shot(&p, 2, 0, 0, 40);
        let heavy = calc_expect_crit_shot(&p, 30, 0, 0, 40);
        assert!(heavy > light);
        assert!(light > 40);
    }

    #[test]
    fn test_expectation_matches_rolled_average() {
        let floor = Floor::from_ascii(&["###", "#.#", "###"]).unwrap();
        let mut state = GameState::new(floor, archer(), RaceTable::new(), GameRng::new(77));
        let (weight, dam) = (8, 30);
        let expect = calc_expect_crit_shot(&state.player, weight, 0, 0, dam);

        let samples = 40_000;
        let mut total: i64 = 0;
        for i in 0..samples {
            total += i64::from(critical_shot(&mut state, weight, 0, 0, dam));
            if i % 1000 == 0 {
                state.clear_messages();
            }
        }
        let mean = total as f64 / f64::from(samples);
        assert!(
            (mean - f64::from(expect)).abs() < 1.0,
            "rolled mean {mean} vs expected {expect}"
        );
    }

    #[test]
    fn test_expect_crit_melee_bounds() {
        let p = archer();
        let dam = 12;
        let e = calc_expect_crit(&p, 150, 5, dam);
        assert!(e >= dam);
        assert!(e <= 7 * dam / 2 + 25);
        assert_eq!(
            calc_expect_dice(&p, 10, 20, 10, false, 150, 5),
            calc_expect_crit(&p, 150, 5, 20)
        );
    }
}
