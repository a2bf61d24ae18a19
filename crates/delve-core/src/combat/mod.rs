//! Combat resolution: melee blows, missiles, criticals and slays

mod critical;
mod expect;
mod fire;
mod melee;
mod slay;

pub use critical::{
    blow_power, critical_norm, critical_shot, fires_bolts, shot_power, shot_tier_damage,
};
pub use expect::{
    calc_crit_ratio_shot, calc_expect_crit, calc_expect_crit_shot, calc_expect_dice,
    calc_expect_shot,
};
pub use fire::{
    exe_fire, fire_multiplier, shot_chance, shot_range, test_hit_fire, FireOutcome, SniperMode,
};
pub use melee::{
    check_hit_by_monster, monster_attack_monster, monster_attack_player, py_attack, test_hit_norm,
};
pub use slay::calc_shot_damage_with_slay;
