//! Mana the player pays to keep pets around

use crate::state::GameState;
use crate::world::RedrawFlags;

/// Normal regeneration rate
pub const PY_REGEN_NORMAL: i32 = 197;
/// Minimum mana regeneration per turn, in 1/65536 points
const PY_REGEN_MNBASE: i32 = 524;
/// Player levels times 80 over this are paid for free
const UPKEEP_DIVIDER: i32 = 20;

/// Percent of normal mana regeneration eaten by the current pets (0..=1000)
///
/// Ordinary pets weigh their level, uniques five levels more, tenfold. A
/// ridden unique is cheaper since it works for its keep.
pub fn calculate_upkeep(state: &GameState) -> i32 {
    let mut total_friends = 0;
    let mut total_levels = 0;
    for m_idx in state.floor.monster_indices() {
        let m = state.floor.monster(m_idx);
        if !m.is_pet() {
            continue;
        }
        total_friends += 1;
        let race = state.races.get(m.r_idx);
        total_levels += if !race.is_unique() {
            race.level
        } else if state.player.riding == m_idx {
            (race.level + 5) * 2
        } else {
            (race.level + 5) * 10
        };
    }
    if total_friends == 0 {
        return 0;
    }
    (total_levels - state.player.lev * 80 / UPKEEP_DIVIDER).clamp(0, 1000)
}

/// Regenerate (or, under heavy upkeep, drain) mana for one turn
///
/// `regen_amount` is the regeneration rate, [`PY_REGEN_NORMAL`] for a
/// resting player. Returns whether the whole-point mana value changed.
pub fn regen_mana(state: &mut GameState, upkeep_factor: i32, regen_amount: i32) -> bool {
    let player = &mut state.player;
    let old_csp = player.csp;
    let regen_rate = regen_amount * 100 - upkeep_factor * PY_REGEN_NORMAL;
    if player.csp > player.msp {
        player.csp = player.msp;
        player.csp_frac = 0;
    } else if regen_rate != 0 {
        let step = player.msp * regen_rate.abs() / 100 + PY_REGEN_MNBASE;
        let mut frac = i64::from(player.csp) * 65536 + i64::from(player.csp_frac);
        if regen_rate > 0 {
            frac += i64::from(step);
        } else {
            frac -= i64::from(step);
        }
        let cap = i64::from(player.msp) * 65536;
        frac = frac.clamp(0, cap);
        player.csp = (frac / 65536) as i32;
        player.csp_frac = (frac % 65536) as i32;
    }
    let changed = player.csp != old_csp;
    if changed {
        state.set_redraw(RedrawFlags::MANA);
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Floor, Pos2D};
    use crate::monster::{Allegiance, BehaviorFlags, MonraceDefinition, MonsterEntity, RaceTable};
    use crate::player::Player;
    use crate::GameRng;

    fn state_with_pets(levels: &[(i32, bool)]) -> GameState {
        let mut races = RaceTable::new();
        let mut floor = Floor::new(10, 10).unwrap();
        for (i, &(level, unique)) in levels.iter().enumerate() {
            let mut race = MonraceDefinition::new("hound", 'Z', level);
            if unique {
                race.behavior |= BehaviorFlags::UNIQUE;
            }
            let r_idx = races.push(race);
            floor
                .place_monster(
                    MonsterEntity::new(r_idx, Pos2D::new(1, 1 + i as i32), 10)
                        .with_allegiance(Allegiance::Pet),
                )
                .unwrap();
        }
        let mut player = Player::new(Pos2D::new(5, 5));
        player.lev = 10;
        player.msp = 100;
        GameState::new(floor, player, races, GameRng::new(1))
    }

    #[test]
    fn test_no_pets_no_upkeep() {
        assert_eq!(calculate_upkeep(&state_with_pets(&[])), 0);
    }

    #[test]
    fn test_upkeep_weights() {
        // 30 + 20 levels against a free allowance of 10 * 80 / 20 = 40
        assert_eq!(calculate_upkeep(&state_with_pets(&[(30, false), (20, false)])), 10);
        // A unique of level 15 weighs (15 + 5) * 10
        assert_eq!(calculate_upkeep(&state_with_pets(&[(15, true)])), 160);
    }

    #[test]
    fn test_heavy_upkeep_drains_mana() {
        let mut state = state_with_pets(&[(15, true)]);
        state.player.csp = 50;
        let factor = calculate_upkeep(&state);
        let mut turns = 0;
        while state.player.csp == 50 && turns < 10_000 {
            regen_mana(&mut state, factor, PY_REGEN_NORMAL);
            turns += 1;
        }
        assert_eq!(state.player.csp, 49);
        assert!(state.redraw.contains(RedrawFlags::MANA));
    }

    #[test]
    fn test_free_regen_caps_at_max() {
        let mut state = state_with_pets(&[]);
        state.player.csp = 99;
        for _ in 0..10_000 {
            regen_mana(&mut state, 0, PY_REGEN_NORMAL);
        }
        assert_eq!(state.player.csp, 100);
    }
}
