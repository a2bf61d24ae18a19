//! Which terrain a monster race can stand on

use crate::grid::{Floor, FlowKind, Pos2D, TerrainFlags, TerrainKind};
use crate::monster::{FeatureFlags, MonraceDefinition, ResistFlags};

/// Can a monster of this race walk onto this feature?
///
/// Walls are handled separately by the wall-passing and wall-killing rules.
pub fn monster_can_cross_terrain(feat: TerrainKind, race: &MonraceDefinition) -> bool {
    let flies = race.feature.contains(FeatureFlags::CAN_FLY);
    if feat.has(TerrainFlags::PATTERN) && !flies {
        return false;
    }
    if feat.has(TerrainFlags::CAN_FLY) && flies {
        return true;
    }
    if !feat.has(TerrainFlags::MOVE) {
        return false;
    }

    let aquatic = race.feature.contains(FeatureFlags::AQUATIC);
    if feat.has(TerrainFlags::WATER) {
        if !aquatic
            && !flies
            && !race.feature.contains(FeatureFlags::CAN_SWIM)
            && feat.has(TerrainFlags::DEEP)
        {
            return false;
        }
    } else if aquatic {
        return false;
    }

    if feat.has(TerrainFlags::LAVA)
        && !flies
        && !race.feature.contains(FeatureFlags::IM_LAVA)
        && !race.resist.contains(ResistFlags::IM_FIRE)
    {
        return false;
    }
    true
}

/// Can this race pass through the (wall) feature by phasing?
pub fn monster_can_pass_wall(feat: TerrainKind, race: &MonraceDefinition) -> bool {
    race.feature.contains(FeatureFlags::PASS_WALL)
        && feat.has(TerrainFlags::WALL)
        && !feat.has(TerrainFlags::PERMANENT)
}

/// Which noise flow this race follows
pub fn flow_kind_for(race: &MonraceDefinition) -> FlowKind {
    if race.feature.contains(FeatureFlags::CAN_FLY) {
        FlowKind::Flying
    } else {
        FlowKind::Normal
    }
}

/// Is `pos` free for this race to step onto? (No monster, not the player)
pub fn monster_can_enter(
    floor: &Floor,
    race: &MonraceDefinition,
    pos: Pos2D,
    player_pos: Pos2D,
) -> bool {
    let Some(grid) = floor.get_grid(pos) else {
        return false;
    };
    if pos == player_pos || grid.has_monster() {
        return false;
    }
    monster_can_cross_terrain(grid.feat, race) || monster_can_pass_wall(grid.feat, race)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swimming_and_flight() {
        let mut race = MonraceDefinition::new("jackal", 'C', 1);
        assert!(monster_can_cross_terrain(TerrainKind::ShallowWater, &race));
        assert!(!monster_can_cross_terrain(TerrainKind::DeepWater, &race));
        assert!(!monster_can_cross_terrain(TerrainKind::Chasm, &race));
        assert!(!monster_can_cross_terrain(TerrainKind::Lava, &race));
        race.feature |= FeatureFlags::CAN_FLY;
        assert!(monster_can_cross_terrain(TerrainKind::DeepWater, &race));
        assert!(monster_can_cross_terrain(TerrainKind::Chasm, &race));
        assert!(!monster_can_cross_terrain(TerrainKind::Granite, &race));
    }

    #[test]
    fn test_aquatic_stays_wet() {
        let mut race = MonraceDefinition::new("eel", 'E', 3);
        race.feature |= FeatureFlags::AQUATIC;
        assert!(monster_can_cross_terrain(TerrainKind::DeepWater, &race));
        assert!(!monster_can_cross_terrain(TerrainKind::Floor, &race));
    }

    #[test]
    fn test_pass_wall_not_permanent() {
        let mut race = MonraceDefinition::new("ghost", 'G', 20);
        race.feature |= FeatureFlags::PASS_WALL;
        assert!(monster_can_pass_wall(TerrainKind::Granite, &race));
        assert!(!monster_can_pass_wall(TerrainKind::PermanentWall, &race));
    }
}
