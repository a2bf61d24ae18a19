//! Terrain features and their properties

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

bitflags! {
    /// Terrain characteristics
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct TerrainFlags: u32 {
        /// Does not block line of sight
        const LOS = 0x0000_0001;
        /// Does not block projections
        const PROJECT = 0x0000_0002;
        /// Can be walked onto
        const MOVE = 0x0000_0004;
        /// Can be flown over
        const CAN_FLY = 0x0000_0008;
        const WALL = 0x0000_0010;
        /// Cannot be altered by anything
        const PERMANENT = 0x0000_0020;
        /// Destroyed by disintegration and wall-killing
        const HURT_DISI = 0x0000_0040;
        /// Can be dug through
        const TUNNEL = 0x0000_0080;
        const DOOR = 0x0000_0100;
        /// A closed door
        const CLOSE = 0x0000_0200;
        /// Can be opened
        const OPEN = 0x0000_0400;
        /// Can be bashed
        const BASH = 0x0000_0800;
        const GLASS = 0x0000_1000;
        const SECRET = 0x0000_2000;
        const TREE = 0x0000_4000;
        const WATER = 0x0000_8000;
        const DEEP = 0x0001_0000;
        const LAVA = 0x0002_0000;
        const STAIRS = 0x0004_0000;
        const MIRROR = 0x0008_0000;
        const PATTERN = 0x0010_0000;
        const TRAP = 0x0020_0000;
        const DISARM = 0x0040_0000;
        /// Interesting enough to stop a run
        const NOTICE = 0x0080_0000;
        /// Running avoids stepping here
        const AVOID_RUN = 0x0100_0000;
        const FLOOR = 0x0200_0000;
        /// The edge of the map, never passable
        const BOUNDARY = 0x0400_0000;
    }
}

/// Terrain feature of a grid
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum TerrainKind {
    #[default]
    Floor,
    Granite,
    Magma,
    PermanentWall,
    Boundary,
    GlassWall,
    Rubble,
    ClosedDoor,
    GlassDoor,
    OpenDoor,
    BrokenDoor,
    SecretDoor,
    Tree,
    ShallowWater,
    DeepWater,
    Lava,
    Chasm,
    UpStair,
    DownStair,
    Mirror,
    PatternStart,
    Pattern,
    Trap,
}

impl TerrainKind {
    /// Characteristics of this feature
    pub fn flags(self) -> TerrainFlags {
        use TerrainFlags as F;
        let open_floor = F::LOS | F::PROJECT | F::MOVE | F::CAN_FLY;
        match self {
            TerrainKind::Floor => open_floor | F::FLOOR,
            TerrainKind::Granite => F::WALL | F::HURT_DISI | F::TUNNEL,
            TerrainKind::Magma => F::WALL | F::HURT_DISI | F::TUNNEL,
            TerrainKind::PermanentWall => F::WALL | F::PERMANENT,
            TerrainKind::Boundary => F::WALL | F::PERMANENT | F::BOUNDARY,
            TerrainKind::GlassWall => F::LOS | F::WALL | F::GLASS | F::HURT_DISI,
            TerrainKind::Rubble => F::HURT_DISI | F::TUNNEL | F::NOTICE,
            TerrainKind::ClosedDoor => {
                F::DOOR | F::CLOSE | F::OPEN | F::BASH | F::HURT_DISI | F::NOTICE
            }
            TerrainKind::GlassDoor => {
                F::LOS
                    | F::DOOR
                    | F::CLOSE
                    | F::OPEN
                    | F::BASH
                    | F::GLASS
                    | F::HURT_DISI
                    | F::NOTICE
            }
            TerrainKind::OpenDoor => open_floor | F::DOOR | F::HURT_DISI | F::NOTICE,
            TerrainKind::BrokenDoor => open_floor | F::DOOR | F::HURT_DISI,
            TerrainKind::SecretDoor => {
                F::DOOR | F::CLOSE | F::OPEN | F::BASH | F::SECRET | F::HURT_DISI
            }
            TerrainKind::Tree => open_floor | F::TREE | F::HURT_DISI,
            TerrainKind::ShallowWater => open_floor | F::WATER,
            TerrainKind::DeepWater => open_floor | F::WATER | F::DEEP | F::NOTICE | F::AVOID_RUN,
            TerrainKind::Lava => open_floor | F::LAVA | F::NOTICE | F::AVOID_RUN,
            TerrainKind::Chasm => F::LOS | F::PROJECT | F::CAN_FLY | F::NOTICE,
            TerrainKind::UpStair | TerrainKind::DownStair => {
                open_floor | F::STAIRS | F::NOTICE | F::PERMANENT
            }
            TerrainKind::Mirror => open_floor | F::MIRROR | F::NOTICE,
            TerrainKind::PatternStart | TerrainKind::Pattern => {
                open_floor | F::PATTERN | F::NOTICE | F::PERMANENT
            }
            TerrainKind::Trap => open_floor | F::TRAP | F::DISARM | F::NOTICE,
        }
    }

    pub fn has(self, flag: TerrainFlags) -> bool {
        self.flags().contains(flag)
    }

    /// Closed (possibly secret) door
    pub fn is_closed_door(self) -> bool {
        self.has(TerrainFlags::DOOR | TerrainFlags::CLOSE)
    }

    /// Needs flight to cross: flyable but not walkable
    pub fn requires_flight(self) -> bool {
        self.has(TerrainFlags::CAN_FLY) && !self.has(TerrainFlags::MOVE)
    }

    /// Feature left behind when disintegrated or dug out
    pub fn destroyed(self) -> TerrainKind {
        match self {
            TerrainKind::ClosedDoor | TerrainKind::GlassDoor | TerrainKind::SecretDoor => {
                TerrainKind::BrokenDoor
            }
            f if f.has(TerrainFlags::HURT_DISI) => TerrainKind::Floor,
            f => f,
        }
    }

    /// Feature after a door is opened
    pub fn opened(self) -> TerrainKind {
        if self.is_closed_door() {
            TerrainKind::OpenDoor
        } else {
            self
        }
    }

    /// Name used in messages
    pub const fn name(self) -> &'static str {
        match self {
            TerrainKind::Floor => "floor",
            TerrainKind::Granite => "granite wall",
            TerrainKind::Magma => "magma vein",
            TerrainKind::PermanentWall => "permanent wall",
            TerrainKind::Boundary => "boundary wall",
            TerrainKind::GlassWall => "glass wall",
            TerrainKind::Rubble => "rubble",
            TerrainKind::ClosedDoor => "door",
            TerrainKind::GlassDoor => "glass door",
            TerrainKind::OpenDoor => "open door",
            TerrainKind::BrokenDoor => "broken door",
            TerrainKind::SecretDoor => "granite wall",
            TerrainKind::Tree => "tree",
            TerrainKind::ShallowWater => "shallow water",
            TerrainKind::DeepWater => "deep water",
            TerrainKind::Lava => "lava",
            TerrainKind::Chasm => "chasm",
            TerrainKind::UpStair => "up staircase",
            TerrainKind::DownStair => "down staircase",
            TerrainKind::Mirror => "mirror",
            TerrainKind::PatternStart => "Pattern startpoint",
            TerrainKind::Pattern => "Pattern",
            TerrainKind::Trap => "trap",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_permanent_never_destroyed() {
        for feat in TerrainKind::iter() {
            if feat.has(TerrainFlags::PERMANENT) {
                assert_eq!(feat.destroyed(), feat, "{feat} changed when destroyed");
            }
        }
    }

    #[test]
    fn test_walls_block_sight_and_projection() {
        assert!(!TerrainKind::Granite.has(TerrainFlags::LOS));
        assert!(!TerrainKind::Granite.has(TerrainFlags::PROJECT));
        assert!(TerrainKind::GlassWall.has(TerrainFlags::LOS));
        assert!(!TerrainKind::GlassWall.has(TerrainFlags::PROJECT));
    }

    #[test]
    fn test_doors() {
        assert!(TerrainKind::ClosedDoor.is_closed_door());
        assert!(TerrainKind::SecretDoor.is_closed_door());
        assert!(!TerrainKind::OpenDoor.is_closed_door());
        assert_eq!(TerrainKind::GlassDoor.opened(), TerrainKind::OpenDoor);
        assert_eq!(TerrainKind::ClosedDoor.destroyed(), TerrainKind::BrokenDoor);
    }

    #[test]
    fn test_chasm_requires_flight() {
        assert!(TerrainKind::Chasm.requires_flight());
        assert!(!TerrainKind::DeepWater.requires_flight());
    }
}
