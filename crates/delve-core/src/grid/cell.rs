//! A single grid of the floor

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::{TerrainFlags, TerrainKind};

bitflags! {
    /// Per-grid state
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct GridFlags: u32 {
        /// The player remembers this grid
        const MARK = 0x0001;
        /// Permanently lit
        const GLOW = 0x0002;
        /// Part of a room
        const ROOM = 0x0004;
        /// In the player's view
        const VIEW = 0x0008;
        /// Seen by the player right now
        const SEEN = 0x0010;
        /// Lit by a monster
        const MONLITE = 0x0020;
        /// Darkened by a monster
        const MONDARK = 0x0040;
        const TEMP_LIT = 0x0080;
        const TEMP_DARK = 0x0100;
        const PROTECTION_RUNE = 0x0200;
        const EXPLOSIVE_RUNE = 0x0400;
        /// Covered by a trap detection
        const IN_DETECT = 0x0800;
        /// Trap detection here is stale
        const UNSAFE = 0x1000;
        /// Door has been spiked shut
        const JAMMED = 0x2000;
    }
}

// Manual serde impl for GridFlags
impl Serialize for GridFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GridFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(GridFlags::from_bits_truncate(bits))
    }
}

/// Flow field flavors: walkers and fliers see different costs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    Normal = 0,
    Flying = 1,
}

/// One floor grid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grid {
    /// Functional terrain
    pub feat: TerrainKind,

    /// Terrain the grid looks like (secret doors look like walls)
    pub mimic: Option<TerrainKind>,

    pub info: GridFlags,

    /// Occupying monster (0 = empty)
    pub m_idx: usize,

    /// Items lying here, oldest first
    pub o_idx_list: Vec<usize>,

    /// Noise-flow cost to the player per flow kind (0 = unreached)
    pub costs: [u16; 2],

    /// Noise-flow step distance to the player per flow kind (0 = unreached)
    pub dists: [u16; 2],

    /// Game turn the player's scent was last laid here (0 = never)
    pub when: u32,

    /// Lock strength of a closed door (0 = unlocked)
    pub lock_power: u8,
}

impl Grid {
    pub fn new(feat: TerrainKind) -> Self {
        Self {
            feat,
            ..Default::default()
        }
    }

    pub fn has(&self, flag: TerrainFlags) -> bool {
        self.feat.has(flag)
    }

    pub fn is_mark(&self) -> bool {
        self.info.contains(GridFlags::MARK)
    }

    /// Terrain the grid appears to be
    pub fn get_feat_mimic(&self) -> TerrainKind {
        self.mimic.unwrap_or(self.feat)
    }

    /// Terrain the player perceives: the mimic unless detected
    pub fn perceived(&self) -> TerrainKind {
        if self.info.contains(GridFlags::IN_DETECT) {
            self.feat
        } else {
            self.get_feat_mimic()
        }
    }

    pub fn has_los(&self) -> bool {
        self.has(TerrainFlags::LOS)
    }

    pub fn is_projectable(&self) -> bool {
        self.has(TerrainFlags::PROJECT)
    }

    pub fn has_monster(&self) -> bool {
        self.m_idx != 0
    }

    pub fn is_rune_protection(&self) -> bool {
        self.info.contains(GridFlags::PROTECTION_RUNE)
    }

    pub fn is_rune_explosion(&self) -> bool {
        self.info.contains(GridFlags::EXPLOSIVE_RUNE)
    }

    pub fn is_mirror(&self) -> bool {
        self.has(TerrainFlags::MIRROR)
    }

    /// Lit by anything, after monster darkness
    pub fn is_lit(&self) -> bool {
        if self.info.contains(GridFlags::MONDARK) && !self.info.contains(GridFlags::MONLITE) {
            return false;
        }
        self.info
            .intersects(GridFlags::GLOW | GridFlags::MONLITE | GridFlags::TEMP_LIT)
    }

    /// A known trap that could be disarmed
    pub fn is_known_trap(&self) -> bool {
        self.has(TerrainFlags::TRAP) && self.mimic.is_none()
    }

    pub fn get_cost(&self, kind: FlowKind) -> u16 {
        self.costs[kind as usize]
    }

    pub fn get_distance(&self, kind: FlowKind) -> u16 {
        self.dists[kind as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_door_mimics_wall() {
        let mut g = Grid::new(TerrainKind::SecretDoor);
        g.mimic = Some(TerrainKind::Granite);
        assert_eq!(g.perceived(), TerrainKind::Granite);
        g.info |= GridFlags::IN_DETECT;
        assert_eq!(g.perceived(), TerrainKind::SecretDoor);
    }

    #[test]
    fn test_monster_darkness_cancels_glow() {
        let mut g = Grid::new(TerrainKind::Floor);
        g.info |= GridFlags::GLOW;
        assert!(g.is_lit());
        g.info |= GridFlags::MONDARK;
        assert!(!g.is_lit());
        g.info |= GridFlags::MONLITE;
        assert!(g.is_lit());
    }
}
