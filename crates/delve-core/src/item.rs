//! Items the core cares about: missiles, launchers and corpses
//!
//! Object generation tables live outside the core; these are the fields the
//! fire, pickup and raise-dead logic read.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::grid::Pos2D;

bitflags! {
    /// Slays, kills and brands carried by a missile or launcher
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SlayFlags: u32 {
        const SLAY_ANIMAL = 0x0000_0001;
        const KILL_ANIMAL = 0x0000_0002;
        const SLAY_EVIL = 0x0000_0004;
        const KILL_EVIL = 0x0000_0008;
        const SLAY_GOOD = 0x0000_0010;
        const KILL_GOOD = 0x0000_0020;
        const SLAY_HUMAN = 0x0000_0040;
        const KILL_HUMAN = 0x0000_0080;
        const SLAY_UNDEAD = 0x0000_0100;
        const KILL_UNDEAD = 0x0000_0200;
        const SLAY_DEMON = 0x0000_0400;
        const KILL_DEMON = 0x0000_0800;
        const SLAY_ORC = 0x0000_1000;
        const KILL_ORC = 0x0000_2000;
        const SLAY_TROLL = 0x0000_4000;
        const KILL_TROLL = 0x0000_8000;
        const SLAY_GIANT = 0x0001_0000;
        const KILL_GIANT = 0x0002_0000;
        const SLAY_DRAGON = 0x0004_0000;
        const KILL_DRAGON = 0x0008_0000;
        const BRAND_ACID = 0x0010_0000;
        const BRAND_ELEC = 0x0020_0000;
        const BRAND_FIRE = 0x0040_0000;
        const BRAND_COLD = 0x0080_0000;
        const BRAND_POIS = 0x0100_0000;
        /// Spends the wielder's mana for extra damage
        const FORCE_WEAPON = 0x0200_0000;
    }
}

// Manual serde impl for SlayFlags
impl Serialize for SlayFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SlayFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(SlayFlags::from_bits_truncate(bits))
    }
}

/// Item kinds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum ItemKind {
    Shot,
    Arrow,
    Bolt,
    Sling,
    ShortBow,
    LongBow,
    LightCrossbow,
    HeavyCrossbow,
    Corpse,
    Skeleton,
    #[default]
    Other,
}

impl ItemKind {
    pub const fn is_ammo(self) -> bool {
        matches!(self, ItemKind::Shot | ItemKind::Arrow | ItemKind::Bolt)
    }

    pub const fn is_launcher(self) -> bool {
        matches!(
            self,
            ItemKind::Sling
                | ItemKind::ShortBow
                | ItemKind::LongBow
                | ItemKind::LightCrossbow
                | ItemKind::HeavyCrossbow
        )
    }

    pub const fn is_crossbow(self) -> bool {
        matches!(self, ItemKind::LightCrossbow | ItemKind::HeavyCrossbow)
    }

    /// Ammunition this launcher fires
    pub const fn ammo(self) -> Option<ItemKind> {
        match self {
            ItemKind::Sling => Some(ItemKind::Shot),
            ItemKind::ShortBow | ItemKind::LongBow => Some(ItemKind::Arrow),
            ItemKind::LightCrossbow | ItemKind::HeavyCrossbow => Some(ItemKind::Bolt),
            _ => None,
        }
    }

    /// Base multiplier of a launcher
    pub const fn launcher_multiplier(self) -> i32 {
        match self {
            ItemKind::Sling | ItemKind::ShortBow => 2,
            ItemKind::LongBow | ItemKind::LightCrossbow => 3,
            ItemKind::HeavyCrossbow => 4,
            _ => 1,
        }
    }

    /// Energy (×100) of one shot from this launcher
    pub const fn launcher_energy(self) -> i32 {
        match self {
            ItemKind::Sling => 8000,
            ItemKind::ShortBow | ItemKind::LongBow => 10000,
            ItemKind::LightCrossbow => 12000,
            ItemKind::HeavyCrossbow => 13333,
            _ => 10000,
        }
    }

    /// Percent chance of breaking on impact
    pub const fn breakage_chance(self) -> i32 {
        match self {
            ItemKind::Arrow => 35,
            ItemKind::Shot | ItemKind::Bolt => 25,
            ItemKind::Corpse | ItemKind::Skeleton => 50,
            _ => 10,
        }
    }
}

/// An item on the floor, carried by a monster, or in the player's pack
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemEntity {
    pub kind: ItemKind,
    pub name: String,
    /// Stack size
    pub number: i32,
    /// Damage dice
    pub dd: i32,
    pub ds: i32,
    pub to_h: i32,
    pub to_d: i32,
    /// Weight in tenths of a pound
    pub weight: i32,
    pub slays: SlayFlags,
    pub is_fixed_artifact: bool,
    /// Floor position (meaningless while held)
    pub pos: Pos2D,
    /// Holding monster (0 = not held)
    pub held_m_idx: usize,
    /// The player has noticed this item
    pub marked: bool,
}

impl ItemEntity {
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            number: 1,
            ..Default::default()
        }
    }

    /// Builder: damage dice
    pub fn with_dice(mut self, dd: i32, ds: i32) -> Self {
        self.dd = dd;
        self.ds = ds;
        self
    }

    /// Builder: stack size
    pub fn with_number(mut self, number: i32) -> Self {
        self.number = number;
        self
    }

    /// Split one item off this stack
    pub fn split_one(&mut self) -> ItemEntity {
        self.number -= 1;
        let mut one = self.clone();
        one.number = 1;
        one
    }

    pub fn is_held(&self) -> bool {
        self.held_m_idx != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_ammo_pairs() {
        assert_eq!(ItemKind::Sling.ammo(), Some(ItemKind::Shot));
        assert_eq!(ItemKind::LongBow.ammo(), Some(ItemKind::Arrow));
        assert_eq!(ItemKind::HeavyCrossbow.ammo(), Some(ItemKind::Bolt));
        assert_eq!(ItemKind::Arrow.ammo(), None);
    }

    #[test]
    fn test_split_one() {
        let mut stack = ItemEntity::new(ItemKind::Arrow, "arrow").with_number(5);
        let one = stack.split_one();
        assert_eq!(one.number, 1);
        assert_eq!(stack.number, 4);
    }
}
