//! Game options consumed by the simulation core
//!
//! Only the boolean toggles that change movement, running and travel
//! behavior live here; display options belong to the front end.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Behavior toggles read by the movement, run and travel engines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    /// Open/close doors automatically on bump and during travel
    pub easy_open: bool,
    /// Pick items up without being asked
    pub always_pickup: bool,
    /// Walking into a known trap tries to disarm it
    pub easy_disarm: bool,
    /// Interrupt running/travel when leaving a trap-detected zone
    pub disturb_trap_detect: bool,
    /// Warn when leaving a trap-detected zone
    pub alert_trap_detect: bool,
    /// Keep running past closed doors
    pub find_ignore_doors: bool,
    /// Keep running past stairs
    pub find_ignore_stairs: bool,
    /// Cut corners while running
    pub find_cut: bool,
    /// Stop running when a monster comes into view
    pub disturb_near: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            easy_open: true,
            always_pickup: false,
            easy_disarm: true,
            disturb_trap_detect: true,
            alert_trap_detect: false,
            find_ignore_doors: true,
            find_ignore_stairs: false,
            find_cut: false,
            disturb_near: true,
        }
    }
}

impl GameOptions {
    /// Parse options from a JSON object; missing keys keep their defaults
    #[cfg(feature = "std")]
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set an option by its name
    pub fn set(&mut self, name: &str, value: bool) -> Result<(), ConfigError> {
        let slot = match name {
            "easy_open" => &mut self.easy_open,
            "always_pickup" => &mut self.always_pickup,
            "easy_disarm" => &mut self.easy_disarm,
            "disturb_trap_detect" => &mut self.disturb_trap_detect,
            "alert_trap_detect" => &mut self.alert_trap_detect,
            "find_ignore_doors" => &mut self.find_ignore_doors,
            "find_ignore_stairs" => &mut self.find_ignore_stairs,
            "find_cut" => &mut self.find_cut,
            "disturb_near" => &mut self.disturb_near,
            _ => return Err(ConfigError::UnknownOption(name.to_owned())),
        };
        *slot = value;
        Ok(())
    }
}

bitflags! {
    /// What the player allows pets to do
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PetPermissions: u8 {
        const OPEN_DOORS = 0x01;
        const PICKUP_ITEMS = 0x02;
        const TELEPORT = 0x04;
        const ATTACK_SPELL = 0x08;
        const SUMMON_SPELL = 0x10;
        const BALL_SPELL = 0x20;
    }
}

impl Default for PetPermissions {
    fn default() -> Self {
        Self::OPEN_DOORS | Self::PICKUP_ITEMS | Self::TELEPORT | Self::ATTACK_SPELL
    }
}

// Manual serde impl for PetPermissions
impl Serialize for PetPermissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PetPermissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(PetPermissions::from_bits_truncate(bits))
    }
}

/// How far pets keep from the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PetFollow {
    /// Stay within this distance
    Near(i32),
    /// Keep at least this distance away; pets inside it flee
    StayAway(i32),
}

impl Default for PetFollow {
    fn default() -> Self {
        PetFollow::Near(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_by_name() {
        let mut opts = GameOptions::default();
        opts.set("find_cut", true).unwrap();
        assert!(opts.find_cut);
        assert!(matches!(
            opts.set("no_such_option", true),
            Err(ConfigError::UnknownOption(_))
        ));
    }

    #[test]
    fn test_from_json_keeps_defaults() {
        let opts = GameOptions::from_json(r#"{ "always_pickup": true }"#).unwrap();
        assert!(opts.always_pickup);
        assert_eq!(opts.easy_open, GameOptions::default().easy_open);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(GameOptions::from_json("[1, 2"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_pet_permissions_serde() {
        let perms = PetPermissions::OPEN_DOORS | PetPermissions::BALL_SPELL;
        let json = serde_json::to_string(&perms).unwrap();
        let back: PetPermissions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, perms);
    }
}
