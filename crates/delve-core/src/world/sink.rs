//! Output sinks: messages, redraw hints, deferred recalculation and sounds

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::Display;

bitflags! {
    /// Screen regions the display layer should refresh
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct RedrawFlags: u16 {
        const MAP = 0x0001;
        const HEALTH = 0x0002;
        const MANA = 0x0004;
        const STATUS = 0x0008;
        const PLAYER_HP = 0x0010;
        const EQUIPMENT = 0x0020;
    }
}

bitflags! {
    /// Expensive recomputations deferred until the next read
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct RecalcFlags: u16 {
        /// Noise flow from the player is stale
        const FLOW = 0x0001;
        /// Monster light and darkness must be rebuilt
        const MONSTER_LITE = 0x0002;
        /// Player view must be rebuilt
        const VIEW = 0x0004;
        /// Monster visibility must be rebuilt
        const MONSTER_VISIBILITY = 0x0008;
    }
}

bits_serde!(RecalcFlags, u16);

/// Named sound/animation cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SoundHook {
    WallHit,
    Shoot,
    Explode,
    OpenDoor,
    BashDoor,
    Glass,
    Dig,
    Hit,
    Miss,
}

/// Receives localized messages and redraw hints
///
/// The core never depends on what the sink does with them.
pub trait MessageSink: core::fmt::Debug {
    fn message(&mut self, msg: &str);

    fn redraw(&mut self, _flags: RedrawFlags) {}

    fn sound(&mut self, _hook: SoundHook) {}
}

/// Sink that keeps everything it is given
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    pub messages: Vec<String>,
    pub redraws: RedrawFlags,
    pub sounds: Vec<SoundHook>,
}

impl MessageSink for BufferSink {
    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_owned());
    }

    fn redraw(&mut self, flags: RedrawFlags) {
        self.redraws |= flags;
    }

    fn sound(&mut self, hook: SoundHook) {
        self.sounds.push(hook);
    }
}
