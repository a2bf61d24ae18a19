//! delve-core: turn-based dungeon simulation core
//!
//! This crate decides, each game turn, how monsters perceive, move, fight and
//! cast, and how the player's step/run/travel and ranged-fire actions resolve
//! against the floor. It has no I/O dependencies: rendering, persistence and
//! dungeon generation sit on the other side of [`world::MessageSink`] and the
//! plain data types in [`grid`].
//!
//! Everything runs synchronously inside one [`GameState`]; each entity's turn
//! is a single call chain that completes before the next entity acts.

/// Serialize a bitflags set as its raw bits
macro_rules! bits_serde {
    ($ty:ty, $raw:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serde::Serialize::serialize(&self.bits(), serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let bits = <$raw as serde::Deserialize>::deserialize(deserializer)?;
                Ok(<$ty>::from_bits_truncate(bits))
            }
        }
    };
}

pub mod combat;
pub mod effect;
pub mod flow;
pub mod geometry;
pub mod grid;
pub mod item;
pub mod monster;
pub mod pet;
pub mod player;
pub mod world;

mod consts;
mod rng;
mod state;

pub use consts::*;
pub use rng::GameRng;
pub use state::GameState;
