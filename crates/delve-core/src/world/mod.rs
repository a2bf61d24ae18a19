//! World-level plumbing: options, boundary errors and output sinks

mod errors;
mod options;
mod sink;

pub use errors::{ConfigError, FloorError};
pub use options::{GameOptions, PetFollow, PetPermissions};
pub use sink::{BufferSink, MessageSink, RecalcFlags, RedrawFlags, SoundHook};
