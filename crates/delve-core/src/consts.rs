//! Engine-wide constants

/// Longest distance any projection may travel
pub const MAX_RANGE: i32 = 18;

/// Farthest distance at which anything can be seen
pub const MAX_SIGHT: i32 = 20;

/// Largest floor the engine accepts
pub const MAX_FLOOR_HEIGHT: i32 = 66;
pub const MAX_FLOOR_WIDTH: i32 = 198;

/// Size of the monster and item pools (slot 0 is reserved in both)
pub const MAX_MONSTERS: usize = 1024;
pub const MAX_ITEMS: usize = 1024;

/// Energy cost of one ordinary action
pub const ENERGY_TURN: i32 = 100;

/// Largest radius of light or darkness a monster can carry
pub const MAX_MONSTER_LITE: i32 = 3;

/// Flow propagation stops after this many steps from the player
pub const FLOW_MAX_DEPTH: u16 = 32;

/// Scent older than this (in game turns) is ignored by trackers
pub const SCENT_MAX_AGE: u32 = 127;

/// Travel cost of an unreachable grid
pub const TRAVEL_UNABLE: i32 = 9999;

/// Initial run counter when the player starts running
pub const RUN_STEPS: i32 = 1000;

/// Travel run counter meaning "travel has not taken a step yet"
pub const TRAVEL_NOT_STARTED: i32 = 255;

/// Scale applied to to-hit bonuses for missile weapons
pub const BTH_PLUS_ADJ: i32 = 3;

/// Weapon proficiency value at master rank
pub const WEAPON_EXP_MASTER: i32 = 8000;

/// Chance denominators for breaking glyphs
pub const BREAK_RUNE_PROTECTION: u32 = 550;
pub const BREAK_RUNE_EXPLOSION: u32 = 299;
