//! Pets: commands the player gives them, the mana they cost to keep, and
//! riding

mod command;
mod riding;
mod upkeep;

pub use command::{
    do_cmd_pet, PetCommand, PET_AWAY_DIST, PET_CLOSE_DIST, PET_DESTROY_DIST, PET_FOLLOW_DIST,
    PET_SPACE_DIST,
};
pub use riding::{can_ride, dismount, mount, RideOutcome};
pub use upkeep::{calculate_upkeep, regen_mana, PY_REGEN_NORMAL};
