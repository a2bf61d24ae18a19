//! Monster system
//!
//! Race templates and live entities, how they choose where to go, how a
//! step is carried out, and the spells they cast.

mod cross;
mod entity;
mod process;
mod race;
mod run;
pub mod spell;
mod sweep;
mod teleport;
mod turn;

pub use cross::{flow_kind_for, monster_can_cross_terrain, monster_can_enter, monster_can_pass_wall};
pub use entity::{
    check_hostile_align, Allegiance, MonsterEntity, MonsterMFlags, MonsterTimed, SmartLearn,
    SubAlign,
};
pub use process::{
    process_door, process_monster_movement, process_post_dig_wall, process_wall, TurnFlags,
};
pub use race::{
    BehaviorFlags, BlowEffect, BlowMethod, FeatureFlags, KindFlags, MonraceDefinition,
    MonraceLore, MonsterBlow, RaceTable, ResistFlags, SpecialAbility,
};
pub use run::{clean_shot, effective_level, find_hiding, find_safety, level_verdict, mon_will_run};
pub use spell::{AbilitySet, MonsterAbility};
pub use sweep::{
    candidate_directions, decide_movement_dirs, Hiding, MonsterSweepGrid, MoveGridDecider, Noise,
    RangedAttack, Scent, SpecificTarget, Surround,
};
pub use teleport::{teleport_away, teleport_monster_to, teleport_player, teleport_player_to};
pub use turn::{monster_speed, process_monster, process_monsters, speed_to_energy};
