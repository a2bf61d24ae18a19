//! The pet command menu

use log::debug;

use super::riding::{dismount, mount, RideOutcome};
use crate::grid::Direction;
use crate::state::GameState;
use crate::world::{PetFollow, PetPermissions};

/// Follow distances behind the menu entries
pub const PET_CLOSE_DIST: i32 = 1;
pub const PET_FOLLOW_DIST: i32 = 6;
pub const PET_DESTROY_DIST: i32 = 255;
pub const PET_SPACE_DIST: i32 = 10;
pub const PET_AWAY_DIST: i32 = 25;

/// An order for the player's pets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetCommand {
    /// Send away one pet, or every pet with `None`
    Dismiss(Option<usize>),
    /// Point pets at a monster, or clear the target
    Target(Option<usize>),
    StayClose,
    FollowMe,
    SeekAndDestroy,
    /// Keep a little room around the player
    GiveMeSpace,
    StayAway,
    /// Flip one or more permissions
    Toggle(PetPermissions),
    /// Mount the pet in this direction, or dismount towards it when riding
    Ride(Direction),
    Name(usize, String),
}

/// Carry out a pet command; returns whether it took game time
pub fn do_cmd_pet(state: &mut GameState, cmd: PetCommand) -> bool {
    state.player.energy_use = 0;
    match cmd {
        PetCommand::Dismiss(which) => {
            dismiss_pets(state, which);
        }
        PetCommand::Target(target) => set_pet_target(state, target),
        PetCommand::StayClose => state.player.pet_follow = PetFollow::Near(PET_CLOSE_DIST),
        PetCommand::FollowMe => state.player.pet_follow = PetFollow::Near(PET_FOLLOW_DIST),
        PetCommand::SeekAndDestroy => {
            state.player.pet_follow = PetFollow::Near(PET_DESTROY_DIST);
        }
        PetCommand::GiveMeSpace => state.player.pet_follow = PetFollow::StayAway(PET_SPACE_DIST),
        PetCommand::StayAway => state.player.pet_follow = PetFollow::StayAway(PET_AWAY_DIST),
        PetCommand::Toggle(perms) => state.player.pet_permissions.toggle(perms),
        PetCommand::Ride(dir) => {
            let outcome = if state.player.is_riding() {
                dismount(state, dir)
            } else {
                mount(state, dir)
            };
            debug!("pet ride command: {outcome:?}");
            return !matches!(outcome, RideOutcome::Refused);
        }
        PetCommand::Name(m_idx, name) => name_pet(state, m_idx, name),
    }
    false
}

/// Delete the chosen pets; returns how many left
fn dismiss_pets(state: &mut GameState, which: Option<usize>) -> usize {
    let chosen: Vec<usize> = state
        .floor
        .monster_indices()
        .into_iter()
        .filter(|&i| state.floor.monster(i).is_pet() && which.is_none_or(|w| w == i))
        .collect();
    if chosen.is_empty() {
        state.message("You have no pets to dismiss.");
        return 0;
    }
    for &m_idx in &chosen {
        let name = state.monster_name(m_idx);
        if state.player.riding == m_idx {
            state.message(format!("You have got off {name}."));
            state.player.riding = 0;
        }
        if state.player.pet_target == m_idx {
            state.player.pet_target = 0;
        }
        state.message(format!("Dismissed {name}."));
        if let Some(race) = state.races.get_mut(state.floor.monster(m_idx).r_idx) {
            race.cur_num = race.cur_num.saturating_sub(1);
        }
        state.floor.delete_monster(m_idx);
    }
    let n = chosen.len();
    state.message(format!("You have dismissed {n} pet{}.", if n == 1 { "" } else { "s" }));
    n
}

fn set_pet_target(state: &mut GameState, target: Option<usize>) {
    match target {
        Some(t) if state.floor.monster_is_valid(t) && state.floor.monster(t).ml => {
            state.player.pet_target = t;
            let name = state.monster_name(t);
            state.message(format!("Your pets now target {name}."));
        }
        Some(_) => state.message("You cannot target that."),
        None => {
            state.player.pet_target = 0;
            state.message("Pet target cleared.");
        }
    }
}

fn name_pet(state: &mut GameState, m_idx: usize, name: String) {
    if !state.floor.monster_is_valid(m_idx) || !state.floor.monster(m_idx).is_pet() {
        state.message("That monster is not a pet.");
        return;
    }
    if let Some(m) = state.floor.monster_mut(m_idx) {
        m.nickname = (!name.is_empty()).then_some(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Floor, Pos2D};
    use crate::monster::{Allegiance, MonraceDefinition, MonsterEntity, RaceTable};
    use crate::player::Player;
    use crate::GameRng;

    fn kennel() -> (GameState, usize, usize) {
        let mut races = RaceTable::new();
        let r_idx = races.push(MonraceDefinition::new("jackal", 'C', 1));
        let mut floor = Floor::new(10, 10).unwrap();
        let pet = floor
            .place_monster(
                MonsterEntity::new(r_idx, Pos2D::new(2, 2), 8).with_allegiance(Allegiance::Pet),
            )
            .unwrap();
        let wild = floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(2, 3), 8))
            .unwrap();
        let mut state =
            GameState::new(floor, Player::new(Pos2D::new(3, 3)), races, GameRng::new(4));
        state.update_monsters();
        (state, pet, wild)
    }

    #[test]
    fn test_dismiss_only_pets() {
        let (mut state, pet, wild) = kennel();
        assert!(!do_cmd_pet(&mut state, PetCommand::Dismiss(None)));
        assert!(!state.floor.monster_is_valid(pet));
        assert!(state.floor.monster_is_valid(wild));
        assert_eq!(state.messages.last().map(String::as_str), Some("You have dismissed 1 pet."));

        state.clear_messages();
        do_cmd_pet(&mut state, PetCommand::Dismiss(None));
        assert_eq!(state.messages, vec!["You have no pets to dismiss.".to_owned()]);
    }

    #[test]
    fn test_follow_modes() {
        let (mut state, _, _) = kennel();
        do_cmd_pet(&mut state, PetCommand::StayAway);
        assert_eq!(state.player.pet_follow, PetFollow::StayAway(PET_AWAY_DIST));
        do_cmd_pet(&mut state, PetCommand::StayClose);
        assert_eq!(state.player.pet_follow, PetFollow::Near(PET_CLOSE_DIST));
    }

    #[test]
    fn test_toggle_and_target() {
        let (mut state, _, wild) = kennel();
        assert!(state.player.pet_permissions.contains(PetPermissions::OPEN_DOORS));
        let both = PetPermissions::OPEN_DOORS | PetPermissions::BALL_SPELL;
        do_cmd_pet(&mut state, PetCommand::Toggle(both));
        assert!(!state.player.pet_permissions.contains(PetPermissions::OPEN_DOORS));
        assert!(state.player.pet_permissions.contains(PetPermissions::BALL_SPELL));

        do_cmd_pet(&mut state, PetCommand::Target(Some(wild)));
        assert_eq!(state.player.pet_target, wild);
        do_cmd_pet(&mut state, PetCommand::Target(None));
        assert_eq!(state.player.pet_target, 0);
    }

    #[test]
    fn test_name_pet() {
        let (mut state, pet, wild) = kennel();
        do_cmd_pet(&mut state, PetCommand::Name(pet, "Fang".to_owned()));
        assert_eq!(state.monster_name(pet), "Fang");
        do_cmd_pet(&mut state, PetCommand::Name(wild, "Nope".to_owned()));
        assert!(state.floor.monster(wild).nickname.is_none());
    }
}
