//! End-to-end turns across the player, monster and combat engines

use delve_core::GameState;
use delve_core::GameRng;
use delve_core::combat::{FireOutcome, SniperMode, exe_fire, shot_tier_damage};
use delve_core::geometry::{ProjectFlags, ProjectionPath, los, projectable};
use delve_core::grid::{Direction, Floor, Pos2D, TerrainKind};
use delve_core::item::{ItemEntity, ItemKind};
use delve_core::monster::{
    Allegiance, MonraceDefinition, MonsterEntity, RaceTable, effective_level, level_verdict,
    process_monsters,
};
use delve_core::player::{
    MoveOutcome, Player, Travel, TravelStop, exe_movement, travel_step,
};

const HALL: [&str; 7] = [
    "##############",
    "#............#",
    "#............#",
    "#####.########",
    "#............#",
    "#............#",
    "##############",
];

fn hall_state(player_at: Pos2D) -> (GameState, usize) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut races = RaceTable::new();
    let r_idx = races.push(MonraceDefinition::new("kobold", 'k', 2));
    let floor = Floor::from_ascii(&HALL).unwrap();
    let state = GameState::new(floor, Player::new(player_at), races, GameRng::new(21));
    (state, r_idx)
}

fn place(state: &mut GameState, r_idx: usize, pos: Pos2D, hp: i32) -> usize {
    let m = state.floor.place_monster(MonsterEntity::new(r_idx, pos, hp)).unwrap();
    state.update_monsters();
    m
}

#[test]
fn test_hostile_closes_in_through_the_gap() {
    let (mut state, r_idx) = hall_state(Pos2D::new(5, 5));
    let m = place(&mut state, r_idx, Pos2D::new(1, 2), 20);
    let start = state.floor.monster(m).pos.distance(state.player.pos);
    for _ in 0..60 {
        process_monsters(&mut state);
    }
    assert!(state.floor.monster_is_valid(m));
    let now = state.floor.monster(m).pos.distance(state.player.pos);
    assert!(now < start, "monster stayed {now} away");
}

#[test]
fn test_player_fights_until_the_way_is_clear() {
    let (mut state, r_idx) = hall_state(Pos2D::new(1, 1));
    let m = place(&mut state, r_idx, Pos2D::new(1, 2), 1);
    let mut attacks = 0;
    while state.floor.monster_is_valid(m) && attacks < 200 {
        let outcome = exe_movement(&mut state, Direction::East, false, false);
        assert_eq!(outcome, MoveOutcome::Attacked(m));
        assert_eq!(state.player.pos, Pos2D::new(1, 1));
        attacks += 1;
    }
    assert!(!state.floor.monster_is_valid(m));
    assert_eq!(exe_movement(&mut state, Direction::East, false, false), MoveOutcome::Moved);
    assert_eq!(state.player.pos, Pos2D::new(1, 2));
}

#[test]
fn test_travel_through_the_gap() {
    let (mut state, _) = hall_state(Pos2D::new(1, 1));
    let goal = Pos2D::new(5, 12);
    {
        let GameState { travel, floor, player, options, .. } = &mut state;
        travel.set_goal(floor, player, options, goal);
    }
    let mut stop = None;
    for _ in 0..100 {
        stop = travel_step(&mut state);
        if stop.is_some() {
            break;
        }
    }
    assert_eq!(stop, Some(TravelStop::Arrived));
    assert_eq!(state.player.pos, goal);
}

#[test]
fn test_travel_into_sealed_room_finds_no_route() {
    let (mut state, _) = hall_state(Pos2D::new(1, 1));
    state.floor.set_feat(Pos2D::new(3, 5), TerrainKind::Granite);
    {
        let GameState { travel, floor, player, options, .. } = &mut state;
        *travel = Travel::new(floor);
        travel.set_goal(floor, player, options, Pos2D::new(5, 12));
    }
    assert_eq!(travel_step(&mut state), Some(TravelStop::NoRoute));
    assert_eq!(state.player.pos, Pos2D::new(1, 1));
    assert!(state.messages.iter().any(|s| s == "No route is found!"));
}

#[test]
fn test_archer_drops_an_approaching_kobold() {
    let (mut state, r_idx) = hall_state(Pos2D::new(1, 1));
    state.player.skill_thb = 250;
    state.player.launcher = Some(ItemEntity::new(ItemKind::LongBow, "long bow"));
    state.player.quiver =
        vec![ItemEntity::new(ItemKind::Arrow, "arrow").with_dice(3, 6).with_number(40)];
    let m = place(&mut state, r_idx, Pos2D::new(1, 9), 15);
    let mut shots = 0;
    while state.floor.monster_is_valid(m) && shots < 40 {
        let target = state.floor.monster(m).pos;
        let outcome = exe_fire(&mut state, 0, target, SniperMode::None);
        assert!(matches!(outcome, FireOutcome::Fired { .. }));
        shots += 1;
        process_monsters(&mut state);
    }
    assert!(!state.floor.monster_is_valid(m));
    assert!(state.player.quiver.first().is_none_or(|q| q.number < 40));
}

#[test]
fn test_wall_blocks_sight_both_ways_across_the_hall() {
    let floor = Floor::from_ascii(&HALL).unwrap();
    let a = Pos2D::new(1, 1);
    let b = Pos2D::new(5, 1);
    assert!(!los(&floor, a, b));
    assert!(!los(&floor, b, a));
    assert!(!projectable(&floor, a, b));
    assert!(los(&floor, Pos2D::new(2, 5), Pos2D::new(4, 5)));
}

#[test]
fn test_projection_never_exceeds_its_range() {
    let floor = Floor::new(40, 40).unwrap();
    let src = Pos2D::new(2, 2);
    for range in 1..20 {
        let path =
            ProjectionPath::new(&floor, range, src, src, Pos2D::new(37, 30), ProjectFlags::empty());
        assert!(path.len() as i32 <= range);
        if let Some(last) = path.last() {
            assert!(src.distance(last) <= range);
        }
    }
}

#[test]
fn test_flee_band_edges() {
    assert_eq!(level_verdict(effective_level(0, 1), 30), Some(true));
    assert_eq!(level_verdict(effective_level(0, 8), 30), None);
    assert_eq!(level_verdict(30, 25), Some(false));
    assert_eq!(level_verdict(29, 25), None);
    assert_eq!(level_verdict(21, 25), Some(true));
    assert_eq!(level_verdict(22, 25), None);
}

#[test]
fn test_critical_tier_edges() {
    assert_eq!(shot_tier_damage(899, 10), 15);
    assert_eq!(shot_tier_damage(900, 10), 20);
    assert_eq!(shot_tier_damage(1349, 10), 20);
    assert_eq!(shot_tier_damage(1350, 10), 30);
}

#[test]
fn test_pet_steps_aside_for_the_player() {
    let (mut state, r_idx) = hall_state(Pos2D::new(1, 1));
    let m = state
        .floor
        .place_monster(
            MonsterEntity::new(r_idx, Pos2D::new(1, 2), 10).with_allegiance(Allegiance::Pet),
        )
        .unwrap();
    state.update_monsters();
    assert_eq!(exe_movement(&mut state, Direction::East, false, false), MoveOutcome::PushedPast(m));
    assert_eq!(state.player.pos, Pos2D::new(1, 2));
    assert_eq!(state.floor.monster(m).pos, Pos2D::new(1, 1));
}
