//! Choosing where a monster wants to go this turn
//!
//! A destination is picked by the first [`MoveGridDecider`] that has an
//! opinion, then overridden if the monster is running away. The final
//! vector is turned into an ordered list of step directions.

use log::trace;

use crate::geometry::{los, projectable};
use crate::grid::{Direction, GridFlags, Pos2D, Pos2DVec, DIRECTIONS_8};
use crate::monster::{
    find_hiding, find_safety, flow_kind_for, mon_will_run, monster_can_cross_terrain,
    monster_can_enter, BehaviorFlags, FeatureFlags, KindFlags, MonraceDefinition, MonsterEntity,
    MonsterMFlags,
};
use crate::world::PetFollow;
use crate::{GameState, MAX_SIGHT, SCENT_MAX_AGE};

/// Pets further than this from the player come back
const PET_SEEK_DIST: i32 = 10;

/// Random steps tried by a monster that wanders
const RANDOM_TRIES: usize = 4;

/// One strategy for picking a destination
pub trait MoveGridDecider {
    fn decide(&self, sweep: &MonsterSweepGrid<'_>) -> Option<Pos2D>;
}

/// Everything the deciders look at
pub struct MonsterSweepGrid<'a> {
    pub state: &'a GameState,
    pub m_idx: usize,
    /// The monster wants to flee
    pub will_run: bool,
    /// Ignore the noise flow this turn
    pub no_flow: bool,
    pub can_pass_wall: bool,
}

impl<'a> MonsterSweepGrid<'a> {
    pub fn new(state: &'a GameState, m_idx: usize) -> Self {
        let m = state.floor.monster(m_idx);
        let race = state.races.get(m.r_idx);
        let ridden = state.player.riding == m_idx;
        let cost = state.floor.grid(m.pos).get_cost(flow_kind_for(race));
        Self {
            state,
            m_idx,
            will_run: mon_will_run(state, m_idx),
            no_flow: m.mflag.contains(MonsterMFlags::NO_FLOW) && cost > 2,
            can_pass_wall: race.feature.contains(FeatureFlags::PASS_WALL)
                && (!ridden || state.player.pass_wall),
        }
    }

    pub fn monster(&self) -> &'a MonsterEntity {
        self.state.floor.monster(self.m_idx)
    }

    pub fn race(&self) -> &'a MonraceDefinition {
        self.state.races.get(self.monster().r_idx)
    }

    fn player_pos(&self) -> Pos2D {
        self.state.player.pos
    }

    fn can_kill_wall(&self) -> bool {
        self.race().feature.contains(FeatureFlags::KILL_WALL)
            && self.state.player.riding != self.m_idx
    }

    /// Hostile pack hunters share the hiding and surrounding tactics
    fn hunts_in_pack(&self) -> bool {
        !self.will_run
            && self.monster().is_hostile()
            && self.race().behavior.contains(BehaviorFlags::FRIENDS)
    }

    /// Destination before any flee override
    pub fn destination(&self) -> Pos2D {
        let deciders: [&dyn MoveGridDecider; 6] = [
            &SpecificTarget,
            &Hiding,
            &Surround,
            &RangedAttack,
            &Noise,
            &Scent,
        ];
        deciders
            .iter()
            .find_map(|d| d.decide(self))
            .unwrap_or_else(|| self.player_pos())
    }

    /// Movement vector after the flee override; `None` if there is nowhere
    /// to go
    pub fn get_movable_grid(&self) -> Option<Pos2DVec> {
        let from = self.monster().pos;
        let mut v = self.destination() - from;
        if self.will_run {
            v = self.flee_vector(v);
        }
        (!v.is_zero()).then_some(v)
    }

    fn flee_vector(&self, toward: Pos2DVec) -> Pos2DVec {
        if self.monster().is_pet() || self.no_flow {
            return -toward;
        }
        match find_safety(self.state, self.m_idx).and_then(|safe| self.runnable_away_grid(safe)) {
            Some(pos) => pos - self.monster().pos,
            None => -toward,
        }
    }

    /// Best grid around the safe point: close to the monster and far from
    /// the player along the flow
    fn runnable_away_grid(&self, safe: Pos2D) -> Option<Pos2D> {
        let floor = &self.state.floor;
        let from = self.monster().pos;
        let kind = flow_kind_for(self.race());
        let mut best: Option<(Pos2D, i32)> = None;
        for dir in DIRECTIONS_8.iter().rev() {
            let pos = safe + dir.vec();
            if !floor.in_bounds(pos) {
                continue;
            }
            let dis = pos.distance(from);
            let flow = i32::from(floor.grid(pos).get_distance(kind));
            let score = (5000 / (dis + 3) - 500 / (flow + 1)).max(0);
            let better = match best {
                None => true,
                Some((prev, s)) => {
                    score > s
                        || (score == s
                            && pos.distance(self.player_pos()) > prev.distance(self.player_pos()))
                }
            };
            if better {
                best = Some((pos, score));
            }
        }
        best.map(|(pos, _)| pos)
    }
}

/// Chase a monster this one is fighting
pub struct SpecificTarget;

impl MoveGridDecider for SpecificTarget {
    fn decide(&self, sweep: &MonsterSweepGrid<'_>) -> Option<Pos2D> {
        if sweep.will_run {
            return None;
        }
        let floor = &sweep.state.floor;
        let from = sweep.monster().pos;
        let target = sweep.monster().target?;
        let t_idx = floor.get_grid(target)?.m_idx;
        let ok = t_idx != 0
            && sweep.state.are_enemies(sweep.m_idx, t_idx)
            && los(floor, from, target)
            && projectable(floor, from, target);
        ok.then_some(target)
    }
}

/// Pack animals lurk out of sight while the player stands in the open
pub struct Hiding;

impl MoveGridDecider for Hiding {
    fn decide(&self, sweep: &MonsterSweepGrid<'_>) -> Option<Pos2D> {
        let race = sweep.race();
        if !sweep.hunts_in_pack()
            || !race.kind.contains(KindFlags::ANIMAL)
            || sweep.can_pass_wall
            || race.feature.contains(FeatureFlags::KILL_WALL)
        {
            return None;
        }
        let floor = &sweep.state.floor;
        let player = &sweep.state.player;
        let mut room = DIRECTIONS_8
            .iter()
            .map(|d| player.pos + d.vec())
            .filter(|&p| floor.in_bounds(p) && monster_can_cross_terrain(floor.grid(p).feat, race))
            .count() as i32;
        if floor.grid(player.pos).info.contains(GridFlags::ROOM) {
            room -= 2;
        }
        if race.abilities.is_empty() {
            room -= 2;
        }
        let pool = (player.mhp + player.msp).max(1);
        if room >= 8 * (player.chp + player.csp) / pool {
            return None;
        }
        find_hiding(sweep.state, sweep.m_idx)
    }
}

/// Pack members near the player spread out around it
pub struct Surround;

impl MoveGridDecider for Surround {
    fn decide(&self, sweep: &MonsterSweepGrid<'_>) -> Option<Pos2D> {
        let from = sweep.monster().pos;
        let player_pos = sweep.player_pos();
        if !sweep.hunts_in_pack() || from.distance(player_pos) >= 3 {
            return None;
        }
        let floor = &sweep.state.floor;
        for i in 0..8 {
            let pos = player_pos + DIRECTIONS_8[(sweep.m_idx + i) & 7].vec();
            if pos == from {
                return Some(player_pos);
            }
            if floor.in_bounds(pos) && monster_can_enter(floor, sweep.race(), pos, player_pos) {
                return Some(pos);
            }
        }
        Some(player_pos)
    }
}

/// Spellcasters without a line of fire step to a grid that has one
pub struct RangedAttack;

impl MoveGridDecider for RangedAttack {
    fn decide(&self, sweep: &MonsterSweepGrid<'_>) -> Option<Pos2D> {
        let race = sweep.race();
        if !race.abilities.has_any(|a| a.is_attack()) {
            return None;
        }
        let floor = &sweep.state.floor;
        let from = sweep.monster().pos;
        let player_pos = sweep.player_pos();
        if projectable(floor, from, player_pos) {
            return None;
        }
        let kind = flow_kind_for(race);
        let now_cost = match floor.grid(from).get_cost(kind) {
            0 => u16::MAX,
            c => c,
        };
        let tunnels = sweep.can_pass_wall || sweep.can_kill_wall();
        let opens_doors = race
            .behavior
            .intersects(BehaviorFlags::OPEN_DOOR | BehaviorFlags::BASH_DOOR);

        let mut best: Option<(Pos2D, u16)> = None;
        for dir in DIRECTIONS_8.iter().rev() {
            let pos = from + dir.vec();
            if !floor.in_bounds(pos) {
                continue;
            }
            if pos == player_pos {
                return None;
            }
            let grid = floor.grid(pos);
            let cost = grid.get_cost(kind);
            if cost == 0 || cost >= now_cost {
                continue;
            }
            let walkable = monster_can_cross_terrain(grid.feat, race)
                || (opens_doors && grid.feat.is_closed_door());
            if !walkable && !tunnels {
                continue;
            }
            if !projectable(floor, pos, player_pos) {
                continue;
            }
            if best.is_none_or(|(_, c)| cost <= c) {
                best = Some((pos, cost));
            }
        }
        best.map(|(pos, _)| pos)
    }
}

/// Follow the noise flow downhill toward the player
pub struct Noise;

impl MoveGridDecider for Noise {
    fn decide(&self, sweep: &MonsterSweepGrid<'_>) -> Option<Pos2D> {
        let player_pos = sweep.player_pos();
        if sweep.no_flow || sweep.can_pass_wall || sweep.can_kill_wall() {
            return Some(player_pos);
        }
        let floor = &sweep.state.floor;
        let from = sweep.monster().pos;
        let kind = flow_kind_for(sweep.race());
        let here = floor.grid(from).get_cost(kind);
        if here == 0 {
            return None;
        }
        if los(floor, player_pos, from) && projectable(floor, player_pos, from) {
            // Walk straight at a visible player unless a close detour is needed
            let step = candidate_directions(player_pos - from)[0];
            let next = from + step.vec();
            if next == player_pos
                || monster_can_enter(floor, sweep.race(), next, player_pos)
                || here > 5
            {
                return Some(player_pos);
            }
        }

        let mut best: Option<(Pos2D, u16)> = None;
        for dir in DIRECTIONS_8.iter().rev() {
            let pos = from + dir.vec();
            if !floor.in_bounds(pos) {
                continue;
            }
            let cost = floor.grid(pos).get_cost(kind);
            if cost == 0 || best.is_some_and(|(_, c)| c < cost) {
                continue;
            }
            best = Some((pos, cost));
        }
        Some(best.map_or(player_pos, |(pos, _)| pos))
    }
}

/// Follow the freshest scent when there is no flow to hear
pub struct Scent;

impl MoveGridDecider for Scent {
    fn decide(&self, sweep: &MonsterSweepGrid<'_>) -> Option<Pos2D> {
        let floor = &sweep.state.floor;
        let from = sweep.monster().pos;
        let when = floor.grid(from).when;
        if when == 0 {
            return None;
        }
        let fresh = floor.grid(sweep.player_pos()).when;
        if fresh.saturating_sub(when) > SCENT_MAX_AGE {
            return None;
        }
        let mut best: Option<(Pos2D, u32)> = None;
        for dir in DIRECTIONS_8.iter().rev() {
            let pos = from + dir.vec();
            if !floor.in_bounds(pos) {
                continue;
            }
            let w = floor.grid(pos).when;
            if best.is_some_and(|(_, b)| b > w) {
                continue;
            }
            best = Some((pos, w));
        }
        best.map(|(pos, _)| pos)
    }
}

/// Step directions toward `v`: the primary heading, then the neighbors of
/// that heading one and two turns away, nearest side first
pub fn candidate_directions(v: Pos2DVec) -> [Direction; 5] {
    let (ay, ax) = (v.y.abs(), v.x.abs());
    let north = v.y <= 0;
    let east = v.x >= 0;
    let vertical = if north { Direction::North } else { Direction::South };
    let horizontal = if east { Direction::East } else { Direction::West };

    let (primary, side) = if ay > ax * 2 {
        let side = if v.x > 0 { Direction::East } else { Direction::West };
        (vertical, diagonal(vertical, side))
    } else if ax > ay * 2 {
        let side = if v.y > 0 { Direction::South } else { Direction::North };
        (horizontal, diagonal(side, horizontal))
    } else {
        let primary = diagonal(vertical, horizontal);
        (primary, if ay > ax { vertical } else { horizontal })
    };

    let turn = if primary.rotate_cw(1) == side { 1 } else { -1 };
    [
        primary,
        primary.rotate_cw(turn),
        primary.rotate_cw(-turn),
        primary.rotate_cw(2 * turn),
        primary.rotate_cw(-2 * turn),
    ]
}

fn diagonal(vertical: Direction, horizontal: Direction) -> Direction {
    Direction::from_vec(vertical.vec() + horizontal.vec())
}

/// Nearest enemy a non-hostile monster should go after
fn find_enemy_target(state: &GameState, m_idx: usize) -> Option<Pos2D> {
    let floor = &state.floor;
    let m = floor.monster(m_idx);
    if let Some(target) = m.target {
        let t_idx = floor.get_grid(target).map_or(0, |g| g.m_idx);
        if t_idx != 0 && state.are_enemies(m_idx, t_idx) && projectable(floor, m.pos, target) {
            return Some(target);
        }
    }
    let range = match (m.is_pet(), state.player.pet_follow) {
        (true, PetFollow::Near(d)) => d.max(PET_SEEK_DIST),
        (true, PetFollow::StayAway(_)) => PET_SEEK_DIST,
        (false, _) => MAX_SIGHT,
    };
    floor
        .monster_indices()
        .into_iter()
        .filter(|&t| state.are_enemies(m_idx, t))
        .map(|t| floor.monster(t).pos)
        .filter(|&p| m.pos.distance(p) <= range && projectable(floor, m.pos, p))
        .min_by_key(|&p| m.pos.distance(p))
}

/// Ordered step directions for this monster's turn
///
/// Confused and erratic monsters get random steps. Pets and friends go
/// after enemies, pets also keep to the player's follow distance.
pub fn decide_movement_dirs(state: &mut GameState, m_idx: usize) -> Vec<Direction> {
    let m = state.floor.monster(m_idx);
    let r_idx = m.r_idx;
    let behavior = state.races.get(r_idx).behavior;
    let confused = m.is_confused() && state.player.riding != m_idx;

    let erratic = match (
        behavior.contains(BehaviorFlags::RAND_25),
        behavior.contains(BehaviorFlags::RAND_50),
    ) {
        (true, true) => 75,
        (false, true) => 50,
        (true, false) => 25,
        (false, false) => 0,
    };
    if confused || (erratic > 0 && state.rng.percent(erratic)) {
        if !confused && state.is_original_ap_and_seen(m_idx) {
            if let Some(race) = state.races.get_mut(r_idx) {
                race.lore.behavior |= behavior & (BehaviorFlags::RAND_25 | BehaviorFlags::RAND_50);
            }
        }
        return random_dirs(state);
    }

    let Some(v) = movement_vector(state, m_idx) else {
        return random_dirs(state);
    };
    match v {
        Some(v) => {
            trace!("monster {m_idx} heads {v:?}");
            candidate_directions(v).to_vec()
        }
        None => Vec::new(),
    }
}

/// Where to head; the outer `None` means wander at random
fn movement_vector(state: &GameState, m_idx: usize) -> Option<Option<Pos2DVec>> {
    let sweep = MonsterSweepGrid::new(state, m_idx);
    let m = sweep.monster();
    if m.is_pet() && state.player.riding != m_idx {
        let cdis = m.pos.distance(state.player.pos);
        let (avoid, lonely) = match state.player.pet_follow {
            PetFollow::StayAway(d) => (cdis <= d, false),
            PetFollow::Near(d) => (false, cdis > d),
        };
        if let Some(enemy) = find_enemy_target(state, m_idx) {
            let v = enemy - m.pos;
            Some((!v.is_zero()).then_some(v))
        } else if avoid || lonely || cdis > PET_SEEK_DIST {
            Some(sweep.get_movable_grid())
        } else {
            None
        }
    } else if !m.is_hostile() {
        let enemy = find_enemy_target(state, m_idx)?;
        let v = enemy - m.pos;
        Some((!v.is_zero()).then_some(v))
    } else {
        Some(sweep.get_movable_grid())
    }
}

fn random_dirs(state: &mut GameState) -> Vec<Direction> {
    (0..RANDOM_TRIES)
        .filter_map(|_| state.rng.choose(&DIRECTIONS_8).copied())
        .collect()
}
