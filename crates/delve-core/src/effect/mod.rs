//! Area-effect executor
//!
//! [`project`] sends a typed effect along a projection path and applies it
//! to every grid, monster and player it reaches: one grid for a bolt, the
//! whole line for a beam, a ball or breath cone at the end otherwise.

mod kind;
mod resist;

pub use kind::EffectType;
pub use resist::{adjust_monster_damage, adjust_player_damage, ResistNote};

use log::debug;

use crate::geometry::{ball_shape, breath_shape, ProjectFlags, ProjectionPath};
use crate::grid::{GridFlags, Pos2D, TerrainFlags};
use crate::monster::{BehaviorFlags, ResistFlags, SmartLearn};
use crate::player::PlayerResist;
use crate::world::{RedrawFlags, SoundHook};
use crate::{GameState, MAX_RANGE};

/// Who or what caused an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectSource {
    Player,
    Monster(usize),
    /// A rune or trap going off where it lies
    Floor,
}

/// What an effect ended up touching
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectResult {
    /// Something the player could notice happened
    pub notice: bool,
    /// Where the projection ended
    pub center: Option<Pos2D>,
    pub monsters_hit: Vec<usize>,
    pub player_hit: bool,
}

impl GameState {
    fn effect_origin(&self, who: EffectSource, target: Pos2D) -> Pos2D {
        match who {
            EffectSource::Player => self.player.pos,
            EffectSource::Monster(m_idx) if self.floor.monster_is_valid(m_idx) => {
                self.floor.monster(m_idx).pos
            }
            _ => target,
        }
    }
}

/// Apply `typ` with base damage `dam` from `who` toward `target`
///
/// `rad` is the ball or breath radius (0 for bolts and beams).
pub fn project(
    state: &mut GameState,
    who: EffectSource,
    rad: i32,
    target: Pos2D,
    dam: i32,
    typ: EffectType,
    flags: ProjectFlags,
) -> ProjectResult {
    let mut result = ProjectResult::default();
    let source = state.effect_origin(who, target);

    let path = if flags.contains(ProjectFlags::JUMP) || source == target {
        ProjectionPath::default()
    } else {
        ProjectionPath::new(&state.floor, MAX_RANGE, state.player.pos, source, target, flags)
    };
    let center = path.last().unwrap_or(source);
    result.center = Some(center);

    if flags.contains(ProjectFlags::BEAM) {
        for pos in &path {
            affect_grid(state, who, pos, dam, typ, flags, &mut result);
        }
        return result;
    }

    let shape = if flags.contains(ProjectFlags::BREATH) {
        breath_shape(&state.floor, &path, rad, source, center, typ.blast_block())
    } else {
        ball_shape(&state.floor, center, rad, typ.blast_block())
    };
    let breath = flags.contains(ProjectFlags::BREATH);
    for d in 0..shape.ring_start.len().saturating_sub(1) {
        for &pos in shape.ring(d) {
            if pos == source && who != EffectSource::Floor {
                continue;
            }
            // Breaths weaken away from their axis, balls away from the center
            let r = if breath {
                dist_to_line(pos, source, center)
            } else {
                d as i32
            };
            let ring_dam = (dam + r) / (r + 1);
            affect_grid(state, who, pos, ring_dam, typ, flags, &mut result);
        }
    }
    if rad > 0 {
        state.sound(SoundHook::Explode);
    }
    result
}

/// Approximate distance from `pos` to the line through `a` and `b`
fn dist_to_line(pos: Pos2D, a: Pos2D, b: Pos2D) -> i32 {
    let pd = a.distance(pos);
    let nd = a.distance(b);
    if pd > nd {
        return pos.distance(b);
    }
    if nd == 0 {
        return 0;
    }
    let (py, px) = (a.y - pos.y, a.x - pos.x);
    let (ny, nx) = (b.x - a.x, a.y - b.y);
    ((py * ny + px * nx) / nd).abs()
}

fn affect_grid(
    state: &mut GameState,
    who: EffectSource,
    pos: Pos2D,
    dam: i32,
    typ: EffectType,
    flags: ProjectFlags,
    result: &mut ProjectResult,
) {
    if !state.floor.contains(pos) {
        return;
    }
    affect_terrain(state, pos, typ, result);

    let m_idx = state.floor.grid(pos).m_idx;
    let is_caster = matches!(who, EffectSource::Monster(c) if c == m_idx);
    if m_idx != 0 && !is_caster && state.player.riding != m_idx {
        if affect_monster(state, who, m_idx, dam, typ) {
            result.notice = true;
        }
        result.monsters_hit.push(m_idx);
    }
    if pos == state.player.pos && who != EffectSource::Player {
        affect_player(state, who, dam, typ, flags);
        result.player_hit = true;
        result.notice = true;
    }
}

fn affect_terrain(state: &mut GameState, pos: Pos2D, typ: EffectType, result: &mut ProjectResult) {
    if typ != EffectType::Disintegrate {
        return;
    }
    let feat = state.floor.grid(pos).feat;
    if feat.has(TerrainFlags::HURT_DISI)
        && !feat.has(TerrainFlags::PERMANENT)
        && destroy_terrain(state, pos)
    {
        result.notice = true;
    }
}

/// Knock down the feature at `pos`: a wall dug out, a door smashed
///
/// Glass shatters and sprays shards over the surrounding grids, which may
/// kill whoever did the smashing. Returns false if nothing changed.
pub fn destroy_terrain(state: &mut GameState, pos: Pos2D) -> bool {
    if !state.floor.contains(pos) {
        return false;
    }
    let feat = state.floor.grid(pos).feat;
    let after = feat.destroyed();
    if after == feat {
        return false;
    }
    state.floor.set_feat(pos, after);
    state.set_redraw(RedrawFlags::MAP);
    if feat.has(TerrainFlags::GLASS) {
        if state.floor.grid(pos).info.contains(GridFlags::VIEW) {
            state.message("The glass shatters!");
        }
        state.sound(SoundHook::Glass);
        let dam = state.rng.dice(2, 6);
        let flags = ProjectFlags::KILL | ProjectFlags::GRID | ProjectFlags::PLAYER;
        project(state, EffectSource::Floor, 1, pos, dam, EffectType::Shards, flags);
    }
    true
}

/// Returns whether the player saw anything happen
fn affect_monster(
    state: &mut GameState,
    who: EffectSource,
    m_idx: usize,
    dam: i32,
    typ: EffectType,
) -> bool {
    let seen = state.floor.monster(m_idx).ml;
    let r_idx = state.floor.monster(m_idx).r_idx;
    let name = state.monster_name_cap(m_idx);

    if typ.is_status() {
        apply_monster_status(state, m_idx, dam, typ);
        return seen;
    }

    let race = state.races.get(r_idx);
    let (dam, note, learned) = adjust_monster_damage(race, typ, dam, &mut state.rng);
    if seen {
        if let Some(text) = note.text() {
            state.message(format!("{name} {text}"));
        }
        if let Some(race) = state.races.get_mut(r_idx) {
            race.lore.resists |= learned;
        }
    }
    if let Some(m) = state.floor.monster_mut(m_idx) {
        m.timed.sleep = 0;
    }
    debug!("{typ} hits monster {m_idx} for {dam}");
    state.damage_monster(m_idx, dam, who == EffectSource::Player);
    seen
}

fn apply_monster_status(state: &mut GameState, m_idx: usize, power: i32, typ: EffectType) {
    let r_idx = state.floor.monster(m_idx).r_idx;
    let race = state.races.get(r_idx);
    let level = race.level + if race.is_unique() { 10 } else { 0 };
    let resisted = match typ {
        EffectType::Terrify => {
            race.resist.contains(ResistFlags::NO_FEAR)
                || race.behavior.contains(BehaviorFlags::NO_FEAR)
        }
        EffectType::OldConf | EffectType::Blind => race.resist.contains(ResistFlags::NO_CONF),
        EffectType::OldSleep => race.resist.contains(ResistFlags::NO_SLEEP),
        _ => false,
    };
    let name = state.monster_name_cap(m_idx);
    let seen = state.floor.monster(m_idx).ml;
    if resisted || state.rng.randint0(100 + power / 2) < level {
        if seen {
            state.message(format!("{name} is unaffected."));
        }
        return;
    }
    let turns = (state.rng.randint0(4) + 4) as i16;
    let Some(m) = state.floor.monster_mut(m_idx) else {
        return;
    };
    let msg = match typ {
        EffectType::Terrify => {
            m.timed.monfear += turns;
            "flees in terror!"
        }
        EffectType::OldConf | EffectType::Blind => {
            m.timed.confused += turns;
            "looks confused."
        }
        EffectType::OldSlow => {
            m.timed.slow += turns;
            "starts moving slower."
        }
        _ => {
            m.timed.sleep = 500;
            "falls asleep!"
        }
    };
    if seen {
        state.message(format!("{name} {msg}"));
    }
}

fn affect_player(
    state: &mut GameState,
    who: EffectSource,
    dam: i32,
    typ: EffectType,
    flags: ProjectFlags,
) {
    let caster = match who {
        EffectSource::Monster(m_idx) if state.floor.monster_is_valid(m_idx) => Some(m_idx),
        _ => None,
    };
    let killer = caster.map_or_else(|| "a rune".to_owned(), |m| state.monster_name(m));

    let is_bolt = flags.contains(ProjectFlags::STOP) && !flags.contains(ProjectFlags::BEAM);
    if is_bolt && caster.is_some() && state.player.resist.contains(PlayerResist::REFLECT) {
        state.message("The attack bounces!");
        learn(state, caster, SmartLearn::REFLECT);
        return;
    }

    if typ.is_status() {
        apply_player_status(state, caster, typ);
        return;
    }

    let (dam, learned) = adjust_player_damage(&state.player, typ, dam, &mut state.rng);
    learn(state, caster, learned);
    if state.player.is_blind() {
        state.message(format!("You are hit by {}!", typ.noun()));
    }
    state.take_hit(dam, &killer);
}

fn apply_player_status(state: &mut GameState, caster: Option<usize>, typ: EffectType) {
    let resisted = match typ {
        EffectType::OldConf => state.player.resist.contains(PlayerResist::CONF),
        EffectType::OldSleep => state.player.resist.contains(PlayerResist::FREE_ACT),
        _ => false,
    };
    if resisted {
        let learned = if typ == EffectType::OldConf {
            SmartLearn::RES_CONF
        } else {
            SmartLearn::FREE_ACT
        };
        learn(state, caster, learned);
        state.message("You are unaffected!");
        return;
    }
    if state.rng.randint0(100) < state.player.skill_sav {
        state.message("You resist the effects!");
        return;
    }
    let turns = (state.rng.randint0(4) + 4) as i16;
    let t = &mut state.player.timed;
    let msg = match typ {
        EffectType::Terrify => {
            t.afraid += turns;
            "You are terrified!"
        }
        EffectType::Blind => {
            t.blind += turns;
            "You are blind!"
        }
        EffectType::OldConf => {
            t.confused += turns;
            "You are confused!"
        }
        EffectType::OldSlow => {
            t.slow += turns;
            "You feel yourself moving slower!"
        }
        _ => {
            t.paralyzed += turns;
            "You are paralyzed!"
        }
    };
    state.message(msg);
    state.disturb();
}

/// A monster that saw the player shrug off an attack remembers it
///
/// Stupid monsters never learn and ordinary ones only half the time.
fn learn(state: &mut GameState, caster: Option<usize>, what: SmartLearn) {
    let Some(m_idx) = caster else {
        return;
    };
    if what.is_empty() {
        return;
    }
    let race = state.races.get(state.floor.monster(m_idx).r_idx);
    if race.is_stupid() || (!race.is_smart() && state.rng.percent(50)) {
        return;
    }
    if let Some(m) = state.floor.monster_mut(m_idx) {
        m.smart |= what;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Floor, TerrainKind};
    use crate::monster::{MonraceDefinition, MonsterEntity, RaceTable};
    use crate::player::Player;
    use crate::world::RecalcFlags;
    use crate::GameRng;

    fn arena() -> (GameState, usize) {
        let rows = [
            "###########",
            "#.........#",
            "#.........#",
            "#.........#",
            "#....#....#",
            "###########",
        ];
        let mut races = RaceTable::new();
        let r_idx = races.push(MonraceDefinition::new("goblin", 'o', 3));
        let floor = Floor::from_ascii(&rows).unwrap();
        let state = GameState::new(floor, Player::new(Pos2D::new(1, 1)), races, GameRng::new(2));
        (state, r_idx)
    }

    #[test]
    fn test_ball_hurts_monsters_in_radius() {
        let (mut state, r_idx) = arena();
        let a = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(2, 6), 100))
            .unwrap();
        let b = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(2, 8), 100))
            .unwrap();
        let res = project(
            &mut state,
            EffectSource::Player,
            2,
            Pos2D::new(2, 6),
            30,
            EffectType::Fire,
            ProjectFlags::STOP | ProjectFlags::KILL,
        );
        assert!(res.monsters_hit.contains(&a));
        assert!(res.monsters_hit.contains(&b));
        assert_eq!(state.floor.monster(a).hp, 70);
        // Two rings out: (30 + 2) / 3
        assert_eq!(state.floor.monster(b).hp, 90);
    }

    #[test]
    fn test_bolt_stops_at_first_monster() {
        let (mut state, r_idx) = arena();
        let near = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(1, 4), 100))
            .unwrap();
        let far = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(1, 7), 100))
            .unwrap();
        let res = project(
            &mut state,
            EffectSource::Player,
            0,
            Pos2D::new(1, 7),
            10,
            EffectType::Missile,
            ProjectFlags::STOP | ProjectFlags::KILL,
        );
        assert_eq!(res.monsters_hit, vec![near]);
        assert_eq!(state.floor.monster(far).hp, 100);
    }

    #[test]
    fn test_disintegration_clears_walls() {
        let (mut state, _) = arena();
        let pillar = Pos2D::new(4, 5);
        project(
            &mut state,
            EffectSource::Floor,
            1,
            Pos2D::new(3, 5),
            10,
            EffectType::Disintegrate,
            ProjectFlags::JUMP,
        );
        assert_eq!(state.floor.grid(pillar).feat, TerrainKind::Floor);
        assert!(state.floor.recalc.contains(RecalcFlags::FLOW));
    }

    #[test]
    fn test_dist_to_line() {
        let a = Pos2D::new(1, 1);
        let b = Pos2D::new(1, 9);
        assert_eq!(dist_to_line(Pos2D::new(1, 5), a, b), 0);
        assert_eq!(dist_to_line(Pos2D::new(3, 5), a, b), 2);
    }

    #[test]
    fn test_monster_breath_hits_player() {
        let (mut state, r_idx) = arena();
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(1, 6), 100))
            .unwrap();
        let target = state.player.pos;
        let res = project(
            &mut state,
            EffectSource::Monster(m),
            2,
            target,
            12,
            EffectType::Cold,
            ProjectFlags::BREATH | ProjectFlags::KILL | ProjectFlags::PLAYER,
        );
        assert!(res.player_hit);
        // On the breath's axis the player takes the full blast
        assert_eq!(state.player.chp, state.player.mhp - 12);
        // The breather is not caught in its own cone
        assert_eq!(state.floor.monster(m).hp, 100);
    }
}
