//! Game state shared by every engine of the core

use log::{debug, warn};

use crate::flow;
use crate::geometry::{los, update_mon_lite};
use crate::grid::{Floor, Pos2D};
use crate::monster::{
    check_hostile_align, BehaviorFlags, FeatureFlags, MonsterMFlags, RaceTable, ResistFlags,
};
use crate::player::{Player, RunState, Travel};
use crate::rng::GameRng;
use crate::world::{GameOptions, MessageSink, RecalcFlags, RedrawFlags, SoundHook};
use crate::MAX_SIGHT;

/// One in this many blows gets through invulnerability
const PENETRATE_INVULNERABILITY: i32 = 13;

/// Everything one game turn reads and writes
#[derive(Debug)]
pub struct GameState {
    pub floor: Floor,
    pub player: Player,
    pub races: RaceTable,
    pub rng: GameRng,
    pub options: GameOptions,

    /// Game turn counter
    pub turn: u32,

    pub run: RunState,
    pub travel: Travel,

    /// Messages of the current turn
    pub messages: Vec<String>,
    /// Pending redraw hints
    pub redraw: RedrawFlags,
    /// Sound cues of the current turn
    pub sounds: Vec<SoundHook>,

    sink: Option<Box<dyn MessageSink>>,
}

impl GameState {
    pub fn new(floor: Floor, player: Player, races: RaceTable, rng: GameRng) -> Self {
        let travel = Travel::new(&floor);
        Self {
            floor,
            player,
            races,
            rng,
            options: GameOptions::default(),
            turn: 1,
            run: RunState::default(),
            travel,
            messages: Vec::new(),
            redraw: RedrawFlags::empty(),
            sounds: Vec::new(),
            sink: None,
        }
    }

    /// Forward messages, redraws and sounds to an external sink as well
    pub fn with_sink(mut self, sink: impl MessageSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Add a message
    pub fn message(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        debug!(target: "delve::msg", "{msg}");
        if let Some(sink) = self.sink.as_mut() {
            sink.message(&msg);
        }
        self.messages.push(msg);
    }

    /// Clear messages
    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.sounds.clear();
    }

    pub fn sound(&mut self, hook: SoundHook) {
        if let Some(sink) = self.sink.as_mut() {
            sink.sound(hook);
        }
        self.sounds.push(hook);
    }

    pub fn set_redraw(&mut self, flags: RedrawFlags) {
        if let Some(sink) = self.sink.as_mut() {
            sink.redraw(flags);
        }
        self.redraw |= flags;
    }

    /// Interrupt running, travel and repeated commands
    pub fn disturb(&mut self) {
        if self.run.is_running() {
            debug!("run disturbed");
        }
        self.run.cancel();
        self.travel.halt();
    }

    /// Can the player see the grid at `pos` right now?
    pub fn player_can_see(&self, pos: Pos2D) -> bool {
        if self.player.is_blind() || !self.floor.contains(pos) {
            return false;
        }
        let d = pos.distance(self.player.pos);
        d <= MAX_SIGHT
            && los(&self.floor, self.player.pos, pos)
            && (d <= self.player.cur_lite || self.floor.grid(pos).is_lit())
    }

    /// Put the player (and the mount under them) on `to`
    ///
    /// Marks the view and noise flow stale and leaves fresh scent behind.
    pub fn relocate_player(&mut self, to: Pos2D) {
        if !self.floor.in_bounds(to) {
            warn!("relocate_player: {to:?} out of bounds");
            return;
        }
        let from = self.player.pos;
        let mount = self.player.riding;
        if mount != 0 && self.floor.monster_is_valid(mount) {
            self.floor.move_monster(mount, to);
        }
        self.player.pos = to;
        self.floor.recalc |= RecalcFlags::VIEW | RecalcFlags::FLOW | RecalcFlags::MONSTER_LITE;
        flow::update_scent(&mut self.floor, to, self.turn);
        self.set_redraw(RedrawFlags::MAP);
        debug!("player moves {from:?} -> {to:?}");
        self.update_monsters();
    }

    /// Rebuild the noise flow if terrain or the player moved
    pub fn ensure_flow(&mut self) -> bool {
        flow::ensure_flow(&mut self.floor, self.player.pos)
    }

    /// Rebuild monster lighting if anything changed
    pub fn ensure_mon_lite(&mut self) {
        if !self.floor.recalc.contains(RecalcFlags::MONSTER_LITE) {
            return;
        }
        let changed = update_mon_lite(&mut self.floor, &self.races, self.player.pos);
        if !changed.is_empty() {
            self.set_redraw(RedrawFlags::MAP);
        }
    }

    // Monster helpers

    /// Name for messages: "the cave orc", a unique's name, a pet's nickname
    /// or "it" when unseen
    pub fn monster_name(&self, m_idx: usize) -> String {
        let m = self.floor.monster(m_idx);
        if !m.ml {
            return "it".to_owned();
        }
        if let (true, Some(nick)) = (m.is_pet(), m.nickname.as_ref()) {
            return nick.clone();
        }
        let race = self.races.get(m.ap_r_idx);
        if race.is_unique() {
            race.name.clone()
        } else {
            format!("the {}", race.name)
        }
    }

    /// [`GameState::monster_name`] with a leading capital
    pub fn monster_name_cap(&self, m_idx: usize) -> String {
        capitalize(&self.monster_name(m_idx))
    }

    /// Player sees this monster as what it really is
    pub fn is_original_ap_and_seen(&self, m_idx: usize) -> bool {
        let m = self.floor.monster(m_idx);
        m.ml && !self.player.is_hallucinating() && m.is_original_ap()
    }

    /// Would these two monsters fight?
    pub fn are_enemies(&self, a: usize, b: usize) -> bool {
        if !self.floor.monster_is_valid(a) || !self.floor.monster_is_valid(b) || a == b {
            return false;
        }
        if self.floor.is_arena {
            return true;
        }
        let m = self.floor.monster(a);
        let n = self.floor.monster(b);
        if check_hostile_align(m.sub_align, n.sub_align) {
            return true;
        }
        m.is_hostile() != n.is_hostile()
    }

    /// Refresh distance and visibility of one monster
    pub fn update_monster(&mut self, m_idx: usize) {
        if !self.floor.monster_is_valid(m_idx) {
            return;
        }
        let player = &self.player;
        let m = self.floor.monster(m_idx);
        let race = self.races.get(m.r_idx);
        let d = m.pos.distance(player.pos);
        let mut in_view = false;
        let mut visible = false;
        if d <= MAX_SIGHT && los(&self.floor, player.pos, m.pos) {
            in_view = true;
            let grid = self.floor.grid(m.pos);
            let lit = grid.is_lit() || d <= player.cur_lite;
            let invisible = race.feature.contains(FeatureFlags::INVISIBLE) && !player.see_invisible;
            visible = !player.is_blind() && lit && !invisible;
        }
        let was_visible = m.ml;
        let r_idx = m.r_idx;

        let Some(m) = self.floor.monster_mut(m_idx) else {
            return;
        };
        m.cdis = d;
        m.ml = visible;
        m.mflag.set(MonsterMFlags::VIEW, in_view);
        m.mflag.set(MonsterMFlags::NEWLY_SEEN, visible && !was_visible);
        if visible && !was_visible {
            if let Some(race) = self.races.get_mut(r_idx) {
                race.lore.sights += 1;
            }
            if self.options.disturb_near {
                self.disturb();
            }
        }
    }

    /// Refresh every monster
    pub fn update_monsters(&mut self) {
        for m_idx in self.floor.monster_indices() {
            self.update_monster(m_idx);
        }
    }

    /// A monster just came into view
    pub fn any_newly_seen_monster(&self) -> bool {
        self.floor.monster_indices().into_iter().any(|i| {
            let m = self.floor.monster(i);
            m.ml && m.mflag.contains(MonsterMFlags::NEWLY_SEEN)
        })
    }

    /// Hurt a monster; returns true if it died
    pub fn damage_monster(&mut self, m_idx: usize, dam: i32, by_player: bool) -> bool {
        if !self.floor.monster_is_valid(m_idx) {
            warn!("damage_monster on invalid index {m_idx}");
            return false;
        }
        if self.floor.monster(m_idx).is_invulnerable()
            && !self.rng.one_in(PENETRATE_INVULNERABILITY)
        {
            if self.floor.monster(m_idx).ml {
                let name = self.monster_name_cap(m_idx);
                self.message(format!("{name} is unharmed."));
            }
            return false;
        }

        let (hp, maxhp, r_idx) = {
            let Some(m) = self.floor.monster_mut(m_idx) else {
                return false;
            };
            m.hp -= dam;
            (m.hp, m.maxhp, m.r_idx)
        };
        if hp < 0 {
            self.monster_death(m_idx, by_player);
            return true;
        }

        let race = self.races.get(r_idx);
        let fearless = race.behavior.contains(BehaviorFlags::NO_FEAR)
            || race.resist.contains(ResistFlags::NO_FEAR);
        if dam > 0 && !fearless && !self.floor.monster(m_idx).is_fearful() && maxhp > 0 {
            let percentage = 100 * hp.max(0) / maxhp;
            if self.rng.randint1(10) >= percentage || (dam >= hp && self.rng.randint0(100) < 80) {
                let extra = if dam >= hp && percentage > 7 {
                    20
                } else {
                    (11 - percentage) * 5
                };
                let timer = (self.rng.randint1(10) + extra).clamp(1, i16::MAX as i32) as i16;
                if let Some(m) = self.floor.monster_mut(m_idx) {
                    m.timed.monfear = timer;
                }
                if self.floor.monster(m_idx).ml {
                    let name = self.monster_name_cap(m_idx);
                    self.message(format!("{name} flees in terror!"));
                }
            }
        }
        self.set_redraw(RedrawFlags::HEALTH);
        false
    }

    /// Remove a dead monster, dropping what it carried
    pub fn monster_death(&mut self, m_idx: usize, by_player: bool) {
        if !self.floor.monster_is_valid(m_idx) {
            return;
        }
        let name = self.monster_name_cap(m_idx);
        let seen = self.floor.monster(m_idx).ml;
        let r_idx = self.floor.monster(m_idx).r_idx;
        if by_player {
            self.message(format!("You have slain {}.", self.monster_name(m_idx)));
        } else if seen {
            self.message(format!("{name} dies."));
        }
        if let Some(race) = self.races.get_mut(r_idx) {
            race.cur_num = race.cur_num.saturating_sub(1);
            if by_player {
                race.lore.kills += 1;
            }
        }
        if self.player.riding == m_idx {
            self.player.riding = 0;
            self.message("You fall to the ground.");
        }
        self.floor.drop_held_items(m_idx);
        self.floor.delete_monster(m_idx);
        self.set_redraw(RedrawFlags::MAP | RedrawFlags::HEALTH);
    }

    /// Hurt the player; returns the damage actually taken
    pub fn take_hit(&mut self, dam: i32, source: &str) -> i32 {
        if self.player.is_dead || dam <= 0 {
            return 0;
        }
        if self.player.timed.invuln > 0 && !self.rng.one_in(PENETRATE_INVULNERABILITY) {
            return 0;
        }
        self.player.chp -= dam;
        self.set_redraw(RedrawFlags::PLAYER_HP);
        self.disturb();
        if self.player.chp < 0 {
            self.player.is_dead = true;
            self.message(format!("You die. ({source})"));
        }
        dam
    }
}

/// Upper-case the first letter
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::{Allegiance, MonraceDefinition, MonsterEntity};
    use crate::world::BufferSink;

    fn state() -> (GameState, usize) {
        let mut races = RaceTable::new();
        let r_idx = races.push(MonraceDefinition::new("cave orc", 'o', 7));
        let floor = Floor::new(12, 12).unwrap();
        let player = Player::new(Pos2D::new(5, 5));
        (GameState::new(floor, player, races, GameRng::new(3)), r_idx)
    }

    #[test]
    fn test_message_reaches_sink() {
        let (state, _) = state();
        let mut state = state.with_sink(BufferSink::default());
        state.message("Hello.");
        assert_eq!(state.messages, vec!["Hello.".to_owned()]);
    }

    #[test]
    fn test_visibility_and_names() {
        let (mut state, r_idx) = state();
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(5, 6), 10))
            .unwrap();
        assert_eq!(state.monster_name(m), "it");
        state.update_monster(m);
        assert!(state.floor.monster(m).ml);
        assert!(state.any_newly_seen_monster());
        assert_eq!(state.monster_name_cap(m), "The cave orc");
        assert_eq!(state.races.get(r_idx).lore.sights, 1);
    }

    #[test]
    fn test_enemies() {
        let (mut state, r_idx) = state();
        let a = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(2, 2), 10))
            .unwrap();
        let b = state
            .floor
            .place_monster(
                MonsterEntity::new(r_idx, Pos2D::new(2, 3), 10).with_allegiance(Allegiance::Pet),
            )
            .unwrap();
        let c = state
            .floor
            .place_monster(
                MonsterEntity::new(r_idx, Pos2D::new(2, 4), 10)
                    .with_allegiance(Allegiance::Friendly),
            )
            .unwrap();
        assert!(state.are_enemies(a, b));
        assert!(!state.are_enemies(b, c));
        assert!(!state.are_enemies(a, a));
    }

    #[test]
    fn test_damage_kills_and_cleans_up() {
        let (mut state, r_idx) = state();
        let m = state
            .floor
            .place_monster(MonsterEntity::new(r_idx, Pos2D::new(5, 7), 5))
            .unwrap();
        assert!(state.damage_monster(m, 6, true));
        assert!(!state.floor.monster_is_valid(m));
        assert_eq!(state.races.get(r_idx).lore.kills, 1);
    }

    #[test]
    fn test_take_hit_and_death() {
        let (mut state, _) = state();
        state.take_hit(5, "test");
        assert_eq!(state.player.chp, 15);
        state.take_hit(50, "test");
        assert!(state.player.is_dead);
    }
}
