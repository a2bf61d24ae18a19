//! The floor: grids plus the monster and item pools

use log::warn;
use serde::{Deserialize, Serialize};

use super::{Grid, GridFlags, Pos2D, TerrainKind};
use crate::item::ItemEntity;
use crate::monster::MonsterEntity;
use crate::world::{FloorError, RecalcFlags};
use crate::{MAX_FLOOR_HEIGHT, MAX_FLOOR_WIDTH, MAX_ITEMS, MAX_MONSTERS, MAX_RANGE};

/// One dungeon level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Floor {
    pub height: i32,
    pub width: i32,
    grids: Vec<Grid>,

    /// Monster pool; slot 0 is never used
    monsters: Vec<MonsterEntity>,
    m_free: Vec<usize>,

    /// Item pool; slot 0 is never used
    items: Vec<Option<ItemEntity>>,
    o_free: Vec<usize>,

    pub dun_level: i32,
    /// Surface map with region transitions at the edges
    pub is_wilderness: bool,
    /// Unlit dungeon where darkness spells are pointless
    pub is_dark: bool,
    /// Antimagic: only innate abilities work
    pub no_magic: bool,
    pub no_teleport: bool,
    /// Monster-versus-monster arena, the player only watches
    pub is_arena: bool,
    pub is_daytime: bool,

    /// Deferred recomputations
    pub recalc: RecalcFlags,

    /// Grids lit or darkened by monsters in the last pass
    pub mon_lite: Vec<Pos2D>,
}

impl Floor {
    /// Create an open floor ringed by boundary walls
    pub fn new(height: i32, width: i32) -> Result<Self, FloorError> {
        if height < 3 || width < 3 || height > MAX_FLOOR_HEIGHT || width > MAX_FLOOR_WIDTH {
            return Err(FloorError::InvalidDimensions { height, width });
        }
        let mut grids = vec![Grid::new(TerrainKind::Floor); (height * width) as usize];
        for y in 0..height {
            for x in 0..width {
                if y == 0 || x == 0 || y == height - 1 || x == width - 1 {
                    grids[(y * width + x) as usize] = Grid::new(TerrainKind::Boundary);
                }
            }
        }
        Ok(Self {
            height,
            width,
            grids,
            monsters: vec![MonsterEntity::default()],
            m_free: Vec::new(),
            items: vec![None],
            o_free: Vec::new(),
            dun_level: 1,
            is_wilderness: false,
            is_dark: false,
            no_magic: false,
            no_teleport: false,
            is_arena: false,
            is_daytime: false,
            recalc: RecalcFlags::FLOW | RecalcFlags::MONSTER_LITE,
            mon_lite: Vec::new(),
        })
    }

    /// Build a floor from a character map
    ///
    /// `#` granite, `%` magma, `X` permanent wall, `G` glass wall, `:` rubble,
    /// `+` closed door, `g` glass door, `'` open door, `s` secret door,
    /// `T` tree, `~` shallow water, `W` deep water, `L` lava, `v` chasm,
    /// `<`/`>` stairs, `^` trap, `m` mirror, `P` pattern; anything else is floor.
    /// The outer ring is forced to boundary walls.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, FloorError> {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
        if rows.iter().any(|r| r.chars().count() as i32 != width) {
            return Err(FloorError::InvalidDimensions { height, width });
        }
        let mut floor = Self::new(height, width)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let pos = Pos2D::new(y as i32, x as i32);
                if !floor.in_bounds(pos) {
                    continue;
                }
                let feat = match c {
                    '#' => TerrainKind::Granite,
                    '%' => TerrainKind::Magma,
                    'X' => TerrainKind::PermanentWall,
                    'G' => TerrainKind::GlassWall,
                    ':' => TerrainKind::Rubble,
                    '+' => TerrainKind::ClosedDoor,
                    'g' => TerrainKind::GlassDoor,
                    '\'' => TerrainKind::OpenDoor,
                    's' => TerrainKind::SecretDoor,
                    'T' => TerrainKind::Tree,
                    '~' => TerrainKind::ShallowWater,
                    'W' => TerrainKind::DeepWater,
                    'L' => TerrainKind::Lava,
                    'v' => TerrainKind::Chasm,
                    '<' => TerrainKind::UpStair,
                    '>' => TerrainKind::DownStair,
                    '^' => TerrainKind::Trap,
                    'm' => TerrainKind::Mirror,
                    'P' => TerrainKind::Pattern,
                    _ => TerrainKind::Floor,
                };
                let grid = floor.grid_mut(pos);
                grid.feat = feat;
                if feat == TerrainKind::SecretDoor {
                    grid.mimic = Some(TerrainKind::Granite);
                }
            }
        }
        Ok(floor)
    }

    /// Inside the grid array
    pub fn contains(&self, pos: Pos2D) -> bool {
        pos.y >= 0 && pos.x >= 0 && pos.y < self.height && pos.x < self.width
    }

    /// Strictly inside the outer ring
    pub fn in_bounds(&self, pos: Pos2D) -> bool {
        pos.y > 0 && pos.x > 0 && pos.y < self.height - 1 && pos.x < self.width - 1
    }

    fn index(&self, pos: Pos2D) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    /// Grid at a position the caller has checked with [`Floor::contains`]
    pub fn grid(&self, pos: Pos2D) -> &Grid {
        &self.grids[self.index(pos)]
    }

    pub fn grid_mut(&mut self, pos: Pos2D) -> &mut Grid {
        let idx = self.index(pos);
        &mut self.grids[idx]
    }

    pub fn get_grid(&self, pos: Pos2D) -> Option<&Grid> {
        self.contains(pos).then(|| self.grid(pos))
    }

    /// Replace the terrain of a grid, invalidating flow and lighting
    pub fn set_feat(&mut self, pos: Pos2D, feat: TerrainKind) {
        if !self.contains(pos) {
            warn!("set_feat outside the floor at {pos:?}");
            return;
        }
        let grid = self.grid_mut(pos);
        grid.feat = feat;
        grid.mimic = None;
        grid.lock_power = 0;
        grid.info.remove(GridFlags::JAMMED);
        self.recalc |= RecalcFlags::FLOW | RecalcFlags::MONSTER_LITE | RecalcFlags::VIEW;
    }

    /// No monster, no player check (callers know where the player is)
    pub fn is_empty_floor(&self, pos: Pos2D) -> bool {
        self.in_bounds(pos)
            && !self.grid(pos).has_monster()
            && self.grid(pos).has(super::TerrainFlags::MOVE)
            && !self.grid(pos).has(super::TerrainFlags::PATTERN)
    }

    /// Every position of the floor, row by row
    pub fn positions(&self) -> impl Iterator<Item = Pos2D> + use<> {
        let (h, w) = (self.height, self.width);
        (0..h).flat_map(move |y| (0..w).map(move |x| Pos2D::new(y, x)))
    }

    // Monster pool

    /// Put a monster on the floor, returning its index
    pub fn place_monster(&mut self, mut monster: MonsterEntity) -> Result<usize, FloorError> {
        let pos = monster.pos;
        if !self.in_bounds(pos) {
            return Err(FloorError::OutOfBounds(pos));
        }
        if self.grid(pos).has_monster() {
            return Err(FloorError::Occupied(pos));
        }
        let m_idx = match self.m_free.pop() {
            Some(idx) => idx,
            None if self.monsters.len() < MAX_MONSTERS => {
                self.monsters.push(MonsterEntity::default());
                self.monsters.len() - 1
            }
            None => return Err(FloorError::MonsterPoolFull),
        };
        if monster.parent_m_idx == 0 {
            monster.parent_m_idx = m_idx;
        }
        self.monsters[m_idx] = monster;
        self.grid_mut(pos).m_idx = m_idx;
        self.recalc |= RecalcFlags::MONSTER_LITE;
        Ok(m_idx)
    }

    /// Monster in a slot; empty slots read as the default entity
    pub fn monster(&self, m_idx: usize) -> &MonsterEntity {
        self.monsters.get(m_idx).unwrap_or(&self.monsters[0])
    }

    pub fn monster_mut(&mut self, m_idx: usize) -> Option<&mut MonsterEntity> {
        if !self.monster_is_valid(m_idx) {
            return None;
        }
        self.monsters.get_mut(m_idx)
    }

    pub fn monster_is_valid(&self, m_idx: usize) -> bool {
        m_idx != 0 && self.monsters.get(m_idx).is_some_and(MonsterEntity::is_valid)
    }

    /// Indices of every live monster
    pub fn monster_indices(&self) -> Vec<usize> {
        (1..self.monsters.len())
            .filter(|&i| self.monsters[i].is_valid())
            .collect()
    }

    /// Highest slot in use plus one
    pub fn monster_max(&self) -> usize {
        self.monsters.len()
    }

    /// How far monster projections reach here; arena fights span twice as far
    pub fn max_range(&self) -> i32 {
        if self.is_arena { MAX_RANGE * 2 } else { MAX_RANGE }
    }

    /// Remove a monster and everything it carries
    pub fn delete_monster(&mut self, m_idx: usize) {
        if !self.monster_is_valid(m_idx) {
            warn!("delete_monster on invalid index {m_idx}");
            return;
        }
        let pos = self.monsters[m_idx].pos;
        let held = core::mem::take(&mut self.monsters[m_idx].held_items);
        for o_idx in held {
            self.items[o_idx] = None;
            self.o_free.push(o_idx);
        }
        if self.contains(pos) && self.grid(pos).m_idx == m_idx {
            self.grid_mut(pos).m_idx = 0;
        }
        for (i, m) in self.monsters.iter_mut().enumerate() {
            if m.is_valid() && m.parent_m_idx == m_idx {
                m.parent_m_idx = i;
            }
        }
        self.monsters[m_idx] = MonsterEntity::default();
        self.m_free.push(m_idx);
        self.recalc |= RecalcFlags::MONSTER_LITE;
    }

    /// Move a monster to an empty grid
    pub fn move_monster(&mut self, m_idx: usize, to: Pos2D) {
        if !self.monster_is_valid(m_idx) || !self.contains(to) {
            warn!("move_monster: bad move of {m_idx} to {to:?}");
            return;
        }
        let from = self.monsters[m_idx].pos;
        if self.grid(from).m_idx == m_idx {
            self.grid_mut(from).m_idx = 0;
        }
        self.grid_mut(to).m_idx = m_idx;
        self.monsters[m_idx].pos = to;
        self.recalc |= RecalcFlags::MONSTER_LITE;
    }

    /// Exchange the positions of two monsters
    pub fn swap_monsters(&mut self, a: usize, b: usize) {
        if !self.monster_is_valid(a) || !self.monster_is_valid(b) {
            warn!("swap_monsters: bad indices {a}, {b}");
            return;
        }
        let pa = self.monsters[a].pos;
        let pb = self.monsters[b].pos;
        self.monsters[a].pos = pb;
        self.monsters[b].pos = pa;
        self.grid_mut(pa).m_idx = b;
        self.grid_mut(pb).m_idx = a;
        self.recalc |= RecalcFlags::MONSTER_LITE;
    }

    // Item pool

    fn alloc_item(&mut self, item: ItemEntity) -> Result<usize, FloorError> {
        let o_idx = match self.o_free.pop() {
            Some(idx) => idx,
            None if self.items.len() < MAX_ITEMS => {
                self.items.push(None);
                self.items.len() - 1
            }
            None => return Err(FloorError::ItemPoolFull),
        };
        self.items[o_idx] = Some(item);
        Ok(o_idx)
    }

    /// Drop an item on a grid, behind whatever already lies there
    pub fn place_item(&mut self, mut item: ItemEntity, pos: Pos2D) -> Result<usize, FloorError> {
        if !self.contains(pos) {
            return Err(FloorError::OutOfBounds(pos));
        }
        item.pos = pos;
        item.held_m_idx = 0;
        let o_idx = self.alloc_item(item)?;
        self.grid_mut(pos).o_idx_list.push(o_idx);
        Ok(o_idx)
    }

    /// Hand a new item to a monster
    pub fn give_item(&mut self, mut item: ItemEntity, m_idx: usize) -> Result<usize, FloorError> {
        if !self.monster_is_valid(m_idx) {
            return Err(FloorError::OutOfBounds(self.monster(m_idx).pos));
        }
        item.held_m_idx = m_idx;
        let o_idx = self.alloc_item(item)?;
        self.monsters[m_idx].held_items.push(o_idx);
        Ok(o_idx)
    }

    pub fn item(&self, o_idx: usize) -> Option<&ItemEntity> {
        self.items.get(o_idx).and_then(Option::as_ref)
    }

    /// Items on a grid, oldest first
    pub fn items_at(&self, pos: Pos2D) -> &[usize] {
        match self.get_grid(pos) {
            Some(g) => &g.o_idx_list,
            None => &[],
        }
    }

    /// Take an item off its grid or holder and return it
    pub fn take_item(&mut self, o_idx: usize) -> Option<ItemEntity> {
        let item = self.items.get_mut(o_idx)?.take()?;
        if item.is_held() {
            if let Some(m) = self.monsters.get_mut(item.held_m_idx) {
                m.held_items.retain(|&i| i != o_idx);
            }
        } else if self.contains(item.pos) {
            let pos = item.pos;
            self.grid_mut(pos).o_idx_list.retain(|&i| i != o_idx);
        }
        self.o_free.push(o_idx);
        Some(item)
    }

    pub fn delete_item(&mut self, o_idx: usize) {
        if self.take_item(o_idx).is_none() {
            warn!("delete_item on empty slot {o_idx}");
        }
    }

    /// Move a floor item into a monster's pack
    pub fn hand_item_to_monster(&mut self, o_idx: usize, m_idx: usize) -> bool {
        if !self.monster_is_valid(m_idx) {
            return false;
        }
        let Some(item) = self.take_item(o_idx) else {
            return false;
        };
        self.give_item(item, m_idx).is_ok()
    }

    /// Move everything a monster carries onto the floor below it
    pub fn drop_held_items(&mut self, m_idx: usize) {
        if !self.monster_is_valid(m_idx) {
            return;
        }
        let pos = self.monsters[m_idx].pos;
        let held = self.monsters[m_idx].held_items.clone();
        for o_idx in held {
            if let Some(item) = self.take_item(o_idx) {
                let _ = self.place_item(item, pos);
            }
        }
    }
}
