//! Spatial hash grid for ally lookups
//!
//! Divides the world into square cells keyed by integer coordinates. Radius
//! queries only visit the cells overlapping the query circle, then filter by
//! exact distance.

use hashbrown::HashMap;

use crate::game::agent::AgentId;
use crate::util::vec2::Vec2;

/// Initial capacity for grid cells (number of expected non-empty cells)
const GRID_INITIAL_CAPACITY: usize = 64;

/// Initial capacity for agent vectors within cells
const CELL_INITIAL_CAPACITY: usize = 4;

/// Grid cell key - (x, y) cell coordinates
pub type CellKey = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridEntry {
    pub id: AgentId,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    /// Inverse cell size for fast position-to-cell conversion
    inv_cell_size: f32,
    cells: HashMap<CellKey, Vec<GridEntry>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::with_capacity(GRID_INITIAL_CAPACITY),
        }
    }

    /// Clear all entries, keeping cell allocations
    #[inline]
    pub fn clear(&mut self) {
        for cell in self.cells.values_mut() {
            cell.clear();
        }
    }

    #[inline]
    fn position_to_cell(&self, position: Vec2) -> CellKey {
        (
            (position.x * self.inv_cell_size).floor() as i32,
            (position.y * self.inv_cell_size).floor() as i32,
        )
    }

    #[inline]
    pub fn insert(&mut self, id: AgentId, position: Vec2) {
        if !position.is_finite() {
            return;
        }
        let key = self.position_to_cell(position);
        self.cells
            .entry(key)
            .or_insert_with(|| Vec::with_capacity(CELL_INITIAL_CAPACITY))
            .push(GridEntry { id, position });
    }

    /// Replace the grid contents
    pub fn rebuild(&mut self, entries: impl Iterator<Item = (AgentId, Vec2)>) {
        self.clear();
        for (id, position) in entries {
            self.insert(id, position);
        }
    }

    /// Entries within `radius` of `position`
    pub fn query_radius(&self, position: Vec2, radius: f32) -> impl Iterator<Item = &GridEntry> + '_ {
        let (cx, cy) = self.position_to_cell(position);
        let reach = (radius.max(0.0) * self.inv_cell_size).ceil() as i32;
        let radius_sq = radius * radius;

        (-reach..=reach)
            .flat_map(move |dy| (-reach..=reach).map(move |dx| (cx + dx, cy + dy)))
            .filter_map(move |key| self.cells.get(&key))
            .flat_map(|cell| cell.iter())
            .filter(move |entry| entry.position.distance_sq_to(position) <= radius_sq)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(crate::game::constants::spatial::CELL_SIZE)
    }
}
