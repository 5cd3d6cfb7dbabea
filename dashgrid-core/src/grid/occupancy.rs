// Occupancy map: which widget owns each grid cell.
//
// Cells hold a SlotId, an index into the widget slice the map was built
// from, rather than a widget id string. Rebuilding from the slice is cheap
// (O(total occupied cells)) and keeps the two structures from drifting.

use serde::Serialize;

use super::geometry::{within_bounds, GridBounds, GridRect, MAX_GRID_CELLS};
use super::model::Widget;

/// Index of a widget in the slice the occupancy map was built from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SlotId(pub usize);

#[derive(Debug, Clone)]
pub struct OccupancyMap {
    columns: i32,
    rows: i32,
    cells: Vec<Option<SlotId>>,
}

impl OccupancyMap {
    /// Empty map for `bounds`. Rows are cut so the map never exceeds
    /// `MAX_GRID_CELLS` cells.
    pub fn new(bounds: GridBounds) -> Self {
        let limit = MAX_GRID_CELLS as i32;
        let columns = bounds.columns.clamp(1, limit);
        let rows = bounds.rows.clamp(1, limit / columns);
        Self {
            columns,
            rows,
            cells: vec![None; columns as usize * rows as usize],
        }
    }

    /// Build a map with every widget placed at its current position.
    pub fn from_widgets(widgets: &[Widget], bounds: GridBounds) -> Self {
        let mut map = Self::new(bounds);
        map.rebuild(widgets);
        map
    }

    pub fn bounds(&self) -> GridBounds {
        GridBounds::new(self.columns, self.rows)
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 1 || col < 1 || row > self.rows || col > self.columns {
            return None;
        }
        Some(((row - 1) * self.columns + (col - 1)) as usize)
    }

    /// Clear and re-place every widget of the slice.
    pub fn rebuild(&mut self, widgets: &[Widget]) {
        self.clear();
        for (i, w) in widgets.iter().enumerate() {
            self.place(SlotId(i), &w.position);
        }
    }

    /// Mark every cell of `rect` as owned by `slot`.
    /// Cells outside the allocated map are skipped: oversized placements are clipped.
    pub fn place(&mut self, slot: SlotId, rect: &GridRect) {
        for cell in rect.cells() {
            if let Some(i) = self.index(cell.row, cell.col) {
                self.cells[i] = Some(slot);
            }
        }
    }

    /// Clear every cell owned by `slot` (full scan).
    pub fn remove(&mut self, slot: SlotId) {
        for c in self.cells.iter_mut() {
            if *c == Some(slot) {
                *c = None;
            }
        }
    }

    /// Clear the cells of `hint` that are owned by `slot`.
    pub fn remove_within(&mut self, slot: SlotId, hint: &GridRect) {
        for cell in hint.cells() {
            if let Some(i) = self.index(cell.row, cell.col) {
                if self.cells[i] == Some(slot) {
                    self.cells[i] = None;
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub fn owner_at(&self, row: i32, col: i32) -> Option<SlotId> {
        self.index(row, col).and_then(|i| self.cells[i])
    }

    pub fn is_free(&self, row: i32, col: i32) -> bool {
        matches!(self.index(row, col), Some(i) if self.cells[i].is_none())
    }

    /// Whether `rect` lies inside the map and every cell is free or owned by `exclude`.
    pub fn can_place(&self, rect: &GridRect, exclude: Option<SlotId>) -> bool {
        if !rect.is_valid() || !within_bounds(rect, self.columns, self.rows) {
            return false;
        }
        self.is_clear(rect, exclude)
    }

    /// Like `can_place` but only looks at the part of `rect` inside the map.
    pub fn is_clear(&self, rect: &GridRect, exclude: Option<SlotId>) -> bool {
        let row_start = rect.row_start.max(1);
        let row_end = rect.row_end.min(self.rows + 1);
        let col_start = rect.column_start.max(1);
        let col_end = rect.column_end.min(self.columns + 1);
        for row in row_start..row_end {
            for col in col_start..col_end {
                if let Some(i) = self.index(row, col) {
                    match self.cells[i] {
                        None => {}
                        Some(owner) if Some(owner) == exclude => {}
                        Some(_) => return false,
                    }
                }
            }
        }
        true
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
