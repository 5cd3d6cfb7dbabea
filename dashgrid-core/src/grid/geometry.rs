// Rectangle primitives on the widget grid.
//
// Coordinates are 1-based CSS grid lines: a widget spanning the first two
// columns has column_start = 1, column_end = 3. Ends are exclusive, so two
// rectangles that merely touch do not overlap.

use serde::{Deserialize, Serialize};

/// Upper limit on `columns * rows` for any allocated grid.
pub const MAX_GRID_CELLS: i64 = 1 << 20;

/// A rectangle of grid cells, `[column_start, column_end) x [row_start, row_end)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRect {
    pub column_start: i32,
    pub column_end: i32,
    pub row_start: i32,
    pub row_end: i32,
}

/// A single grid cell (1-based).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub row: i32,
    pub col: i32,
}

/// Allocated extent of a grid: `columns` wide and `rows` tall.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub columns: i32,
    pub rows: i32,
}

/// Overlap geometry between two rectangles.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionMetrics {
    pub rect: GridRect,
    pub overlap_width: i32,
    pub overlap_height: i32,
    pub overlap_area: i32,
    /// Overlap area relative to the smaller of the two rectangles.
    pub overlap_percentage: f64,
}

impl GridRect {
    /// Rectangle with its top-left cell at (`column`, `row`).
    /// Coordinates saturate at the i32 range.
    pub fn at(column: i32, row: i32, width: i32, height: i32) -> Self {
        Self {
            column_start: column,
            column_end: column.saturating_add(width),
            row_start: row,
            row_end: row.saturating_add(height),
        }
    }

    pub fn width(&self) -> i32 { self.column_end.saturating_sub(self.column_start) }
    pub fn height(&self) -> i32 { self.row_end.saturating_sub(self.row_start) }
    pub fn area(&self) -> i32 { self.width().saturating_mul(self.height()) }

    pub fn origin(&self) -> GridCell {
        GridCell { row: self.row_start, col: self.column_start }
    }

    /// A widget rectangle must cover at least one cell on each axis.
    pub fn is_valid(&self) -> bool {
        self.width() >= 1 && self.height() >= 1
    }

    /// Same size, new top-left corner.
    pub fn moved_to(&self, column: i32, row: i32) -> Self {
        Self::at(column, row, self.width(), self.height())
    }

    /// Same top-left corner, new size.
    pub fn resized(&self, width: i32, height: i32) -> Self {
        Self::at(self.column_start, self.row_start, width, height)
    }

    pub fn translated(&self, d_col: i32, d_row: i32) -> Self {
        Self::at(
            self.column_start.saturating_add(d_col),
            self.row_start.saturating_add(d_row),
            self.width(),
            self.height(),
        )
    }

    /// Smallest rectangle containing both.
    pub fn bounding(&self, other: &GridRect) -> GridRect {
        GridRect {
            column_start: self.column_start.min(other.column_start),
            column_end: self.column_end.max(other.column_end),
            row_start: self.row_start.min(other.row_start),
            row_end: self.row_end.max(other.row_end),
        }
    }

    /// Grow by `margin` cells on every side.
    pub fn inflated(&self, margin: i32) -> GridRect {
        GridRect {
            column_start: self.column_start.saturating_sub(margin),
            column_end: self.column_end.saturating_add(margin),
            row_start: self.row_start.saturating_sub(margin),
            row_end: self.row_end.saturating_add(margin),
        }
    }

    /// Euclidean grid distance between the top-left corners.
    pub fn distance_to(&self, other: &GridRect) -> f64 {
        let dx = f64::from(other.column_start) - f64::from(self.column_start);
        let dy = f64::from(other.row_start) - f64::from(self.row_start);
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether a `width x height` block fits inside this rectangle.
    pub fn can_contain(&self, width: i32, height: i32) -> bool {
        width <= self.width() && height <= self.height()
    }

    /// Iterate every cell covered by the rectangle, row-major.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        (self.row_start..self.row_end)
            .flat_map(move |row| (self.column_start..self.column_end).map(move |col| GridCell { row, col }))
    }

    /// Move the rectangle so it lies inside `bounds`, keeping its size.
    /// Returns `None` when the rectangle is larger than the bounds.
    pub fn clamped_into(&self, bounds: GridBounds) -> Option<GridRect> {
        if self.width() > bounds.columns || self.height() > bounds.rows {
            return None;
        }
        let col = self.column_start.clamp(1, bounds.columns - self.width() + 1);
        let row = self.row_start.clamp(1, bounds.rows - self.height() + 1);
        Some(self.moved_to(col, row))
    }
}

impl GridBounds {
    pub fn new(columns: i32, rows: i32) -> Self {
        Self { columns, rows }
    }

    pub fn contains(&self, rect: &GridRect) -> bool {
        within_bounds(rect, self.columns, self.rows)
    }

    /// Positive on both axes and no more than `MAX_GRID_CELLS` cells.
    pub fn is_allocatable(&self) -> bool {
        self.columns >= 1 && self.rows >= 1 && i64::from(self.columns) * i64::from(self.rows) <= MAX_GRID_CELLS
    }

    /// Nearest cell inside the bounds.
    pub fn clamp_cell(&self, cell: GridCell) -> GridCell {
        GridCell {
            row: cell.row.clamp(1, self.rows.max(1)),
            col: cell.col.clamp(1, self.columns.max(1)),
        }
    }
}

/// True unless the rectangles are separated on either axis.
pub fn overlaps(a: &GridRect, b: &GridRect) -> bool {
    a.column_start < b.column_end
        && b.column_start < a.column_end
        && a.row_start < b.row_end
        && b.row_start < a.row_end
}

pub fn intersection(a: &GridRect, b: &GridRect) -> Option<GridRect> {
    let rect = GridRect {
        column_start: a.column_start.max(b.column_start),
        column_end: a.column_end.min(b.column_end),
        row_start: a.row_start.max(b.row_start),
        row_end: a.row_end.min(b.row_end),
    };
    if rect.column_start >= rect.column_end || rect.row_start >= rect.row_end {
        return None;
    }
    Some(rect)
}

pub fn intersection_metrics(a: &GridRect, b: &GridRect) -> Option<IntersectionMetrics> {
    let rect = intersection(a, b)?;
    let overlap_area = rect.area();
    let smaller = a.area().min(b.area()).max(1);
    Some(IntersectionMetrics {
        rect,
        overlap_width: rect.width(),
        overlap_height: rect.height(),
        overlap_area,
        overlap_percentage: f64::from(overlap_area) / f64::from(smaller),
    })
}

/// 1-based bounds check: lines run from 1 to `columns + 1` / `row_capacity + 1`.
pub fn within_bounds(rect: &GridRect, columns: i32, row_capacity: i32) -> bool {
    rect.column_start >= 1
        && rect.column_end <= columns + 1
        && rect.row_start >= 1
        && rect.row_end <= row_capacity + 1
}
