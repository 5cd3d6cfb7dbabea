// Collision detection and free-space search.
//
// detect() is an exact O(n) rectangle test against every widget.
// find_alternative_position() builds an occupancy map and walks a spiral
// out from the preferred cell, falling back to a raster scan of the whole
// grid so that a free rectangle is always found if one exists.

use std::collections::BTreeSet;

use log::trace;
use serde::Serialize;

use super::geometry::{intersection_metrics, overlaps, GridBounds, GridCell, GridRect};
use super::model::Widget;
use super::occupancy::{OccupancyMap, SlotId};
use super::spiral::Spiral;

/// Moves of at most this many cells on each axis use incremental detection.
pub const MINIMAL_CHANGE_THRESHOLD: i32 = 2;

/// Default ring budget before falling back to the raster scan.
pub const DEFAULT_MAX_RINGS: i32 = 15;

/// Overlap between the candidate and one existing widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionArea {
    pub widget_id: String,
    pub rect: GridRect,
    pub overlap_width: i32,
    pub overlap_height: i32,
    pub overlap_area: i32,
    pub overlap_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionResult {
    pub has_collision: bool,
    pub colliding_widget_ids: BTreeSet<String>,
    /// One entry per colliding widget, in widget order.
    pub collision_areas: Vec<CollisionArea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_position: Option<GridRect>,
}

#[derive(Debug, Clone)]
pub struct CollisionDetector {
    /// Spiral rings tried before the raster fallback.
    pub max_rings: i32,
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self { max_rings: DEFAULT_MAX_RINGS }
    }
}

impl CollisionDetector {
    pub fn new(max_rings: i32) -> Self {
        Self { max_rings: max_rings.max(0) }
    }

    /// Test `candidate` against every widget except `exclude_id`.
    pub fn detect(&self, candidate: &GridRect, widgets: &[Widget], exclude_id: Option<&str>) -> CollisionResult {
        collect_collisions(candidate, widgets.iter(), exclude_id)
    }

    /// Same result as `detect`, but for small moves only widgets near the
    /// union of the old and new positions are tested.
    pub fn detect_incremental(
        &self,
        previous: &GridRect,
        candidate: &GridRect,
        widgets: &[Widget],
        exclude_id: Option<&str>,
    ) -> CollisionResult {
        let d_col = candidate
            .column_start
            .abs_diff(previous.column_start)
            .max(candidate.column_end.abs_diff(previous.column_end));
        let d_row = candidate
            .row_start
            .abs_diff(previous.row_start)
            .max(candidate.row_end.abs_diff(previous.row_end));

        let threshold = MINIMAL_CHANGE_THRESHOLD.unsigned_abs();
        if d_col > threshold || d_row > threshold {
            return self.detect(candidate, widgets, exclude_id);
        }

        // Anything overlapping the candidate also intersects this region.
        let region = previous.bounding(candidate);
        let nearby = widgets.iter().filter(|w| overlaps(&w.position, &region));
        collect_collisions(candidate, nearby, exclude_id)
    }

    /// `detect` plus a suggested free position of the same size when colliding.
    pub fn detect_with_suggestion(
        &self,
        candidate: &GridRect,
        widgets: &[Widget],
        exclude_id: Option<&str>,
        bounds: GridBounds,
    ) -> CollisionResult {
        let mut result = self.detect(candidate, widgets, exclude_id);
        if result.has_collision {
            result.suggested_position = self.find_alternative_position(
                candidate.width(),
                candidate.height(),
                candidate.origin(),
                widgets,
                exclude_id,
                bounds,
            );
        }
        result
    }

    /// Nearest free `width x height` rectangle to `preferred`, or `None` if the
    /// grid has no such rectangle anywhere.
    pub fn find_alternative_position(
        &self,
        width: i32,
        height: i32,
        preferred: GridCell,
        widgets: &[Widget],
        exclude_id: Option<&str>,
        bounds: GridBounds,
    ) -> Option<GridRect> {
        let mut map = OccupancyMap::new(bounds);
        for (i, w) in widgets.iter().enumerate() {
            if Some(w.id.as_str()) != exclude_id {
                map.place(SlotId(i), &w.position);
            }
        }
        self.find_position_in(&map, width, height, preferred, None)
    }

    /// Spiral-then-raster search on an existing occupancy map.
    pub fn find_position_in(
        &self,
        map: &OccupancyMap,
        width: i32,
        height: i32,
        preferred: GridCell,
        exclude: Option<SlotId>,
    ) -> Option<GridRect> {
        let bounds = map.bounds();
        if width < 1 || height < 1 || width > bounds.columns || height > bounds.rows {
            return None;
        }

        let preferred = bounds.clamp_cell(preferred);
        for (d_row, d_col) in Spiral::new(self.max_rings) {
            let rect = GridRect::at(preferred.col + d_col, preferred.row + d_row, width, height);
            if map.can_place(&rect, exclude) {
                trace!("spiral hit at offset ({d_row}, {d_col}) for {width}x{height}");
                return Some(rect);
            }
        }

        raster_scan(map, width, height, exclude)
    }
}

/// First free rectangle in row-major order from the top-left corner.
pub fn raster_scan(map: &OccupancyMap, width: i32, height: i32, exclude: Option<SlotId>) -> Option<GridRect> {
    let bounds = map.bounds();
    for row in 1..=(bounds.rows - height + 1) {
        for col in 1..=(bounds.columns - width + 1) {
            let rect = GridRect::at(col, row, width, height);
            if map.can_place(&rect, exclude) {
                return Some(rect);
            }
        }
    }
    None
}

fn collect_collisions<'a>(
    candidate: &GridRect,
    widgets: impl Iterator<Item = &'a Widget>,
    exclude_id: Option<&str>,
) -> CollisionResult {
    let mut result = CollisionResult::default();
    for w in widgets {
        if Some(w.id.as_str()) == exclude_id || !overlaps(candidate, &w.position) {
            continue;
        }
        if let Some(m) = intersection_metrics(candidate, &w.position) {
            result.colliding_widget_ids.insert(w.id.clone());
            result.collision_areas.push(CollisionArea {
                widget_id: w.id.clone(),
                rect: m.rect,
                overlap_width: m.overlap_width,
                overlap_height: m.overlap_height,
                overlap_area: m.overlap_area,
                overlap_percentage: m.overlap_percentage,
            });
        }
    }
    result.has_collision = !result.collision_areas.is_empty();
    result
}
