// Auto-reflow: gravity and left-alignment compaction.
//
// Each iteration:
// 1. resets the occupancy map and paints fixed widgets (locked, or outside
//    the reflow region) as obstacles
// 2. orders the movable widgets top-left first, larger first within a tie
// 3. pulls each one up (gravity) then left (left alignment) into the first
//    position that fits against what has been placed so far
// 4. scores the iteration's stability
//
// The loop stops when stability reaches the threshold or after
// max_iterations passes. Partial convergence is an accepted outcome.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use super::collision::raster_scan;
use super::geometry::{overlaps, GridBounds, GridRect};
use super::model::Widget;
use super::occupancy::{OccupancyMap, SlotId};
use super::resolver::WidgetMove;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReflowConfig {
    /// Pull widgets toward the top.
    pub enable_gravity: bool,
    /// Pull widgets toward the left.
    pub enable_left_alignment: bool,
    /// Process widgets in caller order instead of by position.
    pub preserve_relative_order: bool,
    /// Free cells kept between a widget and its neighbours.
    pub minimum_gap: i32,
    pub max_iterations: u32,
    /// In [0, 1].
    pub stability_threshold: f64,
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self {
            enable_gravity: true,
            enable_left_alignment: true,
            preserve_relative_order: false,
            minimum_gap: 0,
            max_iterations: 10,
            stability_threshold: 0.95,
        }
    }
}

/// Statistics for one iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflowPass {
    pub moved: usize,
    pub movement_distance: f64,
    pub stability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflowResult {
    /// Net moves, from the position before reflow to the final one.
    pub moved_widgets: Vec<WidgetMove>,
    pub total_movement_distance: f64,
    pub reflow_time_ms: f64,
    /// Stability of the last iteration.
    pub stability: f64,
    pub iterations: u32,
    pub passes: Vec<ReflowPass>,
}

/// Stability of an iteration: 1.0 when nothing moved, lower the more widgets
/// moved and the further they travelled.
pub fn compute_stability(moved: usize, total: usize, movement_distance: f64) -> f64 {
    if moved == 0 || total == 0 {
        return 1.0;
    }
    let moved_ratio = moved as f64 / total as f64;
    let avg = movement_distance / moved as f64;
    let penalty = (avg / 10.0).min(0.5);
    ((1.0 - moved_ratio) - penalty).max(0.0)
}

#[derive(Debug, Clone, Default)]
pub struct AutoReflowEngine {
    config: ReflowConfig,
}

impl AutoReflowEngine {
    pub fn new(config: ReflowConfig) -> Self {
        let mut config = config;
        config.stability_threshold = config.stability_threshold.clamp(0.0, 1.0);
        config.minimum_gap = config.minimum_gap.max(0);
        Self { config }
    }

    pub fn config(&self) -> &ReflowConfig {
        &self.config
    }

    /// Compact the whole layout.
    pub fn execute(&self, widgets: &[Widget], bounds: GridBounds) -> ReflowResult {
        self.run(widgets, bounds, |w| !w.locked)
    }

    /// Compact only widgets intersecting `region`; all others stay put.
    pub fn reflow_region(&self, widgets: &[Widget], region: &GridRect, bounds: GridBounds) -> ReflowResult {
        self.run(widgets, bounds, |w| !w.locked && overlaps(&w.position, region))
    }

    /// Single pass: every movable widget goes to the first free rectangle in
    /// row-major order. Equivalent to gravity + left alignment run to convergence.
    pub fn minimize_empty_space(&self, widgets: &[Widget], bounds: GridBounds) -> ReflowResult {
        let start = Instant::now();
        let movable: Vec<bool> = widgets.iter().map(|w| !w.locked).collect();
        let mut positions: Vec<GridRect> = widgets.iter().map(|w| w.position).collect();
        let mut map = OccupancyMap::new(bounds);
        paint_fixed(&mut map, &positions, &movable);

        let mut moved = 0;
        let mut distance = 0.0;
        for i in self.placement_order(&positions, &movable) {
            let current = positions[i];
            let target = self
                .first_fit(&map, current.width(), current.height())
                .unwrap_or_else(|| {
                    warn!("minimize: no room for '{}' ({}x{})", widgets[i].id, current.width(), current.height());
                    current
                });
            map.place(SlotId(i), &target);
            if target != current {
                moved += 1;
                distance += current.distance_to(&target);
                positions[i] = target;
            }
        }

        let pass = ReflowPass { moved, movement_distance: distance, stability: 1.0 };
        finish(widgets, &positions, vec![pass], 1.0, start)
    }

    fn run(&self, widgets: &[Widget], bounds: GridBounds, is_movable: impl Fn(&Widget) -> bool) -> ReflowResult {
        let start = Instant::now();
        let movable: Vec<bool> = widgets.iter().map(&is_movable).collect();
        let mut positions: Vec<GridRect> = widgets.iter().map(|w| w.position).collect();
        let mut map = OccupancyMap::new(bounds);
        let mut passes = Vec::new();
        let mut stability = 1.0;

        for iteration in 1..=self.config.max_iterations {
            let pass = self.iterate(widgets, &mut positions, &movable, &mut map);
            debug!(
                "reflow iteration {iteration}: moved {} distance {:.2} stability {:.3}",
                pass.moved, pass.movement_distance, pass.stability
            );
            stability = pass.stability;
            passes.push(pass);
            if stability >= self.config.stability_threshold {
                break;
            }
        }

        finish(widgets, &positions, passes, stability, start)
    }

    fn iterate(
        &self,
        widgets: &[Widget],
        positions: &mut [GridRect],
        movable: &[bool],
        map: &mut OccupancyMap,
    ) -> ReflowPass {
        map.clear();
        paint_fixed(map, positions, movable);

        let mut moved = 0;
        let mut distance = 0.0;
        // Fixed widgets count toward the total, so a small region scores high.
        let total = widgets.len();

        for i in self.placement_order(positions, movable) {
            let current = positions[i];
            let mut target = current;

            if self.config.enable_gravity {
                if let Some(row) = (1..=map.bounds().rows - target.height() + 1)
                    .find(|&row| self.fits(map, &target.moved_to(target.column_start, row)))
                {
                    target = target.moved_to(target.column_start, row);
                }
            }
            if self.config.enable_left_alignment {
                if let Some(col) = (1..=map.bounds().columns - target.width() + 1)
                    .find(|&col| self.fits(map, &target.moved_to(col, target.row_start)))
                {
                    target = target.moved_to(col, target.row_start);
                }
            }
            if !self.fits(map, &target) {
                warn!("reflow: '{}' has no free position, left at {:?}", widgets[i].id, current);
                target = current;
            }

            map.place(SlotId(i), &target);
            if target != current {
                trace!("reflow: '{}' {:?} -> {:?}", widgets[i].id, current, target);
                moved += 1;
                distance += current.distance_to(&target);
                positions[i] = target;
            }
        }

        ReflowPass {
            moved,
            movement_distance: distance,
            stability: compute_stability(moved, total, distance),
        }
    }

    /// Movable widget indices in placement order.
    fn placement_order(&self, positions: &[GridRect], movable: &[bool]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..positions.len()).filter(|&i| movable[i]).collect();
        if !self.config.preserve_relative_order {
            // Stable sort: equal keys fall back to caller order.
            order.sort_by_key(|&i| {
                let r = positions[i];
                (r.row_start, r.column_start, std::cmp::Reverse(r.area()))
            });
        }
        order
    }

    fn fits(&self, map: &OccupancyMap, rect: &GridRect) -> bool {
        map.can_place(rect, None)
            && (self.config.minimum_gap == 0 || map.is_clear(&rect.inflated(self.config.minimum_gap), None))
    }

    fn first_fit(&self, map: &OccupancyMap, width: i32, height: i32) -> Option<GridRect> {
        if self.config.minimum_gap == 0 {
            return raster_scan(map, width, height, None);
        }
        let bounds = map.bounds();
        (1..=bounds.rows - height + 1)
            .flat_map(|row| (1..=bounds.columns - width + 1).map(move |col| GridRect::at(col, row, width, height)))
            .find(|rect| self.fits(map, rect))
    }
}

fn paint_fixed(map: &mut OccupancyMap, positions: &[GridRect], movable: &[bool]) {
    for (i, rect) in positions.iter().enumerate() {
        if !movable[i] {
            map.place(SlotId(i), rect);
        }
    }
}

fn finish(
    widgets: &[Widget],
    positions: &[GridRect],
    passes: Vec<ReflowPass>,
    stability: f64,
    start: Instant,
) -> ReflowResult {
    let moved_widgets: Vec<WidgetMove> = widgets
        .iter()
        .zip(positions)
        .filter(|(w, p)| w.position != **p)
        .map(|(w, p)| WidgetMove { id: w.id.clone(), old_position: w.position, new_position: *p })
        .collect();
    let total_movement_distance: f64 = moved_widgets.iter().map(WidgetMove::distance).sum();

    ReflowResult {
        moved_widgets,
        total_movement_distance,
        reflow_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        stability,
        iterations: passes.len() as u32,
        passes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(id: &str, col: i32, row: i32, w: i32, h: i32) -> Widget {
        Widget::new(id, "stats", GridRect::at(col, row, w, h))
    }

    fn bounds() -> GridBounds {
        GridBounds::new(8, 30)
    }

    fn no_overlaps(widgets: &[Widget], result: &ReflowResult) -> bool {
        let final_rects: Vec<GridRect> = widgets
            .iter()
            .map(|w| {
                result
                    .moved_widgets
                    .iter()
                    .find(|m| m.id == w.id)
                    .map_or(w.position, |m| m.new_position)
            })
            .collect();
        for i in 0..final_rects.len() {
            for j in (i + 1)..final_rects.len() {
                if overlaps(&final_rects[i], &final_rects[j]) {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_stability_formula() {
        assert_eq!(compute_stability(0, 5, 0.0), 1.0);
        // 1 of 4 moved, 2 cells: 0.75 - 0.2
        assert!((compute_stability(1, 4, 2.0) - 0.55).abs() < 1e-9);
        // penalty caps at 0.5, result floors at 0
        assert_eq!(compute_stability(4, 4, 100.0), 0.0);
    }

    #[test]
    fn test_compacted_layout_is_stable() {
        let widgets = vec![widget("a", 1, 1, 2, 2), widget("b", 3, 1, 4, 1), widget("c", 3, 2, 1, 1)];
        let result = AutoReflowEngine::default().execute(&widgets, bounds());

        assert!(result.moved_widgets.is_empty());
        assert_eq!(result.stability, 1.0);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_gravity_then_left_alignment() {
        let widgets = vec![widget("a", 1, 1, 2, 2), widget("floating", 5, 6, 2, 1)];
        let result = AutoReflowEngine::default().execute(&widgets, bounds());

        assert_eq!(result.moved_widgets.len(), 1);
        let mv = &result.moved_widgets[0];
        assert_eq!(mv.id, "floating");
        assert_eq!(mv.new_position, GridRect::at(3, 1, 2, 1));
        assert!((result.total_movement_distance - mv.distance()).abs() < 1e-9);
        assert!(no_overlaps(&widgets, &result));
    }

    #[test]
    fn test_gravity_only_keeps_column() {
        let cfg = ReflowConfig { enable_left_alignment: false, ..ReflowConfig::default() };
        let widgets = vec![widget("a", 1, 1, 2, 2), widget("floating", 5, 6, 2, 1)];
        let result = AutoReflowEngine::new(cfg).execute(&widgets, bounds());
        assert_eq!(result.moved_widgets[0].new_position, GridRect::at(5, 1, 2, 1));
    }

    #[test]
    fn test_locked_widgets_stay_put() {
        let widgets = vec![widget("pinned", 1, 4, 2, 2).locked(), widget("b", 1, 8, 2, 2)];
        let result = AutoReflowEngine::default().execute(&widgets, bounds());

        assert!(result.moved_widgets.iter().all(|m| m.id != "pinned"));
        let b = result.moved_widgets.iter().find(|m| m.id == "b").unwrap();
        assert_eq!(b.new_position, GridRect::at(1, 1, 2, 2));
    }

    #[test]
    fn test_larger_widget_claims_contested_row_first() {
        // Same origin: the 3x1 must be placed before the 1x1.
        let widgets = vec![widget("small", 2, 3, 1, 1), widget("wide", 2, 3, 3, 1)];
        let result = AutoReflowEngine::default().execute(&widgets, bounds());
        let wide = result.moved_widgets.iter().find(|m| m.id == "wide").unwrap();
        assert_eq!(wide.new_position, GridRect::at(1, 1, 3, 1));
        assert!(no_overlaps(&widgets, &result));
    }

    #[test]
    fn test_iteration_budget_is_respected() {
        let cfg = ReflowConfig { max_iterations: 1, stability_threshold: 1.0, ..ReflowConfig::default() };
        let widgets = vec![widget("a", 4, 9, 2, 2), widget("b", 7, 12, 1, 3)];
        let result = AutoReflowEngine::new(cfg).execute(&widgets, bounds());
        assert_eq!(result.iterations, 1);
        assert!(result.stability < 1.0);

        let none = ReflowConfig { max_iterations: 0, ..ReflowConfig::default() };
        let result = AutoReflowEngine::new(none).execute(&widgets, bounds());
        assert_eq!(result.iterations, 0);
        assert!(result.moved_widgets.is_empty());
    }

    #[test]
    fn test_minimum_gap_spacing() {
        let cfg = ReflowConfig { minimum_gap: 1, ..ReflowConfig::default() };
        let widgets = vec![widget("a", 1, 1, 2, 1), widget("b", 6, 5, 2, 1)];
        let result = AutoReflowEngine::new(cfg).execute(&widgets, bounds());
        let b = result.moved_widgets.iter().find(|m| m.id == "b").unwrap();
        assert_eq!(b.new_position, GridRect::at(4, 1, 2, 1));
    }

    #[test]
    fn test_region_reflow_only_touches_region() {
        let widgets = vec![widget("outside", 5, 10, 1, 1), widget("inside", 1, 6, 2, 2)];
        let region = GridRect::at(1, 4, 4, 4);
        let result = AutoReflowEngine::default().reflow_region(&widgets, &region, bounds());

        assert_eq!(result.moved_widgets.len(), 1);
        assert_eq!(result.moved_widgets[0].id, "inside");
        assert_eq!(result.moved_widgets[0].new_position, GridRect::at(1, 1, 2, 2));
    }

    #[test]
    fn test_minimize_empty_space_single_pass() {
        let widgets = vec![widget("a", 3, 5, 2, 2), widget("b", 1, 9, 8, 1), widget("c", 7, 2, 1, 1)];
        let result = AutoReflowEngine::default().minimize_empty_space(&widgets, bounds());

        assert_eq!(result.stability, 1.0);
        assert_eq!(result.iterations, 1);
        assert!(no_overlaps(&widgets, &result));
        let c = result.moved_widgets.iter().find(|m| m.id == "c").unwrap();
        assert_eq!(c.new_position, GridRect::at(1, 1, 1, 1));
        let a = result.moved_widgets.iter().find(|m| m.id == "a").unwrap();
        assert_eq!(a.new_position, GridRect::at(2, 1, 2, 2));
        let b = result.moved_widgets.iter().find(|m| m.id == "b").unwrap();
        assert_eq!(b.new_position, GridRect::at(1, 3, 8, 1));
    }

    #[test]
    fn test_preserve_relative_order_follows_caller_order() {
        let widgets = vec![widget("late", 1, 5, 2, 1), widget("early", 1, 2, 2, 1)];

        let sorted = AutoReflowEngine::default().execute(&widgets, bounds());
        let early = sorted.moved_widgets.iter().find(|m| m.id == "early").unwrap();
        let late = sorted.moved_widgets.iter().find(|m| m.id == "late").unwrap();
        assert_eq!(early.new_position, GridRect::at(1, 1, 2, 1));
        assert_eq!(late.new_position, GridRect::at(1, 2, 2, 1));

        let cfg = ReflowConfig { preserve_relative_order: true, ..ReflowConfig::default() };
        let ordered = AutoReflowEngine::new(cfg).execute(&widgets, bounds());
        assert_eq!(ordered.moved_widgets.len(), 1);
        assert_eq!(ordered.moved_widgets[0].id, "late");
        assert_eq!(ordered.moved_widgets[0].new_position, GridRect::at(1, 1, 2, 1));
    }

    #[test]
    fn test_minimum_gap_below_full_row() {
        let cfg = ReflowConfig { minimum_gap: 1, ..ReflowConfig::default() };
        let widgets = vec![widget("a", 1, 1, 8, 1), widget("b", 1, 6, 2, 1)];
        let result = AutoReflowEngine::new(cfg).execute(&widgets, bounds());
        let b = result.moved_widgets.iter().find(|m| m.id == "b").unwrap();
        assert_eq!(b.new_position, GridRect::at(1, 3, 2, 1));
    }

    #[test]
    fn test_minimum_gap_around_locked_obstacle() {
        let cfg = ReflowConfig { minimum_gap: 1, ..ReflowConfig::default() };
        let widgets = vec![widget("wall", 3, 1, 1, 3).locked(), widget("b", 6, 1, 2, 1)];
        let result = AutoReflowEngine::new(cfg).execute(&widgets, bounds());

        assert_eq!(result.moved_widgets.len(), 1);
        assert_eq!(result.moved_widgets[0].id, "b");
        assert_eq!(result.moved_widgets[0].new_position, GridRect::at(5, 1, 2, 1));
    }

    #[test]
    fn test_region_stability_counts_all_widgets() {
        let widgets = vec![
            widget("x", 3, 1, 1, 1),
            widget("y", 5, 1, 1, 1),
            widget("z", 7, 1, 1, 1),
            widget("inside", 1, 2, 1, 1),
        ];
        let region = GridRect::at(1, 2, 1, 1);
        let result = AutoReflowEngine::default().reflow_region(&widgets, &region, bounds());

        assert_eq!(result.moved_widgets.len(), 1);
        // 1 of 4 moved one cell: 0.75 - 0.1
        assert!((result.passes[0].stability - 0.65).abs() < 1e-9);
        assert_eq!(result.stability, 1.0);
    }
}
