// GridEngine: the stateful facade the host UI talks to.
//
// Owns the widget arena (Vec<Widget>) and an occupancy map whose SlotIds
// index that arena. Single-widget moves update the map incrementally;
// anything that touches several widgets rebuilds it from the arena.

use log::{debug, warn};
use serde::Serialize;

use crate::error::GridError;
use crate::grid::{
    AutoReflowEngine, CollisionDetector, CollisionResolver, CollisionResult, GridCell, GridConfig, GridRect,
    OccupancyMap, ReflowConfig, ReflowResult, ResolutionKind, ResolutionStrategy, ResolveRequest, SlotId, Widget,
    WidgetMove,
};
use crate::registry::WidgetRegistry;

/// What would happen if a widget were dropped at a position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePreview {
    pub candidate: GridRect,
    pub collision: CollisionResult,
    pub strategies: Vec<ResolutionStrategy>,
}

/// Result of a move or resize.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Strategy used to resolve a collision, if there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<ResolutionKind>,
    pub moved_widgets: Vec<WidgetMove>,
}

impl ResolutionOutcome {
    fn refused(reason: impl Into<String>) -> Self {
        Self { success: false, reason: Some(reason.into()), applied: None, moved_widgets: Vec::new() }
    }

    fn committed(applied: Option<ResolutionKind>, moved_widgets: Vec<WidgetMove>) -> Self {
        Self { success: true, reason: None, applied, moved_widgets }
    }
}

#[derive(Debug, Clone)]
pub struct GridEngine {
    config: GridConfig,
    widgets: Vec<Widget>,
    occupancy: OccupancyMap,
    detector: CollisionDetector,
    resolver: CollisionResolver,
    reflow: AutoReflowEngine,
    registry: WidgetRegistry,
}

fn ensure_valid(rect: &GridRect) -> Result<(), GridError> {
    if rect.is_valid() { Ok(()) } else { Err(GridError::InvalidRect(*rect)) }
}

fn validate_config(config: &GridConfig) -> Result<(), GridError> {
    if config.is_valid() {
        Ok(())
    } else {
        Err(GridError::InvalidConfig(format!(
            "columns={} rowCapacity={} rowHeight={}",
            config.columns, config.row_capacity, config.row_height
        )))
    }
}

impl Default for GridEngine {
    fn default() -> Self {
        Self::build(GridConfig::default())
    }
}

impl GridEngine {
    pub fn new(config: GridConfig) -> Result<Self, GridError> {
        validate_config(&config)?;
        Ok(Self::build(config))
    }

    fn build(config: GridConfig) -> Self {
        let detector = CollisionDetector::default();
        Self {
            occupancy: OccupancyMap::new(config.bounds()),
            config,
            widgets: Vec::new(),
            resolver: CollisionResolver::new(detector.clone()),
            detector,
            reflow: AutoReflowEngine::default(),
            registry: WidgetRegistry::with_builtin_widgets(),
        }
    }

    pub fn with_reflow_config(mut self, config: ReflowConfig) -> Self {
        self.set_reflow_config(config);
        self
    }

    pub fn set_reflow_config(&mut self, config: ReflowConfig) {
        self.reflow = AutoReflowEngine::new(config);
    }

    pub fn reflow_config(&self) -> &ReflowConfig {
        self.reflow.config()
    }

    pub fn with_registry(mut self, registry: WidgetRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    /// Widget covering a cell, if any.
    pub fn widget_at(&self, row: i32, col: i32) -> Option<&Widget> {
        self.occupancy.owner_at(row, col).and_then(|slot| self.widgets.get(slot.0))
    }

    /// Replace the widget snapshot and rebuild the occupancy map.
    pub fn set_widgets(&mut self, widgets: Vec<Widget>) -> Result<(), GridError> {
        for (i, w) in widgets.iter().enumerate() {
            ensure_valid(&w.position)?;
            if widgets[..i].iter().any(|other| other.id == w.id) {
                return Err(GridError::DuplicateWidget(w.id.clone()));
            }
        }
        self.widgets = widgets;
        self.sync();
        Ok(())
    }

    /// Switch grid configuration (e.g. on a breakpoint change). Widgets are
    /// narrowed and shifted to fit the new column count, then any overlaps
    /// this creates are settled by moving the later widget to the nearest
    /// free spot.
    pub fn set_config(&mut self, config: GridConfig) -> Result<(), GridError> {
        validate_config(&config)?;
        self.config = config;
        let bounds = self.config.bounds();
        for w in &mut self.widgets {
            let r = w.position;
            let fitted = r.resized(r.width().min(bounds.columns), r.height().min(bounds.rows));
            if let Some(clamped) = fitted.clamped_into(bounds) {
                w.position = clamped;
            }
        }
        self.settle_overlaps();
        Ok(())
    }

    /// Collision check for an arbitrary rectangle, with a suggested free spot.
    pub fn detect(&self, candidate: &GridRect, exclude_id: Option<&str>) -> Result<CollisionResult, GridError> {
        ensure_valid(candidate)?;
        Ok(self
            .detector
            .detect_with_suggestion(candidate, &self.widgets, exclude_id, self.config.bounds()))
    }

    /// Collision and ranked strategies for dropping `id` at `target`, without committing.
    pub fn preview_move(&self, id: &str, target: GridRect) -> Result<MovePreview, GridError> {
        ensure_valid(&target)?;
        let idx = self.index_of(id)?;
        let widget = &self.widgets[idx];
        let Some(candidate) = self.fit_candidate(widget, target) else {
            // Too large for the grid: report collisions only, nothing can resolve it.
            let collision = self.detector.detect(&target, &self.widgets, Some(id));
            return Ok(MovePreview { candidate: target, collision, strategies: Vec::new() });
        };
        let collision = self
            .detector
            .detect_incremental(&widget.position, &candidate, &self.widgets, Some(id));
        let request = ResolveRequest { widget_id: id.to_string(), candidate, original: Some(widget.position) };
        let strategies = self.resolver.propose(&request, &collision, &self.widgets, self.config.bounds());
        Ok(MovePreview { candidate, collision, strategies })
    }

    /// Move a widget, resolving any collision with the cheapest strategy.
    pub fn move_widget(&mut self, id: &str, target: GridRect) -> Result<ResolutionOutcome, GridError> {
        ensure_valid(&target)?;
        let idx = self.index_of(id)?;
        if self.widgets[idx].locked {
            return Ok(ResolutionOutcome::refused(format!("widget '{id}' is locked")));
        }
        let Some(candidate) = self.fit_candidate(&self.widgets[idx], target) else {
            return Ok(ResolutionOutcome::refused("widget does not fit the grid"));
        };
        Ok(self.commit_candidate(idx, candidate))
    }

    /// Resize a widget in place (top-left corner fixed), clamped to its constraints.
    pub fn resize_widget(&mut self, id: &str, width: i32, height: i32) -> Result<ResolutionOutcome, GridError> {
        let idx = self.index_of(id)?;
        let target = self.widgets[idx].position.resized(width, height);
        ensure_valid(&target)?;
        self.move_widget(id, target)
    }

    /// Add a widget at its requested position, or at the nearest free spot.
    pub fn add_widget(&mut self, widget: Widget) -> Result<GridRect, GridError> {
        ensure_valid(&widget.position)?;
        if self.widgets.iter().any(|w| w.id == widget.id) {
            return Err(GridError::DuplicateWidget(widget.id));
        }

        let mut widget = widget;
        let (w, h) = widget.constraints.clamp(widget.position.width(), widget.position.height());
        widget.position = widget.position.resized(w, h);

        let requested = widget.position;
        let position = if self.occupancy.can_place(&requested, None) {
            requested
        } else {
            self.find_best_available_position(w, h, Some(requested.origin()))
                .ok_or(GridError::NoSpace { width: w, height: h })?
        };

        widget.position = position;
        self.occupancy.place(SlotId(self.widgets.len()), &position);
        debug!("added '{}' at {:?}", widget.id, position);
        self.widgets.push(widget);
        Ok(position)
    }

    /// Add a widget sized from the registry descriptor for `kind`.
    pub fn add_widget_of_kind(
        &mut self,
        id: &str,
        kind: &str,
        preferred: Option<GridCell>,
    ) -> Result<GridRect, GridError> {
        let descriptor = self.registry.descriptor_or_default(kind);
        let (w, h) = descriptor.default_size();
        let origin = self.config.bounds().clamp_cell(preferred.unwrap_or(GridCell { row: 1, col: 1 }));
        let widget = Widget::new(id, kind, GridRect::at(origin.col, origin.row, w, h))
            .with_constraints(descriptor.constraints);
        self.add_widget(widget)
    }

    pub fn remove_widget(&mut self, id: &str) -> Result<Widget, GridError> {
        let idx = self.index_of(id)?;
        let removed = self.widgets.remove(idx);
        // Slots after idx shifted down by one.
        self.sync();
        debug!("removed '{}'", removed.id);
        Ok(removed)
    }

    /// Nearest free `width x height` rectangle to `preferred` (top-left by default).
    pub fn find_best_available_position(
        &self,
        width: i32,
        height: i32,
        preferred: Option<GridCell>,
    ) -> Option<GridRect> {
        let origin = preferred.unwrap_or(GridCell { row: 1, col: 1 });
        self.detector.find_position_in(&self.occupancy, width, height, origin, None)
    }

    /// Compact the whole layout and apply the result.
    pub fn reflow(&mut self) -> ReflowResult {
        let result = self.reflow.execute(&self.widgets, self.config.bounds());
        self.apply_moves(&result.moved_widgets);
        result
    }

    /// Single-pass packing into the first free spots, applied.
    pub fn minimize_empty_space(&mut self) -> ReflowResult {
        let result = self.reflow.minimize_empty_space(&self.widgets, self.config.bounds());
        self.apply_moves(&result.moved_widgets);
        result
    }

    /// Compact only the widgets intersecting `region`, applied.
    pub fn reflow_region(&mut self, region: GridRect) -> Result<ReflowResult, GridError> {
        ensure_valid(&region)?;
        let result = self.reflow.reflow_region(&self.widgets, &region, self.config.bounds());
        self.apply_moves(&result.moved_widgets);
        Ok(result)
    }

    fn index_of(&self, id: &str) -> Result<usize, GridError> {
        self.widgets
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| GridError::UnknownWidget(id.to_string()))
    }

    /// Apply the widget's size constraints and keep the rect inside the grid.
    fn fit_candidate(&self, widget: &Widget, target: GridRect) -> Option<GridRect> {
        let (w, h) = widget.constraints.clamp(target.width(), target.height());
        target.resized(w, h).clamped_into(self.config.bounds())
    }

    fn commit_candidate(&mut self, idx: usize, candidate: GridRect) -> ResolutionOutcome {
        let original = self.widgets[idx].position;
        if candidate == original {
            return ResolutionOutcome::committed(None, Vec::new());
        }
        let id = self.widgets[idx].id.clone();
        let slot = SlotId(idx);

        if self.occupancy.can_place(&candidate, Some(slot)) {
            self.widgets[idx].position = candidate;
            self.occupancy.remove_within(slot, &original);
            self.occupancy.place(slot, &candidate);
            let mv = WidgetMove { id, old_position: original, new_position: candidate };
            return ResolutionOutcome::committed(None, vec![mv]);
        }

        let collision = self
            .detector
            .detect_incremental(&original, &candidate, &self.widgets, Some(id.as_str()));
        let request = ResolveRequest { widget_id: id, candidate, original: Some(original) };
        let strategies = self.resolver.propose(&request, &collision, &self.widgets, self.config.bounds());

        let Some(best) = strategies.first() else {
            debug!("move of '{}' to {:?} refused: no strategy", request.widget_id, candidate);
            return ResolutionOutcome::refused("not enough space to resolve the collision");
        };
        debug!("move of '{}' resolved by {:?} (cost {:.2})", request.widget_id, best.kind, best.cost);
        let moved = self.resolver.apply(best, &mut self.widgets);
        self.sync();
        ResolutionOutcome::committed(Some(best.kind), moved)
    }

    fn apply_moves(&mut self, moves: &[WidgetMove]) {
        for mv in moves {
            if let Some(w) = self.widgets.iter_mut().find(|w| w.id == mv.id) {
                w.position = mv.new_position;
            }
        }
        self.sync();
    }

    fn settle_overlaps(&mut self) {
        let bounds = self.config.bounds();
        let mut map = OccupancyMap::new(bounds);
        let mut order: Vec<usize> = (0..self.widgets.len()).collect();
        // Locked widgets keep their spot; everything else yields to them.
        order.sort_by_key(|&i| {
            let w = &self.widgets[i];
            (!w.locked, w.position.row_start, w.position.column_start)
        });

        for i in order {
            let rect = self.widgets[i].position;
            if !map.can_place(&rect, None) {
                match self.detector.find_position_in(&map, rect.width(), rect.height(), rect.origin(), None) {
                    Some(spot) => self.widgets[i].position = spot,
                    None => warn!("no room for '{}' after config change", self.widgets[i].id),
                }
            }
            map.place(SlotId(i), &self.widgets[i].position);
        }
        self.occupancy = map;
    }

    fn sync(&mut self) {
        self.occupancy = OccupancyMap::from_widgets(&self.widgets, self.config.bounds());
    }
}
