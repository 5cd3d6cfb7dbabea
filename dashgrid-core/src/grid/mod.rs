// Widget grid layout engine.
//
// Widgets are rectangles on an integer grid with a fixed column count and
// (practically) unbounded rows. The engine keeps them non-overlapping:
//
// Submodules:
// - geometry: GridRect, overlap and intersection tests, bounds checks
// - model: Widget, GridConfig, breakpoints
// - occupancy: cell -> owning widget map
// - spiral: nearest-first offset iterator
// - collision: collision detection and free-space search
// - resolver: push / swap / reposition strategies
// - reflow: gravity and left-alignment compaction

pub mod geometry;
pub mod model;
pub mod occupancy;
pub mod spiral;
pub mod collision;
pub mod resolver;
pub mod reflow;

pub use geometry::{
    intersection, intersection_metrics, overlaps, within_bounds, GridBounds, GridCell, GridRect,
    IntersectionMetrics, MAX_GRID_CELLS,
};
pub use model::{Breakpoint, GridConfig, PixelRect, SizeConstraints, Widget};
pub use occupancy::{OccupancyMap, SlotId};
pub use spiral::Spiral;
pub use collision::{CollisionArea, CollisionDetector, CollisionResult, MINIMAL_CHANGE_THRESHOLD};
pub use resolver::{CollisionResolver, ResolutionKind, ResolutionStrategy, ResolveRequest, WidgetMove};
pub use reflow::{AutoReflowEngine, ReflowConfig, ReflowPass, ReflowResult};
