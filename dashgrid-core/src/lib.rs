//! Layout engine for a drag-and-drop dashboard widget grid.
//!
//! Widgets are rectangles on a fixed-column integer grid. The engine detects
//! collisions, proposes and applies resolutions (push, swap, reposition) and
//! compacts layouts with gravity and left alignment. It is synchronous and
//! does no I/O; the host UI owns rendering and persistence.
//!
//! Use [`engine::GridEngine`] from Rust, or the `WidgetGrid` class exported
//! by [`wasm`] from JavaScript.

pub mod grid;
pub mod engine;
pub mod registry;
pub mod error;
pub mod logging;
pub mod output;
pub mod wasm;

pub use engine::{GridEngine, MovePreview, ResolutionOutcome};
pub use error::GridError;
pub use grid::{
    AutoReflowEngine, CollisionDetector, CollisionResolver, CollisionResult, GridBounds, GridCell, GridConfig,
    GridRect, OccupancyMap, ReflowConfig, ReflowResult, ResolutionKind, ResolutionStrategy, Widget, WidgetMove,
};
pub use registry::{WidgetDescriptor, WidgetRegistry};
