//! WASM bindings for the dashgrid-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.
//! Arguments and results are JSON strings; results use the
//! `output::Response` envelope.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::engine::GridEngine;
use crate::error::GridError;
use crate::grid::{CollisionDetector, CollisionResult, GridBounds, GridCell, GridConfig, GridRect, ReflowConfig, Widget};
use crate::logging;
use crate::output::Response;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    fn console_error(s: &str);
}

fn report(err: &GridError) {
    #[cfg(target_arch = "wasm32")]
    console_error(&format!("dashgrid: {err}"));
    #[cfg(not(target_arch = "wasm32"))]
    log::error!("{err}");
}

fn respond<T: Serialize>(result: Result<T, GridError>) -> String {
    match result {
        Ok(data) => Response::success(data).to_json(),
        Err(err) => {
            report(&err);
            Response::<T>::failure(&err).to_json()
        }
    }
}

fn preferred_cell(row: Option<i32>, col: Option<i32>) -> Option<GridCell> {
    match (row, col) {
        (None, None) => None,
        (row, col) => Some(GridCell { row: row.unwrap_or(1), col: col.unwrap_or(1) }),
    }
}

/// Install the console logger. `level` is "error", "warn", "info", "debug" or "trace".
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    logging::init(logging::parse_level(level));
}

/// Stateless collision check of `candidate_json` (a GridRect) against `widgets_json`.
#[wasm_bindgen]
pub fn detect_collision(candidate_json: &str, widgets_json: &str, exclude_id: Option<String>) -> String {
    respond(detect_from_json(candidate_json, widgets_json, exclude_id.as_deref()))
}

fn detect_from_json(
    candidate_json: &str,
    widgets_json: &str,
    exclude_id: Option<&str>,
) -> Result<CollisionResult, GridError> {
    let candidate: GridRect = serde_json::from_str(candidate_json)?;
    let widgets: Vec<Widget> = serde_json::from_str(widgets_json)?;
    if !candidate.is_valid() {
        return Err(GridError::InvalidRect(candidate));
    }
    Ok(CollisionDetector::default().detect(&candidate, &widgets, exclude_id))
}

/// Stateless nearest-free-position search. Returns `data: null` when the grid has no room.
#[wasm_bindgen]
pub fn find_alternative_position(
    width: i32,
    height: i32,
    row: i32,
    col: i32,
    widgets_json: &str,
    columns: i32,
    rows: i32,
) -> String {
    respond(search_from_json(width, height, GridCell { row, col }, widgets_json, GridBounds::new(columns, rows)))
}

fn search_from_json(
    width: i32,
    height: i32,
    preferred: GridCell,
    widgets_json: &str,
    bounds: GridBounds,
) -> Result<Option<GridRect>, GridError> {
    if !bounds.is_allocatable() {
        return Err(GridError::InvalidConfig(format!("columns={} rows={}", bounds.columns, bounds.rows)));
    }
    let widgets: Vec<Widget> = serde_json::from_str(widgets_json)?;
    Ok(CollisionDetector::default().find_alternative_position(width, height, preferred, &widgets, None, bounds))
}

/// Stateful grid held on the JS side across gestures.
#[wasm_bindgen]
pub struct WidgetGrid {
    engine: GridEngine,
}

#[wasm_bindgen]
impl WidgetGrid {
    /// Create a grid from a (possibly partial) GridConfig JSON. Invalid
    /// configuration is reported and the default 12-column grid is used.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> WidgetGrid {
        let engine = serde_json::from_str::<GridConfig>(config_json)
            .map_err(GridError::from)
            .and_then(GridEngine::new)
            .unwrap_or_else(|err| {
                report(&err);
                GridEngine::default()
            });
        WidgetGrid { engine }
    }

    #[wasm_bindgen(js_name = setWidgets)]
    pub fn set_widgets(&mut self, widgets_json: &str) -> String {
        respond(serde_json::from_str::<Vec<Widget>>(widgets_json).map_err(GridError::from).and_then(|widgets| {
            let count = widgets.len();
            self.engine.set_widgets(widgets).map(|_| count)
        }))
    }

    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config_json: &str) -> String {
        respond(
            serde_json::from_str::<GridConfig>(config_json)
                .map_err(GridError::from)
                .and_then(|config| self.engine.set_config(config))
                .map(|_| self.engine.widgets().to_vec()),
        )
    }

    #[wasm_bindgen(js_name = setReflowConfig)]
    pub fn set_reflow_config(&mut self, config_json: &str) -> String {
        respond(serde_json::from_str::<ReflowConfig>(config_json).map_err(GridError::from).map(|config| {
            self.engine.set_reflow_config(config);
            self.engine.reflow_config().clone()
        }))
    }

    pub fn widgets(&self) -> String {
        respond(Ok(self.engine.widgets()))
    }

    pub fn detect(&self, candidate_json: &str, exclude_id: Option<String>) -> String {
        respond(
            serde_json::from_str::<GridRect>(candidate_json)
                .map_err(GridError::from)
                .and_then(|candidate| self.engine.detect(&candidate, exclude_id.as_deref())),
        )
    }

    #[wasm_bindgen(js_name = previewMove)]
    pub fn preview_move(&self, id: &str, target_json: &str) -> String {
        respond(
            serde_json::from_str::<GridRect>(target_json)
                .map_err(GridError::from)
                .and_then(|target| self.engine.preview_move(id, target)),
        )
    }

    #[wasm_bindgen(js_name = moveWidget)]
    pub fn move_widget(&mut self, id: &str, target_json: &str) -> String {
        respond(
            serde_json::from_str::<GridRect>(target_json)
                .map_err(GridError::from)
                .and_then(|target| self.engine.move_widget(id, target)),
        )
    }

    #[wasm_bindgen(js_name = resizeWidget)]
    pub fn resize_widget(&mut self, id: &str, width: i32, height: i32) -> String {
        respond(self.engine.resize_widget(id, width, height))
    }

    #[wasm_bindgen(js_name = addWidget)]
    pub fn add_widget(&mut self, widget_json: &str) -> String {
        respond(
            serde_json::from_str::<Widget>(widget_json)
                .map_err(GridError::from)
                .and_then(|widget| self.engine.add_widget(widget)),
        )
    }

    #[wasm_bindgen(js_name = addWidgetOfKind)]
    pub fn add_widget_of_kind(&mut self, id: &str, kind: &str, row: Option<i32>, col: Option<i32>) -> String {
        respond(self.engine.add_widget_of_kind(id, kind, preferred_cell(row, col)))
    }

    #[wasm_bindgen(js_name = removeWidget)]
    pub fn remove_widget(&mut self, id: &str) -> String {
        respond(self.engine.remove_widget(id))
    }

    #[wasm_bindgen(js_name = findBestAvailablePosition)]
    pub fn find_best_available_position(&self, width: i32, height: i32, row: Option<i32>, col: Option<i32>) -> String {
        respond(Ok(self.engine.find_best_available_position(width, height, preferred_cell(row, col))))
    }

    pub fn reflow(&mut self) -> String {
        respond(Ok(self.engine.reflow()))
    }

    #[wasm_bindgen(js_name = minimizeEmptySpace)]
    pub fn minimize_empty_space(&mut self) -> String {
        respond(Ok(self.engine.minimize_empty_space()))
    }

    #[wasm_bindgen(js_name = reflowRegion)]
    pub fn reflow_region(&mut self, region_json: &str) -> String {
        respond(
            serde_json::from_str::<GridRect>(region_json)
                .map_err(GridError::from)
                .and_then(|region| self.engine.reflow_region(region)),
        )
    }
}
