//! Errors returned by the engine facade and the wasm bindings.
//!
//! Layout decisions themselves never fail: they clip, return `None`, or
//! report `success: false`. These errors cover caller contract violations.

use thiserror::Error;

use crate::grid::GridRect;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid rectangle {0:?}: width and height must be at least 1")]
    InvalidRect(GridRect),

    #[error("unknown widget '{0}'")]
    UnknownWidget(String),

    #[error("widget '{0}' already exists")]
    DuplicateWidget(String),

    #[error("no free {width}x{height} area on the grid")]
    NoSpace { width: i32, height: i32 },

    #[error("invalid grid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl GridError {
    /// Stable machine-readable code for the host UI.
    pub fn code(&self) -> &'static str {
        match self {
            GridError::InvalidRect(_) => "invalid_rect",
            GridError::UnknownWidget(_) => "unknown_widget",
            GridError::DuplicateWidget(_) => "duplicate_widget",
            GridError::NoSpace { .. } => "no_space",
            GridError::InvalidConfig(_) => "invalid_config",
            GridError::Json(_) => "json",
        }
    }
}
