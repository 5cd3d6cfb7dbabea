// Widgets and grid configuration.
//
// The engine never owns a widget's lifecycle: the host hands over a snapshot
// (a Vec<Widget>) and receives new positions back. `data` is opaque to the
// engine and round-trips untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::geometry::{GridBounds, GridRect};

/// Optional per-widget size limits, in grid cells.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SizeConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<i32>,
}

impl SizeConstraints {
    /// Clamp a requested size into the limits. Never returns less than 1x1.
    pub fn clamp(&self, width: i32, height: i32) -> (i32, i32) {
        let mut w = width;
        let mut h = height;
        if let Some(max) = self.max_width { w = w.min(max); }
        if let Some(min) = self.min_width { w = w.max(min); }
        if let Some(max) = self.max_height { h = h.min(max); }
        if let Some(min) = self.min_height { h = h.max(min); }
        (w.max(1), h.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: String,
    /// Widget type tag ("clock", "weather", ...), see `registry`.
    #[serde(rename = "type", default)]
    pub kind: String,
    pub position: GridRect,
    /// Locked widgets are never moved by reflow, push or swap.
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub constraints: SizeConstraints,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Widget {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, position: GridRect) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            position,
            locked: false,
            constraints: SizeConstraints::default(),
            data: Value::Null,
        }
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn with_constraints(mut self, constraints: SizeConstraints) -> Self {
        self.constraints = constraints;
        self
    }
}

/// Responsive column counts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Small,
    Medium,
    Large,
}

impl Breakpoint {
    pub fn for_width(viewport_width: f32) -> Self {
        if viewport_width < 640.0 {
            Breakpoint::Small
        } else if viewport_width < 1024.0 {
            Breakpoint::Medium
        } else {
            Breakpoint::Large
        }
    }

    pub fn columns(self) -> i32 {
        match self {
            Breakpoint::Small => 4,
            Breakpoint::Medium => 8,
            Breakpoint::Large => 12,
        }
    }
}

/// Pixel-space rectangle for the host renderer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    pub columns: i32,
    /// Row height in pixels.
    pub row_height: f32,
    /// Gap between cells in pixels.
    pub gap: f32,
    /// Padding around the grid in pixels.
    pub padding: f32,
    /// Rows allocated in the occupancy map. A practical ceiling, not a layout rule.
    pub row_capacity: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 12,
            row_height: 80.0,
            gap: 16.0,
            padding: 16.0,
            row_capacity: 100,
        }
    }
}

impl GridConfig {
    pub fn for_breakpoint(breakpoint: Breakpoint) -> Self {
        Self { columns: breakpoint.columns(), ..Self::default() }
    }

    pub fn bounds(&self) -> GridBounds {
        GridBounds::new(self.columns, self.row_capacity)
    }

    pub fn is_valid(&self) -> bool {
        self.bounds().is_allocatable() && self.row_height > 0.0
    }

    /// Width of one column for a container of `container_width` pixels.
    pub fn cell_width(&self, container_width: f32) -> f32 {
        let cols = self.columns.max(1) as f32;
        let inner = container_width - 2.0 * self.padding - (cols - 1.0) * self.gap;
        (inner / cols).max(0.0)
    }

    /// Translate grid cells into pixels within a container of `container_width`.
    pub fn pixel_rect(&self, rect: &GridRect, container_width: f32) -> PixelRect {
        let cell_w = self.cell_width(container_width);
        let w = rect.width() as f32;
        let h = rect.height() as f32;
        PixelRect {
            x: self.padding + (rect.column_start - 1) as f32 * (cell_w + self.gap),
            y: self.padding + (rect.row_start - 1) as f32 * (self.row_height + self.gap),
            width: w * cell_w + (w - 1.0) * self.gap,
            height: h * self.row_height + (h - 1.0) * self.gap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraints_clamp() {
        let c = SizeConstraints { min_width: Some(2), max_width: Some(4), min_height: None, max_height: Some(3) };
        assert_eq!(c.clamp(1, 5), (2, 3));
        assert_eq!(c.clamp(6, 0), (4, 1));
        assert_eq!(SizeConstraints::default().clamp(3, 2), (3, 2));
    }

    #[test]
    fn test_breakpoints() {
        assert_eq!(Breakpoint::for_width(320.0).columns(), 4);
        assert_eq!(Breakpoint::for_width(800.0).columns(), 8);
        assert_eq!(Breakpoint::for_width(1440.0).columns(), 12);
        assert_eq!(GridConfig::for_breakpoint(Breakpoint::Medium).columns, 8);
    }

    #[test]
    fn test_pixel_rect() {
        let cfg = GridConfig { columns: 4, row_height: 100.0, gap: 10.0, padding: 20.0, row_capacity: 50 };
        // inner = 470 - 40 - 30 = 400 -> 100px columns
        let px = cfg.pixel_rect(&GridRect::at(2, 2, 2, 1), 470.0);
        assert_eq!(px, PixelRect { x: 130.0, y: 130.0, width: 210.0, height: 100.0 });
    }

    #[test]
    fn test_widget_json_uses_type_tag() {
        let json = r#"{"id":"w1","type":"clock","position":{"columnStart":1,"columnEnd":3,"rowStart":1,"rowEnd":2}}"#;
        let w: Widget = serde_json::from_str(json).unwrap();
        assert_eq!(w.kind, "clock");
        assert_eq!(w.position.width(), 2);
        assert!(!w.locked);

        let partial: GridConfig = serde_json::from_str(r#"{"columns":8}"#).unwrap();
        assert_eq!(partial.columns, 8);
        assert_eq!(partial.row_capacity, 100);
    }

    #[test]
    fn test_config_rejects_oversized_grid() {
        assert!(GridConfig::default().is_valid());
        let huge = GridConfig { columns: 50_000, row_capacity: 50_000, ..GridConfig::default() };
        assert!(!huge.is_valid());
        assert!(!GridConfig { columns: 0, ..GridConfig::default() }.is_valid());
    }
}
