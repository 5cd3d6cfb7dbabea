//! Widget type registry.
//!
//! Maps a widget's type tag to a descriptor with its default size and size
//! limits. The host attaches rendering to the same tags; the engine only
//! needs the geometry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grid::SizeConstraints;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDescriptor {
    pub kind: String,
    pub title: String,
    pub default_width: i32,
    pub default_height: i32,
    #[serde(default)]
    pub constraints: SizeConstraints,
}

impl WidgetDescriptor {
    pub fn new(kind: &str, title: &str, default_width: i32, default_height: i32) -> Self {
        Self {
            kind: kind.to_string(),
            title: title.to_string(),
            default_width,
            default_height,
            constraints: SizeConstraints::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: SizeConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Default size after applying the descriptor's own limits.
    pub fn default_size(&self) -> (i32, i32) {
        self.constraints.clamp(self.default_width, self.default_height)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    descriptors: HashMap<String, WidgetDescriptor>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the stock dashboard widgets.
    pub fn with_builtin_widgets() -> Self {
        let limits = |min_w, max_w, min_h, max_h| SizeConstraints {
            min_width: Some(min_w),
            max_width: Some(max_w),
            min_height: Some(min_h),
            max_height: Some(max_h),
        };
        let mut registry = Self::new();
        registry.register(WidgetDescriptor::new("clock", "Clock", 2, 1).with_constraints(limits(1, 4, 1, 2)));
        registry.register(WidgetDescriptor::new("weather", "Weather", 2, 2).with_constraints(limits(2, 4, 1, 3)));
        registry.register(WidgetDescriptor::new("calendar", "Calendar", 3, 3).with_constraints(limits(2, 6, 2, 6)));
        registry.register(WidgetDescriptor::new("notes", "Notes", 2, 2).with_constraints(limits(1, 6, 1, 6)));
        registry.register(WidgetDescriptor::new("stats", "Statistics", 4, 2).with_constraints(limits(2, 12, 1, 4)));
        registry.register(WidgetDescriptor::new("chart", "Chart", 4, 3).with_constraints(limits(2, 12, 2, 6)));
        registry.register(WidgetDescriptor::new("tasks", "Tasks", 3, 4).with_constraints(limits(2, 6, 2, 8)));
        registry
    }

    /// Register or replace a descriptor.
    pub fn register(&mut self, descriptor: WidgetDescriptor) {
        self.descriptors.insert(descriptor.kind.clone(), descriptor);
    }

    pub fn get(&self, kind: &str) -> Option<&WidgetDescriptor> {
        self.descriptors.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.descriptors.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.descriptors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Descriptor for `kind`, or a 2x2 unconstrained one for unknown kinds.
    pub fn descriptor_or_default(&self, kind: &str) -> WidgetDescriptor {
        self.get(kind)
            .cloned()
            .unwrap_or_else(|| WidgetDescriptor::new(kind, kind, 2, 2))
    }
}
