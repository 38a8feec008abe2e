//! Construction-time configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::render::Color;

/// Distance of the rotate handle above the outline's top edge.
pub const DEFAULT_ROTATE_HANDLE_OFFSET: f32 = 30.0;
/// Radius of every handle's circular hit shape.
pub const DEFAULT_HANDLE_RADIUS: f32 = 6.0;

/// Handle appearance and hit radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleStyle {
    pub radius: f32,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
}

impl Default for HandleStyle {
    fn default() -> Self {
        Self {
            radius: DEFAULT_HANDLE_RADIUS,
            fill: Color::WHITE,
            // black at 40% opacity
            stroke: Color::BLACK.with_alpha(102),
            stroke_width: 1.0,
        }
    }
}

/// Outline appearance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireframeStyle {
    pub color: Color,
    pub thickness: f32,
}

impl Default for WireframeStyle {
    fn default() -> Self {
        Self {
            color: Color::SKY,
            thickness: 1.0,
        }
    }
}

/// Gizmo configuration. Every field has a default, so partial JSON works.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoConfig {
    pub rotate_handle_offset: f32,
    pub handle: HandleStyle,
    pub wireframe: WireframeStyle,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            rotate_handle_offset: DEFAULT_ROTATE_HANDLE_OFFSET,
            handle: HandleStyle::default(),
            wireframe: WireframeStyle::default(),
        }
    }
}

impl GizmoConfig {
    /// Parses a JSON document, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
