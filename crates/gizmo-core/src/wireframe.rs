//! Bounding outline.

use bevy::math::{Rect, Vec2};

use crate::config::WireframeStyle;
use crate::render::DrawCommand;

/// Passive outline. The whole rectangle, not just the stroke, is its hit region.
#[derive(Debug, Clone)]
pub struct Wireframe {
    style: WireframeStyle,
    geometry: Option<DrawCommand>,
    hit_area: Option<Rect>,
}

impl Wireframe {
    pub fn new(style: WireframeStyle) -> Self {
        Self {
            style,
            geometry: None,
            hit_area: None,
        }
    }

    /// Replaces prior geometry with a stroked `bounds` and makes `bounds` the hit region.
    pub fn draw(&mut self, bounds: Rect) {
        self.geometry = Some(DrawCommand::StrokeRect {
            rect: bounds,
            color: self.style.color,
            width: self.style.thickness,
        });
        self.hit_area = Some(bounds);
    }

    pub fn clear(&mut self) {
        self.geometry = None;
        self.hit_area = None;
    }

    pub fn geometry(&self) -> Option<&DrawCommand> {
        self.geometry.as_ref()
    }

    pub fn hit_area(&self) -> Option<Rect> {
        self.hit_area
    }

    /// Hit test in gizmo-local space.
    pub fn contains(&self, local: Vec2) -> bool {
        self.hit_area.is_some_and(|area| area.contains(local))
    }
}
