//! Shape primitives handed to the host renderer.
//!
//! All geometry is expressed in the gizmo's local space; the host places it
//! with [`GizmoRenderData::frame`].

use bevy::math::{Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::affine::AffineTransform;

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Opaque color from a `0xRRGGBB` literal.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Default outline color.
    pub const SKY: Color = Color::from_hex(0x55_c1_ff);
}

/// One fill or stroke call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f32,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Color,
        width: f32,
    },
}

/// Everything the host needs to draw one gizmo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GizmoRenderData {
    /// Gizmo local space to world space.
    pub frame: AffineTransform,
    /// Commands in paint order.
    pub commands: Vec<DrawCommand>,
}
