//! Group bounding boxes.
//!
//! Both calculations are pure folds over the current member transforms and
//! are recomputed from scratch on every call.

use bevy::math::{Rect, Vec2};

use crate::affine::AffineTransform;
use crate::scene::SceneGraph;

/// Corners in the order top-left, top-right, bottom-right, bottom-left
/// (y grows downwards).
pub fn rect_corners(rect: &Rect) -> [Vec2; 4] {
    [
        rect.min,
        Vec2::new(rect.max.x, rect.min.y),
        rect.max,
        Vec2::new(rect.min.x, rect.max.y),
    ]
}

/// Zero-area rectangle at the origin, returned when nothing can be bounded.
pub fn degenerate_rect() -> Rect {
    Rect::from_corners(Vec2::ZERO, Vec2::ZERO)
}

/// Min/max accumulator.
#[derive(Debug, Clone, Copy)]
struct Extent {
    min: Vec2,
    max: Vec2,
}

impl Extent {
    const EMPTY: Self = Self {
        min: Vec2::splat(f32::INFINITY),
        max: Vec2::splat(f32::NEG_INFINITY),
    };

    fn include(&mut self, point: Vec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    fn into_rect(self) -> Rect {
        if self.is_empty() {
            degenerate_rect()
        } else {
            Rect { min: self.min, max: self.max }
        }
    }
}

/// Axis-aligned world-space box covering every member's world bounds.
///
/// Returns [`degenerate_rect`] for an empty group or when no member resolves.
pub fn world_bounds<S: SceneGraph>(scene: &S, group: &[S::Node]) -> Rect {
    let mut extent = Extent::EMPTY;
    for &node in group {
        let Some(bounds) = scene.world_bounds(node) else {
            continue;
        };
        extent.include(bounds.min);
        extent.include(bounds.max);
    }
    extent.into_rect()
}

/// Box axis-aligned inside `frame`'s local space.
///
/// `frame` maps the reference frame's local space to world space. Each
/// member's local-bounds corners go to world through the member's world
/// transform and then into the frame through `frame⁻¹`.
pub fn oriented_bounds<S: SceneGraph>(scene: &S, group: &[S::Node], frame: &AffineTransform) -> Rect {
    let Some(world_to_frame) = frame.invert() else {
        return degenerate_rect();
    };
    let mut extent = Extent::EMPTY;
    for &node in group {
        let (Some(world), Some(local)) = (scene.world_transform(node), scene.local_bounds(node)) else {
            continue;
        };
        let to_frame = world_to_frame.append(&world);
        for corner in rect_corners(&local) {
            extent.include(to_frame.apply(corner));
        }
    }
    extent.into_rect()
}
