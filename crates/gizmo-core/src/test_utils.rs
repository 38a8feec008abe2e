//! Scene fixtures shared by the unit tests.

use bevy::math::{Rect, Vec2};

use crate::affine::AffineTransform;
use crate::scene::{NodeId, Scene};

/// Two 100x100 squares under the root, at (0,0)-(100,100) and (200,200)-(300,300).
pub(crate) fn two_squares() -> (Scene, Vec<NodeId>) {
    let mut scene = Scene::new();
    let root = scene.root();
    let a = scene.spawn_rect(root, Vec2::ZERO, Vec2::splat(100.0)).unwrap();
    let b = scene.spawn_rect(root, Vec2::splat(200.0), Vec2::splat(100.0)).unwrap();
    (scene, vec![a, b])
}

/// One 100x100 square centered on (100,100).
pub(crate) fn centered_square() -> (Scene, NodeId) {
    let mut scene = Scene::new();
    let root = scene.root();
    let square = scene.spawn_rect(root, Vec2::splat(50.0), Vec2::splat(100.0)).unwrap();
    (scene, square)
}

/// Two children under differently transformed parents.
///
/// Returns `(scene, [parent_a, parent_b], [child_a, child_b])`.
pub(crate) fn split_parents() -> (Scene, [NodeId; 2], Vec<NodeId>) {
    let mut scene = Scene::new();
    let root = scene.root();
    let parent_a = scene
        .spawn(
            root,
            AffineTransform::from_scale_angle_translation(Vec2::splat(2.0), 0.0, Vec2::new(50.0, 10.0)),
            Rect::default(),
        )
        .unwrap();
    let parent_b = scene
        .spawn(
            root,
            AffineTransform::from_scale_angle_translation(
                Vec2::new(1.0, 0.5),
                std::f32::consts::FRAC_PI_6,
                Vec2::new(300.0, 200.0),
            ),
            Rect::default(),
        )
        .unwrap();
    let child_a = scene.spawn_rect(parent_a, Vec2::new(10.0, 20.0), Vec2::splat(40.0)).unwrap();
    let child_b = scene
        .spawn(
            parent_b,
            AffineTransform::from_scale_angle_translation(Vec2::ONE, 0.3, Vec2::new(-20.0, 5.0)),
            Rect::from_corners(Vec2::ZERO, Vec2::new(60.0, 30.0)),
        )
        .unwrap();
    (scene, [parent_a, parent_b], vec![child_a, child_b])
}

pub(crate) fn near(a: Vec2, b: Vec2, tolerance: f32) -> bool {
    (a - b).abs().max_element() <= tolerance
}
