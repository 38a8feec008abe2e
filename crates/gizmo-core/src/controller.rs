//! Group transform controller.
//!
//! Owns the handles, the wireframe and the drag state machine
//! (`Idle -> Panning | Scaling(corner) | Rotating -> Idle`), and turns pointer
//! motion into affine deltas that are re-based into every member's local
//! space.
//!
//! The gizmo lives in world space. Its frame is a rotation by the displayed
//! angle about an origin that is re-anchored on the pivot of every scale or
//! rotate gesture; the outline and handles are laid out inside that frame.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use bevy::math::{Rect, Vec2};

use crate::affine::AffineTransform;
use crate::bounds::{degenerate_rect, oriented_bounds, rect_corners, world_bounds};
use crate::config::GizmoConfig;
use crate::error::{GizmoError, Result};
use crate::handle::{Corner, Cursor, HandleRole, HandleSet, HandleSignal};
use crate::input::{PointerEvent, PointerEventKind, Propagation};
use crate::render::GizmoRenderData;
use crate::scene::SceneGraph;
use crate::wireframe::Wireframe;

/// Kind of drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragOperation {
    Pan,
    Scale(Corner),
    Rotate,
}

impl DragOperation {
    /// Handle that drives this operation; `None` for pans on the body.
    pub fn handle_role(self) -> Option<HandleRole> {
        match self {
            DragOperation::Pan => None,
            DragOperation::Scale(corner) => Some(HandleRole::Corner(corner)),
            DragOperation::Rotate => Some(HandleRole::Rotate),
        }
    }
}

impl From<HandleRole> for DragOperation {
    fn from(role: HandleRole) -> Self {
        match role {
            HandleRole::Corner(corner) => DragOperation::Scale(corner),
            HandleRole::Rotate => DragOperation::Rotate,
        }
    }
}

/// Interactive part of a gizmo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoPart {
    Body,
    Handle(HandleRole),
}

/// State of one gesture, from begin to end.
#[derive(Debug, Clone)]
struct DragSession<N> {
    operation: DragOperation,
    /// Member local transforms at gesture start.
    snapshot: Vec<(N, AffineTransform)>,
    /// World-space fixed point of the gesture.
    pivot: Vec2,
    /// Gizmo frame at gesture start, anchored on the pivot.
    frame: AffineTransform,
    /// Pointer angle in `frame` at gesture start (rotate).
    start_angle: f32,
    /// Oriented bounds in the pre-anchor frame (scale).
    start_bounds: Rect,
    /// Last pointer position seen (pan).
    last_pointer: Vec2,
}

/// Translate, scale and rotate a group of scene objects as one unit.
///
/// The controller holds non-owning node keys; the host keeps ownership of
/// the objects. Two controllers must not share members.
#[derive(Debug, Clone)]
pub struct GizmoController<N> {
    group: Vec<N>,
    config: GizmoConfig,
    handles: HandleSet,
    wireframe: Wireframe,
    session: Option<DragSession<N>>,
    origin: Vec2,
    base_angle: f32,
    angle: f32,
    bounds: Rect,
}

impl<N: Copy + Eq + Hash + fmt::Debug> GizmoController<N> {
    /// Creates a controller with the default configuration.
    pub fn new<S>(scene: &S, group: Vec<N>) -> Result<Self>
    where
        S: SceneGraph<Node = N>,
    {
        Self::with_config(scene, group, GizmoConfig::default())
    }

    /// Creates a controller and lays out its outline and handles.
    ///
    /// Fails with [`GizmoError::InvalidArgument`] when `group` is empty.
    /// Duplicate members are dropped, keeping the first occurrence.
    pub fn with_config<S>(scene: &S, group: Vec<N>, config: GizmoConfig) -> Result<Self>
    where
        S: SceneGraph<Node = N>,
    {
        if group.is_empty() {
            return Err(GizmoError::InvalidArgument(
                "gizmo group must contain at least one object".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(group.len());
        let requested = group.len();
        let group: Vec<N> = group.into_iter().filter(|node| seen.insert(*node)).collect();
        if group.len() != requested {
            tracing::debug!("[gizmo] Dropped {} duplicate members", requested - group.len());
        }

        let mut controller = Self {
            origin: world_bounds(scene, &group).center(),
            group,
            handles: HandleSet::new(config.handle.radius),
            wireframe: Wireframe::new(config.wireframe),
            config,
            session: None,
            base_angle: 0.0,
            angle: 0.0,
            bounds: degenerate_rect(),
        };
        controller.refresh(scene);
        tracing::info!("[gizmo] Created for {} objects", controller.group.len());
        Ok(controller)
    }

    /// Ends any gesture in progress (keeping its result) and releases the group.
    pub fn dispose<S>(mut self, scene: &S) -> Vec<N>
    where
        S: SceneGraph<Node = N>,
    {
        self.end_drag(scene);
        self.wireframe.clear();
        tracing::info!("[gizmo] Disposed ({} objects)", self.group.len());
        self.group
    }

    pub fn group(&self) -> &[N] {
        &self.group
    }

    pub fn config(&self) -> &GizmoConfig {
        &self.config
    }

    /// Displayed rotation of the gizmo frame, in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Rotation committed by the last completed gesture.
    pub fn base_angle(&self) -> f32 {
        self.base_angle
    }

    /// World position of the frame origin.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Gizmo local space to world space.
    pub fn frame(&self) -> AffineTransform {
        AffineTransform::from_scale_angle_translation(Vec2::ONE, self.angle, self.origin)
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn operation(&self) -> Option<DragOperation> {
        self.session.as_ref().map(|s| s.operation)
    }

    /// Pivot of the active scale or rotate gesture.
    pub fn pivot(&self) -> Option<Vec2> {
        self.session
            .as_ref()
            .filter(|s| s.operation != DragOperation::Pan)
            .map(|s| s.pivot)
    }

    /// Outline rectangle from the last refresh, in gizmo-local space.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Outline corners in world space (top-left, top-right, bottom-right, bottom-left).
    pub fn world_outline(&self) -> [Vec2; 4] {
        let frame = self.frame();
        rect_corners(&self.bounds).map(|corner| frame.apply(corner))
    }

    pub fn wireframe(&self) -> &Wireframe {
        &self.wireframe
    }

    pub fn handles(&self) -> &HandleSet {
        &self.handles
    }

    /// Handle position in gizmo-local space.
    pub fn handle_position(&self, role: HandleRole) -> Vec2 {
        self.handles.get(role).position()
    }

    pub fn handle_world_position(&self, role: HandleRole) -> Vec2 {
        self.frame().apply(self.handle_position(role))
    }

    /// Cursor for the current state.
    pub fn cursor(&self) -> Cursor {
        match self.operation() {
            None => Cursor::Default,
            Some(DragOperation::Pan) => Cursor::Grabbing,
            Some(operation) => operation
                .handle_role()
                .map_or(Cursor::Grabbing, |role| self.handles.get(role).cursor()),
        }
    }

    /// Cursor for a pointer hovering at `global` while idle.
    pub fn hover_cursor(&self, global: Vec2) -> Cursor {
        match self.hit_test(global) {
            Some(GizmoPart::Handle(role)) => role.cursor(),
            Some(GizmoPart::Body) => Cursor::Grab,
            None => Cursor::Default,
        }
    }

    /// Topmost part under `global`; handles take priority over the body.
    pub fn hit_test(&self, global: Vec2) -> Option<GizmoPart> {
        let local = self.frame().apply_inverse(global)?;
        if let Some(role) = self.handles.hit(local) {
            return Some(GizmoPart::Handle(role));
        }
        self.wireframe.contains(local).then_some(GizmoPart::Body)
    }

    /// Recomputes the outline and handle layout from the current member transforms.
    pub fn refresh<S>(&mut self, scene: &S)
    where
        S: SceneGraph<Node = N>,
    {
        let bounds = oriented_bounds(scene, &self.group, &self.frame());
        self.wireframe.draw(bounds);
        self.handles.layout(&bounds, self.config.rotate_handle_offset);
        self.bounds = bounds;
    }

    /// Shape primitives for the outline and the handles, in paint order.
    pub fn render_data(&self) -> GizmoRenderData {
        let mut data = GizmoRenderData {
            frame: self.frame(),
            commands: Vec::new(),
        };
        if let Some(outline) = self.wireframe.geometry() {
            data.commands.push(*outline);
        }
        for handle in self.handles.iter() {
            data.commands.extend(handle.draw(&self.config.handle));
        }
        data
    }

    /// Feeds one pointer event through the state machine.
    pub fn handle_event<S>(&mut self, scene: &mut S, event: &PointerEvent) -> Propagation
    where
        S: SceneGraph<Node = N>,
    {
        match event.kind {
            PointerEventKind::Down => self.pointer_down(scene, event.global),
            PointerEventKind::Move => self.pointer_move(scene, event.global),
            PointerEventKind::Up | PointerEventKind::UpOutside => self.pointer_up(scene),
        }
    }

    fn pointer_down<S>(&mut self, scene: &S, global: Vec2) -> Propagation
    where
        S: SceneGraph<Node = N>,
    {
        if self.session.is_some() {
            return Propagation::Continue;
        }
        let operation = match self.hit_test(global) {
            None => return Propagation::Continue,
            Some(GizmoPart::Body) => DragOperation::Pan,
            Some(GizmoPart::Handle(role)) => role.into(),
        };
        // A press on the gizmo never falls through, even when refused.
        self.begin_drag(scene, operation, global);
        Propagation::Stop
    }

    fn pointer_move<S>(&mut self, scene: &mut S, global: Vec2) -> Propagation
    where
        S: SceneGraph<Node = N>,
    {
        if self.session.is_none() {
            return Propagation::Continue;
        }
        let pointer = match self.handles.dragging().and_then(|h| h.pointer_move(global)) {
            Some(HandleSignal::Update { pointer, .. }) => pointer,
            _ => global,
        };
        self.apply_update(scene, pointer);
        Propagation::Stop
    }

    fn pointer_up<S>(&mut self, scene: &S) -> Propagation
    where
        S: SceneGraph<Node = N>,
    {
        if self.session.is_none() {
            return Propagation::Continue;
        }
        self.end_drag(scene);
        Propagation::Stop
    }

    /// Starts a gesture with the pointer at `pointer` (world space).
    ///
    /// Returns `false`, leaving the controller idle, when a gesture is
    /// already active or no member can be resolved in `scene`.
    pub fn begin_drag<S>(&mut self, scene: &S, operation: DragOperation, pointer: Vec2) -> bool
    where
        S: SceneGraph<Node = N>,
    {
        if self.session.is_some() {
            tracing::debug!(
                "[gizmo] Refusing {:?}: {:?} already active",
                operation,
                self.operation()
            );
            return false;
        }
        let Some(role) = operation.handle_role() else {
            return self.start_session(scene, operation, pointer);
        };
        let Some(HandleSignal::Begin { pointer, .. }) = self.handles.get_mut(role).pointer_down(pointer) else {
            return false;
        };
        let started = self.start_session(scene, operation, pointer);
        if !started {
            let _ = self.handles.get_mut(role).pointer_up();
        }
        started
    }

    /// Applies the active gesture for a pointer at `pointer` (world space).
    pub fn update_drag<S>(&mut self, scene: &mut S, pointer: Vec2)
    where
        S: SceneGraph<Node = N>,
    {
        self.apply_update(scene, pointer);
    }

    /// Ends the active gesture, keeping the last applied transforms.
    pub fn end_drag<S>(&mut self, scene: &S)
    where
        S: SceneGraph<Node = N>,
    {
        let Some(session) = self.session.take() else {
            return;
        };
        if let Some(role) = session.operation.handle_role() {
            let _ = self.handles.get_mut(role).pointer_up();
        }
        self.base_angle = self.angle;
        tracing::debug!(
            "[gizmo] Ended {:?} (angle={:.4})",
            session.operation,
            self.base_angle
        );
        self.refresh(scene);
    }

    fn start_session<S>(&mut self, scene: &S, operation: DragOperation, pointer: Vec2) -> bool
    where
        S: SceneGraph<Node = N>,
    {
        if self.session.is_some() {
            return false;
        }
        let snapshot: Vec<(N, AffineTransform)> = self
            .group
            .iter()
            .filter_map(|&node| Some((node, scene.local_transform(node)?)))
            .collect();
        if snapshot.is_empty() {
            tracing::debug!("[gizmo] Refusing {:?}: no member resolves in the scene", operation);
            return false;
        }

        let mut session = DragSession {
            operation,
            snapshot,
            pivot: self.origin,
            frame: self.frame(),
            start_angle: 0.0,
            start_bounds: degenerate_rect(),
            last_pointer: pointer,
        };

        match operation {
            DragOperation::Pan => {}
            DragOperation::Scale(corner) => {
                let frame = self.frame();
                let bounds = oriented_bounds(scene, &self.group, &frame);
                session.pivot = frame.apply(corner.opposite().of(&bounds));
                session.start_bounds = bounds;
                self.origin = session.pivot;
                session.frame = self.frame();
            }
            DragOperation::Rotate => {
                session.pivot = world_bounds(scene, &self.group).center();
                self.origin = session.pivot;
                session.frame = self.frame();
                let Some(local) = session.frame.apply_inverse(pointer) else {
                    return false;
                };
                session.start_angle = local.to_angle();
            }
        }

        tracing::debug!(
            "[gizmo] Began {:?} at {:?} (pivot={:?})",
            operation,
            pointer,
            session.pivot
        );
        self.session = Some(session);
        self.refresh(scene);
        true
    }

    fn apply_update<S>(&mut self, scene: &mut S, pointer: Vec2)
    where
        S: SceneGraph<Node = N>,
    {
        // Take the session out so member updates can borrow `self`.
        let Some(mut session) = self.session.take() else {
            return;
        };

        match session.operation {
            DragOperation::Pan => {
                let previous = session.last_pointer;
                session.last_pointer = pointer;
                self.pan(scene, previous, pointer);
            }
            DragOperation::Scale(corner) => {
                if let Some(delta) = self.scale_delta(&session, corner, pointer) {
                    rebase_members(scene, &session.snapshot, &delta);
                }
            }
            DragOperation::Rotate => {
                if let Some(local) = session.frame.apply_inverse(pointer) {
                    let delta_angle = local.to_angle() - session.start_angle;
                    let delta = AffineTransform::about(session.pivot, &AffineTransform::from_angle(delta_angle));
                    tracing::trace!("[gizmo] Rotate by {:.4} rad", delta_angle);
                    rebase_members(scene, &session.snapshot, &delta);
                    self.origin = session.pivot;
                    self.angle = self.base_angle + delta_angle;
                }
            }
        }

        self.session = Some(session);
        self.refresh(scene);
    }

    /// Moves every member by the pointer delta projected into its parent's space.
    fn pan<S>(&mut self, scene: &mut S, previous: Vec2, current: Vec2)
    where
        S: SceneGraph<Node = N>,
    {
        for &node in &self.group {
            let Some(parent) = scene.parent(node) else {
                tracing::warn!("[gizmo] Skipping {:?}: no parent", node);
                continue;
            };
            let (Some(from), Some(to), Some(local)) = (
                scene.to_local(parent, previous),
                scene.to_local(parent, current),
                scene.local_transform(node),
            ) else {
                tracing::warn!("[gizmo] Skipping {:?}: unresolved parent space", node);
                continue;
            };
            scene.set_local_transform(node, local.with_translation(local.translation() + (to - from)));
        }
        self.origin += current - previous;
        tracing::trace!("[gizmo] Pan by {:?}", current - previous);
    }

    /// World-space scale about the session pivot along the gizmo's own axes.
    fn scale_delta(&self, session: &DragSession<N>, corner: Corner, pointer: Vec2) -> Option<AffineTransform> {
        let local = session.frame.apply_inverse(pointer)?;
        let new_width = if corner.is_left() { -local.x } else { local.x };
        let new_height = if corner.is_top() { -local.y } else { local.y };
        let factors = Vec2::new(
            scale_factor(new_width, session.start_bounds.width()),
            scale_factor(new_height, session.start_bounds.height()),
        );
        tracing::trace!("[gizmo] Scale {:?} by {:?}", corner, factors);

        let aligned = AffineTransform::from_angle(self.angle)
            .append(&AffineTransform::from_scale(factors))
            .append(&AffineTransform::from_angle(-self.angle));
        Some(AffineTransform::about(session.pivot, &aligned))
    }
}

/// `extent / start`, or exactly 1 when the starting extent is degenerate.
fn scale_factor(extent: f32, start: f32) -> f32 {
    if start.abs() <= f32::EPSILON || !start.is_finite() {
        return 1.0;
    }
    let factor = extent / start;
    if factor.is_finite() { factor } else { 1.0 }
}

/// Applies a world-space `delta` to each snapshot, re-based through the
/// member's current parent: `parent⁻¹ · delta · parent · snapshot`.
///
/// Members without a parent, or whose parent cannot be inverted, are skipped.
fn rebase_members<S: SceneGraph>(scene: &mut S, snapshot: &[(S::Node, AffineTransform)], delta: &AffineTransform) {
    for &(node, start_local) in snapshot {
        let Some(parent_world) = scene.parent(node).and_then(|parent| scene.world_transform(parent)) else {
            tracing::warn!("[gizmo] Skipping {:?}: detached from its parent", node);
            continue;
        };
        let Some(parent_inverse) = parent_world.invert() else {
            tracing::warn!("[gizmo] Skipping {:?}: parent transform is singular", node);
            continue;
        };
        let start_world = parent_world.append(&start_local);
        let new_world = delta.append(&start_world);
        scene.set_local_transform(node, parent_inverse.append(&new_world));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeId, Scene};
    use crate::test_utils::{centered_square, near, split_parents, two_squares};
    use std::f32::consts::FRAC_PI_2;

    const TOLERANCE: f32 = 1e-2;

    fn locals(scene: &Scene, group: &[NodeId]) -> Vec<AffineTransform> {
        group.iter().map(|&n| scene.local_transform(n).unwrap()).collect()
    }

    #[test]
    fn test_empty_group_is_rejected() {
        let scene = Scene::new();
        let err = GizmoController::new(&scene, Vec::new()).unwrap_err();
        assert!(matches!(err, GizmoError::InvalidArgument(_)));
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let (scene, group) = two_squares();
        let controller = GizmoController::new(&scene, vec![group[0], group[1], group[0]]).unwrap();
        assert_eq!(controller.group(), group.as_slice());
    }

    #[test]
    fn test_initial_layout() {
        let (scene, group) = two_squares();
        let controller = GizmoController::new(&scene, group).unwrap();

        let outline = controller.world_outline();
        assert!(near(outline[0], Vec2::ZERO, TOLERANCE));
        assert!(near(outline[2], Vec2::splat(300.0), TOLERANCE));

        let br = controller
            .handle_world_position(HandleRole::Corner(Corner::BottomRight));
        assert!(near(br, Vec2::splat(300.0), TOLERANCE));
        let rotate = controller.handle_world_position(HandleRole::Rotate);
        assert!(near(rotate, Vec2::new(150.0, -30.0), TOLERANCE));

        assert_eq!(controller.hit_test(Vec2::splat(150.0)), Some(GizmoPart::Body));
        assert_eq!(
            controller.hit_test(Vec2::new(2.0, 3.0)),
            Some(GizmoPart::Handle(HandleRole::Corner(Corner::TopLeft)))
        );
        assert_eq!(controller.hit_test(Vec2::new(-50.0, 150.0)), None);
        assert_eq!(controller.hover_cursor(Vec2::splat(150.0)), Cursor::Grab);
        assert_eq!(controller.cursor(), Cursor::Default);
    }

    #[test]
    fn test_bottom_right_scale_scenario() {
        let (mut scene, group) = two_squares();
        let mut controller = GizmoController::new(&scene, group.clone()).unwrap();

        assert!(controller.begin_drag(&scene, DragOperation::Scale(Corner::BottomRight), Vec2::splat(300.0)));
        assert!(near(controller.pivot().unwrap(), Vec2::ZERO, TOLERANCE));
        controller.update_drag(&mut scene, Vec2::splat(350.0));
        controller.end_drag(&scene);

        let bounds = world_bounds(&scene, &group);
        assert!(near(bounds.min, Vec2::ZERO, TOLERANCE));
        assert!((bounds.width() - 350.0).abs() < TOLERANCE);
        assert!((bounds.height() - 350.0).abs() < TOLERANCE);

        // Each square scaled by 350/300 about the origin.
        let factor = 350.0 / 300.0;
        let b = scene.world_bounds(group[1]).unwrap();
        assert!(near(b.min, Vec2::splat(200.0 * factor), TOLERANCE));
        assert!(near(b.max, Vec2::splat(300.0 * factor), TOLERANCE));
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_opposite_corner_is_fixed() {
        for corner in Corner::ALL {
            let (mut scene, group) = two_squares();
            let mut controller = GizmoController::new(&scene, group.clone()).unwrap();
            let start = world_bounds(&scene, &group);
            let fixed = corner.opposite().of(&start);

            assert!(controller.begin_drag(&scene, DragOperation::Scale(corner), corner.of(&start)));
            controller.update_drag(&mut scene, corner.of(&start) + Vec2::new(-40.0, 70.0));

            let after = world_bounds(&scene, &group);
            assert!(
                near(corner.opposite().of(&after), fixed, TOLERANCE),
                "{corner:?}: {:?} moved to {:?}",
                fixed,
                corner.opposite().of(&after)
            );
            assert!(near(controller.pivot().unwrap(), fixed, TOLERANCE));
        }
    }

    #[test]
    fn test_scale_then_back_restores_snapshot() {
        let (mut scene, group) = two_squares();
        let before = locals(&scene, &group);
        let mut controller = GizmoController::new(&scene, group.clone()).unwrap();

        assert!(controller.begin_drag(&scene, DragOperation::Scale(Corner::TopLeft), Vec2::ZERO));
        controller.update_drag(&mut scene, Vec2::new(-150.0, 60.0));
        assert!(!locals(&scene, &group)[0].abs_diff_eq(&before[0], 1e-3));

        controller.update_drag(&mut scene, Vec2::ZERO);
        for (after, before) in locals(&scene, &group).iter().zip(&before) {
            assert!(after.abs_diff_eq(before, 1e-3));
        }
    }

    #[test]
    fn test_delta_inverse_round_trip() {
        let pivot = Vec2::new(30.0, -12.0);
        let delta = AffineTransform::about(pivot, &AffineTransform::from_scale(Vec2::new(1.75, 0.4)));
        let start = AffineTransform::from_scale_angle_translation(Vec2::new(1.0, 2.0), 0.4, Vec2::new(7.0, 8.0));

        let restored = delta.invert().unwrap().append(&delta.append(&start));
        assert!(restored.abs_diff_eq(&start, 1e-4));
        assert!(near(delta.apply(pivot), pivot, 1e-4));
    }

    #[test]
    fn test_degenerate_group_scales_by_one() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_rect(root, Vec2::splat(40.0), Vec2::ZERO).unwrap();
        let b = scene.spawn_rect(root, Vec2::splat(40.0), Vec2::ZERO).unwrap();
        let group = vec![a, b];
        let before = locals(&scene, &group);
        let mut controller = GizmoController::new(&scene, group.clone()).unwrap();

        assert!(controller.begin_drag(&scene, DragOperation::Scale(Corner::BottomRight), Vec2::splat(40.0)));
        controller.update_drag(&mut scene, Vec2::new(90.0, 120.0));

        for (after, before) in locals(&scene, &group).iter().zip(&before) {
            assert!(after.is_finite());
            assert!(after.abs_diff_eq(before, 1e-5));
        }
        assert_eq!(scale_factor(10.0, 0.0), 1.0);
        assert_eq!(scale_factor(10.0, 5.0), 2.0);
    }

    #[test]
    fn test_quarter_turn_scenario() {
        let (mut scene, square) = centered_square();
        let mut controller = GizmoController::new(&scene, vec![square]).unwrap();
        let center = Vec2::splat(100.0);

        assert!(controller.begin_drag(&scene, DragOperation::Rotate, center + Vec2::new(100.0, 0.0)));
        assert!(near(controller.pivot().unwrap(), center, TOLERANCE));
        controller.update_drag(&mut scene, center + Vec2::new(0.0, 100.0));
        assert!((controller.angle() - FRAC_PI_2).abs() < 1e-4);
        // Not committed until the gesture ends.
        assert_eq!(controller.base_angle(), 0.0);
        controller.end_drag(&scene);
        assert!((controller.base_angle() - FRAC_PI_2).abs() < 1e-4);

        let world = scene.world_transform(square).unwrap();
        // (50,50) -> (150,50) -> (150,150) -> (50,150) -> (50,50)
        assert!(near(world.apply(Vec2::ZERO), Vec2::new(150.0, 50.0), TOLERANCE));
        assert!(near(world.apply(Vec2::new(100.0, 0.0)), Vec2::new(150.0, 150.0), TOLERANCE));
        assert!(near(world.apply(Vec2::splat(100.0)), Vec2::new(50.0, 150.0), TOLERANCE));
        assert!(near(world.apply(Vec2::new(0.0, 100.0)), Vec2::new(50.0, 50.0), TOLERANCE));
        assert!(near(world.apply(Vec2::splat(50.0)), center, TOLERANCE));

        // The outline follows the square, so its corners stay on it.
        let outline = controller.world_outline();
        assert!(near(outline[0], Vec2::new(150.0, 50.0), TOLERANCE));
    }

    #[test]
    fn test_rotation_keeps_pivot() {
        let (mut scene, group) = two_squares();
        let mut controller = GizmoController::new(&scene, group.clone()).unwrap();
        let center = world_bounds(&scene, &group).center();

        assert!(controller.begin_drag(&scene, DragOperation::Rotate, Vec2::new(150.0, -30.0)));
        controller.update_drag(&mut scene, Vec2::new(260.0, 20.0));
        controller.end_drag(&scene);

        let after = world_bounds(&scene, &group).center();
        assert!(near(after, center, TOLERANCE));
        assert!(controller.angle() != 0.0);
        assert!(near(controller.origin(), center, TOLERANCE));
    }

    #[test]
    fn test_scale_after_rotation_uses_gizmo_axes() {
        let (mut scene, square) = centered_square();
        let mut controller = GizmoController::new(&scene, vec![square]).unwrap();
        let center = Vec2::splat(100.0);

        controller.begin_drag(&scene, DragOperation::Rotate, center + Vec2::new(100.0, 0.0));
        controller.update_drag(&mut scene, center + Vec2::new(0.0, 100.0));
        controller.end_drag(&scene);

        // The outline hugs the rotated square, still 100x100 in gizmo space.
        let bounds = controller.bounds();
        assert!((bounds.width() - 100.0).abs() < TOLERANCE);
        assert!((bounds.height() - 100.0).abs() < TOLERANCE);

        // Stretch along the gizmo's x axis only, which is world +y now.
        let handle = controller
            .handle_world_position(HandleRole::Corner(Corner::BottomRight));
        assert!(controller.begin_drag(&scene, DragOperation::Scale(Corner::BottomRight), handle));
        let axis_x = controller.frame().apply(Vec2::X) - controller.frame().apply(Vec2::ZERO);
        controller.update_drag(&mut scene, handle + axis_x * 100.0);
        controller.end_drag(&scene);

        let bounds = controller.bounds();
        assert!((bounds.width() - 200.0).abs() < TOLERANCE);
        assert!((bounds.height() - 100.0).abs() < TOLERANCE);
        let world = scene.world_bounds(square).unwrap();
        assert!((world.width() - 100.0).abs() < TOLERANCE);
        assert!((world.height() - 200.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_cross_parent_rebasing() {
        let (mut scene, _parents, group) = split_parents();
        let before: Vec<AffineTransform> = group.iter().map(|&n| scene.world_transform(n).unwrap()).collect();
        let start = world_bounds(&scene, &group);
        let mut controller = GizmoController::new(&scene, group.clone()).unwrap();

        // Uniform factor 2 about the top-left corner.
        let pivot = start.min;
        assert!(controller.begin_drag(&scene, DragOperation::Scale(Corner::BottomRight), start.max));
        controller.update_drag(&mut scene, pivot + (start.max - pivot) * 2.0);

        let delta = AffineTransform::about(pivot, &AffineTransform::from_scale(Vec2::splat(2.0)));
        for (&node, before) in group.iter().zip(&before) {
            let expected = delta.append(before);
            let actual = scene.world_transform(node).unwrap();
            assert!(actual.abs_diff_eq(&expected, 1e-2), "{node:?}: {actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let (mut scene, _, group) = split_parents();
        let mut controller = GizmoController::new(&scene, group).unwrap();
        controller.begin_drag(&scene, DragOperation::Rotate, Vec2::ZERO);
        controller.update_drag(&mut scene, Vec2::new(500.0, 90.0));

        controller.refresh(&scene);
        let first = controller.render_data();
        controller.refresh(&scene);
        assert_eq!(controller.render_data(), first);
        assert_eq!(first.commands.len(), 1 + 2 * HandleRole::ALL.len());
    }

    #[test]
    fn test_pan_projects_into_parent_space() {
        let (mut scene, [parent_a, _], group) = split_parents();
        let mut controller = GizmoController::new(&scene, group.clone()).unwrap();
        let before: Vec<Vec2> = group.iter().map(|&n| scene.world_bounds(n).unwrap().min).collect();

        let start = controller.world_outline()[0] + Vec2::splat(5.0);
        assert_eq!(controller.hit_test(start + Vec2::splat(20.0)), Some(GizmoPart::Body));
        let grab = start + Vec2::splat(20.0);
        assert!(controller.handle_event(&mut scene, &PointerEvent::down(grab)).is_stopped());
        assert_eq!(controller.operation(), Some(DragOperation::Pan));
        assert_eq!(controller.cursor(), Cursor::Grabbing);

        controller.handle_event(&mut scene, &PointerEvent::moved(grab + Vec2::new(10.0, 0.0)));
        controller.handle_event(&mut scene, &PointerEvent::moved(grab + Vec2::new(30.0, -20.0)));
        controller.handle_event(&mut scene, &PointerEvent::up(grab + Vec2::new(30.0, -20.0)));

        for (&node, before) in group.iter().zip(&before) {
            let after = scene.world_bounds(node).unwrap().min;
            assert!(near(after - *before, Vec2::new(30.0, -20.0), TOLERANCE));
        }
        // Parent A scales by 2, so the local offset is halved.
        assert_eq!(scene.parent(group[0]), Some(parent_a));
        assert!(near(scene.position(group[0]).unwrap(), Vec2::new(25.0, 10.0), TOLERANCE));
    }

    #[test]
    fn test_reentrant_begin_is_refused() {
        let (scene, group) = two_squares();
        let mut controller = GizmoController::new(&scene, group).unwrap();
        assert!(controller.begin_drag(&scene, DragOperation::Pan, Vec2::splat(150.0)));
        assert!(!controller.begin_drag(&scene, DragOperation::Rotate, Vec2::ZERO));
        assert_eq!(controller.operation(), Some(DragOperation::Pan));
        assert!(!controller.handles().get(HandleRole::Rotate).is_dragging());
    }

    #[test]
    fn test_unresolvable_group_refuses_session() {
        let (mut scene, group) = two_squares();
        let mut controller = GizmoController::new(&scene, group.clone()).unwrap();
        for &node in &group {
            scene.despawn(node);
        }
        assert!(!controller.begin_drag(&scene, DragOperation::Scale(Corner::TopLeft), Vec2::ZERO));
        assert!(!controller.is_dragging());
        assert!(
            !controller
                .handles()
                .get(HandleRole::Corner(Corner::TopLeft))
                .is_dragging()
        );
    }

    #[test]
    fn test_detached_member_is_skipped() {
        let (mut scene, group) = two_squares();
        let mut controller = GizmoController::new(&scene, group.clone()).unwrap();
        assert!(controller.begin_drag(&scene, DragOperation::Scale(Corner::BottomRight), Vec2::splat(300.0)));

        scene.detach(group[0]);
        let detached = scene.local_transform(group[0]).unwrap();
        controller.update_drag(&mut scene, Vec2::splat(600.0));

        assert_eq!(scene.local_transform(group[0]).unwrap(), detached);
        let b = scene.world_bounds(group[1]).unwrap();
        assert!(near(b.max, Vec2::splat(600.0), TOLERANCE));
    }

    #[test]
    fn test_release_outside_commits() {
        let (mut scene, square) = centered_square();
        let mut controller = GizmoController::new(&scene, vec![square]).unwrap();
        let rotate = controller.handle_world_position(HandleRole::Rotate);

        assert!(controller.handle_event(&mut scene, &PointerEvent::down(rotate)).is_stopped());
        assert_eq!(controller.operation(), Some(DragOperation::Rotate));
        assert_eq!(controller.cursor(), Cursor::Grabbing);

        controller.handle_event(&mut scene, &PointerEvent::moved(Vec2::new(200.0, 100.0)));
        let rotated = scene.local_transform(square).unwrap();
        let result = controller.handle_event(&mut scene, &PointerEvent::up_outside(Vec2::new(900.0, 900.0)));

        assert!(result.is_stopped());
        assert!(!controller.is_dragging());
        assert_eq!(scene.local_transform(square).unwrap(), rotated);
        assert!((controller.base_angle() - FRAC_PI_2).abs() < 1e-4);
        assert!(!controller.handles().get(HandleRole::Rotate).is_dragging());
    }

    #[test]
    fn test_dispose_keeps_transforms() {
        let (mut scene, group) = two_squares();
        let mut controller = GizmoController::new(&scene, group.clone()).unwrap();
        controller.begin_drag(&scene, DragOperation::Pan, Vec2::splat(150.0));
        controller.update_drag(&mut scene, Vec2::splat(160.0));

        let returned = controller.dispose(&scene);
        assert_eq!(returned, group);
        assert!(near(scene.position(group[0]).unwrap(), Vec2::splat(10.0), TOLERANCE));
    }
}
