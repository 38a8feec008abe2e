//! Host scene-graph boundary.
//!
//! The gizmo never owns the objects it manipulates. Everything it needs from
//! the host is expressed by [`SceneGraph`]; [`Scene`] is a small arena-backed
//! implementation for headless hosts and tests.

use std::fmt;
use std::hash::Hash;

use bevy::math::{Rect, Vec2};

use crate::affine::AffineTransform;
use crate::bounds::rect_corners;
use crate::error::{GizmoError, Result};

/// Queries and mutations the gizmo performs against the host scene graph.
///
/// Every query returns `None` when the host can no longer resolve the node
/// (destroyed, or otherwise unavailable); callers skip such nodes.
pub trait SceneGraph {
    /// Non-owning key of a scene object.
    type Node: Copy + Eq + Hash + fmt::Debug;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn local_transform(&self, node: Self::Node) -> Option<AffineTransform>;

    fn set_local_transform(&mut self, node: Self::Node, transform: AffineTransform);

    /// Transform from the node's local space to world space.
    fn world_transform(&self, node: Self::Node) -> Option<AffineTransform>;

    /// Bounds of the node's own content, in its local space.
    fn local_bounds(&self, node: Self::Node) -> Option<Rect>;

    /// Axis-aligned world bounds of the node's content.
    fn world_bounds(&self, node: Self::Node) -> Option<Rect> {
        let world = self.world_transform(node)?;
        let local = self.local_bounds(node)?;
        let corners = rect_corners(&local).map(|corner| world.apply(corner));
        let mut bounds = Rect::from_corners(corners[0], corners[0]);
        for corner in &corners[1..] {
            bounds = bounds.union_point(*corner);
        }
        Some(bounds)
    }

    /// Converts a world point into `node`'s local space.
    fn to_local(&self, node: Self::Node, global: Vec2) -> Option<Vec2> {
        self.world_transform(node)?.apply_inverse(global)
    }

    /// Converts a point in `node`'s local space to world space.
    fn to_global(&self, node: Self::Node, local: Vec2) -> Option<Vec2> {
        Some(self.world_transform(node)?.apply(local))
    }
}

/// Index of a node inside a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct SceneNode {
    parent: Option<NodeId>,
    local: AffineTransform,
    bounds: Rect,
    alive: bool,
}

/// Arena-backed retained scene graph.
///
/// Node 0 is the root; its local transform is its world transform.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<SceneNode>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode {
                parent: None,
                local: AffineTransform::IDENTITY,
                bounds: Rect::from_corners(Vec2::ZERO, Vec2::ZERO),
                alive: true,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.alive).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    fn get(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.get(node.index()).filter(|n| n.alive)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(node.index()).filter(|n| n.alive)
    }

    /// Adds a node under `parent` with the given local transform and content bounds.
    pub fn spawn(&mut self, parent: NodeId, local: AffineTransform, bounds: Rect) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(GizmoError::InvalidArgument(format!(
                "parent {parent} is not part of the scene"
            )));
        }
        let id = u32::try_from(self.nodes.len())
            .map_err(|_| GizmoError::InvalidArgument("scene node limit reached".to_string()))?;
        self.nodes.push(SceneNode {
            parent: Some(parent),
            local,
            bounds,
            alive: true,
        });
        Ok(NodeId(id))
    }

    /// Adds a node at `position` whose content is the rectangle `(0,0)..size`.
    pub fn spawn_rect(&mut self, parent: NodeId, position: Vec2, size: Vec2) -> Result<NodeId> {
        self.spawn(
            parent,
            AffineTransform::from_translation(position),
            Rect::from_corners(Vec2::ZERO, size),
        )
    }

    /// Re-parents `node`. Fails on unknown nodes and on cycles.
    pub fn attach(&mut self, node: NodeId, parent: NodeId) -> Result<()> {
        if node == self.root() || !self.contains(node) || !self.contains(parent) {
            return Err(GizmoError::InvalidArgument(format!(
                "cannot attach {node} to {parent}"
            )));
        }
        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            if ancestor == node {
                return Err(GizmoError::InvalidArgument(format!(
                    "attaching {node} to {parent} would create a cycle"
                )));
            }
            cursor = self.get(ancestor).and_then(|n| n.parent);
        }
        if let Some(n) = self.get_mut(node) {
            n.parent = Some(parent);
        }
        Ok(())
    }

    /// Removes `node` from its parent; the node itself stays alive.
    pub fn detach(&mut self, node: NodeId) {
        if node == self.root() {
            return;
        }
        if let Some(n) = self.get_mut(node) {
            n.parent = None;
        }
    }

    /// Destroys `node`; its children become detached.
    pub fn despawn(&mut self, node: NodeId) {
        if node == self.root() {
            return;
        }
        let Some(n) = self.get_mut(node) else {
            return;
        };
        n.alive = false;
        n.parent = None;
        for child in &mut self.nodes {
            if child.parent == Some(node) {
                child.parent = None;
            }
        }
    }

    pub fn position(&self, node: NodeId) -> Option<Vec2> {
        self.get(node).map(|n| n.local.translation())
    }

    pub fn set_position(&mut self, node: NodeId, position: Vec2) {
        if let Some(n) = self.get_mut(node) {
            n.local = n.local.with_translation(position);
        }
    }

    pub fn set_local_bounds(&mut self, node: NodeId, bounds: Rect) {
        if let Some(n) = self.get_mut(node) {
            n.bounds = bounds;
        }
    }
}

impl SceneGraph for Scene {
    type Node = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.parent
    }

    fn local_transform(&self, node: NodeId) -> Option<AffineTransform> {
        self.get(node).map(|n| n.local)
    }

    fn set_local_transform(&mut self, node: NodeId, transform: AffineTransform) {
        if let Some(n) = self.get_mut(node) {
            n.local = transform;
        }
    }

    fn world_transform(&self, node: NodeId) -> Option<AffineTransform> {
        let n = self.get(node)?;
        let mut world = n.local;
        let mut cursor = n.parent;
        while let Some(parent) = cursor {
            let p = self.get(parent)?;
            world = p.local.append(&world);
            cursor = p.parent;
        }
        Some(world)
    }

    fn local_bounds(&self, node: NodeId) -> Option<Rect> {
        self.get(node).map(|n| n.bounds)
    }
}
