//! Pointer input and routing.
//!
//! Hosts translate their native pointer events into [`PointerEvent`]s. A
//! [`PointerRouter`] gives controllers an explicit subscribe/unsubscribe
//! lifecycle, routes presses to the topmost gizmo under the pointer, and
//! captures the pointer for the rest of the gesture.

use std::fmt;
use std::hash::Hash;

use bevy::math::Vec2;

use crate::controller::GizmoController;
use crate::scene::SceneGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    /// Released while outside the hit area of whatever received the press.
    UpOutside,
}

/// A pointer event in global (world) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub global: Vec2,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, global: Vec2) -> Self {
        Self { kind, global }
    }

    pub fn down(global: Vec2) -> Self {
        Self::new(PointerEventKind::Down, global)
    }

    pub fn moved(global: Vec2) -> Self {
        Self::new(PointerEventKind::Move, global)
    }

    pub fn up(global: Vec2) -> Self {
        Self::new(PointerEventKind::Up, global)
    }

    pub fn up_outside(global: Vec2) -> Self {
        Self::new(PointerEventKind::UpOutside, global)
    }

    pub fn is_release(&self) -> bool {
        matches!(self.kind, PointerEventKind::Up | PointerEventKind::UpOutside)
    }
}

/// Whether an event may continue to siblings and ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

impl Propagation {
    pub fn is_stopped(self) -> bool {
        self == Propagation::Stop
    }
}

/// Subscription key returned by [`PointerRouter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GizmoId(u64);

impl fmt::Display for GizmoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gizmo-{}", self.0)
    }
}

/// Routes pointer events to subscribed controllers.
///
/// Controllers are stacked in subscription order; the most recent one is
/// topmost and is offered presses first. Controllers over overlapping groups
/// are not guarded against.
pub struct PointerRouter<N> {
    entries: Vec<(GizmoId, GizmoController<N>)>,
    captured: Option<GizmoId>,
    next_id: u64,
}

impl<N> Default for PointerRouter<N> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            captured: None,
            next_id: 1,
        }
    }
}

impl<N: Copy + Eq + Hash + fmt::Debug> PointerRouter<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, controller: GizmoController<N>) -> GizmoId {
        let id = GizmoId(self.next_id);
        self.next_id += 1;
        tracing::debug!("[router] Subscribed {} ({} objects)", id, controller.group().len());
        self.entries.push((id, controller));
        id
    }

    /// Removes a controller without touching its state.
    pub fn unsubscribe(&mut self, id: GizmoId) -> Option<GizmoController<N>> {
        let index = self.entries.iter().position(|(entry, _)| *entry == id)?;
        if self.captured == Some(id) {
            self.captured = None;
        }
        tracing::debug!("[router] Unsubscribed {}", id);
        Some(self.entries.remove(index).1)
    }

    /// Unsubscribes and disposes a controller, committing any gesture in
    /// progress. Returns the controller's group.
    pub fn dispose<S>(&mut self, scene: &S, id: GizmoId) -> Option<Vec<N>>
    where
        S: SceneGraph<Node = N>,
    {
        self.unsubscribe(id).map(|controller| controller.dispose(scene))
    }

    pub fn get(&self, id: GizmoId) -> Option<&GizmoController<N>> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, controller)| controller)
    }

    pub fn get_mut(&mut self, id: GizmoId) -> Option<&mut GizmoController<N>> {
        self.entries
            .iter_mut()
            .find(|(entry, _)| *entry == id)
            .map(|(_, controller)| controller)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Controller currently holding pointer capture.
    pub fn captured(&self) -> Option<GizmoId> {
        self.captured
    }

    pub fn dispatch<S>(&mut self, scene: &mut S, event: &PointerEvent) -> Propagation
    where
        S: SceneGraph<Node = N>,
    {
        match event.kind {
            PointerEventKind::Down => self.dispatch_down(scene, event),
            PointerEventKind::Move | PointerEventKind::Up | PointerEventKind::UpOutside => {
                let Some(id) = self.captured else {
                    return Propagation::Continue;
                };
                let Some(controller) = self.get_mut(id) else {
                    self.captured = None;
                    return Propagation::Continue;
                };
                let propagation = controller.handle_event(scene, event);
                if !controller.is_dragging() {
                    self.captured = None;
                }
                propagation
            }
        }
    }

    fn dispatch_down<S>(&mut self, scene: &mut S, event: &PointerEvent) -> Propagation
    where
        S: SceneGraph<Node = N>,
    {
        // One gesture at a time.
        if self.captured.is_some() {
            return Propagation::Continue;
        }
        for (id, controller) in self.entries.iter_mut().rev() {
            if controller.hit_test(event.global).is_none() {
                continue;
            }
            if controller.handle_event(scene, event).is_stopped() {
                if controller.is_dragging() {
                    self.captured = Some(*id);
                }
                return Propagation::Stop;
            }
        }
        Propagation::Continue
    }
}
