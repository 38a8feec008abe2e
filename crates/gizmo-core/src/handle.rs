//! Draggable grips.
//!
//! A [`Handle`] only adapts pointer events into [`HandleSignal`]s; all
//! transform math lives in the controller.

use bevy::math::{Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::HandleStyle;
use crate::render::DrawCommand;

/// Corner of a bounding rectangle. Top is the smaller y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    pub fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    /// The diagonally opposite corner.
    #[must_use]
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Position of this corner on `rect`.
    pub fn of(self, rect: &Rect) -> Vec2 {
        Vec2::new(
            if self.is_left() { rect.min.x } else { rect.max.x },
            if self.is_top() { rect.min.y } else { rect.max.y },
        )
    }
}

/// Pointer cursor hint for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Grab,
    Grabbing,
    NwseResize,
    NeswResize,
    Crosshair,
}

impl Cursor {
    /// CSS cursor keyword.
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
            Cursor::NwseResize => "nwse-resize",
            Cursor::NeswResize => "nesw-resize",
            Cursor::Crosshair => "crosshair",
        }
    }
}

/// What a handle controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleRole {
    Corner(Corner),
    Rotate,
}

impl HandleRole {
    pub const ALL: [HandleRole; 5] = [
        HandleRole::Corner(Corner::TopLeft),
        HandleRole::Corner(Corner::TopRight),
        HandleRole::Corner(Corner::BottomLeft),
        HandleRole::Corner(Corner::BottomRight),
        HandleRole::Rotate,
    ];

    fn index(self) -> usize {
        match self {
            HandleRole::Corner(Corner::TopLeft) => 0,
            HandleRole::Corner(Corner::TopRight) => 1,
            HandleRole::Corner(Corner::BottomLeft) => 2,
            HandleRole::Corner(Corner::BottomRight) => 3,
            HandleRole::Rotate => 4,
        }
    }

    /// Idle cursor: diagonal resize for corners, crosshair for rotate.
    pub fn cursor(self) -> Cursor {
        match self {
            HandleRole::Corner(Corner::TopLeft | Corner::BottomRight) => Cursor::NwseResize,
            HandleRole::Corner(Corner::TopRight | Corner::BottomLeft) => Cursor::NeswResize,
            HandleRole::Rotate => Cursor::Crosshair,
        }
    }
}

/// Emitted by a handle in response to pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandleSignal {
    Begin { role: HandleRole, pointer: Vec2 },
    Update { role: HandleRole, pointer: Vec2 },
    End { role: HandleRole },
}

/// A single circular grip. `idle -> dragging -> idle`.
#[derive(Debug, Clone)]
pub struct Handle {
    role: HandleRole,
    radius: f32,
    position: Vec2,
    dragging: bool,
}

impl Handle {
    pub fn new(role: HandleRole, radius: f32) -> Self {
        Self {
            role,
            radius,
            position: Vec2::ZERO,
            dragging: false,
        }
    }

    pub fn role(&self) -> HandleRole {
        self.role
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Position in gizmo-local space.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn cursor(&self) -> Cursor {
        if self.dragging {
            Cursor::Grabbing
        } else {
            self.role.cursor()
        }
    }

    /// Hit test against the circular hit shape, in gizmo-local space.
    pub fn contains(&self, local: Vec2) -> bool {
        local.distance_squared(self.position) <= self.radius * self.radius
    }

    /// Starts a drag. The caller must stop the down event from propagating.
    ///
    /// Returns `None` if the handle is already dragging.
    pub fn pointer_down(&mut self, pointer: Vec2) -> Option<HandleSignal> {
        if self.dragging {
            return None;
        }
        self.dragging = true;
        Some(HandleSignal::Begin {
            role: self.role,
            pointer,
        })
    }

    pub fn pointer_move(&self, pointer: Vec2) -> Option<HandleSignal> {
        self.dragging.then_some(HandleSignal::Update {
            role: self.role,
            pointer,
        })
    }

    /// Ends a drag. Handles both release inside and outside the hit area.
    pub fn pointer_up(&mut self) -> Option<HandleSignal> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        Some(HandleSignal::End { role: self.role })
    }

    pub fn draw(&self, style: &HandleStyle) -> [DrawCommand; 2] {
        [
            DrawCommand::FillCircle {
                center: self.position,
                radius: self.radius,
                color: style.fill,
            },
            DrawCommand::StrokeCircle {
                center: self.position,
                radius: self.radius,
                color: style.stroke,
                width: style.stroke_width,
            },
        ]
    }
}

/// Exactly one handle per [`HandleRole`].
#[derive(Debug, Clone)]
pub struct HandleSet {
    handles: [Handle; 5],
}

impl HandleSet {
    pub fn new(radius: f32) -> Self {
        Self {
            handles: HandleRole::ALL.map(|role| Handle::new(role, radius)),
        }
    }

    pub fn get(&self, role: HandleRole) -> &Handle {
        &self.handles[role.index()]
    }

    pub fn get_mut(&mut self, role: HandleRole) -> &mut Handle {
        &mut self.handles[role.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        self.handles.iter()
    }

    /// The handle currently being dragged, if any.
    pub fn dragging(&self) -> Option<&Handle> {
        self.handles.iter().find(|h| h.is_dragging())
    }

    /// Topmost handle under `local`; the rotate handle is painted last.
    pub fn hit(&self, local: Vec2) -> Option<HandleRole> {
        self.handles.iter().rev().find(|h| h.contains(local)).map(Handle::role)
    }

    /// Places the corner handles on `rect` and the rotate handle `offset`
    /// above the top edge, horizontally centered.
    pub fn layout(&mut self, rect: &Rect, offset: f32) {
        for corner in Corner::ALL {
            self.get_mut(HandleRole::Corner(corner)).set_position(corner.of(rect));
        }
        let top_center = Vec2::new(rect.center().x, rect.min.y - offset);
        self.get_mut(HandleRole::Rotate).set_position(top_center);
    }
}
