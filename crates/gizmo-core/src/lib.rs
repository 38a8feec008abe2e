//! Group Transform Gizmo
//!
//! Translate, scale (per corner, about the opposite corner) and rotate
//! (about the group center) a set of scene objects as one unit, with a live
//! bounding outline.
//!
//! The host scene graph is reached through [`SceneGraph`]; [`Scene`] is a
//! small arena implementation for headless use. Pointer input goes either
//! straight into a [`GizmoController`] or through a [`PointerRouter`] that
//! handles capture across several gizmos.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod affine;
pub mod bounds;
pub mod config;
pub mod controller;
pub mod error;
pub mod handle;
pub mod input;
pub mod render;
pub mod scene;
pub mod wireframe;

#[cfg(test)]
mod test_utils;

pub use affine::AffineTransform;
pub use bounds::{oriented_bounds, world_bounds};
pub use config::{GizmoConfig, HandleStyle, WireframeStyle};
pub use controller::{DragOperation, GizmoController, GizmoPart};
pub use error::{GizmoError, Result};
pub use handle::{Corner, Cursor, Handle, HandleRole, HandleSet, HandleSignal};
pub use input::{GizmoId, PointerEvent, PointerEventKind, PointerRouter, Propagation};
pub use render::{Color, DrawCommand, GizmoRenderData};
pub use scene::{NodeId, Scene, SceneGraph};
pub use wireframe::Wireframe;
