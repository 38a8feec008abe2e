//! Error types.

/// Errors surfaced by the gizmo.
///
/// Interactive operations never fail; degenerate input is clamped or
/// ignored. Errors only come from construction and configuration.
#[derive(Debug, thiserror::Error)]
pub enum GizmoError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid gizmo config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GizmoError>;
