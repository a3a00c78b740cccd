//! Error taxonomy for scene and body construction
//!
//! These are programmer errors, not transient conditions: callers surface
//! them immediately (debug_assert in debug, logged-and-skipped in release)
//! rather than retrying.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// A sibling with this name already exists under the parent.
    #[error("duplicate child name `{name}` under `{parent}`")]
    DuplicateName { parent: String, name: String },

    /// Degenerate shape parameters (zero/negative extent or radius).
    #[error("invalid shape: {0}")]
    InvalidShape(&'static str),

    /// Operation on a node that has already been swept. Unreachable when
    /// the mark-then-sweep discipline is followed.
    #[error("stale node reference")]
    StaleNode,
}
