//! Pimba - a side-scrolling pipe-avoider gameplay core
//!
//! Core modules:
//! - `scene`: Retained scene tree with deferred (mark-then-sweep) removal
//! - `sim`: Deterministic simulation (bodies, collisions, spawning, tick)
//! - `services`: Narrow contracts for the external renderer/audio/share collaborators
//!
//! Rendering, audio mixing, device input and networking are external
//! collaborators; this crate only produces draw lists and drains events.

pub mod error;
pub mod scene;
pub mod services;
pub mod sim;

pub use error::SceneError;
pub use scene::{Facet, Node, NodeId, SceneTree, Transform};
pub use sim::{GameEvent, GamePhase, TickInput, World, tick};

use glam::Vec2;

/// Game configuration constants
///
/// World space is screen space: origin at the top-left corner, y pointing
/// down, so gravity is positive-y and a jump impulse is negative-y.
pub mod consts {
    /// Virtual viewport size
    pub const VIEWPORT_WIDTH: f32 = 540.0;
    pub const VIEWPORT_HEIGHT: f32 = 960.0;

    /// Downward acceleration applied to dynamic bodies (pixels/s²)
    pub const GRAVITY: f32 = 300.0;
    /// Upward launch speed; `apply_impulse` replaces velocity with this
    pub const JUMP_FORCE: f32 = 100.0;

    /// Leftward pipe scroll speed (pixels/s)
    pub const PIPE_SPEED: f32 = 100.0;
    /// Pipe body width
    pub const PIPE_WIDTH: f32 = 52.0;
    /// Vertical opening between a top/bottom pipe pair
    pub const PIPE_GAP: f32 = 80.0;
    /// Seconds between pipe pair spawns
    pub const PIPE_INTERVAL: f32 = 1.8;
    /// Minimum clearance between the gap and the viewport edges
    pub const SAFE_MARGIN: f32 = 40.0;

    /// Player body
    pub const PLAYER_RADIUS: f32 = 12.0;
    pub const PLAYER_X: f32 = 40.0;

    /// Collision layer bits
    pub const LAYER_PLAYER: u32 = 1 << 0;
    pub const LAYER_OBSTACLE: u32 = 1 << 1;
}

/// Axis-aligned rectangle centered at `center`, used for button hit tests
#[derive(Debug, Clone, Copy)]
pub struct Rect2 {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect2 {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Point-in-rectangle test in world space
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        let half = self.size * 0.5;
        (point.x - self.center.x).abs() <= half.x && (point.y - self.center.y).abs() <= half.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect2::new(Vec2::new(10.0, 10.0), Vec2::new(4.0, 2.0));
        assert!(rect.contains(Vec2::new(10.0, 10.0)));
        assert!(rect.contains(Vec2::new(12.0, 11.0)));
        assert!(!rect.contains(Vec2::new(12.1, 10.0)));
        assert!(!rect.contains(Vec2::new(10.0, 11.1)));
    }
}
