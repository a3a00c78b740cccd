//! Physics body facet
//!
//! Two body kinds only: kinematic bodies are pushed around by gameplay
//! code (pipes scrolling left), dynamic bodies fall under gravity and get
//! jump impulses (the player). No rotation, no friction, no resolution
//! beyond the game-over event.

use glam::Vec2;

use crate::consts::GRAVITY;
use crate::error::SceneError;
use crate::scene::SceneTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Velocity set externally; never gravity-affected
    Kinematic,
    /// Accumulates gravity, receives impulses, integrated every tick
    Dynamic,
}

/// Collision shape with validated, strictly positive parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

impl Shape {
    pub fn circle(radius: f32) -> Result<Self, SceneError> {
        if radius <= 0.0 || !radius.is_finite() {
            return Err(SceneError::InvalidShape("circle radius must be positive"));
        }
        Ok(Self::Circle { radius })
    }

    pub fn rect(width: f32, height: f32) -> Result<Self, SceneError> {
        if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
            return Err(SceneError::InvalidShape("rect extents must be positive"));
        }
        Ok(Self::Rect { width, height })
    }

    /// Half extents of the bounding box (for culling and overlap tests)
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Rect { width, height } => Vec2::new(width / 2.0, height / 2.0),
        }
    }
}

/// Body capability carried by a scene node
///
/// `layer` is a single bit saying what this body is; `mask` is the set of
/// layer bits it can hit. Only dynamic bodies are tested against others.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub kind: BodyKind,
    pub shape: Shape,
    pub velocity: Vec2,
    pub layer: u32,
    pub mask: u32,
}

impl Body {
    pub fn kinematic(shape: Shape, layer: u32, mask: u32) -> Self {
        Self {
            kind: BodyKind::Kinematic,
            shape,
            velocity: Vec2::ZERO,
            layer,
            mask,
        }
    }

    pub fn dynamic(shape: Shape, layer: u32, mask: u32) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            shape,
            velocity: Vec2::ZERO,
            layer,
            mask,
        }
    }

    /// Replace (not add to) the velocity.
    ///
    /// Matches the flappy jump feel: each flap cancels any accumulated
    /// fall speed instead of stacking on it.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity = impulse;
    }
}

/// Advance every body-carrying node by one step.
///
/// Dynamic bodies accumulate gravity first; both kinds then integrate
/// position. Runs only while the session is stepping (Ready/Playing).
pub fn integrate_bodies(tree: &mut SceneTree, dt: f32) {
    for id in tree.live_ids() {
        let Some(node) = tree.get_mut(id) else {
            continue;
        };
        let Some(body) = node.body_facet_mut() else {
            continue;
        };
        if body.kind == BodyKind::Dynamic {
            body.velocity.y += GRAVITY * dt;
        }
        let velocity = body.velocity;
        node.transform.position += velocity * dt;
    }
}
