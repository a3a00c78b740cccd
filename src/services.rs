//! Narrow contracts for external collaborators
//!
//! The core never talks to a GPU, mixer or socket. It hands the renderer a
//! z-sorted draw list once per tick, and emits events (`sim::GameEvent`)
//! the driver forwards to the audio and sharing collaborators.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::Shape;

/// What a single draw command renders
#[derive(Debug, Clone, PartialEq)]
pub enum DrawKind {
    /// Textured quad; `texture` is an opaque asset key owned by the renderer
    Sprite { texture: String, size: Vec2 },
    /// Text run; `font` is an opaque asset key owned by the renderer
    Text { font: String, text: String },
    /// Debug shape for bodies without a sprite child
    Shape(Shape),
}

/// One entry of the per-tick draw list
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub kind: DrawKind,
    /// World-space position (center)
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
    pub z_index: i32,
}

/// Draw-order list handed to the renderer once per tick
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Commands sorted by z (stable, so tree order breaks ties)
    pub fn sorted(mut self) -> Vec<DrawCommand> {
        self.commands.sort_by_key(|c| c.z_index);
        self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Flat score record handed to the sharing collaborator.
///
/// Captured by value at share time; whatever thread serializes or POSTs it
/// later never touches the scene tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub name: String,
    pub score: u32,
    pub platform: String,
    pub engine_version: String,
}

impl ShareRecord {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
            platform: std::env::consts::OS.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// JSON payload for the persistence/network collaborator
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable share line for the clipboard collaborator
    pub fn share_text(&self) -> String {
        format!(
            "I scored {} points in Pimba!, check it out!",
            self.score
        )
    }
}
