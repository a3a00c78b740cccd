//! Scene nodes and their capability facets

use glam::Vec2;

use crate::sim::Body;

/// 2D transform relative to the parent node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Optional capability carried by a node
///
/// A tagged variant replaces the usual Node2D/Sprite2D/RigidBody2D/Label
/// class ladder: one node type, capability queries instead of downcasts.
#[derive(Debug, Clone)]
pub enum Facet {
    /// Pure grouping node, no capability of its own
    Group,
    /// Renderable sprite; `texture` is an opaque asset key for the renderer
    Sprite { texture: String, size: Vec2 },
    /// Text label; `font` is an opaque asset key for the renderer
    Label { font: String, text: String },
    /// Screen button with a world-space hit rectangle of `size`
    Button { texture: String, size: Vec2 },
    /// Physics body (see `sim::Body`)
    Body(Body),
}

/// A node in the scene tree
///
/// `name` is assigned at insertion and is unique among siblings. The pipe
/// spawner relies on it doubling as a type tag ("TopPipe"/"BottomPipe").
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub transform: Transform,
    pub z_index: i32,
    pub visible: bool,
    pub facet: Facet,
    pub(crate) children: Vec<super::NodeId>,
    pub(crate) parent: Option<super::NodeId>,
    pub(crate) pending_removal: bool,
    pub(crate) ready_fired: bool,
}

impl Node {
    pub fn new(facet: Facet) -> Self {
        Self {
            name: String::new(),
            transform: Transform::default(),
            z_index: 0,
            visible: true,
            facet,
            children: Vec::new(),
            parent: None,
            pending_removal: false,
            ready_fired: false,
        }
    }

    pub fn group() -> Self {
        Self::new(Facet::Group)
    }

    pub fn sprite(texture: impl Into<String>, size: Vec2) -> Self {
        Self::new(Facet::Sprite {
            texture: texture.into(),
            size,
        })
    }

    pub fn label(font: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Facet::Label {
            font: font.into(),
            text: text.into(),
        })
    }

    pub fn button(texture: impl Into<String>, size: Vec2) -> Self {
        Self::new(Facet::Button {
            texture: texture.into(),
            size,
        })
    }

    pub fn body(body: Body) -> Self {
        Self::new(Facet::Body(body))
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_z(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Name this node was inserted under (empty before insertion)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capability query: physics body facet
    pub fn body_facet(&self) -> Option<&Body> {
        match &self.facet {
            Facet::Body(body) => Some(body),
            _ => None,
        }
    }

    pub fn body_facet_mut(&mut self) -> Option<&mut Body> {
        match &mut self.facet {
            Facet::Body(body) => Some(body),
            _ => None,
        }
    }

    /// Capability query: label text (mutable, for HUD updates)
    pub fn label_text_mut(&mut self) -> Option<&mut String> {
        match &mut self.facet {
            Facet::Label { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Capability query: button hit size
    pub fn button_size(&self) -> Option<Vec2> {
        match &self.facet {
            Facet::Button { size, .. } => Some(*size),
            _ => None,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
    }
}
