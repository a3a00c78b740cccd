//! Retained scene graph
//!
//! One node type with optional capability facets instead of an inheritance
//! hierarchy. The tree is the sole owner of every live entity; everything
//! else holds plain `NodeId` handles into it. Removal is two-phase:
//! `mark_for_removal` flags a subtree, `sweep` frees it between ticks.

pub mod node;
pub mod tree;

pub use node::{Facet, Node, Transform};
pub use tree::{NodeId, SceneTree};
