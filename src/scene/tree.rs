//! Scene tree: arena-owned nodes with two-phase deferred removal
//!
//! Removal discipline: `mark_for_removal` only flags a subtree and is safe
//! while handlers are walking the tree; `sweep` runs once per tick, outside
//! any traversal, and physically frees everything that was marked. Handles
//! are generational, so an id that survived a sweep can never alias a
//! recycled slot.

use glam::Vec2;

use super::node::{Facet, Node};
use crate::error::SceneError;
use crate::services::{DrawCommand, DrawKind, DrawList};
use crate::Rect2;

/// Generational handle into the scene tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The retained scene graph; sole owner of all live nodes
pub struct SceneTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl SceneTree {
    /// Create a tree with an empty root group named "Root"
    pub fn new() -> Self {
        let mut root_node = Node::group();
        root_node.name = "Root".to_string();
        let root = NodeId {
            index: 0,
            generation: 0,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root_node),
            }],
            free: Vec::new(),
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Number of live (allocated) nodes, including the root
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach `node` as a child of `parent` under `name`.
    ///
    /// Names are unique among siblings; a clash is a programmer error and
    /// is rejected rather than overwritten.
    pub fn insert(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        mut node: Node,
    ) -> Result<NodeId, SceneError> {
        let name = name.into();

        let parent_node = self.get(parent).ok_or(SceneError::StaleNode)?;
        if parent_node
            .children
            .iter()
            .filter_map(|&child| self.get(child))
            .any(|child| child.name == name)
        {
            return Err(SceneError::DuplicateName {
                parent: parent_node.name.clone(),
                name,
            });
        }

        node.name = name;
        node.parent = Some(parent);
        let id = self.allocate(node);

        // Parent was checked live above
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.push(id);
        }
        Ok(id)
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Flag a node and its whole subtree for deletion.
    ///
    /// No structural change happens here; the subtree stays allocated (but
    /// is skipped by traversal) until the next `sweep`.
    pub fn mark_for_removal(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get_mut(current) {
                node.pending_removal = true;
                stack.extend(node.children.iter().copied());
            } else {
                debug_assert!(false, "mark_for_removal on stale node");
                log::warn!("mark_for_removal: stale node id, skipping");
            }
        }
    }

    /// Physically free every marked subtree. Call once per tick, never
    /// while iterating. Returns the number of nodes freed.
    pub fn sweep(&mut self) -> usize {
        let marked: Vec<NodeId> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.node
                    .as_ref()
                    .filter(|node| node.pending_removal)
                    .map(|_| NodeId {
                        index: index as u32,
                        generation: slot.generation,
                    })
            })
            .collect();

        // Detach subtree roots from their (unmarked) parents first so the
        // tree shape stays consistent while slots are freed.
        for &id in &marked {
            let parent = self.get(id).and_then(|node| node.parent);
            if let Some(parent) = parent {
                let parent_marked = self
                    .get(parent)
                    .map(|p| p.pending_removal)
                    .unwrap_or(false);
                if !parent_marked
                    && let Some(parent_node) = self.get_mut(parent)
                {
                    parent_node.children.retain(|&child| child != id);
                }
            }
        }

        let freed = marked.len();
        for id in marked {
            let slot = &mut self.slots[id.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
        freed
    }

    /// Lazy depth-first traversal of live `(name, id)` pairs.
    ///
    /// Parent before children, siblings in insertion order. Subtrees
    /// pending removal are skipped entirely.
    pub fn iter(&self) -> SceneIter<'_> {
        SceneIter {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Snapshot of the live traversal order; use when the loop body needs
    /// `&mut` access to nodes.
    pub fn live_ids(&self) -> Vec<NodeId> {
        self.iter().map(|(_, id)| id).collect()
    }

    /// World-space position of a node (sum of ancestor translations)
    pub fn world_position(&self, id: NodeId) -> Option<Vec2> {
        let mut position = Vec2::ZERO;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id)?;
            position += node.transform.position;
            current = node.parent;
        }
        Some(position)
    }

    /// Fire `ready` on every live node that has not seen it yet.
    /// Idempotent per node: fires only on the first traversal after
    /// insertion.
    pub fn ready(&mut self) -> usize {
        let mut fired = 0;
        for id in self.live_ids() {
            if let Some(node) = self.get_mut(id)
                && !node.ready_fired
            {
                node.ready_fired = true;
                fired += 1;
            }
        }
        fired
    }

    /// Per-tick `process` hook, propagated depth-first to every live node.
    /// Returns the number of nodes visited.
    ///
    /// Built-in facets are passive here; physics integration runs in the
    /// orchestrator's physics step, ahead of the sweep. The hook keeps the
    /// ready/process/draw/input dispatch contract for collaborator facets.
    pub fn process(&mut self, _dt: f32) -> usize {
        self.iter().count()
    }

    /// Emit draw commands for every visible live node, depth-first.
    ///
    /// An invisible node hides its whole subtree.
    pub fn draw(&self, list: &mut DrawList) {
        self.draw_node(self.root, Vec2::ZERO, list);
    }

    fn draw_node(&self, id: NodeId, parent_position: Vec2, list: &mut DrawList) {
        let Some(node) = self.get(id) else {
            return;
        };
        if node.pending_removal || !node.visible {
            return;
        }
        let world = parent_position + node.transform.position;

        let kind = match &node.facet {
            Facet::Group => None,
            Facet::Sprite { texture, size } | Facet::Button { texture, size } => {
                Some(DrawKind::Sprite {
                    texture: texture.clone(),
                    size: *size,
                })
            }
            Facet::Label { font, text } => Some(DrawKind::Text {
                font: font.clone(),
                text: text.clone(),
            }),
            Facet::Body(body) => Some(DrawKind::Shape(body.shape)),
        };
        if let Some(kind) = kind {
            list.push(DrawCommand {
                kind,
                position: world,
                scale: node.transform.scale,
                rotation: node.transform.rotation,
                z_index: node.z_index,
            });
        }

        for &child in &node.children {
            self.draw_node(child, world, list);
        }
    }

    /// Hit-test a world-space pointer position against every visible
    /// button, in traversal order.
    pub fn hit_buttons(&self, pointer: Vec2) -> Vec<NodeId> {
        let mut hits = Vec::new();
        for (_, id) in self.iter() {
            let Some(node) = self.get(id) else { continue };
            if !node.visible {
                continue;
            }
            if let Some(size) = node.button_size() {
                let Some(center) = self.world_position(id) else {
                    continue;
                };
                if Rect2::new(center, size).contains(pointer) {
                    hits.push(id);
                }
            }
        }
        hits
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first iterator over live nodes; see [`SceneTree::iter`]
pub struct SceneIter<'a> {
    tree: &'a SceneTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for SceneIter<'a> {
    type Item = (&'a str, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            if node.pending_removal {
                continue;
            }
            // Reverse push keeps sibling order; invisible nodes still
            // traverse (visibility only affects drawing).
            for &child in node.children.iter().rev() {
                self.stack.push(child);
            }
            return Some((node.name.as_str(), id));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &SceneTree) -> Vec<String> {
        tree.iter().map(|(name, _)| name.to_string()).collect()
    }

    #[test]
    fn test_dfs_order_parent_before_children() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let a = tree.insert(root, "A", Node::group()).unwrap();
        tree.insert(root, "B", Node::group()).unwrap();
        tree.insert(a, "A1", Node::group()).unwrap();
        tree.insert(a, "A2", Node::group()).unwrap();

        assert_eq!(names(&tree), vec!["Root", "A", "A1", "A2", "B"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        tree.insert(root, "Player", Node::group()).unwrap();
        let err = tree.insert(root, "Player", Node::group()).unwrap_err();
        assert_eq!(
            err,
            SceneError::DuplicateName {
                parent: "Root".to_string(),
                name: "Player".to_string(),
            }
        );
        // Same name under a different parent is fine
        let a = tree.insert(root, "A", Node::group()).unwrap();
        assert!(tree.insert(a, "Player", Node::group()).is_ok());
    }

    #[test]
    fn test_mark_skips_traversal_sweep_is_exact() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let a = tree.insert(root, "A", Node::group()).unwrap();
        let b = tree.insert(root, "B", Node::group()).unwrap();
        let a1 = tree.insert(a, "A1", Node::group()).unwrap();

        // Mark mid-walk, as a collision handler would between visits
        let order = tree.live_ids();
        for id in order {
            if id == a {
                tree.mark_for_removal(a);
            }
        }

        // Marked subtree is no longer visited, but still allocated
        assert_eq!(names(&tree), vec!["Root", "B"]);
        assert!(tree.get(a1).is_some());

        let freed = tree.sweep();
        assert_eq!(freed, 2); // exactly A and A1
        assert!(tree.get(a).is_none());
        assert!(tree.get(a1).is_none());
        assert!(tree.get(b).is_some());
        assert_eq!(names(&tree), vec!["Root", "B"]);
    }

    #[test]
    fn test_stale_id_after_slot_reuse() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let a = tree.insert(root, "A", Node::group()).unwrap();
        tree.mark_for_removal(a);
        tree.sweep();

        // Slot gets recycled; the old handle must not alias the new node
        let b = tree.insert(root, "B", Node::group()).unwrap();
        assert!(tree.get(a).is_none());
        assert_eq!(tree.get(b).map(|n| n.name()), Some("B"));
    }

    #[test]
    fn test_ready_fires_once_per_node() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        tree.insert(root, "A", Node::group()).unwrap();
        assert_eq!(tree.ready(), 2); // root + A
        assert_eq!(tree.ready(), 0);

        tree.insert(root, "B", Node::group()).unwrap();
        assert_eq!(tree.ready(), 1); // only the newcomer
    }

    #[test]
    fn test_world_position_accumulates() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let a = tree
            .insert(root, "A", Node::group().at(Vec2::new(10.0, 20.0)))
            .unwrap();
        let a1 = tree
            .insert(a, "A1", Node::group().at(Vec2::new(1.0, 2.0)))
            .unwrap();
        assert_eq!(tree.world_position(a1), Some(Vec2::new(11.0, 22.0)));
    }

    #[test]
    fn test_hit_buttons_respects_visibility() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let shown = tree
            .insert(
                root,
                "PauseButton",
                Node::button("pause", Vec2::new(30.0, 30.0)).at(Vec2::new(510.0, 15.0)),
            )
            .unwrap();
        tree.insert(
            root,
            "ShareButton",
            Node::button("share", Vec2::new(30.0, 30.0))
                .at(Vec2::new(510.0, 15.0))
                .hidden(),
        )
        .unwrap();

        let hits = tree.hit_buttons(Vec2::new(510.0, 15.0));
        assert_eq!(hits, vec![shown]);
        assert!(tree.hit_buttons(Vec2::new(100.0, 100.0)).is_empty());
    }
}
