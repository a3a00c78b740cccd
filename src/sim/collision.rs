//! Shape overlap tests and the per-tick collision pass
//!
//! The detector walks the tree once per tick and tests every dynamic body
//! against every other body its mask allows. O(n) pairs is plenty at this
//! entity count; culling keeps n small, but nothing here assumes a bound.
//!
//! Collisions are surfaced as events consumed by the state machine, not
//! as callbacks captured inside the physics layer.

use glam::Vec2;

use super::body::{BodyKind, Shape};
use crate::scene::{NodeId, SceneTree};

/// A dynamic body overlapped something its mask allows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    /// The dynamic body that hit
    pub body: NodeId,
    /// The entity it hit (first overlap in traversal order)
    pub other: NodeId,
}

/// Circle-circle: center distance no greater than the radius sum
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) <= (ra + rb) * (ra + rb)
}

/// Circle-rect: clamped nearest point on the rect within the radius
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect_center: Vec2, half: Vec2) -> bool {
    let nearest = center.clamp(rect_center - half, rect_center + half);
    center.distance_squared(nearest) <= radius * radius
}

/// Rect-rect: axis-aligned interval overlap on both axes
#[inline]
pub fn rects_overlap(a: Vec2, half_a: Vec2, b: Vec2, half_b: Vec2) -> bool {
    (a.x - b.x).abs() <= half_a.x + half_b.x && (a.y - b.y).abs() <= half_a.y + half_b.y
}

/// Shape-appropriate overlap test between two positioned shapes
pub fn shapes_overlap(pos_a: Vec2, shape_a: Shape, pos_b: Vec2, shape_b: Shape) -> bool {
    match (shape_a, shape_b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circles_overlap(pos_a, ra, pos_b, rb)
        }
        (Shape::Circle { radius }, rect @ Shape::Rect { .. }) => {
            circle_rect_overlap(pos_a, radius, pos_b, rect.half_extents())
        }
        (rect @ Shape::Rect { .. }, Shape::Circle { radius }) => {
            circle_rect_overlap(pos_b, radius, pos_a, rect.half_extents())
        }
        (a @ Shape::Rect { .. }, b @ Shape::Rect { .. }) => {
            rects_overlap(pos_a, a.half_extents(), pos_b, b.half_extents())
        }
    }
}

/// Run the collision pass over the tree.
///
/// For each dynamic body, at most one collision is reported per tick: the
/// first overlapping entity in traversal order (deterministic for a fixed
/// tree). Layer/mask filtering: `dynamic.mask & other.layer != 0`.
pub fn detect_collisions(tree: &SceneTree) -> Vec<Collision> {
    // World-space snapshot in traversal order
    let bodies: Vec<(NodeId, Vec2, super::Body)> = tree
        .iter()
        .filter_map(|(_, id)| {
            let body = *tree.get(id)?.body_facet()?;
            let position = tree.world_position(id)?;
            Some((id, position, body))
        })
        .collect();

    let mut collisions = Vec::new();
    for &(id, position, body) in &bodies {
        if body.kind != BodyKind::Dynamic {
            continue;
        }
        for &(other_id, other_position, other_body) in &bodies {
            if other_id == id || body.mask & other_body.layer == 0 {
                continue;
            }
            if shapes_overlap(position, body.shape, other_position, other_body.shape) {
                collisions.push(Collision {
                    body: id,
                    other: other_id,
                });
                // One collision event per dynamic body per tick
                break;
            }
        }
    }
    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{LAYER_OBSTACLE, LAYER_PLAYER};
    use crate::scene::Node;
    use crate::sim::Body;

    #[test]
    fn test_circle_circle_boundary_counts() {
        // Touching exactly at the radius sum is an overlap
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(8.0, 0.0), 3.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(8.1, 0.0), 3.0));
    }

    #[test]
    fn test_circle_rect_corner() {
        let half = Vec2::new(10.0, 10.0);
        // Circle near the corner: nearest point is the corner itself
        let corner = Vec2::new(10.0, 10.0);
        let center = corner + Vec2::splat(2.0);
        assert!(circle_rect_overlap(center, 3.0, Vec2::ZERO, half));
        assert!(!circle_rect_overlap(corner + Vec2::splat(3.0), 2.0, Vec2::ZERO, half));
    }

    #[test]
    fn test_rect_rect_interval_overlap() {
        let half = Vec2::new(26.0, 230.0);
        assert!(rects_overlap(Vec2::ZERO, half, Vec2::new(50.0, 0.0), half));
        assert!(!rects_overlap(Vec2::ZERO, half, Vec2::new(53.0, 0.0), half));
        // Overlapping in x but not in y
        assert!(!rects_overlap(
            Vec2::ZERO,
            half,
            Vec2::new(0.0, 461.0),
            half
        ));
    }

    fn pipe_at(x: f32, y: f32, height: f32) -> Node {
        Node::body(Body::kinematic(
            Shape::rect(52.0, height).unwrap(),
            LAYER_OBSTACLE,
            LAYER_PLAYER,
        ))
        .at(Vec2::new(x, y))
    }

    #[test]
    fn test_one_event_per_dynamic_body_per_tick() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let player = tree
            .insert(
                root,
                "Player",
                Node::body(Body::dynamic(
                    Shape::circle(12.0).unwrap(),
                    LAYER_PLAYER,
                    LAYER_OBSTACLE,
                ))
                .at(Vec2::new(40.0, 480.0)),
            )
            .unwrap();
        // Two pipes both overlapping the player
        let first = tree.insert(root, "TopPipe", pipe_at(40.0, 480.0, 100.0)).unwrap();
        tree.insert(root, "BottomPipe", pipe_at(45.0, 480.0, 100.0))
            .unwrap();

        let collisions = detect_collisions(&tree);
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].body, player);
        // Deterministic tie-break: first overlap in traversal order
        assert_eq!(collisions[0].other, first);
    }

    #[test]
    fn test_mask_filtering() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        // Player whose mask does not include the obstacle layer
        tree.insert(
            root,
            "Player",
            Node::body(Body::dynamic(
                Shape::circle(12.0).unwrap(),
                LAYER_PLAYER,
                0,
            ))
            .at(Vec2::new(40.0, 480.0)),
        )
        .unwrap();
        tree.insert(root, "TopPipe", pipe_at(40.0, 480.0, 100.0)).unwrap();
        assert!(detect_collisions(&tree).is_empty());
    }

    #[test]
    fn test_kinematic_bodies_do_not_initiate() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        // Two overlapping kinematic pipes: nobody initiates
        tree.insert(root, "TopPipe", pipe_at(40.0, 480.0, 100.0)).unwrap();
        tree.insert(root, "BottomPipe", pipe_at(40.0, 480.0, 100.0))
            .unwrap();
        assert!(detect_collisions(&tree).is_empty());
    }
}
