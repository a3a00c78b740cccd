//! Pipe pair generation and off-screen culling
//!
//! A pair shares one spawn event, one gap and one x-origin; after creation
//! the two pipes are independent nodes, culled separately once fully past
//! the left viewport edge. Pipe nodes carry a sequence number in the name
//! ("TopPipe7") so sibling names stay unique; the culling pass matches on
//! the "Pipe" substring, not the exact name.

use glam::Vec2;
use rand::Rng;

use super::body::{Body, Shape};
use super::state::{GameEvent, Session, SoundEffect};
use crate::consts::*;
use crate::error::SceneError;
use crate::scene::{Node, NodeId, SceneTree};

/// Which pipes a spawn event actually produced
#[derive(Debug, Clone, Copy)]
pub struct SpawnOutcome {
    pub top: Option<NodeId>,
    pub bottom: Option<NodeId>,
    pub gap_center: f32,
}

/// Uniform gap center leaving at least `SAFE_MARGIN` clearance from both
/// viewport edges (both pipes, if created, stay fully on screen).
pub fn choose_gap_center<R: Rng>(rng: &mut R, viewport_height: f32) -> f32 {
    let min_center = SAFE_MARGIN + PIPE_GAP / 2.0;
    let max_center = viewport_height - SAFE_MARGIN - PIPE_GAP / 2.0;
    rng.random_range(min_center..=max_center)
}

/// Insert a top/bottom kinematic pipe pair for the given gap center.
///
/// A side whose computed height is not positive is skipped, which is what
/// keeps `Shape::rect` from ever seeing a degenerate extent here. `seq`
/// disambiguates sibling names across spawns.
pub fn spawn_pair_at(
    tree: &mut SceneTree,
    parent: NodeId,
    gap_center: f32,
    viewport: Vec2,
    seq: u32,
) -> Result<SpawnOutcome, SceneError> {
    let spawn_x = viewport.x + PIPE_WIDTH / 2.0;
    let gap_top = gap_center - PIPE_GAP / 2.0;
    let gap_bottom = gap_center + PIPE_GAP / 2.0;

    let mut outcome = SpawnOutcome {
        top: None,
        bottom: None,
        gap_center,
    };

    if gap_top > 0.0 {
        let shape = Shape::rect(PIPE_WIDTH, gap_top)?;
        let mut body = Body::kinematic(shape, LAYER_OBSTACLE, LAYER_PLAYER);
        body.velocity = Vec2::new(-PIPE_SPEED, 0.0);
        let node = Node::body(body).at(Vec2::new(spawn_x, gap_top / 2.0));
        outcome.top = Some(tree.insert(parent, format!("TopPipe{seq}"), node)?);
    }

    let bottom_height = viewport.y - gap_bottom;
    if bottom_height > 0.0 {
        let shape = Shape::rect(PIPE_WIDTH, bottom_height)?;
        let mut body = Body::kinematic(shape, LAYER_OBSTACLE, LAYER_PLAYER);
        body.velocity = Vec2::new(-PIPE_SPEED, 0.0);
        let node = Node::body(body).at(Vec2::new(spawn_x, gap_bottom + bottom_height / 2.0));
        outcome.bottom = Some(tree.insert(parent, format!("BottomPipe{seq}"), node)?);
    }

    log::debug!(
        "spawned pipe pair #{seq}: gap_center {gap_center:.1}, top {:?}, bottom {:?}",
        outcome.top.is_some(),
        outcome.bottom.is_some()
    );
    Ok(outcome)
}

/// Spawn a pair at a caller-chosen gap center, scoring as a side effect.
///
/// Scoring happens at spawn time, not at pass-through: the score counts
/// pairs released, not pairs cleared.
pub fn spawn_pair_with_center(
    tree: &mut SceneTree,
    parent: NodeId,
    session: &mut Session,
    gap_center: f32,
    viewport: Vec2,
) -> Result<SpawnOutcome, SceneError> {
    let outcome = spawn_pair_at(tree, parent, gap_center, viewport, session.score)?;
    session.score += 1;
    session.push_event(GameEvent::Sound(SoundEffect::Point));
    Ok(outcome)
}

/// Spawn a pair with a randomized gap center
pub fn spawn_pair<R: Rng>(
    tree: &mut SceneTree,
    parent: NodeId,
    session: &mut Session,
    rng: &mut R,
    viewport: Vec2,
) -> Result<SpawnOutcome, SceneError> {
    let gap_center = choose_gap_center(rng, viewport.y);
    spawn_pair_with_center(tree, parent, session, gap_center, viewport)
}

/// Per-tick obstacle pass: reassert the leftward scroll velocity on every
/// pipe body and mark the ones fully past the left edge for removal.
/// Returns how many pipes were marked.
pub fn cull_pipes(tree: &mut SceneTree) -> usize {
    let mut marked = Vec::new();
    for (name, id) in tree.iter() {
        if !name.contains("Pipe") {
            continue;
        }
        let Some(position) = tree.world_position(id) else {
            continue;
        };
        if let Some(body) = tree.get(id).and_then(|node| node.body_facet()) {
            let half_width = body.shape.half_extents().x;
            if position.x + half_width < 0.0 {
                marked.push(id);
            }
        }
    }

    for id in tree.live_ids() {
        let Some(node) = tree.get_mut(id) else {
            continue;
        };
        if !node.name().contains("Pipe") {
            continue;
        }
        if let Some(body) = node.body_facet_mut() {
            body.velocity = Vec2::new(-PIPE_SPEED, 0.0);
        }
    }

    let count = marked.len();
    for id in marked {
        log::debug!("culling off-screen pipe");
        tree.mark_for_removal(id);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const VIEWPORT: Vec2 = Vec2::new(540.0, 960.0);

    #[test]
    fn test_forced_gap_center_geometry_and_score() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let mut session = Session::new();

        let outcome =
            spawn_pair_with_center(&mut tree, root, &mut session, 500.0, VIEWPORT).unwrap();

        // gap_top 460, gap_bottom 540
        let top = tree.get(outcome.top.unwrap()).unwrap();
        assert_eq!(
            top.body_facet().unwrap().shape,
            Shape::rect(52.0, 460.0).unwrap()
        );
        assert_eq!(top.transform.position, Vec2::new(566.0, 230.0));

        let bottom = tree.get(outcome.bottom.unwrap()).unwrap();
        assert_eq!(
            bottom.body_facet().unwrap().shape,
            Shape::rect(52.0, 420.0).unwrap()
        );
        assert_eq!(bottom.transform.position, Vec2::new(566.0, 750.0));

        assert_eq!(session.score, 1);
        let events = session.drain_events();
        assert_eq!(events, vec![GameEvent::Sound(SoundEffect::Point)]);
    }

    #[test]
    fn test_degenerate_sides_are_skipped() {
        let mut tree = SceneTree::new();
        let root = tree.root();

        // Gap hugging the top edge: no top pipe
        let outcome = spawn_pair_at(&mut tree, root, 30.0, VIEWPORT, 0).unwrap();
        assert!(outcome.top.is_none());
        assert!(outcome.bottom.is_some());

        // Gap hugging the bottom edge: no bottom pipe
        let outcome = spawn_pair_at(&mut tree, root, 930.0, VIEWPORT, 1).unwrap();
        assert!(outcome.top.is_some());
        assert!(outcome.bottom.is_none());
    }

    #[test]
    fn test_pair_complete_when_gap_fits() {
        // gap (80) <= height - 2*margin, and the center stays in bounds, so
        // both sides must be created for any legal draw
        let mut tree = SceneTree::new();
        let root = tree.root();
        let mut rng = Pcg32::seed_from_u64(7);
        for seq in 0..50 {
            let center = choose_gap_center(&mut rng, VIEWPORT.y);
            let outcome = spawn_pair_at(&mut tree, root, center, VIEWPORT, seq).unwrap();
            assert!(outcome.top.is_some() && outcome.bottom.is_some());
        }
    }

    #[test]
    fn test_sequenced_names_do_not_clash() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let mut session = Session::new();
        for _ in 0..3 {
            spawn_pair_with_center(&mut tree, root, &mut session, 480.0, VIEWPORT).unwrap();
        }
        // 1 root + 3 pairs
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_cull_marks_only_fully_offscreen() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let mut session = Session::new();
        let outcome =
            spawn_pair_with_center(&mut tree, root, &mut session, 480.0, VIEWPORT).unwrap();
        let top = outcome.top.unwrap();

        // Still half visible: x + width/2 == 0 is not yet past the edge
        tree.get_mut(top).unwrap().transform.position.x = -PIPE_WIDTH / 2.0;
        assert_eq!(cull_pipes(&mut tree), 0);

        tree.get_mut(top).unwrap().transform.position.x = -PIPE_WIDTH / 2.0 - 0.1;
        assert_eq!(cull_pipes(&mut tree), 1);

        tree.sweep();
        assert!(tree.get(top).is_none());
        // Bottom pipe untouched
        assert!(tree.get(outcome.bottom.unwrap()).is_some());
    }

    #[test]
    fn test_cull_reasserts_scroll_velocity() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let mut session = Session::new();
        let outcome =
            spawn_pair_with_center(&mut tree, root, &mut session, 480.0, VIEWPORT).unwrap();
        let top = outcome.top.unwrap();

        tree.get_mut(top)
            .unwrap()
            .body_facet_mut()
            .unwrap()
            .velocity = Vec2::ZERO;
        cull_pipes(&mut tree);
        assert_eq!(
            tree.get(top).unwrap().body_facet().unwrap().velocity,
            Vec2::new(-PIPE_SPEED, 0.0)
        );
    }

    proptest! {
        /// Gap placement bound: margin clearance holds for every seed
        #[test]
        fn prop_gap_center_within_margins(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let gap_center = choose_gap_center(&mut rng, VIEWPORT.y);
            prop_assert!(gap_center - PIPE_GAP / 2.0 >= SAFE_MARGIN);
            prop_assert!(gap_center + PIPE_GAP / 2.0 <= VIEWPORT.y - SAFE_MARGIN);
        }
    }
}
