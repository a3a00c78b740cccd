//! Frame orchestrator
//!
//! `tick` is the single per-frame driver. Fixed in-tick order: input →
//! state machine → spawn accumulation → pipe velocity/cull marking →
//! physics integration and collision → tree sweep → ready/process. The
//! driver then takes the draw list and drains events; the tree has exactly
//! one writer, this function.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::body::{Body, Shape, integrate_bodies};
use super::collision::detect_collisions;
use super::spawner::{cull_pipes, spawn_pair};
use super::state::{GameEvent, GamePhase, Session, SoundEffect, random_codename};
use crate::consts::*;
use crate::error::SceneError;
use crate::scene::{Facet, Node, NodeId, SceneTree};
use crate::services::{DrawCommand, DrawList, ShareRecord};

/// Input commands for a single tick.
///
/// The device-polling layer is an external collaborator; it reduces raw
/// events to these discrete commands, with pointer positions already in
/// world space.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Flap (space key); also promotes a waiting session to Playing
    pub jump: bool,
    /// Pause toggle (escape key)
    pub toggle_pause: bool,
    /// Pointer-down position in world space, if any
    pub pointer: Option<Vec2>,
}

/// Non-owning handles into the tree for the entities the orchestrator
/// addresses directly. The tree remains the sole owner.
#[derive(Debug, Clone, Copy)]
pub struct SceneRefs {
    pub player: NodeId,
    pub name_label: NodeId,
    pub center_label: NodeId,
    pub pause_button: NodeId,
    pub share_button: NodeId,
    pub start_button: NodeId,
}

/// Everything one game session owns: tree, session state, handles, RNG
pub struct World {
    pub tree: SceneTree,
    pub session: Session,
    pub refs: SceneRefs,
    pub viewport: Vec2,
    rng: Pcg32,
}

impl World {
    /// Build the initial scene: background, player, HUD labels, buttons.
    pub fn new(seed: u64) -> Result<Self, SceneError> {
        let viewport = Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut tree = SceneTree::new();
        let root = tree.root();

        tree.insert(
            root,
            "Background",
            Node::sprite("background-day", viewport)
                .at(viewport * 0.5)
                .with_z(-1),
        )?;

        let player_body = Body::dynamic(Shape::circle(PLAYER_RADIUS)?, LAYER_PLAYER, LAYER_OBSTACLE);
        let player = tree.insert(
            root,
            "Player",
            Node::body(player_body).at(Vec2::new(PLAYER_X, viewport.y / 2.0)),
        )?;
        tree.insert(
            player,
            "Sprite",
            Node::sprite("yellowbird-midflap", Vec2::new(34.0, 24.0)),
        )?;

        let name_label = tree.insert(
            root,
            "PlayerName",
            Node::label("mine", random_codename(&mut rng))
                .at(Vec2::new(10.0, 10.0))
                .with_z(1001),
        )?;
        let center_label = tree.insert(
            root,
            "CenterLabel",
            Node::label("mine", "")
                .at(Vec2::new(50.0, viewport.y / 2.0))
                .with_z(1001)
                .hidden(),
        )?;

        let pause_button = tree.insert(
            root,
            "PauseButton",
            Node::button("pause", Vec2::new(30.0, 30.0))
                .at(Vec2::new(viewport.x - 30.0, 15.0))
                .with_z(1001),
        )?;
        let share_button = tree.insert(
            root,
            "ShareButton",
            Node::button("share", Vec2::new(80.0, 28.0))
                .at(Vec2::new(45.0, viewport.y / 2.0 + 50.0))
                .with_z(1001)
                .hidden(),
        )?;
        let start_button = tree.insert(
            root,
            "StartButton",
            Node::button("start", Vec2::new(80.0, 28.0))
                .at(Vec2::new(135.0, viewport.y / 2.0 + 50.0))
                .with_z(1001)
                .hidden(),
        )?;

        Ok(Self {
            tree,
            session: Session::new(),
            refs: SceneRefs {
                player,
                name_label,
                center_label,
                pause_button,
                share_button,
                start_button,
            },
            viewport,
            rng,
        })
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    /// Player codename shown on the HUD
    pub fn player_name(&self) -> &str {
        match self.tree.get(self.refs.name_label).map(|n| &n.facet) {
            Some(Facet::Label { text, .. }) => text,
            _ => "",
        }
    }

    /// Launch the player upward. Replaces the velocity outright; sound and
    /// any other feedback ride the event channel.
    pub fn player_jump(&mut self) {
        self.session.begin_playing();
        if let Some(body) = self
            .tree
            .get_mut(self.refs.player)
            .and_then(|node| node.body_facet_mut())
        {
            body.apply_impulse(Vec2::new(0.0, -JUMP_FORCE));
            self.session.push_event(GameEvent::Sound(SoundEffect::Wing));
        } else {
            debug_assert!(false, "player body missing");
            log::warn!("player_jump: player body missing");
        }
    }

    /// Toggle pause and update the HUD (indicator label, button texture)
    pub fn toggle_pause(&mut self) {
        if !self.session.toggle_pause() {
            return;
        }
        let paused = self.session.phase == GamePhase::Paused;
        self.set_label(self.refs.center_label, if paused { "PAUSED" } else { "" }, paused);
        self.set_button_texture(self.refs.pause_button, if paused { "resume" } else { "pause" });
    }

    /// Emit a share request carrying the session data by value
    pub fn share_score(&mut self) {
        let record = ShareRecord::new(self.player_name(), self.session.score);
        log::info!(
            "sharing score: codename {}, score {}, platform {}",
            record.name,
            record.score,
            record.platform
        );
        self.session.push_event(GameEvent::ShareRequested(record));
    }

    /// `GameOver → Ready`: clear pipes, recenter the player, reset the
    /// session and re-hide the result UI. Pipes are only marked here; the
    /// tick's sweep frees them.
    pub fn restart(&mut self) {
        if self.session.phase != GamePhase::GameOver {
            return;
        }
        log::info!("restarting after game over");

        let pipes: Vec<NodeId> = self
            .tree
            .iter()
            .filter(|(name, _)| name.contains("Pipe"))
            .map(|(_, id)| id)
            .collect();
        for pipe in pipes {
            self.tree.mark_for_removal(pipe);
        }

        let start = Vec2::new(PLAYER_X, self.viewport.y / 2.0);
        if let Some(node) = self.tree.get_mut(self.refs.player) {
            node.set_position(start);
            if let Some(body) = node.body_facet_mut() {
                body.velocity = Vec2::ZERO;
            }
        }

        self.session.restart();
        self.set_label(self.refs.center_label, "", false);
        self.set_visible(self.refs.share_button, false);
        self.set_visible(self.refs.start_button, false);
    }

    /// Per-tick draw list for the external renderer, z-sorted
    pub fn draw(&self) -> Vec<DrawCommand> {
        let mut list = DrawList::new();
        self.tree.draw(&mut list);
        list.sorted()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session.drain_events()
    }

    fn enter_game_over(&mut self, other_name: &str) {
        if !self.session.game_over() {
            return;
        }
        log::info!("collided with {other_name}, game over at score {}", self.session.score);
        self.session.push_event(GameEvent::Sound(SoundEffect::Hit));
        let text = format!("GAME OVER\n  Score: {}", self.session.score);
        self.set_label(self.refs.center_label, &text, true);
        self.set_visible(self.refs.share_button, true);
        self.set_visible(self.refs.start_button, true);
    }

    fn set_label(&mut self, id: NodeId, text: &str, visible: bool) {
        if let Some(node) = self.tree.get_mut(id) {
            node.visible = visible;
            if let Some(current) = node.label_text_mut() {
                current.clear();
                current.push_str(text);
            }
        }
    }

    fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.tree.get_mut(id) {
            node.set_visible(visible);
        }
    }

    fn set_button_texture(&mut self, id: NodeId, texture: &str) {
        if let Some(node) = self.tree.get_mut(id)
            && let Facet::Button { texture: current, .. } = &mut node.facet
        {
            *current = texture.to_string();
        }
    }
}

/// Advance the world by one frame
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    debug_assert!(dt >= 0.0 && dt.is_finite(), "dt must be non-negative and finite");

    // Input → state machine
    if let Some(pointer) = input.pointer {
        let hits = world.tree.hit_buttons(pointer);
        let over = world.session.phase == GamePhase::GameOver;
        if hits.contains(&world.refs.pause_button) {
            world.toggle_pause();
        } else if over && hits.contains(&world.refs.share_button) {
            world.share_score();
        } else if over && hits.contains(&world.refs.start_button) {
            world.restart();
        } else if world.session.is_stepping() {
            world.player_jump();
        }
    }
    if input.jump && world.session.is_stepping() {
        world.player_jump();
    }
    if input.toggle_pause {
        world.toggle_pause();
    }

    // Frozen phases skip everything between input and the sweep
    if world.session.is_stepping() {
        // Spawn cadence; drift policy is reset-to-zero
        world.session.time_since_last_pipe += dt;
        if world.session.time_since_last_pipe >= PIPE_INTERVAL {
            world.session.time_since_last_pipe = 0.0;
            let root = world.tree.root();
            let viewport = world.viewport;
            if let Err(err) = spawn_pair(
                &mut world.tree,
                root,
                &mut world.session,
                &mut world.rng,
                viewport,
            ) {
                debug_assert!(false, "spawn_pair failed: {err}");
                log::warn!("spawn_pair failed, skipping this spawn: {err}");
            }
        }

        cull_pipes(&mut world.tree);
        integrate_bodies(&mut world.tree, dt);

        // Collision checks run ahead of the sweep, so a collision-triggered
        // removal is finalized at the next sweep, never mid-detection.
        for collision in detect_collisions(&world.tree) {
            if collision.body == world.refs.player {
                let other = world
                    .tree
                    .get(collision.other)
                    .map(|node| node.name().to_string())
                    .unwrap_or_default();
                world.enter_game_over(&other);
                break;
            }
        }
    }

    world.tree.sweep();
    world.tree.ready();
    world.tree.process(dt);
}
