//! Deterministic gameplay simulation
//!
//! All gameplay logic lives here. The module is pure and deterministic:
//! driver-supplied dt, seeded RNG, stable traversal order, no rendering or
//! platform dependencies.

pub mod body;
pub mod collision;
pub mod spawner;
pub mod state;
pub mod tick;

pub use body::{Body, BodyKind, Shape, integrate_bodies};
pub use collision::{Collision, detect_collisions, shapes_overlap};
pub use spawner::{SpawnOutcome, choose_gap_center, cull_pipes, spawn_pair, spawn_pair_with_center};
pub use state::{CODENAMES, GameEvent, GamePhase, Session, SoundEffect, random_codename};
pub use tick::{SceneRefs, TickInput, World, tick};
