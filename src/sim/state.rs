//! Session state, phase machine and game events
//!
//! The session is an explicit value threaded through the orchestrator
//! every tick; there is no process-wide game context. Events are the only
//! channel out of the simulation (sounds, share requests), drained by the
//! driver after each tick.

use rand::Rng;

use crate::services::ShareRecord;

/// The four-state gameplay machine.
///
/// `Ready` steps physics exactly like `Playing` with score 0; the first
/// jump input promotes it. `GameOver` has one modeled exit: `restart`
/// back to `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Ready,
    Playing,
    Paused,
    GameOver,
}

/// Sounds the external audio sink can play; fire-and-forget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Jump flap
    Wing,
    /// Score increment (at pipe spawn)
    Point,
    /// Player hit an obstacle
    Hit,
}

/// Events emitted by the simulation for external collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(SoundEffect),
    PhaseChanged(GamePhase),
    /// Score sharing requested; the record is captured by value and may be
    /// serialized/POSTed on any thread without touching the tree
    ShareRequested(ShareRecord),
}

/// Per-session gameplay state
#[derive(Debug, Clone)]
pub struct Session {
    pub phase: GamePhase,
    /// Monotone while playing; incremented at spawn time
    pub score: u32,
    /// Spawn accumulator; reset to zero on every spawn (no drift carry)
    pub time_since_last_pipe: f32,
    /// Phase to return to when unpausing
    resume_phase: GamePhase,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Ready,
            score: 0,
            time_since_last_pipe: 0.0,
            resume_phase: GamePhase::Ready,
            events: Vec::new(),
        }
    }

    /// Whether the simulation advances this tick
    pub fn is_stepping(&self) -> bool {
        matches!(self.phase, GamePhase::Ready | GamePhase::Playing)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the accumulated events to the driver
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// First jump input promotes the waiting session
    pub fn begin_playing(&mut self) {
        if self.phase == GamePhase::Ready {
            self.phase = GamePhase::Playing;
            self.events.push(GameEvent::PhaseChanged(self.phase));
        }
    }

    /// Toggle pause. Forbidden while game over; returns whether the phase
    /// changed. Pausing freezes the session (no integration, no spawn
    /// accumulation, no culling) until toggled back.
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::GameOver => false,
            GamePhase::Paused => {
                self.phase = self.resume_phase;
                log::info!("resumed");
                self.events.push(GameEvent::PhaseChanged(self.phase));
                true
            }
            phase => {
                self.resume_phase = phase;
                self.phase = GamePhase::Paused;
                log::info!("paused");
                self.events.push(GameEvent::PhaseChanged(self.phase));
                true
            }
        }
    }

    /// Enter the terminal phase. Idempotent: only the first call reports a
    /// fresh transition, so a stray duplicate collision cannot re-trigger
    /// game-over side effects.
    pub fn game_over(&mut self) -> bool {
        if self.phase == GamePhase::GameOver {
            return false;
        }
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::PhaseChanged(self.phase));
        true
    }

    /// Leave `GameOver` for a fresh round: score, timer and phase reset.
    /// The orchestrator resets the tree side (pipes, player).
    pub fn restart(&mut self) {
        self.phase = GamePhase::Ready;
        self.resume_phase = GamePhase::Ready;
        self.score = 0;
        self.time_since_last_pipe = 0.0;
        self.events.push(GameEvent::PhaseChanged(self.phase));
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Player codenames, NATO alphabet
pub const CODENAMES: [&str; 26] = [
    "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India", "Juliett",
    "Kilo", "Lima", "Mike", "November", "Oscar", "Papa", "Quebec", "Romeo", "Sierra", "Tango",
    "Uniform", "Victor", "Whiskey", "X-ray", "Yankee", "Zulu",
];

pub fn random_codename<R: Rng>(rng: &mut R) -> &'static str {
    CODENAMES[rng.random_range(0..CODENAMES.len())]
}
