//! Pimba entry point
//!
//! Headless demo driver: runs a scripted session against the simulation
//! core and logs what a real frontend would render, play and share. The
//! actual renderer/audio/input backends are external collaborators.

use pimba::sim::{GameEvent, GamePhase, TickInput, World, tick};

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(0xF1A9);

    if let Err(err) = run(seed) {
        log::error!("failed to start: {err}");
        std::process::exit(1);
    }
}

fn run(seed: u64) -> Result<(), pimba::SceneError> {
    let mut world = World::new(seed)?;
    log::info!("Pimba starting, seed {seed}, codename {}", world.player_name());

    // Open paused, as a frontend waiting on a start screen would
    world.toggle_pause();

    let dt = 1.0 / 60.0;
    let mut sounds = 0usize;
    for frame in 0u32..60 * 60 {
        let mut input = TickInput::default();
        if frame == 30 {
            // Unpause and start flapping
            input.toggle_pause = true;
        }
        // Scripted flap cadence keeps the bird airborne for a while
        if frame > 30 && frame % 20 == 0 {
            input.jump = true;
        }

        tick(&mut world, &input, dt);

        for event in world.drain_events() {
            match event {
                GameEvent::Sound(effect) => {
                    sounds += 1;
                    log::debug!("sound: {effect:?}");
                }
                GameEvent::PhaseChanged(phase) => log::info!("phase: {phase:?}"),
                GameEvent::ShareRequested(record) => match record.to_json() {
                    Ok(json) => log::info!("share payload:\n{json}"),
                    Err(err) => log::warn!("share payload serialization failed: {err}"),
                },
            }
        }

        if world.session.phase == GamePhase::GameOver {
            world.share_score();
            for event in world.drain_events() {
                if let GameEvent::ShareRequested(record) = event {
                    println!("{}", record.share_text());
                }
            }
            break;
        }
    }

    let draw_commands = world.draw();
    println!(
        "final score {}, {} draw commands, {} sounds played",
        world.score(),
        draw_commands.len(),
        sounds
    );
    Ok(())
}
