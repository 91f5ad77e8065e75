//! Star Invaders entry point
//!
//! On the web this only installs logging; the page drives `WebSession`.
//! Natively it runs a short scripted headless session and logs what happens.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to init logger: {err}").into());
    }
    log::info!("Star Invaders (web) ready");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use star_invaders::consts::SIM_DT;
    use star_invaders::sim::{CombatSession, GameEvent, GamePhase, TickInput};
    use star_invaders::{Settings, StoredHighScore};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Star Invaders (native) starting headless demo...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    let mut session = CombatSession::new(Settings::default(), Box::new(StoredHighScore::in_memory()), seed);

    // Sweep left and right while holding fire, for at most two minutes of game time
    let max_ticks = (120.0 / SIM_DT) as u64;
    for tick in 0..max_ticks {
        let sweep_right = (tick / 240) % 2 == 0;
        let input = TickInput {
            left: !sweep_right,
            right: sweep_right,
            shoot: true,
            ..Default::default()
        };
        session.tick(&input, SIM_DT);

        for event in session.drain_events() {
            match event {
                GameEvent::WaveAnnouncement { .. }
                | GameEvent::PlayerHit { .. }
                | GameEvent::NewHighScore { .. }
                | GameEvent::Victory { .. }
                | GameEvent::GameOver { .. } => log::info!("{:?}", event),
                other => log::debug!("{:?}", other),
            }
        }

        if matches!(session.phase(), GamePhase::GameOver | GamePhase::Victory) {
            break;
        }
    }

    log::info!(
        "Finished at wave {} with score {} ({} lives left, high score {})",
        session.wave(),
        session.score(),
        session.lives(),
        session.high_score()
    );
}
