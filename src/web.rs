//! Browser binding
//!
//! Owns a [`CombatSession`] and drives it from `requestAnimationFrame` deltas
//! with a fixed-step accumulator. The page renders from `snapshot_json` and
//! plays effects from `drain_events_json`.

use wasm_bindgen::prelude::*;

use crate::consts::{MAX_SUBSTEPS, SIM_DT, WORLD_WIDTH};
use crate::highscores;
use crate::platform::{CombinedInput, KeyboardState, TouchState, VirtualButtons};
use crate::settings::Settings;
use crate::sim::{CombatSession, GamePhase, TickInput};

#[wasm_bindgen]
pub struct WebSession {
    session: CombatSession,
    keyboard: KeyboardState,
    touch: TouchState,
    buttons: VirtualButtons,
    /// One-shot commands, cleared after the first substep that sees them
    pending: TickInput,
    accumulator: f32,
}

#[wasm_bindgen]
impl WebSession {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WebSession {
        let settings = Settings::load();
        let touch = TouchState::new(WORLD_WIDTH);
        WebSession {
            session: CombatSession::new(settings, highscores::load_local(), seed),
            keyboard: KeyboardState::default(),
            touch,
            buttons: VirtualButtons::default(),
            pending: TickInput::default(),
            accumulator: 0.0,
        }
    }

    /// Advance by a frame delta in milliseconds
    pub fn update(&mut self, dt_ms: f32) {
        let dt = (dt_ms / 1000.0).min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let held = {
                let mut sources = CombinedInput::new().with(&self.keyboard);
                if self.session.settings().touch_controls {
                    sources = sources.with(&self.touch).with(&self.buttons);
                }
                TickInput::from_source(&sources)
            };
            let input = TickInput {
                pause: self.pending.pause,
                continue_game: self.pending.continue_game,
                skip_wave: self.pending.skip_wave,
                ..held
            };
            self.session.tick(&input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            self.pending = TickInput::default();
        }

        // Drop backlog rather than spiral
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
    }

    pub fn key_down(&mut self, code: &str) {
        match code {
            "Escape" | "KeyP" => self.pending.pause = true,
            "Enter" => self.pending.continue_game = true,
            _ => self.keyboard.key_down(code),
        }
    }

    pub fn key_up(&mut self, code: &str) {
        self.keyboard.key_up(code);
    }

    /// Touch or mouse press at canvas x, in world units
    pub fn pointer_down(&mut self, x: f32) {
        self.touch.pointer_down(x);
    }

    pub fn pointer_up(&mut self) {
        self.touch.pointer_up();
    }

    pub fn set_button_left(&mut self, held: bool) {
        self.buttons.left = held;
    }

    pub fn set_button_right(&mut self, held: bool) {
        self.buttons.right = held;
    }

    /// Tab hidden or window blurred
    pub fn auto_pause(&mut self) {
        self.keyboard.release_all();
        self.touch.pointer_up();
        if self.session.phase() == GamePhase::Playing {
            self.session.toggle_pause();
            log::info!("Auto-paused");
        }
    }

    pub fn toggle_pause(&mut self) {
        self.session.toggle_pause();
    }

    pub fn continue_game(&mut self) -> bool {
        self.session.continue_after_victory()
    }

    pub fn restart(&mut self) {
        self.accumulator = 0.0;
        self.pending = TickInput::default();
        self.session.restart();
    }

    pub fn score(&self) -> u64 {
        self.session.score()
    }

    pub fn high_score(&self) -> u64 {
        self.session.high_score()
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.session.snapshot()).unwrap_or_else(|err| {
            log::error!("Failed to serialize snapshot: {}", err);
            String::from("{}")
        })
    }

    pub fn drain_events_json(&mut self) -> String {
        let events = self.session.drain_events();
        serde_json::to_string(&events).unwrap_or_else(|err| {
            log::error!("Failed to serialize events: {}", err);
            String::from("[]")
        })
    }
}
