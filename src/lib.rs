//! Star Invaders - A wave-based space shooter
//!
//! Core modules:
//! - `sim`: Deterministic combat simulation (waves, targeting, collisions, score)
//! - `platform`: Input capability interface and platform adapters
//! - `persistence`: Key/value storage for the high score
//! - `settings`: Data-driven game balance

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::{HighScoreStore, MemoryHighScore, StoredHighScore};
pub use settings::{Settings, ShootingMode};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions (origin top-left, y down)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Hit box sizes (width, height)
    pub const PLAYER_SIZE: (f32, f32) = (40.0, 40.0);
    pub const ENEMY_SIZE: (f32, f32) = (30.0, 30.0);
    pub const BULLET_SIZE: (f32, f32) = (6.0, 15.0);

    /// Player
    pub const PLAYER_SPEED: f32 = 250.0;
    pub const PLAYER_INITIAL_X: f32 = 400.0;
    pub const PLAYER_INITIAL_Y: f32 = 550.0;
    pub const PLAYER_BULLET_SPEED: f32 = 400.0;
    pub const SHOOT_COOLDOWN_MS: f32 = 250.0;
    /// Touch devices auto-fire, so they get a tighter cooldown
    pub const MOBILE_SHOOT_COOLDOWN_MS: f32 = 150.0;
    /// Bullets spawn this far above/below the shooter
    pub const MUZZLE_OFFSET: f32 = 10.0;

    /// Enemies
    pub const ENEMY_SPEED_MIN: i32 = -50;
    pub const ENEMY_SPEED_MAX: i32 = 50;
    pub const ENEMY_BULLET_SPEED: f32 = 200.0;
    pub const BASE_FIRE_INTERVAL_MS: f32 = 1000.0;

    /// Formation
    pub const SPAWN_ROWS: u32 = 3;
    pub const SPAWN_COLS: u32 = 5;
    pub const SPAWN_SPACING_X: f32 = 80.0;
    pub const SPAWN_SPACING_Y: f32 = 60.0;
    pub const SPAWN_START_X: f32 = 100.0;
    pub const SPAWN_START_Y: f32 = 50.0;

    /// Rules
    pub const INITIAL_LIVES: u32 = 3;
    pub const POINTS_PER_ENEMY: u64 = 10;

    /// Waves
    pub const MAX_WAVE: u32 = 5;
    pub const FIRE_RATE_MULTIPLIER: f32 = 0.85;
    pub const MIN_FIRE_INTERVAL_MS: f32 = 400.0;
    pub const WAVE_TRANSITION_DELAY_MS: f32 = 2000.0;

    /// Aimed shooting
    pub const AIMED_START_WAVE: u32 = 2;
    pub const AIMED_BASE_PROBABILITY: f32 = 0.3;
    pub const AIMED_PROBABILITY_INCREMENT: f32 = 0.15;
    /// Hard cap; the remaining 5% of shots always go straight down
    pub const AIMED_MAX_PROBABILITY: f32 = 0.95;
    pub const AIMED_PREDICTION_FACTOR: f32 = 0.8;
    pub const AIMED_ACCURACY: f32 = 0.8;
    pub const AIMED_WARNING_DURATION_MS: f32 = 500.0;

    /// Effects
    pub const BLINK_DURATION_MS: f32 = 80.0;
    pub const BLINK_REPEAT: u32 = 3;
    pub const HIT_BLINK_DURATION_MS: f32 = 500.0;
    pub const RESPAWN_FLASH_MS: f32 = 100.0;
    pub const INVINCIBLE_DURATION_MS: f32 = 500.0;
    pub const HIT_TEXT_DURATION_MS: f32 = 1000.0;
}

/// Axis-aligned box overlap test for centre-positioned sprites
#[inline]
pub fn boxes_overlap(a_pos: Vec2, a_size: (f32, f32), b_pos: Vec2, b_size: (f32, f32)) -> bool {
    let dx = (a_pos.x - b_pos.x).abs();
    let dy = (a_pos.y - b_pos.y).abs();
    dx * 2.0 < a_size.0 + b_size.0 && dy * 2.0 < a_size.1 + b_size.1
}

/// Seconds to simulation milliseconds
#[inline]
pub fn secs_to_ms(secs: f32) -> f64 {
    secs as f64 * 1000.0
}
