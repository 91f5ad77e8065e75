//! Player ship and its hit/respawn state machine
//!
//! ```text
//! Normal --hit--> Hit --blink--> Respawning --flash--> Invincible --timeout--> Normal
//! ```
//!
//! Every state except `Normal` is invincible. One timer drives each
//! transition; the session owns the scheduler and stores the handle here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::targeting::PlayerSnapshot;
use super::timers::TimerHandle;
use crate::consts::{MUZZLE_OFFSET, PLAYER_SIZE, WORLD_WIDTH};
use crate::settings::{EffectSettings, PlayerSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCondition {
    Normal,
    /// Just lost a life, blinking in place, no control
    Hit,
    /// Back at the spawn point, no control yet
    Respawning,
    /// Controllable but can't be hurt
    Invincible,
}

/// Result of a hit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Already invincible, nothing happened
    Ignored,
    /// Lost a life, still in the game
    Damaged { lives: u32 },
    /// Lost the last life
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub lives: u32,
    pub condition: PlayerCondition,
    spawn: Vec2,
    last_shot_ms: Option<f64>,
    #[serde(skip)]
    condition_timer: Option<TimerHandle>,
}

impl Player {
    pub fn new(settings: &PlayerSettings, lives: u32) -> Self {
        let spawn = Vec2::new(settings.initial_x, settings.initial_y);
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            lives,
            condition: PlayerCondition::Normal,
            spawn,
            last_shot_ms: None,
            condition_timer: None,
        }
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn
    }

    pub fn is_invincible(&self) -> bool {
        self.condition != PlayerCondition::Normal
    }

    /// Can move and shoot
    pub fn is_controllable(&self) -> bool {
        matches!(self.condition, PlayerCondition::Normal | PlayerCondition::Invincible)
    }

    /// Valid aiming reference; None while being hit or respawned
    pub fn snapshot(&self) -> Option<PlayerSnapshot> {
        self.is_controllable().then_some(PlayerSnapshot {
            pos: self.pos,
            vel: self.vel,
        })
    }

    /// Set horizontal velocity from input. Both directions cancel out.
    pub fn apply_input(&mut self, left: bool, right: bool, speed: f32) {
        if !self.is_controllable() {
            self.vel = Vec2::ZERO;
            return;
        }
        self.vel.x = match (left, right) {
            (true, false) => -speed,
            (false, true) => speed,
            _ => 0.0,
        };
    }

    /// Move, staying inside the world
    pub fn step(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        let half_w = PLAYER_SIZE.0 / 2.0;
        if self.pos.x < half_w || self.pos.x > WORLD_WIDTH - half_w {
            self.pos.x = self.pos.x.clamp(half_w, WORLD_WIDTH - half_w);
            self.vel.x = 0.0;
        }
    }

    /// Fire if the cooldown allows. Returns the bullet spawn point.
    pub fn try_shoot(&mut self, now_ms: f64, cooldown_ms: f32) -> Option<Vec2> {
        if !self.is_controllable() {
            return None;
        }
        if let Some(last) = self.last_shot_ms {
            if now_ms - last <= cooldown_ms as f64 {
                return None;
            }
        }
        self.last_shot_ms = Some(now_ms);
        Some(self.pos - Vec2::new(0.0, MUZZLE_OFFSET))
    }

    /// Lose a life unless invincible. Invincibility starts in the same step.
    pub fn take_hit(&mut self) -> HitOutcome {
        if self.is_invincible() || self.lives == 0 {
            return HitOutcome::Ignored;
        }
        self.lives -= 1;
        self.vel = Vec2::ZERO;
        self.condition = PlayerCondition::Hit;
        if self.lives == 0 {
            HitOutcome::Killed
        } else {
            HitOutcome::Damaged { lives: self.lives }
        }
    }

    /// Move to the next hit state. Returns the new state and how long it lasts
    /// (None once back to `Normal`).
    pub fn advance_condition(&mut self, effects: &EffectSettings) -> (PlayerCondition, Option<f32>) {
        self.condition = match self.condition {
            PlayerCondition::Hit => {
                self.pos = self.spawn;
                self.vel = Vec2::ZERO;
                PlayerCondition::Respawning
            }
            PlayerCondition::Respawning => PlayerCondition::Invincible,
            PlayerCondition::Invincible | PlayerCondition::Normal => PlayerCondition::Normal,
        };
        (self.condition, condition_duration_ms(self.condition, effects))
    }

    /// Store the live transition timer, returning the one it replaces
    pub fn replace_condition_timer(&mut self, handle: Option<TimerHandle>) -> Option<TimerHandle> {
        std::mem::replace(&mut self.condition_timer, handle)
    }
}

/// How long a hit state lasts
pub fn condition_duration_ms(condition: PlayerCondition, effects: &EffectSettings) -> Option<f32> {
    match condition {
        PlayerCondition::Normal => None,
        PlayerCondition::Hit => Some(effects.hit_blink_duration_ms),
        PlayerCondition::Respawning => Some(effects.respawn_flash_ms),
        PlayerCondition::Invincible => Some(effects.invincible_duration_ms),
    }
}
