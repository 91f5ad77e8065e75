//! Deterministic combat simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Timers run on simulation time, never wall-clock time
//! - No rendering or platform dependencies

pub mod collision;
pub mod player;
pub mod score;
pub mod state;
pub mod targeting;
pub mod tick;
pub mod timers;
pub mod wave;

pub use collision::{OverlapReport, PlayerContact, detect_overlaps, resolve_enemy_hit, resolve_player_hit};
pub use player::{HitOutcome, Player, PlayerCondition};
pub use score::ScoreTracker;
pub use state::{Bullet, BulletOwner, Enemy, EntityStore, GameEvent, GamePhase};
pub use targeting::{AimingContext, PlayerSnapshot, ShotPlan, compute_bullet_velocity};
pub use tick::{CombatSession, SessionSnapshot, TickInput};
pub use timers::{Scheduler, TimerEvent, TimerHandle};
pub use wave::{WaveAction, WaveController, WavePhase, fire_interval_for_wave, spawn_formation};
