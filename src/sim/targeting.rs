//! Enemy targeting
//!
//! Decides the velocity of a newly fired enemy bullet. Speed is always the
//! configured bullet speed; only the direction changes with the AI mode.
//!
//! Aimed shots lead the player linearly (constant velocity over the bullet's
//! flight time) and are then spoiled by a random offset proportional to the
//! shot distance, so far shots miss by more pixels but by the same angle.

use glam::Vec2;
use rand::Rng;

use crate::consts::AIMED_MAX_PROBABILITY;
use crate::settings::{AimedSettings, ShootingMode, ShootingSettings};

/// Below this length a direction is treated as zero
const MIN_DIRECTION: f32 = 1e-3;

/// Where the player is and where it's going
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSnapshot {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Everything a single shot needs. Rebuilt for every shot.
#[derive(Debug, Clone, Copy)]
pub struct AimingContext {
    pub enemy_pos: Vec2,
    /// None while the player is being hit/respawned
    pub player: Option<PlayerSnapshot>,
    pub wave: u32,
}

/// How the session should execute a shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotPlan {
    /// Fire now
    Immediate,
    /// Show a warning on the enemy, fire once it ends
    AfterWarning { warning_ms: f32 },
}

/// Plain vertical shot
#[inline]
pub fn straight_down(bullet_speed: f32) -> Vec2 {
    Vec2::new(0.0, bullet_speed)
}

/// Map reserved modes onto one that actually exists
pub fn resolve_mode(mode: ShootingMode) -> ShootingMode {
    if mode.is_implemented() {
        mode
    } else {
        log::warn!("{} shooting is not implemented, falling back to Random", mode.as_str());
        ShootingMode::Random
    }
}

/// Whether aimed logic applies at this wave
pub fn aiming_active(aimed: &AimedSettings, wave: u32) -> bool {
    aimed.enabled && wave >= aimed.start_wave
}

/// Chance that a shot is aimed on this wave, capped so some shots stay random
pub fn aim_probability(wave: u32, aimed: &AimedSettings) -> f32 {
    let waves_in = wave as f32 - aimed.start_wave as f32;
    (aimed.base_probability + waves_in * aimed.probability_increment)
        .min(AIMED_MAX_PROBABILITY)
        .max(0.0)
}

/// Decide whether a shot needs a telegraph first
pub fn plan_shot(mode: ShootingMode, wave: u32, shooting: &ShootingSettings) -> ShotPlan {
    let aimed = &shooting.aimed;
    match resolve_mode(mode) {
        ShootingMode::Aimed if aiming_active(aimed, wave) && aimed.show_warning => {
            ShotPlan::AfterWarning {
                warning_ms: aimed.warning_duration_ms,
            }
        }
        _ => ShotPlan::Immediate,
    }
}

/// Player x when a bullet fired now would arrive
pub fn predict_player_x(enemy_pos: Vec2, player: &PlayerSnapshot, bullet_speed: f32, prediction_factor: f32) -> f32 {
    let distance = enemy_pos.distance(player.pos);
    let time_to_reach = distance / bullet_speed;
    player.pos.x + player.vel.x * time_to_reach * prediction_factor
}

/// Aimed velocity for a given inaccuracy draw
///
/// `jitter` holds two uniform draws shifted to `[-0.5, 0.5)`. Degenerate
/// geometry (player on top of the enemy, non-finite input) shoots straight down.
pub fn aimed_velocity(
    enemy_pos: Vec2,
    player: &PlayerSnapshot,
    aimed: &AimedSettings,
    bullet_speed: f32,
    jitter: Vec2,
) -> Vec2 {
    let predicted_x = predict_player_x(enemy_pos, player, bullet_speed, aimed.prediction_factor);
    let mut dir = Vec2::new(predicted_x - enemy_pos.x, player.pos.y - enemy_pos.y);

    let initial_distance = dir.length();
    if !dir.is_finite() || initial_distance < MIN_DIRECTION {
        return straight_down(bullet_speed);
    }

    let inaccuracy = (1.0 - aimed.accuracy) * initial_distance;
    dir += jitter * inaccuracy;

    let final_distance = dir.length();
    if !dir.is_finite() || final_distance < MIN_DIRECTION {
        return straight_down(bullet_speed);
    }

    dir / final_distance * bullet_speed
}

/// Velocity of the next enemy bullet
pub fn compute_bullet_velocity<R: Rng>(
    ctx: &AimingContext,
    mode: ShootingMode,
    shooting: &ShootingSettings,
    bullet_speed: f32,
    rng: &mut R,
) -> Vec2 {
    let aimed = &shooting.aimed;
    if resolve_mode(mode) != ShootingMode::Aimed || !aiming_active(aimed, ctx.wave) {
        return straight_down(bullet_speed);
    }

    let Some(player) = ctx.player else {
        return straight_down(bullet_speed);
    };

    let probability = aim_probability(ctx.wave, aimed);
    if rng.random::<f32>() >= probability {
        return straight_down(bullet_speed);
    }

    let jitter = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5);
    let vel = aimed_velocity(ctx.enemy_pos, &player, aimed, bullet_speed, jitter);
    log::debug!(
        "Aimed shot wave {} p={:.2} from {:?} -> {:?}",
        ctx.wave,
        probability,
        ctx.enemy_pos,
        vel
    );
    vel
}
