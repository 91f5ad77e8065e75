//! Overlap detection and collision resolution
//!
//! Detection snapshots every overlapping pair for the step first; resolution
//! then re-checks each pair against the live store, so a bullet destroyed by
//! an earlier pair is never processed again.

use super::player::{HitOutcome, Player};
use super::score::ScoreTracker;
use super::state::{BulletOwner, EntityStore};
use crate::boxes_overlap;
use crate::consts::{BULLET_SIZE, ENEMY_SIZE, PLAYER_SIZE};

/// All overlaps found in one step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapReport {
    /// (player bullet id, enemy id)
    pub bullet_enemy: Vec<(u32, u32)>,
    /// Enemy bullet ids touching the player
    pub player_bullets: Vec<u32>,
    /// Enemy ids touching the player
    pub player_enemies: Vec<u32>,
}

impl OverlapReport {
    pub fn is_empty(&self) -> bool {
        self.bullet_enemy.is_empty() && self.player_bullets.is_empty() && self.player_enemies.is_empty()
    }
}

/// What hurt the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerContact {
    EnemyBullet(u32),
    Enemy(u32),
}

/// A confirmed kill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyKill {
    pub enemy_id: u32,
    /// Session score after the kill
    pub score: u64,
}

/// Find every overlapping pair among live entities
pub fn detect_overlaps(store: &EntityStore, player: &Player) -> OverlapReport {
    let mut report = OverlapReport::default();

    for bullet in store.player_bullets.iter().filter(|b| b.active) {
        for enemy in store.active_enemies() {
            if boxes_overlap(bullet.pos, BULLET_SIZE, enemy.pos, ENEMY_SIZE) {
                report.bullet_enemy.push((bullet.id, enemy.id));
            }
        }
    }

    for bullet in store.enemy_bullets.iter().filter(|b| b.active) {
        if boxes_overlap(player.pos, PLAYER_SIZE, bullet.pos, BULLET_SIZE) {
            report.player_bullets.push(bullet.id);
        }
    }

    for enemy in store.active_enemies() {
        if boxes_overlap(player.pos, PLAYER_SIZE, enemy.pos, ENEMY_SIZE) {
            report.player_enemies.push(enemy.id);
        }
    }

    report
}

/// Player bullet meets enemy: bullet gone, enemy starts blinking out, points
/// awarded. None if either side was already used up this step.
pub fn resolve_enemy_hit(
    store: &mut EntityStore,
    score: &mut ScoreTracker,
    points: u64,
    bullet_id: u32,
    enemy_id: u32,
) -> Option<EnemyKill> {
    let bullet_live = store
        .bullet(BulletOwner::Player, bullet_id)
        .is_some_and(|b| b.active);
    if !bullet_live || !store.is_enemy_active(enemy_id) {
        return None;
    }

    store.destroy_bullet(BulletOwner::Player, bullet_id);
    store.deactivate_enemy(enemy_id);
    score.add_score(points);

    Some(EnemyKill {
        enemy_id,
        score: score.score(),
    })
}

/// Enemy bullet or enemy body meets player. Invincible players ignore it
/// entirely (the bullet keeps flying). Touching an enemy doesn't kill it.
pub fn resolve_player_hit(store: &mut EntityStore, player: &mut Player, contact: PlayerContact) -> HitOutcome {
    if player.is_invincible() || player.lives == 0 {
        return HitOutcome::Ignored;
    }

    match contact {
        PlayerContact::EnemyBullet(id) => {
            if !store.destroy_bullet(BulletOwner::Enemy, id) {
                return HitOutcome::Ignored;
            }
        }
        PlayerContact::Enemy(id) => {
            if !store.is_enemy_active(id) {
                return HitOutcome::Ignored;
            }
        }
    }

    player.take_hit()
}
