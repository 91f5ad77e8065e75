//! Entity store and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{BULLET_SIZE, ENEMY_SIZE, WORLD_HEIGHT, WORLD_WIDTH};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay (wave transitions happen inside this phase)
    Playing,
    /// Player paused; nothing advances
    Paused,
    /// Final wave cleared, waiting for continue
    Victory,
    /// Out of lives
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// An invader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    /// Horizontal only; enemies never move vertically
    pub vel_x: f32,
    /// False once hit; the enemy is blinking out and can't shoot or be hit
    pub active: bool,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, vel_x: f32) -> Self {
        Self {
            id,
            pos,
            vel_x,
            active: true,
        }
    }

    /// Move and bounce off the side walls
    pub fn step(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.pos.x += self.vel_x * dt;

        let half_w = ENEMY_SIZE.0 / 2.0;
        if self.pos.x < half_w {
            self.pos.x = half_w;
            self.vel_x = self.vel_x.abs();
        } else if self.pos.x > WORLD_WIDTH - half_w {
            self.pos.x = WORLD_WIDTH - half_w;
            self.vel_x = -self.vel_x.abs();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub owner: BulletOwner,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Cleared on destroy, swept at the end of the step
    pub active: bool,
}

impl Bullet {
    pub fn step(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    /// Player bullets leave through the top, enemy bullets through the
    /// bottom; aimed shots can also drift out the sides.
    pub fn out_of_bounds(&self) -> bool {
        let half_w = BULLET_SIZE.0 / 2.0;
        if self.pos.x < -half_w || self.pos.x > WORLD_WIDTH + half_w {
            return true;
        }
        match self.owner {
            BulletOwner::Player => self.pos.y < 0.0,
            BulletOwner::Enemy => self.pos.y > WORLD_HEIGHT,
        }
    }
}

/// Presentation hooks, drained by the host after each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    WaveAnnouncement { wave: u32 },
    /// Enemy hit, blinking out over `duration_ms`
    EnemyBlink { enemy_id: u32, duration_ms: f32 },
    EnemyDestroyed { enemy_id: u32 },
    PlayerShot { x: f32, y: f32 },
    EnemyShot { enemy_id: u32, aimed: bool },
    /// Telegraph an aimed shot (red border on the enemy)
    ShootWarning { enemy_id: u32, duration_ms: f32 },
    PlayerHit { lives: u32 },
    PlayerRespawned { x: f32, y: f32 },
    InvincibilityEnded,
    FloatingText { text: String, x: f32, y: f32, duration_ms: f32 },
    HitTextCleared,
    ScoreChanged { score: u64 },
    NewHighScore { score: u64 },
    Victory { score: u64, lives: u32, wave: u32 },
    GameOver { score: u64, high_score: u64, is_new_record: bool },
    Paused,
    Resumed,
}

/// Live enemies and bullets, kept in id order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    pub enemies: Vec<Enemy>,
    pub player_bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    next_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    pub fn spawn_enemy(&mut self, pos: Vec2, vel_x: f32) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, pos, vel_x));
        id
    }

    pub fn spawn_bullet(&mut self, owner: BulletOwner, pos: Vec2, vel: Vec2) -> u32 {
        let id = self.next_entity_id();
        let bullet = Bullet {
            id,
            owner,
            pos,
            vel,
            active: true,
        };
        self.bullets_mut(owner).push(bullet);
        id
    }

    fn bullets_mut(&mut self, owner: BulletOwner) -> &mut Vec<Bullet> {
        match owner {
            BulletOwner::Player => &mut self.player_bullets,
            BulletOwner::Enemy => &mut self.enemy_bullets,
        }
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Present and not already blinking out
    pub fn is_enemy_active(&self, id: u32) -> bool {
        self.enemy(id).is_some_and(|e| e.active)
    }

    /// Mark an enemy as hit. Returns false if it was already hit or gone.
    pub fn deactivate_enemy(&mut self, id: u32) -> bool {
        match self.enemy_mut(id) {
            Some(enemy) if enemy.active => {
                enemy.active = false;
                true
            }
            _ => false,
        }
    }

    /// Returns false if there was nothing to remove
    pub fn remove_enemy(&mut self, id: u32) -> bool {
        let before = self.enemies.len();
        self.enemies.retain(|e| e.id != id);
        self.enemies.len() != before
    }

    pub fn bullet(&self, owner: BulletOwner, id: u32) -> Option<&Bullet> {
        match owner {
            BulletOwner::Player => self.player_bullets.iter().find(|b| b.id == id),
            BulletOwner::Enemy => self.enemy_bullets.iter().find(|b| b.id == id),
        }
    }

    /// Mark a bullet destroyed. Returns false on double-destroy.
    pub fn destroy_bullet(&mut self, owner: BulletOwner, id: u32) -> bool {
        match self.bullets_mut(owner).iter_mut().find(|b| b.id == id) {
            Some(bullet) if bullet.active => {
                bullet.active = false;
                true
            }
            _ => false,
        }
    }

    /// Drop destroyed and out-of-bounds bullets
    pub fn sweep_bullets(&mut self) {
        for bullets in [&mut self.player_bullets, &mut self.enemy_bullets] {
            bullets.retain(|b| b.active && !b.out_of_bounds());
        }
    }

    /// Every enemy still in the store, including ones blinking out
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn active_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.active)
    }

    pub fn active_enemy_count(&self) -> usize {
        self.active_enemies().count()
    }

    pub fn clear_bullets(&mut self) {
        self.player_bullets.clear();
        self.enemy_bullets.clear();
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
        self.clear_bullets();
    }

    /// Move everything one step
    pub fn step(&mut self, dt: f32) {
        for enemy in &mut self.enemies {
            enemy.step(dt);
        }
        for bullet in self.player_bullets.iter_mut().chain(self.enemy_bullets.iter_mut()) {
            bullet.step(dt);
        }
    }
}
