//! Fixed timestep simulation tick
//!
//! `CombatSession` ties the entity store, targeting, collisions, waves, score
//! and the timer calendar into one deterministic update step.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{
    EnemyKill, OverlapReport, PlayerContact, detect_overlaps, resolve_enemy_hit, resolve_player_hit,
};
use super::player::{HitOutcome, Player, PlayerCondition, condition_duration_ms};
use super::score::ScoreTracker;
use super::state::{BulletOwner, EntityStore, GameEvent, GamePhase};
use super::targeting::{AimingContext, ShotPlan, compute_bullet_velocity, plan_shot, resolve_mode};
use super::timers::{Scheduler, TimerEvent, TimerHandle};
use super::wave::{WaveAction, WaveController, WavePhase, spawn_formation};
use crate::consts::{MUZZLE_OFFSET, WORLD_HEIGHT, WORLD_WIDTH};
use crate::highscores::HighScoreStore;
use crate::platform::InputSource;
use crate::secs_to_ms;
use crate::settings::Settings;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
    /// Pause toggle
    pub pause: bool,
    /// Continue after victory
    pub continue_game: bool,
    /// Destroy the current formation (debug/testing)
    pub skip_wave: bool,
}

impl TickInput {
    /// Sample held controls from any input device
    pub fn from_source(source: &dyn InputSource) -> Self {
        Self {
            left: source.is_left_active(),
            right: source.is_right_active(),
            shoot: source.is_shoot_active(),
            ..Default::default()
        }
    }
}

/// One game session: from the first wave until game over or restart
pub struct CombatSession {
    settings: Settings,
    seed: u64,
    rng: Pcg32,
    phase: GamePhase,
    store: EntityStore,
    player: Player,
    waves: WaveController,
    score: ScoreTracker,
    scheduler: Scheduler,
    fire_timer: Option<TimerHandle>,
    hit_text_timer: Option<TimerHandle>,
    events: Vec<GameEvent>,
    /// Simulation tick counter
    time_ticks: u64,
}

impl CombatSession {
    /// Create a session and spawn wave 1
    pub fn new(settings: Settings, high_scores: Box<dyn HighScoreStore>, seed: u64) -> Self {
        let mut session = Self {
            player: Player::new(&settings.player, settings.rules.initial_lives),
            waves: WaveController::new(settings.waves.clone(), settings.enemy.base_fire_interval_ms),
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            store: EntityStore::new(),
            score: ScoreTracker::new(high_scores),
            scheduler: Scheduler::new(),
            fire_timer: None,
            hit_text_timer: None,
            events: Vec::new(),
            time_ticks: 0,
        };
        session.start();
        session
    }

    fn start(&mut self) {
        log::info!(
            "Session start: seed {}, mode {}, high score {}",
            self.seed,
            self.settings.shooting.mode.as_str(),
            self.score.high_score()
        );
        self.phase = GamePhase::Playing;
        self.spawn_wave(self.waves.wave(), self.waves.fire_interval_ms());
        self.events.push(GameEvent::WaveAnnouncement {
            wave: self.waves.wave(),
        });
    }

    /// Fresh session with the same settings and high score store. Every
    /// outstanding timer from the old session is dropped.
    pub fn restart(&mut self) {
        self.scheduler = Scheduler::new();
        self.fire_timer = None;
        self.hit_text_timer = None;
        self.store = EntityStore::new();
        self.player = Player::new(&self.settings.player, self.settings.rules.initial_lives);
        self.waves.reset();
        self.score.reset();
        self.events.clear();
        self.time_ticks = 0;
        self.start();
    }

    /// Advance the session by one fixed timestep
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if input.pause {
            self.toggle_pause();
        }

        match self.phase {
            GamePhase::Paused | GamePhase::GameOver => return,
            GamePhase::Victory => {
                if input.continue_game {
                    self.continue_after_victory();
                }
                return;
            }
            GamePhase::Playing => {}
        }

        if input.skip_wave {
            log::info!("Skipping wave {}", self.waves.wave());
            self.store.enemies.clear();
        }

        self.time_ticks += 1;

        self.player
            .apply_input(input.left, input.right, self.settings.player.speed);
        if input.shoot {
            self.player_shoot();
        }

        self.store.step(dt);
        self.player.step(dt);

        let report = detect_overlaps(&self.store, &self.player);
        self.apply_overlaps(&report);
        if self.phase != GamePhase::Playing {
            return;
        }
        self.store.sweep_bullets();

        self.scheduler.advance_clock(secs_to_ms(dt));
        while let Some(event) = self.scheduler.pop_due() {
            self.handle_timer(event);
            if self.phase == GamePhase::GameOver {
                return;
            }
        }

        self.check_wave_progress();
    }

    /// Pause or resume. Only meaningful while playing.
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                self.phase = GamePhase::Paused;
                self.events.push(GameEvent::Paused);
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                self.events.push(GameEvent::Resumed);
            }
            GamePhase::Victory | GamePhase::GameOver => {}
        }
    }

    /// Resolve overlaps reported for this step. Also the entry point for a
    /// host-side physics backend.
    pub fn apply_overlaps(&mut self, report: &OverlapReport) {
        if self.phase != GamePhase::Playing {
            return;
        }

        let points = self.settings.rules.points_per_enemy;
        for &(bullet_id, enemy_id) in &report.bullet_enemy {
            if let Some(kill) = resolve_enemy_hit(&mut self.store, &mut self.score, points, bullet_id, enemy_id) {
                self.on_enemy_killed(kill);
            }
        }

        let contacts = report
            .player_bullets
            .iter()
            .map(|&id| PlayerContact::EnemyBullet(id))
            .chain(report.player_enemies.iter().map(|&id| PlayerContact::Enemy(id)));
        for contact in contacts {
            match resolve_player_hit(&mut self.store, &mut self.player, contact) {
                HitOutcome::Ignored => {}
                HitOutcome::Damaged { lives } => self.on_player_damaged(lives),
                HitOutcome::Killed => {
                    self.end_game();
                    return;
                }
            }
        }
    }

    /// Leave the victory screen and start again from wave 1, keeping score
    /// and lives. Returns false if not in victory.
    pub fn continue_after_victory(&mut self) -> bool {
        if self.phase != GamePhase::Victory {
            return false;
        }
        let Some(action) = self.waves.continue_after_victory() else {
            return false;
        };
        log::info!("Continuing after victory with score {}", self.score.score());
        self.store.clear_bullets();
        self.phase = GamePhase::Playing;
        self.apply_wave_action(action);
        self.events.push(GameEvent::WaveAnnouncement {
            wave: self.waves.wave(),
        });
        true
    }

    /// Take all pending presentation events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn player_shoot(&mut self) {
        let cooldown = self.settings.effective_shoot_cooldown_ms();
        if let Some(muzzle) = self.player.try_shoot(self.scheduler.now_ms(), cooldown) {
            let vel = Vec2::new(0.0, -self.settings.player.bullet_speed);
            self.store.spawn_bullet(BulletOwner::Player, muzzle, vel);
            self.events.push(GameEvent::PlayerShot {
                x: muzzle.x,
                y: muzzle.y,
            });
        }
    }

    fn on_enemy_killed(&mut self, kill: EnemyKill) {
        let blink_ms = self.settings.effects.enemy_blink_total_ms();
        self.scheduler.after(
            blink_ms as f64,
            TimerEvent::EnemyBlinkDone {
                enemy_id: kill.enemy_id,
            },
        );
        self.events.push(GameEvent::EnemyBlink {
            enemy_id: kill.enemy_id,
            duration_ms: blink_ms,
        });
        self.events.push(GameEvent::ScoreChanged { score: kill.score });

        if self.score.take_new_record_celebration() {
            log::info!("New high score: {}", self.score.score());
            self.events.push(GameEvent::NewHighScore {
                score: self.score.score(),
            });
        }
    }

    fn on_player_damaged(&mut self, lives: u32) {
        log::info!("Player hit, {} lives left", lives);
        let hit_text_ms = self.settings.effects.hit_text_duration_ms;
        let hit_ms = condition_duration_ms(PlayerCondition::Hit, &self.settings.effects);

        self.events.push(GameEvent::PlayerHit { lives });
        self.events.push(GameEvent::FloatingText {
            text: "HIT!".to_string(),
            x: WORLD_WIDTH / 2.0,
            y: WORLD_HEIGHT / 2.0,
            duration_ms: hit_text_ms,
        });

        if let Some(old) = self.hit_text_timer.take() {
            self.scheduler.cancel(old);
        }
        self.hit_text_timer = Some(self.scheduler.after(hit_text_ms as f64, TimerEvent::HitTextExpired));

        self.arm_condition_timer(hit_ms);
    }

    /// Replace the player's state timer
    fn arm_condition_timer(&mut self, duration_ms: Option<f32>) {
        let handle = duration_ms.map(|ms| self.scheduler.after(ms as f64, TimerEvent::PlayerCondition));
        if let Some(old) = self.player.replace_condition_timer(handle) {
            self.scheduler.cancel(old);
        }
    }

    fn end_game(&mut self) {
        log::info!(
            "Game over: score {}, high score {}",
            self.score.score(),
            self.score.high_score()
        );
        self.phase = GamePhase::GameOver;
        self.scheduler.clear();
        self.fire_timer = None;
        self.hit_text_timer = None;
        self.player.replace_condition_timer(None);
        self.events.push(GameEvent::PlayerHit { lives: 0 });
        self.events.push(GameEvent::GameOver {
            score: self.score.score(),
            high_score: self.score.high_score(),
            is_new_record: self.score.is_new_record(),
        });
    }

    fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::EnemyFire => self.enemy_shoot(),
            TimerEvent::AimedShot { enemy_id } => self.fire_enemy_bullet(enemy_id),
            TimerEvent::EnemyBlinkDone { enemy_id } => {
                if self.store.remove_enemy(enemy_id) {
                    self.events.push(GameEvent::EnemyDestroyed { enemy_id });
                }
            }
            TimerEvent::WaveTransitionDone => {
                if let Some(action) = self.waves.complete_transition() {
                    self.apply_wave_action(action);
                }
            }
            TimerEvent::PlayerCondition => {
                self.player.replace_condition_timer(None);
                let (condition, duration) = self.player.advance_condition(&self.settings.effects);
                match condition {
                    PlayerCondition::Respawning => {
                        let spawn = self.player.spawn_point();
                        self.events.push(GameEvent::PlayerRespawned {
                            x: spawn.x,
                            y: spawn.y,
                        });
                    }
                    PlayerCondition::Normal => self.events.push(GameEvent::InvincibilityEnded),
                    PlayerCondition::Hit | PlayerCondition::Invincible => {}
                }
                self.arm_condition_timer(duration);
            }
            TimerEvent::HitTextExpired => {
                self.hit_text_timer = None;
                self.events.push(GameEvent::HitTextCleared);
            }
        }
    }

    /// Fire-rate tick: pick a random enemy and shoot or telegraph
    fn enemy_shoot(&mut self) {
        let candidates: Vec<u32> = self.store.active_enemies().map(|e| e.id).collect();
        if candidates.is_empty() {
            return;
        }
        let enemy_id = candidates[self.rng.random_range(0..candidates.len())];

        let mode = resolve_mode(self.settings.shooting.mode);
        match plan_shot(mode, self.waves.wave(), &self.settings.shooting) {
            ShotPlan::Immediate => self.fire_enemy_bullet(enemy_id),
            ShotPlan::AfterWarning { warning_ms } => {
                self.events.push(GameEvent::ShootWarning {
                    enemy_id,
                    duration_ms: warning_ms,
                });
                self.scheduler
                    .after(warning_ms as f64, TimerEvent::AimedShot { enemy_id });
            }
        }
    }

    /// Shoot from an enemy if it is still alive; a stale target drops the shot
    fn fire_enemy_bullet(&mut self, enemy_id: u32) {
        let Some(enemy_pos) = self.store.enemy(enemy_id).filter(|e| e.active).map(|e| e.pos) else {
            log::debug!("Shot from enemy {} dropped, target gone", enemy_id);
            return;
        };

        let ctx = AimingContext {
            enemy_pos,
            player: self.player.snapshot(),
            wave: self.waves.wave(),
        };
        let mode = resolve_mode(self.settings.shooting.mode);
        let vel = compute_bullet_velocity(
            &ctx,
            mode,
            &self.settings.shooting,
            self.settings.enemy.bullet_speed,
            &mut self.rng,
        );

        let muzzle = enemy_pos + Vec2::new(0.0, MUZZLE_OFFSET);
        self.store.spawn_bullet(BulletOwner::Enemy, muzzle, vel);
        self.events.push(GameEvent::EnemyShot {
            enemy_id,
            aimed: vel.x != 0.0,
        });
    }

    fn check_wave_progress(&mut self) {
        if let Some(action) = self.waves.observe_enemy_count(self.store.enemy_count()) {
            self.apply_wave_action(action);
        }
    }

    fn apply_wave_action(&mut self, action: WaveAction) {
        match action {
            WaveAction::BeginTransition { next_wave, delay_ms } => {
                self.events.push(GameEvent::WaveAnnouncement { wave: next_wave });
                self.scheduler
                    .after(delay_ms as f64, TimerEvent::WaveTransitionDone);
            }
            WaveAction::EnterVictory { wave } => {
                log::info!("Victory at wave {} with score {}", wave, self.score.score());
                self.phase = GamePhase::Victory;
                if let Some(handle) = self.fire_timer {
                    self.scheduler.set_paused(handle, true);
                }
                self.events.push(GameEvent::Victory {
                    score: self.score.score(),
                    lives: self.player.lives,
                    wave,
                });
            }
            WaveAction::SpawnWave { wave, fire_interval_ms } => {
                self.spawn_wave(wave, fire_interval_ms);
            }
        }
    }

    fn spawn_wave(&mut self, wave: u32, fire_interval_ms: f32) {
        if let Some(old) = self.fire_timer.take() {
            self.scheduler.cancel(old);
        }
        self.fire_timer = Some(
            self.scheduler
                .every(fire_interval_ms as f64, TimerEvent::EnemyFire),
        );
        let ids = spawn_formation(
            &mut self.store,
            &self.settings.spawn,
            &self.settings.enemy,
            &mut self.rng,
        );
        log::info!("Spawned wave {} ({} enemies)", wave, ids.len());
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn wave(&self) -> u32 {
        self.waves.wave()
    }

    pub fn wave_phase(&self) -> WavePhase {
        self.waves.phase()
    }

    pub fn fire_interval_ms(&self) -> f32 {
        self.waves.fire_interval_ms()
    }

    pub fn score(&self) -> u64 {
        self.score.score()
    }

    pub fn high_score(&self) -> u64 {
        self.score.high_score()
    }

    pub fn lives(&self) -> u32 {
        self.player.lives
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn entities(&self) -> &EntityStore {
        &self.store
    }

    /// Direct store access for host-side spawning and tests
    pub fn entities_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Simulation time in ms
    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn is_fire_timer_paused(&self) -> bool {
        self.fire_timer
            .is_some_and(|handle| self.scheduler.is_paused(handle))
    }

    pub fn has_fire_timer(&self) -> bool {
        self.fire_timer
            .is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    /// Render-facing view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        let view = |id: u32, pos: Vec2, active: bool| EntityView {
            id,
            x: pos.x,
            y: pos.y,
            active,
        };
        SessionSnapshot {
            phase: self.phase,
            wave: self.waves.wave(),
            max_wave: self.waves.max_wave(),
            wave_phase: self.waves.phase(),
            score: self.score.score(),
            high_score: self.score.high_score(),
            lives: self.player.lives,
            player: PlayerView {
                x: self.player.pos.x,
                y: self.player.pos.y,
                condition: self.player.condition,
            },
            enemies: self
                .store
                .enemies
                .iter()
                .map(|e| view(e.id, e.pos, e.active))
                .collect(),
            player_bullets: self
                .store
                .player_bullets
                .iter()
                .map(|b| view(b.id, b.pos, b.active))
                .collect(),
            enemy_bullets: self
                .store
                .enemy_bullets
                .iter()
                .map(|b| view(b.id, b.pos, b.active))
                .collect(),
            time_ms: self.scheduler.now_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub condition: PlayerCondition,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: GamePhase,
    pub wave: u32,
    pub max_wave: u32,
    pub wave_phase: WavePhase,
    pub score: u64,
    pub high_score: u64,
    pub lives: u32,
    pub player: PlayerView,
    pub enemies: Vec<EntityView>,
    pub player_bullets: Vec<EntityView>,
    pub enemy_bullets: Vec<EntityView>,
    pub time_ms: f64,
}
