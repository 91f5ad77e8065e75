//! End-to-end combat session scenarios

use glam::Vec2;
use star_invaders::consts::SIM_DT;
use star_invaders::sim::{
    BulletOwner, CombatSession, GameEvent, GamePhase, OverlapReport, PlayerCondition, ScoreTracker, TickInput,
    WavePhase,
};
use star_invaders::{MemoryHighScore, Settings, ShootingMode, StoredHighScore};

fn new_session(settings: Settings) -> CombatSession {
    CombatSession::new(settings, Box::new(MemoryHighScore(0)), 7)
}

fn idle() -> TickInput {
    TickInput::default()
}

fn run_ms(s: &mut CombatSession, input: &TickInput, ms: f32) {
    let ticks = (ms / 1000.0 / SIM_DT).ceil() as u32;
    for _ in 0..ticks {
        s.tick(input, SIM_DT);
    }
}

/// Drop a stationary player bullet on the first live enemy and step once
fn kill_one(s: &mut CombatSession) {
    let pos = s
        .entities()
        .active_enemies()
        .next()
        .map(|e| e.pos)
        .expect("no live enemy");
    s.entities_mut()
        .spawn_bullet(BulletOwner::Player, pos, Vec2::ZERO);
    s.tick(&idle(), SIM_DT);
}

/// Destroy the formation and wait out the transition
fn clear_wave(s: &mut CombatSession) {
    let skip = TickInput {
        skip_wave: true,
        ..Default::default()
    };
    s.tick(&skip, SIM_DT);
    if s.phase() == GamePhase::Playing {
        run_ms(s, &idle(), 2100.0);
    }
}

#[test]
fn first_wave_grid() {
    let s = new_session(Settings::default());
    assert_eq!(s.wave(), 1);
    assert_eq!(s.entities().enemy_count(), 15);

    let positions: Vec<Vec2> = s.entities().enemies.iter().map(|e| e.pos).collect();
    for row in 0..3 {
        for col in 0..5 {
            let expected = Vec2::new(100.0 + col as f32 * 80.0, 50.0 + row as f32 * 60.0);
            assert!(positions.contains(&expected), "missing enemy at {expected}");
        }
    }
}

#[test]
fn add_score_beats_record_once() {
    let mut tracker = ScoreTracker::new(Box::new(MemoryHighScore(100)));
    assert!(tracker.add_score(150));
    assert_eq!(tracker.score(), 150);
    assert_eq!(tracker.high_score(), 150);
    assert!(tracker.take_new_record_celebration());
    assert!(!tracker.take_new_record_celebration());
}

#[test]
fn new_high_score_event_fires_once() {
    let mut s = CombatSession::new(Settings::default(), Box::new(MemoryHighScore(5)), 7);
    s.drain_events();

    kill_one(&mut s);
    kill_one(&mut s);
    assert_eq!(s.score(), 20);
    assert_eq!(s.high_score(), 20);

    let celebrations = s
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::NewHighScore { .. }))
        .count();
    assert_eq!(celebrations, 1);
}

#[test]
fn last_life_ends_session() {
    let mut settings = Settings::default();
    settings.rules.initial_lives = 1;
    let mut s = new_session(settings);

    let at = s.player().pos;
    s.entities_mut()
        .spawn_bullet(BulletOwner::Enemy, at, Vec2::ZERO);
    s.tick(&idle(), SIM_DT);

    assert_eq!(s.lives(), 0);
    assert_eq!(s.phase(), GamePhase::GameOver);
    assert_eq!(s.pending_timers(), 0);
    let events = s.drain_events();
    assert!(events.contains(&GameEvent::GameOver {
        score: 0,
        high_score: 0,
        is_new_record: false,
    }));

    // Nothing moves the score or lives any more
    let enemy = s.entities().enemies[0].clone();
    let bullet = s
        .entities_mut()
        .spawn_bullet(BulletOwner::Player, enemy.pos, Vec2::ZERO);
    s.apply_overlaps(&OverlapReport {
        bullet_enemy: vec![(bullet, enemy.id)],
        player_bullets: Vec::new(),
        player_enemies: vec![enemy.id],
    });
    run_ms(&mut s, &idle(), 3000.0);
    assert_eq!(s.score(), 0);
    assert_eq!(s.lives(), 0);
    assert!(s.entities().is_enemy_active(enemy.id));
    assert!(!s.continue_after_victory());
    assert!(s.drain_events().is_empty());
}

#[test]
fn simultaneous_bullets_cost_one_life() {
    let mut s = new_session(Settings::default());
    s.drain_events();
    let at = s.player().pos;
    for _ in 0..5 {
        s.entities_mut()
            .spawn_bullet(BulletOwner::Enemy, at, Vec2::ZERO);
    }
    s.tick(&idle(), SIM_DT);

    assert_eq!(s.lives(), 2);
    assert_eq!(s.player().condition, PlayerCondition::Hit);
    let hits = s
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::PlayerHit { .. }))
        .count();
    assert_eq!(hits, 1);
}

#[test]
fn wave_transition_timing() {
    let mut s = new_session(Settings::default());
    s.drain_events();

    let skip = TickInput {
        skip_wave: true,
        ..Default::default()
    };
    s.tick(&skip, SIM_DT);
    assert_eq!(s.wave(), 1);
    assert_eq!(s.wave_phase(), WavePhase::Transitioning);
    assert!(
        s.drain_events()
            .contains(&GameEvent::WaveAnnouncement { wave: 2 })
    );

    run_ms(&mut s, &idle(), 1990.0);
    assert_eq!(s.wave(), 1);
    assert_eq!(s.entities().enemy_count(), 0);

    run_ms(&mut s, &idle(), 20.0);
    assert_eq!(s.wave(), 2);
    assert_eq!(s.wave_phase(), WavePhase::Spawned);
    assert_eq!(s.entities().enemy_count(), 15);
    assert!((s.fire_interval_ms() - 850.0).abs() < 1e-3);
}

#[test]
fn victory_then_continue() {
    let mut s = new_session(Settings::with_mode(ShootingMode::Random));
    kill_one(&mut s);
    for _ in 1..5 {
        clear_wave(&mut s);
    }
    assert_eq!(s.wave(), 5);
    assert_eq!(s.phase(), GamePhase::Playing);
    let (score, lives) = (s.score(), s.lives());
    assert_eq!(score, 10);

    clear_wave(&mut s);
    assert_eq!(s.phase(), GamePhase::Victory);
    assert!(s.is_fire_timer_paused());
    assert!(s.drain_events().contains(&GameEvent::Victory {
        score,
        lives,
        wave: 5,
    }));

    // Frozen until the player continues
    let now = s.now_ms();
    run_ms(&mut s, &idle(), 1000.0);
    assert_eq!(s.now_ms(), now);

    let go = TickInput {
        continue_game: true,
        ..Default::default()
    };
    s.tick(&go, SIM_DT);
    assert_eq!(s.phase(), GamePhase::Playing);
    assert_eq!(s.wave(), 1);
    assert_eq!(s.score(), score);
    assert_eq!(s.lives(), lives);
    assert_eq!(s.fire_interval_ms(), 1000.0);
    assert_eq!(s.entities().enemy_count(), 15);
    assert!(s.has_fire_timer());
    assert!(!s.is_fire_timer_paused());
}

#[test]
fn pause_freezes_hit_sequence() {
    let mut s = new_session(Settings::default());
    let at = s.player().pos;
    s.entities_mut()
        .spawn_bullet(BulletOwner::Enemy, at, Vec2::ZERO);
    s.tick(&idle(), SIM_DT);
    assert_eq!(s.player().condition, PlayerCondition::Hit);

    s.toggle_pause();
    run_ms(&mut s, &idle(), 5000.0);
    assert_eq!(s.player().condition, PlayerCondition::Hit);
    assert_eq!(s.lives(), 2);

    s.toggle_pause();
    run_ms(&mut s, &idle(), 510.0);
    assert_eq!(s.player().condition, PlayerCondition::Respawning);
}

#[test]
fn restart_keeps_high_score() {
    let mut s = CombatSession::new(Settings::default(), Box::new(StoredHighScore::in_memory()), 99);
    kill_one(&mut s);
    kill_one(&mut s);
    assert_eq!(s.score(), 20);

    s.restart();
    assert_eq!(s.phase(), GamePhase::Playing);
    assert_eq!(s.score(), 0);
    assert_eq!(s.high_score(), 20);
    assert_eq!(s.wave(), 1);
    assert_eq!(s.lives(), 3);
    assert_eq!(s.entities().enemy_count(), 15);
    assert_eq!(s.drain_events(), vec![GameEvent::WaveAnnouncement { wave: 1 }]);
}

#[test]
fn restart_drops_outstanding_timers() {
    let mut settings = Settings::default();
    settings.shooting.aimed.start_wave = 1;
    settings.enemy.base_fire_interval_ms = 5000.0;
    let mut s = new_session(settings);

    // Aimed warning pending
    run_ms(&mut s, &idle(), 5010.0);
    assert!(
        s.drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::ShootWarning { .. }))
    );
    assert!(s.entities().enemy_bullets.is_empty());

    // Death blink pending
    kill_one(&mut s);

    // Wave transition pending
    let skip = TickInput {
        skip_wave: true,
        ..Default::default()
    };
    s.tick(&skip, SIM_DT);
    assert_eq!(s.wave_phase(), WavePhase::Transitioning);
    assert!(s.pending_timers() >= 4);

    s.restart();
    // Only the fresh fire timer
    assert_eq!(s.pending_timers(), 1);
    s.drain_events();

    run_ms(&mut s, &idle(), 2100.0);
    assert!(s.entities().enemy_bullets.is_empty());
    assert_eq!(s.wave(), 1);
    assert_eq!(s.wave_phase(), WavePhase::Spawned);
    assert_eq!(s.entities().enemy_count(), 15);
    assert_eq!(s.entities().active_enemy_count(), 15);
    assert!(s.drain_events().iter().all(|e| !matches!(
        e,
        GameEvent::EnemyDestroyed { .. } | GameEvent::WaveAnnouncement { .. } | GameEvent::EnemyShot { .. }
    )));
}
