//! Wave progression
//!
//! ```text
//! Spawned --(no enemies)--> EmptyDetected --(wave < max)--> Transitioning --(delay)--> Spawned
//!                                        \--(wave == max)--> Victory --(continue)--> Spawned (wave 1)
//! ```
//!
//! The controller only decides; the session carries out the returned
//! [`WaveAction`] (timers, announcements, spawning).

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::EntityStore;
use crate::settings::{EnemySettings, SpawnSettings, WaveSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Enemies alive, normal play
    Spawned,
    /// Last enemy gone, next step not decided yet
    EmptyDetected,
    /// Announcement showing, waiting out the transition delay
    Transitioning,
    /// Final wave cleared
    Victory,
}

/// What the session has to do after a controller step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaveAction {
    /// Announce `next_wave` and start the transition delay
    BeginTransition { next_wave: u32, delay_ms: f32 },
    /// Stop the fire timer and show the summary
    EnterVictory { wave: u32 },
    /// Re-arm the fire timer and spawn a fresh formation
    SpawnWave { wave: u32, fire_interval_ms: f32 },
}

/// Enemy fire interval for a wave: `max(base * mult^(wave-1), min)`
pub fn fire_interval_for_wave(wave: u32, base_interval_ms: f32, waves: &WaveSettings) -> f32 {
    let exponent = wave.saturating_sub(1) as i32;
    (base_interval_ms * waves.fire_rate_multiplier.powi(exponent)).max(waves.min_fire_interval_ms)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveController {
    wave: u32,
    phase: WavePhase,
    fire_interval_ms: f32,
    base_interval_ms: f32,
    settings: WaveSettings,
}

impl WaveController {
    pub fn new(settings: WaveSettings, base_interval_ms: f32) -> Self {
        Self {
            wave: 1,
            phase: WavePhase::Spawned,
            fire_interval_ms: fire_interval_for_wave(1, base_interval_ms, &settings),
            base_interval_ms,
            settings,
        }
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn max_wave(&self) -> u32 {
        self.settings.max_wave
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn fire_interval_ms(&self) -> f32 {
        self.fire_interval_ms
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase == WavePhase::Transitioning
    }

    pub fn is_victory(&self) -> bool {
        self.phase == WavePhase::Victory
    }

    /// Feed the current enemy count. Only a `Spawned` wave reacts, so late
    /// collision callbacks after a transition started change nothing.
    pub fn observe_enemy_count(&mut self, count: usize) -> Option<WaveAction> {
        if self.phase != WavePhase::Spawned || count > 0 {
            return None;
        }
        self.phase = WavePhase::EmptyDetected;
        self.resolve_empty()
    }

    fn resolve_empty(&mut self) -> Option<WaveAction> {
        if self.phase != WavePhase::EmptyDetected {
            return None;
        }
        if self.wave < self.settings.max_wave {
            self.phase = WavePhase::Transitioning;
            log::info!("Wave {} cleared", self.wave);
            Some(WaveAction::BeginTransition {
                next_wave: self.wave + 1,
                delay_ms: self.settings.transition_delay_ms,
            })
        } else {
            self.phase = WavePhase::Victory;
            log::info!("Final wave {} cleared", self.wave);
            Some(WaveAction::EnterVictory { wave: self.wave })
        }
    }

    /// Transition delay elapsed
    pub fn complete_transition(&mut self) -> Option<WaveAction> {
        if self.phase != WavePhase::Transitioning {
            return None;
        }
        self.wave += 1;
        self.fire_interval_ms = fire_interval_for_wave(self.wave, self.base_interval_ms, &self.settings);
        self.phase = WavePhase::Spawned;
        log::info!("Wave {} begins, fire interval {:.0}ms", self.wave, self.fire_interval_ms);
        Some(WaveAction::SpawnWave {
            wave: self.wave,
            fire_interval_ms: self.fire_interval_ms,
        })
    }

    /// Player chose to keep going after victory
    pub fn continue_after_victory(&mut self) -> Option<WaveAction> {
        if self.phase != WavePhase::Victory {
            return None;
        }
        self.reset();
        Some(WaveAction::SpawnWave {
            wave: self.wave,
            fire_interval_ms: self.fire_interval_ms,
        })
    }

    /// Back to wave 1
    pub fn reset(&mut self) {
        self.wave = 1;
        self.phase = WavePhase::Spawned;
        self.fire_interval_ms = fire_interval_for_wave(1, self.base_interval_ms, &self.settings);
    }
}

/// Lay out the enemy grid, each enemy drifting at a random integer speed
pub fn spawn_formation<R: Rng>(
    store: &mut EntityStore,
    spawn: &SpawnSettings,
    enemy: &EnemySettings,
    rng: &mut R,
) -> Vec<u32> {
    let (lo, hi) = if enemy.speed_min <= enemy.speed_max {
        (enemy.speed_min, enemy.speed_max)
    } else {
        (enemy.speed_max, enemy.speed_min)
    };

    let mut ids = Vec::with_capacity((spawn.rows * spawn.cols) as usize);
    for row in 0..spawn.rows {
        for col in 0..spawn.cols {
            let pos = Vec2::new(
                spawn.start_x + col as f32 * spawn.spacing_x,
                spawn.start_y + row as f32 * spawn.spacing_y,
            );
            let vel_x = rng.random_range(lo..=hi) as f32;
            ids.push(store.spawn_enemy(pos, vel_x));
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn controller() -> WaveController {
        WaveController::new(WaveSettings::default(), 1000.0)
    }

    #[test]
    fn test_fire_interval_curve() {
        let waves = WaveSettings::default();
        assert_eq!(fire_interval_for_wave(1, 1000.0, &waves), 1000.0);
        assert!((fire_interval_for_wave(2, 1000.0, &waves) - 850.0).abs() < 1e-3);
        assert_eq!(fire_interval_for_wave(50, 1000.0, &waves), waves.min_fire_interval_ms);
    }

    #[test]
    fn test_normal_progression() {
        let mut wc = controller();
        assert_eq!(wc.observe_enemy_count(3), None);
        assert_eq!(
            wc.observe_enemy_count(0),
            Some(WaveAction::BeginTransition {
                next_wave: 2,
                delay_ms: 2000.0
            })
        );
        assert!(wc.is_transitioning());

        // Re-entrant empty reports while transitioning
        assert_eq!(wc.observe_enemy_count(0), None);

        match wc.complete_transition() {
            Some(WaveAction::SpawnWave { wave, fire_interval_ms }) => {
                assert_eq!(wave, 2);
                assert!((fire_interval_ms - 850.0).abs() < 1e-3);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(wc.phase(), WavePhase::Spawned);
        assert_eq!(wc.complete_transition(), None);
    }

    #[test]
    fn test_victory_on_last_wave() {
        let mut wc = controller();
        for _ in 1..wc.max_wave() {
            wc.observe_enemy_count(0);
            wc.complete_transition();
        }
        assert_eq!(wc.wave(), 5);
        assert_eq!(wc.observe_enemy_count(0), Some(WaveAction::EnterVictory { wave: 5 }));
        assert!(wc.is_victory());
        assert_eq!(wc.observe_enemy_count(0), None);
        assert_eq!(wc.complete_transition(), None);

        assert_eq!(
            wc.continue_after_victory(),
            Some(WaveAction::SpawnWave {
                wave: 1,
                fire_interval_ms: 1000.0
            })
        );
        assert_eq!(wc.wave(), 1);
        assert_eq!(wc.continue_after_victory(), None);
    }

    #[test]
    fn test_formation_grid() {
        let mut store = EntityStore::new();
        let mut rng = Pcg32::seed_from_u64(7);
        let ids = spawn_formation(&mut store, &SpawnSettings::default(), &EnemySettings::default(), &mut rng);
        assert_eq!(ids.len(), 15);
        assert_eq!(store.enemy_count(), 15);

        for (i, enemy) in store.enemies.iter().enumerate() {
            let row = (i / 5) as f32;
            let col = (i % 5) as f32;
            assert_eq!(enemy.pos, Vec2::new(100.0 + col * 80.0, 50.0 + row * 60.0));
            assert!((-50.0..=50.0).contains(&enemy.vel_x));
            assert_eq!(enemy.vel_x.fract(), 0.0);
        }
    }

    proptest! {
        #[test]
        fn prop_fire_interval_non_increasing(wave in 1u32..100) {
            let waves = WaveSettings::default();
            let here = fire_interval_for_wave(wave, 1000.0, &waves);
            let next = fire_interval_for_wave(wave + 1, 1000.0, &waves);
            prop_assert!(next <= here);
            prop_assert!(next >= waves.min_fire_interval_ms);
        }
    }
}
