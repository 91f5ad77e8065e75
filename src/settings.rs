//! Game settings and balance
//!
//! Every tuning value the combat core consumes. Persisted in LocalStorage on
//! the web so designers can tweak a build without recompiling.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Enemy shooting AI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShootingMode {
    /// Straight down from a random enemy
    Random,
    /// Predictive shots at the player, probability grows per wave
    #[default]
    Aimed,
    /// Reserved, behaves as `Random`
    Formation,
    /// Reserved, behaves as `Random`
    Positioning,
}

impl ShootingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShootingMode::Random => "Random",
            ShootingMode::Aimed => "Aimed",
            ShootingMode::Formation => "Formation",
            ShootingMode::Positioning => "Positioning",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "random" => Some(ShootingMode::Random),
            "aimed" => Some(ShootingMode::Aimed),
            "formation" => Some(ShootingMode::Formation),
            "positioning" => Some(ShootingMode::Positioning),
            _ => None,
        }
    }

    /// Whether the mode has an implementation of its own
    pub fn is_implemented(&self) -> bool {
        matches!(self, ShootingMode::Random | ShootingMode::Aimed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Horizontal speed (px/s)
    pub speed: f32,
    pub initial_x: f32,
    pub initial_y: f32,
    /// Upward speed of player bullets (px/s)
    pub bullet_speed: f32,
    pub shoot_cooldown_ms: f32,
    pub mobile_shoot_cooldown_ms: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            initial_x: PLAYER_INITIAL_X,
            initial_y: PLAYER_INITIAL_Y,
            bullet_speed: PLAYER_BULLET_SPEED,
            shoot_cooldown_ms: SHOOT_COOLDOWN_MS,
            mobile_shoot_cooldown_ms: MOBILE_SHOOT_COOLDOWN_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySettings {
    /// Initial horizontal speed is drawn from `speed_min..=speed_max`
    pub speed_min: i32,
    pub speed_max: i32,
    pub bullet_speed: f32,
    pub base_fire_interval_ms: f32,
}

impl Default for EnemySettings {
    fn default() -> Self {
        Self {
            speed_min: ENEMY_SPEED_MIN,
            speed_max: ENEMY_SPEED_MAX,
            bullet_speed: ENEMY_BULLET_SPEED,
            base_fire_interval_ms: BASE_FIRE_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AimedSettings {
    pub enabled: bool,
    /// First wave on which aimed shots can happen
    pub start_wave: u32,
    pub base_probability: f32,
    pub probability_increment: f32,
    /// How much of the player's velocity to lead by (0 = none)
    pub prediction_factor: f32,
    /// 1.0 = perfect aim
    pub accuracy: f32,
    pub show_warning: bool,
    pub warning_duration_ms: f32,
}

impl Default for AimedSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            start_wave: AIMED_START_WAVE,
            base_probability: AIMED_BASE_PROBABILITY,
            probability_increment: AIMED_PROBABILITY_INCREMENT,
            prediction_factor: AIMED_PREDICTION_FACTOR,
            accuracy: AIMED_ACCURACY,
            show_warning: true,
            warning_duration_ms: AIMED_WARNING_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingSettings {
    pub mode: ShootingMode,
    pub aimed: AimedSettings,
}

/// Enemy formation layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    pub rows: u32,
    pub cols: u32,
    pub spacing_x: f32,
    pub spacing_y: f32,
    pub start_x: f32,
    pub start_y: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            rows: SPAWN_ROWS,
            cols: SPAWN_COLS,
            spacing_x: SPAWN_SPACING_X,
            spacing_y: SPAWN_SPACING_Y,
            start_x: SPAWN_START_X,
            start_y: SPAWN_START_Y,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// Half of one enemy blink cycle
    pub blink_duration_ms: f32,
    pub blink_repeat: u32,
    pub hit_blink_duration_ms: f32,
    pub respawn_flash_ms: f32,
    pub invincible_duration_ms: f32,
    pub hit_text_duration_ms: f32,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            blink_duration_ms: BLINK_DURATION_MS,
            blink_repeat: BLINK_REPEAT,
            hit_blink_duration_ms: HIT_BLINK_DURATION_MS,
            respawn_flash_ms: RESPAWN_FLASH_MS,
            invincible_duration_ms: INVINCIBLE_DURATION_MS,
            hit_text_duration_ms: HIT_TEXT_DURATION_MS,
        }
    }
}

impl EffectSettings {
    /// Total length of the enemy death blink (yoyo, so two halves per cycle)
    pub fn enemy_blink_total_ms(&self) -> f32 {
        self.blink_duration_ms * 2.0 * (self.blink_repeat + 1) as f32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    pub initial_lives: u32,
    pub points_per_enemy: u64,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            initial_lives: INITIAL_LIVES,
            points_per_enemy: POINTS_PER_ENEMY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveSettings {
    pub max_wave: u32,
    /// Applied once per wave past the first
    pub fire_rate_multiplier: f32,
    pub min_fire_interval_ms: f32,
    pub transition_delay_ms: f32,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            max_wave: MAX_WAVE,
            fire_rate_multiplier: FIRE_RATE_MULTIPLIER,
            min_fire_interval_ms: MIN_FIRE_INTERVAL_MS,
            transition_delay_ms: WAVE_TRANSITION_DELAY_MS,
        }
    }
}

/// Full game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerSettings,
    pub enemy: EnemySettings,
    pub shooting: ShootingSettings,
    pub spawn: SpawnSettings,
    pub effects: EffectSettings,
    pub rules: RuleSettings,
    pub waves: WaveSettings,
    /// Touch device: auto-fire and the mobile cooldown
    pub touch_controls: bool,
}

impl Settings {
    /// Settings with a specific shooting AI
    pub fn with_mode(mode: ShootingMode) -> Self {
        let mut settings = Self::default();
        settings.shooting.mode = mode;
        settings
    }

    /// Cooldown between player shots for the current device
    pub fn effective_shoot_cooldown_ms(&self) -> f32 {
        if self.touch_controls {
            self.player.mobile_shoot_cooldown_ms
        } else {
            self.player.shoot_cooldown_ms
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "star_invaders_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        use crate::persistence::{KeyValueStore, LocalStorage};

        match LocalStorage::open().and_then(|s| s.get(Self::STORAGE_KEY)) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings unavailable: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        use crate::persistence::{KeyValueStore, LocalStorage};

        let result = self
            .to_json()
            .map_err(|e| crate::persistence::StorageError::Write(e.to_string()))
            .and_then(|json| LocalStorage::open()?.set(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Settings not saved: {}", e),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let s = Settings::default();
        assert_eq!(s.shooting.mode, ShootingMode::Aimed);
        assert_eq!(s.spawn.rows * s.spawn.cols, 15);
        assert_eq!(s.waves.max_wave, 5);
        assert_eq!(s.rules.initial_lives, 3);
        assert!((s.enemy.base_fire_interval_ms - 1000.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_enemy_blink_total() {
        let effects = EffectSettings::default();
        // 80ms each way, 4 cycles
        assert!((effects.enemy_blink_total_ms() - 640.0).abs() < 0.001);
    }

    #[test]
    fn test_touch_cooldown() {
        let mut s = Settings::default();
        assert!((s.effective_shoot_cooldown_ms() - 250.0).abs() < 0.001);
        s.touch_controls = true;
        assert!((s.effective_shoot_cooldown_ms() - 150.0).abs() < 0.001);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(ShootingMode::from_str("AIMED"), Some(ShootingMode::Aimed));
        assert_eq!(ShootingMode::from_str("nope"), None);
        assert!(!ShootingMode::Formation.is_implemented());
        assert_eq!(ShootingMode::Positioning.as_str(), "Positioning");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{"touch_controls": true}"#).unwrap();
        assert!(s.touch_controls);
        assert_eq!(s.waves.max_wave, MAX_WAVE);

        let round = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(round.spawn.cols, s.spawn.cols);
    }

    #[test]
    fn test_partial_nested_json() {
        let s = Settings::from_json(r#"{"waves": {"max_wave": 3}, "shooting": {"aimed": {"accuracy": 0.5}}}"#).unwrap();
        assert_eq!(s.waves.max_wave, 3);
        assert!((s.waves.fire_rate_multiplier - FIRE_RATE_MULTIPLIER).abs() < f32::EPSILON);
        assert!((s.waves.transition_delay_ms - WAVE_TRANSITION_DELAY_MS).abs() < f32::EPSILON);
        assert!((s.shooting.aimed.accuracy - 0.5).abs() < f32::EPSILON);
        assert_eq!(s.shooting.aimed.start_wave, AIMED_START_WAVE);
        assert_eq!(s.shooting.mode, ShootingMode::Aimed);
    }
}
