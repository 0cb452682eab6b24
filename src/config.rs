/// Tuning constants for a session, plus the rule that turns the pre-game
/// prompt's text into a platform count.
///
/// Every field has a default, so a JSON override file only needs to name
/// the values it changes.

use std::fs;
use std::num::IntErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ── Playfield ────────────────────────────────────────────────────────────
    pub width: f32,
    pub height: f32,
    pub fps: u32,

    // ── Player physics ───────────────────────────────────────────────────────
    pub gravity: f32,
    /// Vertical velocity applied on jump (negative is up).
    pub jump_power: f32,
    pub player_speed: f32,
    pub max_health: u32,
    pub animation_frame_ms: u64,

    // ── Coins & power-ups ────────────────────────────────────────────────────
    pub coin_spawn_ms: u64,
    pub coin_value: u32,
    pub powerup_chance: f64,
    pub powerup_heal: u32,
    /// Horizontal distance between a coin and the power-up spawned with it.
    pub powerup_offset_x: f32,

    // ── Enemies ──────────────────────────────────────────────────────────────
    pub max_enemies: usize,
    pub initial_enemies: usize,
    pub enemy_speed: f32,
    pub enemy_damage: u32,
    pub enemy_spawn_score_interval: u32,

    // ── Platforms ────────────────────────────────────────────────────────────
    pub max_platforms: usize,
    pub default_platforms: usize,
    pub platform_speed: f32,
    /// Maximum drift of a moving platform from where it was placed.
    pub platform_range: f32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 1100.0,
            height: 720.0,
            fps: 60,
            gravity: 0.8,
            jump_power: -16.0,
            player_speed: 8.0,
            max_health: 100,
            animation_frame_ms: 100,
            coin_spawn_ms: 3000,
            coin_value: 10,
            powerup_chance: 0.2,
            powerup_heal: 30,
            powerup_offset_x: 40.0,
            max_enemies: 10,
            initial_enemies: 3,
            enemy_speed: 2.0,
            enemy_damage: 10,
            enemy_spawn_score_interval: 500,
            max_platforms: 15,
            default_platforms: 5,
            platform_speed: 2.0,
            platform_range: 100.0,
        }
    }
}

impl Config {
    pub fn from_json_str(text: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config = Config::from_json_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "playfield must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        // Platform spacing reserves 200 units of headroom.
        if self.height <= 200.0 {
            return Err(ConfigError::Invalid(format!(
                "height must exceed 200, got {}",
                self.height
            )));
        }
        if self.fps == 0 {
            return Err(ConfigError::Invalid("fps must be at least 1".into()));
        }
        if self.max_platforms == 0 {
            return Err(ConfigError::Invalid("max_platforms must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.powerup_chance) {
            return Err(ConfigError::Invalid(format!(
                "powerup_chance must be within [0, 1], got {}",
                self.powerup_chance
            )));
        }
        if self.enemy_spawn_score_interval == 0 {
            return Err(ConfigError::Invalid(
                "enemy_spawn_score_interval must be positive".into(),
            ));
        }
        if self.initial_enemies > self.max_enemies {
            return Err(ConfigError::Invalid(format!(
                "initial_enemies ({}) exceeds max_enemies ({})",
                self.initial_enemies, self.max_enemies
            )));
        }
        if self.max_health == 0 {
            return Err(ConfigError::Invalid("max_health must be positive".into()));
        }
        Ok(())
    }

    /// Duration of one simulation frame at the target rate.
    pub fn frame_ms(&self) -> u64 {
        1000 / self.fps.max(1) as u64
    }

    pub fn clamp_platforms(&self, count: usize) -> usize {
        count.clamp(1, self.max_platforms.max(1))
    }
}

/// Turn whatever the player typed at the prompt into a platform count.
///
/// Non-numeric text falls back to `default_platforms`; numbers are clamped
/// into `[1, max_platforms]`, including ones too large for an `i64`.
pub fn parse_platform_count(text: &str, config: &Config) -> usize {
    match text.trim().parse::<i64>() {
        Ok(n) if n < 1 => 1,
        Ok(n) => config.clamp_platforms(usize::try_from(n).unwrap_or(usize::MAX)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => config.clamp_platforms(usize::MAX),
            IntErrorKind::NegOverflow => 1,
            _ => config.clamp_platforms(config.default_platforms),
        },
    }
}
