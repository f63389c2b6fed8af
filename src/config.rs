//! Gameplay tunables.
//!
//! Defaults reproduce the classic 256x256 layout. A JSON file may override
//! any subset of fields.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Screen ===
    pub screen_width: f32,
    pub screen_height: f32,

    // === Stack ===
    /// Pancakes needed before the butter appears
    pub target_stack: u32,
    /// Height each stacked pancake adds to the catch rectangle
    pub step_height: f32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Distance from the bottom edge to the paddle's top
    pub paddle_bottom_offset: f32,
    /// Pixels per tick while a direction is held
    pub paddle_speed: f32,

    // === Items ===
    pub item_width: f32,
    pub item_height: f32,
    /// How far past the bottom edge an item may fall before it is dropped
    pub offscreen_margin: f32,

    // === Difficulty curves ===
    pub initial_spawn_interval: u32,
    pub min_spawn_interval: u32,
    pub burnt_base: f64,
    pub burnt_per_stack: f64,
    pub burnt_cap: f64,
    pub fall_speed_base: f32,
    pub fall_speed_per_stack: f32,
    /// Upper bound on the stack-dependent part of the fall speed
    pub fall_speed_bonus_cap: f32,
    pub butter_speed: f32,

    // === Presentation ===
    /// Ticks the stack stays highlighted after a catch
    pub flash_ticks: u32,
    pub ticks_per_second: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_width: 256.0,
            screen_height: 256.0,

            target_stack: 12,
            step_height: 16.0,

            paddle_width: 56.0,
            paddle_height: 10.0,
            paddle_bottom_offset: 28.0,
            paddle_speed: 3.0,

            item_width: 16.0,
            item_height: 16.0,
            offscreen_margin: 10.0,

            initial_spawn_interval: 32,
            min_spawn_interval: 16,
            burnt_base: 0.1,
            burnt_per_stack: 0.05,
            burnt_cap: 0.6,
            fall_speed_base: 2.0,
            fall_speed_per_stack: 1.0,
            fall_speed_bonus_cap: 15.0,
            butter_speed: 1.4,

            flash_ticks: 8,
            ticks_per_second: 30,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for io::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Io(inner) => inner,
            other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
        }
    }
}

impl Config {
    /// Read a JSON config file and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)))
            }
        }

        fn probability(name: &str, value: f64) -> Result<(), ConfigError> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{} must be within [0, 1], got {}", name, value)))
            }
        }

        positive("screen_width", self.screen_width)?;
        positive("screen_height", self.screen_height)?;
        positive("paddle_width", self.paddle_width)?;
        positive("paddle_height", self.paddle_height)?;
        positive("paddle_speed", self.paddle_speed)?;
        positive("item_width", self.item_width)?;
        positive("item_height", self.item_height)?;
        positive("fall_speed_base", self.fall_speed_base)?;
        positive("butter_speed", self.butter_speed)?;

        if !(self.step_height.is_finite() && self.step_height >= 0.0) {
            return Err(ConfigError::Invalid("step_height must not be negative".into()));
        }
        if !(self.offscreen_margin.is_finite() && self.offscreen_margin >= 0.0) {
            return Err(ConfigError::Invalid("offscreen_margin must not be negative".into()));
        }
        if !(self.fall_speed_per_stack >= 0.0 && self.fall_speed_bonus_cap >= 0.0) {
            return Err(ConfigError::Invalid("fall speed growth must not be negative".into()));
        }
        if self.paddle_width > self.screen_width {
            return Err(ConfigError::Invalid("paddle is wider than the screen".into()));
        }
        if self.item_width > self.screen_width {
            return Err(ConfigError::Invalid("items are wider than the screen".into()));
        }
        if self.paddle_bottom_offset < 0.0 || self.paddle_bottom_offset > self.screen_height {
            return Err(ConfigError::Invalid(
                "paddle_bottom_offset must lie within the screen".into(),
            ));
        }

        probability("burnt_base", self.burnt_base)?;
        probability("burnt_cap", self.burnt_cap)?;
        if self.burnt_per_stack < 0.0 {
            return Err(ConfigError::Invalid("burnt_per_stack must not be negative".into()));
        }
        if self.burnt_base > self.burnt_cap {
            return Err(ConfigError::Invalid("burnt_base exceeds burnt_cap".into()));
        }

        if self.min_spawn_interval == 0 {
            return Err(ConfigError::Invalid("min_spawn_interval must be at least 1".into()));
        }
        if self.min_spawn_interval > self.initial_spawn_interval {
            return Err(ConfigError::Invalid(
                "min_spawn_interval exceeds initial_spawn_interval".into(),
            ));
        }
        if self.ticks_per_second == 0 {
            return Err(ConfigError::Invalid("ticks_per_second must be at least 1".into()));
        }

        Ok(())
    }

    /// Chance that a non-butter spawn is burnt.
    pub fn burnt_probability(&self, stack_count: u32) -> f64 {
        (self.burnt_base + stack_count as f64 * self.burnt_per_stack).min(self.burnt_cap)
    }

    /// Fall speed of pancakes and burnt pancakes, pixels per tick.
    pub fn fall_speed(&self, stack_count: u32) -> f32 {
        let bonus = (stack_count as f32 * self.fall_speed_per_stack).min(self.fall_speed_bonus_cap);
        self.fall_speed_base + bonus
    }

    /// Ticks between spawn attempts.
    pub fn spawn_interval(&self, stack_count: u32) -> u32 {
        self.initial_spawn_interval
            .saturating_sub(stack_count)
            .max(self.min_spawn_interval)
    }

    /// Top-left x range available to a spawned item.
    pub fn max_item_x(&self) -> f32 {
        (self.screen_width - self.item_width).max(0.0)
    }
}
