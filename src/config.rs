//! Game configuration and its validation.

use crate::settle::SettlePolicy;
use clap::ValueEnum;
use thiserror::Error;

/// Standard playfield: 12 columns, 20 rows.
pub const DEFAULT_WIDTH: usize = 12;
pub const DEFAULT_HEIGHT: usize = 20;

/// The widest bounding box (I piece) must fit at spawn.
pub const MIN_WIDTH: usize = 4;
pub const MAX_DIMENSION: usize = 64;

/// Starting drop speed picked before a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Speed {
    #[default]
    Slow,
    Normal,
    Fast,
}

impl Speed {
    /// Initial drop interval in milliseconds.
    pub fn interval_ms(self) -> u32 {
        match self {
            Self::Slow => 250,
            Self::Normal => 175,
            Self::Fast => 120,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("width {0} is too small: pieces need at least {min} columns", min = MIN_WIDTH)]
    WidthTooSmall(usize),
    #[error("height must be at least 1")]
    ZeroHeight,
    #[error("{width}x{height} exceeds the {max}x{max} limit", max = MAX_DIMENSION)]
    TooLarge { width: usize, height: usize },
}

/// Options that shape a game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub speed: Speed,
    pub policy: SettlePolicy,
    /// Fixed seed for piece kinds and spawn columns; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            speed: Speed::default(),
            policy: SettlePolicy::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_WIDTH {
            return Err(ConfigError::WidthTooSmall(self.width));
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(ConfigError::TooLarge {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
