//! Game configuration

use crate::board::{check_board_size, Palette, DEFAULT_BOARD_SIZE};
use crate::error::ConfigError;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to build the same starting position anywhere
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Board edge length (`size x size` tiles)
    pub size: usize,
    /// Board generation seed
    pub seed: u64,
    #[serde(default)]
    pub palette: Palette,
    /// Local undo depth
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            seed: 0,
            palette: Palette::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl GameConfig {
    pub fn new(size: usize, seed: u64) -> Self {
        Self {
            size,
            seed,
            ..Default::default()
        }
    }

    /// Use the first `count` palette colors
    pub fn with_colors(mut self, count: usize) -> Result<Self, ConfigError> {
        self.palette = Palette::with_size(count)?;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_board_size(self.size)?;
        self.palette.validate()
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
