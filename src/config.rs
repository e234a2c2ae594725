//! Configuration loading for micromouse

use crate::cell::Cell;
use crate::error::{NavError, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MouseConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Run/status server settings
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Listen address (default: localhost:8778)
    #[serde(default = "default_address")]
    pub address: String,
}

/// Navigation controller settings
#[derive(Clone, Debug, Deserialize)]
pub struct NavigationConfig {
    /// Consecutive actuation failures tolerated before the run is aborted (default: 3)
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: usize,
}

/// Simulated maze and mouse
#[derive(Clone, Debug, Deserialize)]
pub struct SimulationConfig {
    /// Maze width in cells (default: 8)
    #[serde(default = "default_size")]
    pub width: usize,

    /// Maze height in cells (default: 8)
    #[serde(default = "default_size")]
    pub height: usize,

    /// Seed for generated mazes (default: 2024)
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// ASCII maze file used instead of a generated maze when its size matches
    #[serde(default)]
    pub maze_file: Option<String>,

    /// Time one move takes in milliseconds (default: 50)
    #[serde(default = "default_move_delay_ms")]
    pub move_delay_ms: u64,

    /// Start cell for standalone runs (default: top-left corner)
    #[serde(default = "default_start")]
    pub start: Cell,

    /// Goal cell for standalone runs (default: bottom-right corner of the default maze)
    #[serde(default = "default_goal")]
    pub goal: Cell,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: default_size(),
            height: default_size(),
            seed: default_seed(),
            maze_file: None,
            move_delay_ms: default_move_delay_ms(),
            start: default_start(),
            goal: default_goal(),
        }
    }
}

// Default value functions
fn default_address() -> String {
    crate::ADDRESS.to_string()
}
fn default_max_consecutive_failures() -> usize {
    3
}
fn default_size() -> usize {
    8
}
fn default_seed() -> u64 {
    2024
}
fn default_move_delay_ms() -> u64 {
    50
}
fn default_start() -> Cell {
    Cell::new(0, 0)
}
fn default_goal() -> Cell {
    Cell::new(default_size() - 1, default_size() - 1)
}

impl MouseConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read config file: {}", e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: MouseConfig = toml::from_str(content)?;
        Ok(config)
    }
}
