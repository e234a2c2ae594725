//! Error types for the micromouse engine

use thiserror::Error;

use crate::cell::Cell;

/// Micromouse error type
#[derive(Error, Debug)]
pub enum NavError {
    /// Wall query between two cells that are not 4-neighbours.
    #[error("Cells {from} and {to} are not adjacent")]
    InvalidAdjacency { from: Cell, to: Cell },

    #[error("Cell {0} is outside the maze")]
    OutOfBounds(Cell),

    #[error("Invalid maze dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("A run is already in progress")]
    AlreadyRunning,

    /// The robot could not carry out a command. Recoverable for the run.
    #[error("Actuation failure: {0}")]
    ActuationFailure(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for NavError {
    fn from(e: serde_json::Error) -> Self {
        NavError::Protocol(e.to_string())
    }
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
