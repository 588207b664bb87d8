//! Strategy errors

use crate::window::WindowSide;
use thiserror::Error;
use trailstop_core::Price;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Price window is empty")]
    EmptyWindow,

    #[error("Invariant violated: {window} window empty after confirming {price}")]
    InvariantViolation { window: WindowSide, price: Price },
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Configuration loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
