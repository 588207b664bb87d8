//! Runner errors

use thiserror::Error;
use trailstop_strategy::{ConfigError, EngineError};

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Price feed error: {0}")]
    Feed(String),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Run timed out after {0} ms")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
