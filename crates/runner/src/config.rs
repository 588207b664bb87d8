//! Simulation configuration
//!
//! JSON file layout:
//!
//! ```json
//! {
//!   "entry_price": "100",
//!   "strategy": { "stop_offset": "0.1", "up_delay_ms": 10000, "down_delay_ms": 7000 },
//!   "feed": { "start_price": "100", "tick_size": "0.05", "updates": 120, "interval_ms": 1000, "seed": 42 },
//!   "timeout_ms": 600000
//! }
//! ```

use crate::event_feed::PriceFeedConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use trailstop_strategy::{ConfigError, TrailingStopConfig};

/// Root configuration for a simulated position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Price the position was acquired at
    pub entry_price: Decimal,
    /// Engine parameters
    pub strategy: TrailingStopConfig,
    /// Price source
    pub feed: PriceFeedConfig,
    /// Upper bound on the run (simulated time under a paused clock)
    pub timeout_ms: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            entry_price: dec!(100),
            strategy: TrailingStopConfig::default(),
            feed: PriceFeedConfig::default(),
            timeout_ms: None,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.validate()?;

        if self.entry_price <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "entry_price must be positive, got {}",
                self.entry_price
            )));
        }
        if self.feed.script.is_empty() && self.feed.tick_size <= Decimal::ZERO {
            return Err(ConfigError::Invalid(
                "feed.tick_size must be positive for a random walk".into(),
            ));
        }
        Ok(())
    }
}
