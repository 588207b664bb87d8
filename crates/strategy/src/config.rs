//! Trailing-stop configuration
//!
//! Loadable from JSON; every field falls back to the standard strategy
//! parameters when omitted.

use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Parameters of the trailing-stop engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailingStopConfig {
    /// Distance kept between the stable price and the sell threshold
    /// (same currency unit as prices)
    pub stop_offset: Decimal,
    /// Delay before an observation is confirmed in the up window
    pub up_delay_ms: u64,
    /// Delay before an observation is confirmed in the down window
    /// (shorter than the up delay so the sell side reacts faster)
    pub down_delay_ms: u64,
}

impl Default for TrailingStopConfig {
    fn default() -> Self {
        Self {
            stop_offset: dec!(0.1),
            up_delay_ms: 10_000,
            down_delay_ms: 7_000,
        }
    }
}

impl TrailingStopConfig {
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

    /// Check the parameters the engine relies on
    ///
    /// Delays must be positive: an observation has to be in its windows
    /// before its own confirmation can come back.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stop_offset < Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "stop_offset must be non-negative, got {}",
                self.stop_offset
            )));
        }
        if self.up_delay_ms == 0 {
            return Err(ConfigError::Invalid("up_delay_ms must be positive".into()));
        }
        if self.down_delay_ms == 0 {
            return Err(ConfigError::Invalid("down_delay_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn up_delay(&self) -> Duration {
        Duration::from_millis(self.up_delay_ms)
    }

    pub fn down_delay(&self) -> Duration {
        Duration::from_millis(self.down_delay_ms)
    }
}
