//! Trailing-Stop Simulation - full wiring for one position
//!
//! ```text
//! PriceFeed ──► prices ──► PositionRunner ──► Sell ──► order sink
//!                               ▲    │
//!                               │    └──► DelayedMessageScheduler
//!                               └──────── confirmations
//! ```

use crate::config::SimulationConfig;
use crate::error::{Result, RunnerError};
use crate::event_feed::PriceFeed;
use crate::position::{PositionRunner, RunSummary};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// Feed channel capacity
const FEED_BUFFER: usize = 1024;

/// Results of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub summary: RunSummary,
    /// Sell orders that reached the order sink
    pub sell_orders: usize,
}

pub struct TrailingStopSimulation {
    config: SimulationConfig,
}

impl TrailingStopSimulation {
    /// Create a simulation; the config is validated up front
    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the position to its sell or to the end of the feed
    pub async fn run(self) -> Result<SimulationResults> {
        let (feed_tx, feed_rx) = mpsc::channel(FEED_BUFFER);
        let (sell_tx, mut sell_rx) = mpsc::unbounded_channel();

        let feed = PriceFeed::new(self.config.feed.clone());
        let feed_handle = tokio::spawn(feed.run(feed_tx));

        let runner = PositionRunner::new(
            self.config.strategy.clone(),
            self.config.entry_price,
            feed_rx,
            sell_tx,
        );

        let outcome = match self.config.timeout_ms {
            Some(ms) => tokio::time::timeout(Duration::from_millis(ms), runner.run())
                .await
                .unwrap_or(Err(RunnerError::Timeout(ms))),
            None => runner.run().await,
        };

        // Position is closed either way; stop producing prices for it
        feed_handle.abort();
        if let Err(e) = feed_handle.await
            && !e.is_cancelled()
        {
            return Err(RunnerError::Feed(e.to_string()));
        }
        let summary = outcome?;

        let mut sell_orders = 0;
        while sell_rx.try_recv().is_ok() {
            sell_orders += 1;
        }

        Ok(SimulationResults {
            summary,
            sell_orders,
        })
    }
}
