//! Price Feed - Source of price observations for a position
//!
//! Produces the `PriceUpdated` stream the engine reacts to:
//! - A scripted list of prices (replays, tests)
//! - A seeded random walk on a tick grid (simulation)
//!
//! Closing the feed ends the position's history.

use crate::backtest::PriceTick;
use crate::error::{Result, RunnerError};
use chrono::TimeDelta;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use trailstop_core::{Price, Timestamp};

/// Configuration for the price feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceFeedConfig {
    /// Fixed prices to emit, in order; when empty a random walk is used
    pub script: Vec<Decimal>,
    /// Random walk starting price
    pub start_price: Decimal,
    /// Random walk price grid
    pub tick_size: Decimal,
    /// Largest move per update, in ticks
    pub max_ticks_per_step: u32,
    /// Number of random walk updates
    pub updates: usize,
    /// Time between updates
    pub interval_ms: u64,
    /// How long the history stays open after the last price
    pub hold_after_last_ms: u64,
    /// Seed for reproducible walks
    pub seed: Option<u64>,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            script: Vec::new(),
            start_price: dec!(100),
            tick_size: dec!(0.05),
            max_ticks_per_step: 4,
            updates: 120,
            interval_ms: 1_000,
            hold_after_last_ms: 0,
            seed: None,
        }
    }
}

impl PriceFeedConfig {
    /// Feed that replays exactly these prices
    pub fn scripted(prices: impl IntoIterator<Item = Decimal>, interval_ms: u64) -> Self {
        Self {
            script: prices.into_iter().collect(),
            interval_ms,
            ..Default::default()
        }
    }

    /// Total number of prices the feed will emit
    pub fn len(&self) -> usize {
        if self.script.is_empty() {
            self.updates
        } else {
            self.script.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generates price observations
pub struct PriceFeed {
    config: PriceFeedConfig,
    /// Last random walk price
    current: Decimal,
    /// Prices emitted so far
    emitted: usize,
    rng: StdRng,
}

impl PriceFeed {
    /// Create a new feed; seeded from config or entropy
    pub fn new(config: PriceFeedConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            current: config.start_price,
            config,
            emitted: 0,
            rng,
        }
    }

    /// Create with a specific seed for reproducible walks
    pub fn with_seed(config: PriceFeedConfig, seed: u64) -> Self {
        Self::new(PriceFeedConfig {
            seed: Some(seed),
            ..config
        })
    }

    pub fn config(&self) -> &PriceFeedConfig {
        &self.config
    }

    /// Next price, or None once the feed is exhausted
    pub fn next_price(&mut self) -> Option<Price> {
        if self.emitted >= self.config.len() {
            return None;
        }

        let price = match self.config.script.get(self.emitted) {
            Some(price) => *price,
            None => self.step(),
        };
        self.emitted += 1;
        Some(price)
    }

    /// One random walk step, kept at least one tick above zero
    fn step(&mut self) -> Price {
        let max = i64::from(self.config.max_ticks_per_step);
        let ticks = self.rng.gen_range(-max..=max);
        let next = self.current + self.config.tick_size * Decimal::from(ticks);

        self.current = next.max(self.config.tick_size);
        self.current
    }

    /// Remaining prices as ticks spaced by the feed interval, starting at `start`
    pub fn ticks(&mut self, start: Timestamp) -> Result<Vec<PriceTick>> {
        let interval_ms = self.config.interval_ms;
        let out_of_range =
            move || RunnerError::Feed(format!("interval of {}ms is out of range", interval_ms));
        let interval = i64::try_from(interval_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .ok_or_else(out_of_range)?;

        let mut ticks = Vec::with_capacity(self.config.len().saturating_sub(self.emitted));
        let mut at = Some(start);

        while let Some(price) = self.next_price() {
            let now = at.ok_or_else(out_of_range)?;
            ticks.push(PriceTick::new(now, price));
            at = now.checked_add_signed(interval);
        }
        Ok(ticks)
    }

    /// Emit every price into `tx`, sleeping the interval between them
    ///
    /// Dropping `tx` on return closes the history. Stops early when the
    /// receiver is gone (position already closed).
    pub async fn run(mut self, tx: mpsc::Sender<Price>) {
        let interval = std::time::Duration::from_millis(self.config.interval_ms);
        let mut first = true;

        while let Some(price) = self.next_price() {
            if !first {
                tokio::time::sleep(interval).await;
            }
            first = false;

            if tx.send(price).await.is_err() {
                log::debug!("Price feed receiver closed after {} prices", self.emitted);
                return;
            }
        }

        if self.config.hold_after_last_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(
                self.config.hold_after_last_ms,
            ))
            .await;
        }
        log::info!("Price feed finished after {} prices", self.emitted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_scripted_feed_replays_in_order() {
        let mut feed = PriceFeed::new(PriceFeedConfig::scripted(
            [dec!(14), dec!(5), dec!(5)],
            1_000,
        ));

        assert_eq!(feed.next_price(), Some(dec!(14)));
        assert_eq!(feed.next_price(), Some(dec!(5)));
        assert_eq!(feed.next_price(), Some(dec!(5)));
        assert_eq!(feed.next_price(), None);
    }

    #[test]
    fn test_random_walk_stays_on_grid_and_positive() {
        let config = PriceFeedConfig {
            start_price: dec!(0.2),
            tick_size: dec!(0.05),
            max_ticks_per_step: 10,
            updates: 500,
            ..Default::default()
        };
        let mut feed = PriceFeed::with_seed(config, 42);

        let mut count = 0;
        let mut previous = dec!(0.2);
        while let Some(price) = feed.next_price() {
            assert!(price >= dec!(0.05));
            assert!((price % dec!(0.05)).is_zero());
            assert!((price - previous).abs() <= dec!(0.5));
            previous = price;
            count += 1;
        }
        assert_eq!(count, 500);
    }

    #[test]
    fn test_same_seed_same_walk() {
        let config = PriceFeedConfig {
            updates: 50,
            ..Default::default()
        };
        let mut a = PriceFeed::with_seed(config.clone(), 7);
        let mut b = PriceFeed::with_seed(config, 7);

        let walk_a: Vec<_> = std::iter::from_fn(|| a.next_price()).collect();
        let walk_b: Vec<_> = std::iter::from_fn(|| b.next_price()).collect();
        assert_eq!(walk_a, walk_b);
    }

    #[test]
    fn test_ticks_are_spaced_by_interval() {
        let start = Utc::now();
        let mut feed = PriceFeed::new(PriceFeedConfig::scripted(
            [dec!(1), dec!(2), dec!(3)],
            1_500,
        ));

        let ticks = feed.ticks(start).unwrap();
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[0].at, start);
        assert_eq!(ticks[2].at - start, TimeDelta::milliseconds(3_000));
        assert_eq!(ticks[2].price, dec!(3));
    }

    #[test]
    fn test_ticks_reject_out_of_range_interval() {
        let start = Utc::now();

        // Does not fit in i64 milliseconds
        let mut feed = PriceFeed::new(PriceFeedConfig::scripted([dec!(1)], u64::MAX));
        assert!(matches!(feed.ticks(start), Err(RunnerError::Feed(_))));

        // Fits, but the second tick lands past the calendar
        let mut feed = PriceFeed::new(PriceFeedConfig::scripted(
            [dec!(1), dec!(2)],
            10_000_000_000_000_000,
        ));
        assert!(matches!(feed.ticks(start), Err(RunnerError::Feed(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_closes_channel_when_done() {
        let (tx, mut rx) = mpsc::channel(16);
        let feed = PriceFeed::new(PriceFeedConfig::scripted([dec!(1), dec!(2)], 100));
        tokio::spawn(feed.run(tx));

        assert_eq!(rx.recv().await, Some(dec!(1)));
        assert_eq!(rx.recv().await, Some(dec!(2)));
        assert_eq!(rx.recv().await, None);
    }
}
