//! Trailing-Stop Simulation Integration Test
//!
//! Tests the full wiring under a paused tokio clock:
//! - Price feed (scripted or random walk)
//! - Position runner owning the engine
//! - Timer-backed delayed confirmations
//! - Sell order sink
//!
//! Feed intervals are chosen so no confirmation is ever due at the same
//! instant as another delivery.

use rust_decimal_macros::dec;
use trailstop_runner::{
    Backtest, PriceFeed, PriceFeedConfig, RunnerError, SimulationConfig, TrailingStopSimulation,
};
use trailstop_strategy::{EngineError, TrailingStopConfig};

fn scripted(entry: rust_decimal::Decimal, feed: PriceFeedConfig) -> SimulationConfig {
    SimulationConfig {
        entry_price: entry,
        strategy: TrailingStopConfig::default(),
        feed,
        timeout_ms: Some(600_000),
    }
}

/// A confirmed drop below the stop sells exactly once
#[tokio::test(start_paused = true)]
async fn test_confirmed_drop_sells() {
    let _ = env_logger::try_init();

    let feed = PriceFeedConfig {
        hold_after_last_ms: 8_000,
        ..PriceFeedConfig::scripted([dec!(14), dec!(5), dec!(5)], 1_000)
    };
    let sim = TrailingStopSimulation::with_config(scripted(dec!(10), feed)).unwrap();

    let results = sim.run().await.unwrap();

    assert!(results.summary.sold);
    assert_eq!(results.sell_orders, 1);
    assert_eq!(results.summary.final_threshold, dec!(9.9));
    assert_eq!(results.summary.updates_processed, 3);
    // DelayedPriceDown(14) at t+7 is the first and last confirmation
    assert_eq!(results.summary.confirmations_processed, 1);
}

/// Rising market: up-confirmations ratchet the stop, no sell
#[tokio::test(start_paused = true)]
async fn test_rising_market_ratchets_threshold() {
    let _ = env_logger::try_init();

    // Prices 101..=110 every 1.3s; history ends with the last price at t=11.7s
    let prices: Vec<_> = (101..=110).map(rust_decimal::Decimal::from).collect();
    let feed = PriceFeedConfig::scripted(prices, 1_300);
    let sim = TrailingStopSimulation::with_config(scripted(dec!(100), feed)).unwrap();

    let results = sim.run().await.unwrap();
    let summary = results.summary;

    assert!(!summary.sold);
    assert_eq!(results.sell_orders, 0);
    assert_eq!(summary.updates_processed, 10);
    // Downs at 7.0, 8.3, 9.6, 10.9; ups at 10.0, 11.3
    assert_eq!(summary.confirmations_processed, 6);
    assert_eq!(summary.threshold_raises, 2);
    assert_eq!(summary.final_threshold, dec!(102.9));
    assert_eq!(summary.abandoned_confirmations, 14);
}

/// History that ends before any confirmation leaves the stop untouched
#[tokio::test(start_paused = true)]
async fn test_short_history_ends_quietly() {
    let feed = PriceFeedConfig::scripted([dec!(50), dec!(10)], 1_000);
    let sim = TrailingStopSimulation::with_config(scripted(dec!(50), feed)).unwrap();

    let results = sim.run().await.unwrap();

    assert!(!results.summary.sold);
    assert_eq!(results.summary.confirmations_processed, 0);
    assert_eq!(results.summary.final_threshold, dec!(49.9));
    assert_eq!(results.summary.abandoned_confirmations, 4);
}

/// A gap longer than the delays drains a window; the error surfaces
#[tokio::test(start_paused = true)]
async fn test_drained_window_surfaces_error() {
    let feed = PriceFeedConfig {
        hold_after_last_ms: 30_000,
        ..PriceFeedConfig::scripted([dec!(11)], 1_000)
    };
    let sim = TrailingStopSimulation::with_config(scripted(dec!(10), feed)).unwrap();

    let err = sim.run().await.unwrap_err();
    assert!(matches!(
        err,
        RunnerError::Engine(EngineError::InvariantViolation { .. })
    ));
}

/// Random walk run completes and agrees with itself
#[tokio::test(start_paused = true)]
async fn test_random_walk_simulation_runs() {
    let _ = env_logger::try_init();

    let config = SimulationConfig {
        feed: PriceFeedConfig {
            updates: 300,
            interval_ms: 1_000,
            seed: Some(42),
            ..Default::default()
        },
        timeout_ms: Some(3_600_000),
        ..Default::default()
    };
    let sim = TrailingStopSimulation::with_config(config).unwrap();

    let results = sim.run().await.unwrap();
    let summary = results.summary;

    assert_eq!(results.sell_orders, usize::from(summary.sold));
    assert!(summary.updates_processed <= 300);
    assert!(summary.final_threshold >= dec!(99.9));
    if !summary.sold {
        assert_eq!(summary.updates_processed, 300);
    }
}

/// Virtual-time replay of the same scripted history sells at the same point
#[test]
fn test_backtest_matches_scripted_run() {
    let start = chrono::Utc::now();
    let ticks = PriceFeed::new(PriceFeedConfig::scripted(
        [dec!(14), dec!(5), dec!(5), dec!(5), dec!(5), dec!(5), dec!(5), dec!(5)],
        1_000,
    ))
    .ticks(start)
    .unwrap();

    let report = Backtest::new(TrailingStopConfig::default(), dec!(10))
        .run(start, &ticks)
        .unwrap();

    assert!(report.sold());
    assert_eq!(report.sold_at, Some(start + chrono::TimeDelta::seconds(7)));
    assert_eq!(report.final_threshold, dec!(9.9));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = SimulationConfig {
        entry_price: dec!(-1),
        ..Default::default()
    };
    assert!(matches!(
        TrailingStopSimulation::with_config(config),
        Err(RunnerError::Config(_))
    ));
}
