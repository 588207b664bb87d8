//! Backtest - deterministic replay in virtual time
//!
//! Runs the same engine over a timestamped price history without sleeping.
//! Pending deliveries (price ticks and the engine's confirmations) sit in a
//! priority queue keyed by due time. At equal timestamps confirmations go
//! before price ticks, and within a kind the scheduling order is kept.

use crate::error::{Result, RunnerError};
use chrono::TimeDelta;
use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use trailstop_core::{OutboundMessage, Price, StrategyEvent, Timestamp};
use trailstop_ports::RecordingPublisher;
use trailstop_strategy::{HandleOutcome, StrategyEngine, TrailingStopConfig};
use uuid::Uuid;

/// One observed price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTick {
    pub at: Timestamp,
    pub price: Price,
}

impl PriceTick {
    pub fn new(at: Timestamp, price: Price) -> Self {
        Self { at, price }
    }
}

/// Delivery order at equal timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Lane {
    Confirmation,
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Pending {
    seq: u64,
    event: StrategyEvent,
}

type DueKey = Reverse<(Timestamp, Lane, u64)>;

/// Outcome of a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub position_id: Uuid,
    pub entry_price: Price,
    /// When the sell was emitted, if it was
    pub sold_at: Option<Timestamp>,
    /// Last observed price at the time of the sell
    pub sell_price: Option<Price>,
    pub final_threshold: Price,
    /// Initial stop followed by every raise
    pub threshold_history: Vec<(Timestamp, Price)>,
    pub events_processed: usize,
    /// Deliveries still due after the end of the history
    pub pending_at_end: usize,
}

impl BacktestReport {
    pub fn sold(&self) -> bool {
        self.sold_at.is_some()
    }
}

/// Replays a price history through a fresh engine
pub struct Backtest {
    config: TrailingStopConfig,
    entry_price: Price,
}

impl Backtest {
    pub fn new(config: TrailingStopConfig, entry_price: Price) -> Self {
        Self {
            config,
            entry_price,
        }
    }

    /// Replay up to the last tick
    pub fn run(&self, entry_at: Timestamp, ticks: &[PriceTick]) -> Result<BacktestReport> {
        let end_at = ticks.last().map_or(entry_at, |t| t.at);
        self.run_until(entry_at, ticks, end_at)
    }

    /// Replay, delivering everything due at or before `end_at`
    pub fn run_until(
        &self,
        entry_at: Timestamp,
        ticks: &[PriceTick],
        end_at: Timestamp,
    ) -> Result<BacktestReport> {
        if ticks.windows(2).any(|w| w[1].at < w[0].at) {
            return Err(RunnerError::Feed("price ticks out of order".into()));
        }
        if ticks.first().is_some_and(|t| t.at < entry_at) {
            return Err(RunnerError::Feed("price tick before position entry".into()));
        }

        let publisher = RecordingPublisher::new();
        let mut engine = StrategyEngine::with_config(self.config.clone(), publisher.clone());
        let mut queue: PriorityQueue<Pending, DueKey> = PriorityQueue::new();
        let mut seq = 0u64;

        for tick in ticks {
            queue.push(
                Pending {
                    seq,
                    event: StrategyEvent::price_updated(tick.price),
                },
                Reverse((tick.at, Lane::Tick, seq)),
            );
            seq += 1;
        }

        engine.handle_position_acquired(self.entry_price)?;
        let mut report = BacktestReport {
            position_id: engine.position_id(),
            entry_price: self.entry_price,
            sold_at: None,
            sell_price: None,
            final_threshold: engine.sell_threshold(),
            threshold_history: vec![(entry_at, engine.sell_threshold())],
            events_processed: 1,
            pending_at_end: 0,
        };
        let mut last_price = None;
        let mut cursor = publisher.len();

        while engine.is_runnable() {
            let Some((_, Reverse((due, _, _)))) = queue.peek() else {
                break;
            };
            let now = *due;
            if now > end_at {
                break;
            }
            let Some((pending, _)) = queue.pop() else {
                break;
            };

            if let StrategyEvent::PriceUpdated { price } = pending.event {
                last_price = Some(price);
            }

            let outcome = engine.handle(pending.event).inspect_err(|e| {
                log::error!("[{}] Backtest stopped at {}: {}", report.position_id, now, e);
            })?;
            report.events_processed += 1;

            match outcome {
                HandleOutcome::ThresholdRaised { to, .. } => {
                    report.threshold_history.push((now, to));
                }
                HandleOutcome::Sold { .. } => {
                    report.sold_at = Some(now);
                    report.sell_price = last_price;
                }
                HandleOutcome::Applied | HandleOutcome::Ignored => {}
            }

            for message in publisher.messages_since(cursor) {
                if let OutboundMessage::Schedule(scheduled) = message {
                    let due = TimeDelta::from_std(scheduled.delay)
                        .ok()
                        .and_then(|delay| now.checked_add_signed(delay))
                        .ok_or_else(|| {
                            RunnerError::Feed(format!(
                                "delay of {:?} from {} is out of range",
                                scheduled.delay, now
                            ))
                        })?;
                    queue.push(
                        Pending {
                            seq,
                            event: scheduled.payload,
                        },
                        Reverse((due, Lane::Confirmation, seq)),
                    );
                    seq += 1;
                }
            }
            cursor = publisher.len();
        }

        report.final_threshold = engine.sell_threshold();
        report.pending_at_end = queue.len();

        log::info!(
            "[{}] Backtest done: sold={} threshold={} events={}",
            report.position_id,
            report.sold(),
            report.final_threshold,
            report.events_processed
        );
        Ok(report)
    }
}
