//! Position Runner - Runs the trailing-stop engine for one position
//!
//! The runner is the engine's single owner, so handlers never interleave:
//! - Opens the position with `PositionAcquired`
//! - Turns feed prices into `PriceUpdated`
//! - Hands due confirmations from the scheduler back to the engine
//! - Stops on the sell, or when the price history ends

use crate::error::{Result, RunnerError};
use crate::publisher::ChannelPublisher;
use crate::scheduler::DelayedMessageScheduler;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use trailstop_core::{Price, Sell, StrategyEvent};
use trailstop_strategy::{HandleOutcome, StrategyEngine, TrailingStopConfig};
use uuid::Uuid;

/// What happened during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub position_id: Uuid,
    pub entry_price: Price,
    pub sold: bool,
    pub final_threshold: Price,
    pub updates_processed: usize,
    pub confirmations_processed: usize,
    pub threshold_raises: usize,
    /// Confirmations still in flight when the run ended
    pub abandoned_confirmations: usize,
}

pub struct PositionRunner {
    engine: StrategyEngine<ChannelPublisher>,
    entry_price: Price,
    /// Price observations (closed = history ended)
    feed_rx: mpsc::Receiver<Price>,
    /// Deliveries from the scheduler
    confirmation_rx: mpsc::UnboundedReceiver<StrategyEvent>,
    summary: RunSummary,
}

impl PositionRunner {
    /// Create a runner; the sell order goes to `sell_tx`
    pub fn new(
        config: TrailingStopConfig,
        entry_price: Price,
        feed_rx: mpsc::Receiver<Price>,
        sell_tx: mpsc::UnboundedSender<Sell>,
    ) -> Self {
        let (scheduler, confirmation_rx) = DelayedMessageScheduler::channel();
        let engine = StrategyEngine::with_config(config, ChannelPublisher::new(scheduler, sell_tx));

        let summary = RunSummary {
            position_id: engine.position_id(),
            entry_price,
            sold: false,
            final_threshold: engine.sell_threshold(),
            updates_processed: 0,
            confirmations_processed: 0,
            threshold_raises: 0,
            abandoned_confirmations: 0,
        };

        Self {
            engine,
            entry_price,
            feed_rx,
            confirmation_rx,
            summary,
        }
    }

    pub fn position_id(&self) -> Uuid {
        self.engine.position_id()
    }

    /// Hand one event to the engine and account for the outcome
    fn apply(&mut self, event: StrategyEvent) -> Result<()> {
        let outcome = self.engine.handle(event).map_err(|e| {
            log::error!("[{}] {} failed: {}", self.summary.position_id, event.kind(), e);
            RunnerError::Engine(e)
        })?;

        match event {
            StrategyEvent::PriceUpdated { .. } => self.summary.updates_processed += 1,
            StrategyEvent::DelayedPriceUp { .. } | StrategyEvent::DelayedPriceDown { .. } => {
                self.summary.confirmations_processed += 1
            }
            StrategyEvent::PositionAcquired { .. } => {}
        }

        match outcome {
            HandleOutcome::ThresholdRaised { .. } => self.summary.threshold_raises += 1,
            HandleOutcome::Sold { .. } => self.summary.sold = true,
            HandleOutcome::Applied | HandleOutcome::Ignored => {}
        }
        Ok(())
    }

    /// Run until the sell or the end of the price history
    pub async fn run(mut self) -> Result<RunSummary> {
        log::info!(
            "[{}] Position runner started, entry {}",
            self.summary.position_id,
            self.entry_price
        );

        self.apply(StrategyEvent::position_acquired(self.entry_price))?;

        while self.engine.is_runnable() {
            tokio::select! {
                // Confirmations already due go before new prices
                biased;

                confirmation = self.confirmation_rx.recv() => {
                    match confirmation {
                        Some(event) => self.apply(event)?,
                        None => return Err(RunnerError::ChannelClosed),
                    }
                }

                price = self.feed_rx.recv() => {
                    match price {
                        Some(price) => self.apply(StrategyEvent::price_updated(price))?,
                        None => {
                            log::info!("[{}] Price history ended", self.summary.position_id);
                            break;
                        }
                    }
                }
            }
        }

        self.summary.final_threshold = self.engine.sell_threshold();
        self.summary.abandoned_confirmations = self.engine.publisher().scheduler().in_flight();

        log::info!(
            "[{}] Position runner stopped: sold={} threshold={} updates={} confirmations={}",
            self.summary.position_id,
            self.summary.sold,
            self.summary.final_threshold,
            self.summary.updates_processed,
            self.summary.confirmations_processed
        );
        Ok(self.summary)
    }
}
