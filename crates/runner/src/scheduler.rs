//! Delayed Message Scheduler
//!
//! Re-delivers the engine's confirmation requests after their delay.
//! Each request gets its own sleeping task, so there is no ordering between
//! in-flight messages beyond "not before `delay`". Nothing can be cancelled:
//! a confirmation for a closed position is still delivered and the engine
//! ignores it, or it is dropped if the engine is already gone.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::mpsc;
use trailstop_core::{ScheduledMessage, StrategyEvent};

/// Timer-backed scheduler feeding a confirmation channel
#[derive(Debug, Clone)]
pub struct DelayedMessageScheduler {
    /// Where due confirmations are delivered
    confirmation_tx: mpsc::UnboundedSender<StrategyEvent>,
    /// Scheduled but not yet delivered
    in_flight: Arc<AtomicUsize>,
    /// Total ever scheduled
    scheduled: Arc<AtomicU64>,
}

impl DelayedMessageScheduler {
    pub fn new(confirmation_tx: mpsc::UnboundedSender<StrategyEvent>) -> Self {
        Self {
            confirmation_tx,
            in_flight: Arc::new(AtomicUsize::new(0)),
            scheduled: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a scheduler together with the receiving end of its deliveries
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StrategyEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Deliver `message.payload` no earlier than `message.delay` from now
    ///
    /// Non-blocking. Must be called from within a tokio runtime.
    pub fn schedule(&self, message: ScheduledMessage) {
        let tx = self.confirmation_tx.clone();
        let in_flight = Arc::clone(&self.in_flight);

        in_flight.fetch_add(1, Ordering::SeqCst);
        self.scheduled.fetch_add(1, Ordering::Relaxed);

        tokio::spawn(async move {
            tokio::time::sleep(message.delay).await;
            if tx.send(message.payload).is_err() {
                log::debug!("Dropping {:?}: engine gone", message.payload);
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Messages scheduled but not yet delivered
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Total messages ever scheduled
    pub fn scheduled_count(&self) -> u64 {
        self.scheduled.load(Ordering::Relaxed)
    }
}
