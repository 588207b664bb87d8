//! Channel-backed publisher
//!
//! Routes the engine's outbound messages: confirmation requests go to the
//! delayed scheduler, the sell goes to the order sink.

use crate::scheduler::DelayedMessageScheduler;
use tokio::sync::mpsc;
use trailstop_core::{OutboundMessage, Sell};
use trailstop_ports::Publisher;

pub struct ChannelPublisher {
    scheduler: DelayedMessageScheduler,
    sell_tx: mpsc::UnboundedSender<Sell>,
}

impl ChannelPublisher {
    pub fn new(scheduler: DelayedMessageScheduler, sell_tx: mpsc::UnboundedSender<Sell>) -> Self {
        Self { scheduler, sell_tx }
    }

    pub fn scheduler(&self) -> &DelayedMessageScheduler {
        &self.scheduler
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, message: OutboundMessage) {
        match message {
            OutboundMessage::Schedule(scheduled) => self.scheduler.schedule(scheduled),
            OutboundMessage::Sell(sell) => {
                if let Err(e) = self.sell_tx.send(sell) {
                    log::warn!("Sell order dropped, order sink closed: {}", e);
                }
            }
        }
    }

    fn name(&self) -> &str {
        "ChannelPublisher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use trailstop_core::StrategyEvent;

    #[tokio::test(start_paused = true)]
    async fn test_routes_messages() {
        let (scheduler, mut confirmation_rx) = DelayedMessageScheduler::channel();
        let (sell_tx, mut sell_rx) = mpsc::unbounded_channel();
        let publisher = ChannelPublisher::new(scheduler, sell_tx);

        publisher.publish(OutboundMessage::schedule(
            Duration::from_secs(7),
            StrategyEvent::delayed_price_down(dec!(3)),
        ));
        publisher.publish(OutboundMessage::sell());

        assert_eq!(sell_rx.recv().await, Some(Sell));
        assert_eq!(publisher.scheduler().in_flight(), 1);
        assert_eq!(
            confirmation_rx.recv().await,
            Some(StrategyEvent::delayed_price_down(dec!(3)))
        );
    }

    #[tokio::test]
    async fn test_closed_sell_sink_does_not_panic() {
        let (scheduler, _confirmation_rx) = DelayedMessageScheduler::channel();
        let (sell_tx, sell_rx) = mpsc::unbounded_channel();
        drop(sell_rx);

        let publisher = ChannelPublisher::new(scheduler, sell_tx);
        publisher.publish(OutboundMessage::sell());
    }
}
