use crate::events::StrategyEvent;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal sell order for the position (no payload)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sell;

/// Request to deliver `payload` back to the engine no earlier than `delay` from now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMessage {
    pub delay: Duration,
    pub payload: StrategyEvent,
}

impl ScheduledMessage {
    pub fn new(delay: Duration, payload: StrategyEvent) -> Self {
        Self { delay, payload }
    }
}

/// Everything the engine can hand to its publisher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundMessage {
    /// Delayed confirmation to be re-delivered by the scheduler
    Schedule(ScheduledMessage),
    /// Exit the position
    Sell(Sell),
}

impl OutboundMessage {
    pub fn schedule(delay: Duration, payload: StrategyEvent) -> Self {
        OutboundMessage::Schedule(ScheduledMessage::new(delay, payload))
    }

    pub fn sell() -> Self {
        OutboundMessage::Sell(Sell)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, OutboundMessage::Sell(_))
    }

    pub fn as_scheduled(&self) -> Option<&ScheduledMessage> {
        match self {
            OutboundMessage::Schedule(message) => Some(message),
            OutboundMessage::Sell(_) => None,
        }
    }
}

impl From<ScheduledMessage> for OutboundMessage {
    fn from(message: ScheduledMessage) -> Self {
        OutboundMessage::Schedule(message)
    }
}

impl From<Sell> for OutboundMessage {
    fn from(sell: Sell) -> Self {
        OutboundMessage::Sell(sell)
    }
}
