//! Strategy Events
//!
//! Inbound events drive the strategy engine; outbound messages are what the
//! engine hands to its publisher (delayed confirmations and the final sell).

mod inbound;
mod outbound;

pub use inbound::StrategyEvent;
pub use outbound::{OutboundMessage, ScheduledMessage, Sell};
