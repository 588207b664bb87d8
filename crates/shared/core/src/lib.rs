//! Trailstop Core Domain
//!
//! Pure domain types for the trailing-stop sell strategy.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod events;
pub mod values;

// Re-export commonly used types at crate root
pub use events::{OutboundMessage, ScheduledMessage, Sell, StrategyEvent};
pub use values::{Price, Timestamp};
