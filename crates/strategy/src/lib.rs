//! Trailstop Strategy
//!
//! Exit logic for a single long position:
//! - Two windows of recent prices awaiting delayed confirmation
//! - A sell threshold that only ratchets upward
//! - A one-shot sell once the confirmed downside breaks the threshold
//!
//! ## Event Flow
//!
//! ```text
//! PositionAcquired ──► threshold = price - offset
//!
//! PriceUpdated ──┬──► UpWindow.add, DownWindow.add
//!                ├──► publish Schedule(10s, DelayedPriceUp)
//!                └──► publish Schedule(7s,  DelayedPriceDown)
//!
//! DelayedPriceUp ────► UpWindow.remove_one ──► min - offset > threshold ? raise
//!
//! DelayedPriceDown ──► DownWindow.remove_one ─► max < threshold ? publish Sell, Done
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trailstop_ports::RecordingPublisher;
//! use trailstop_strategy::StrategyEngine;
//!
//! let publisher = RecordingPublisher::new();
//! let mut engine = StrategyEngine::new(publisher.clone());
//! engine.handle_position_acquired(dec!(10))?;
//! engine.handle_price_updated(dec!(10.4))?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod window;

// Re-export main types
pub use config::TrailingStopConfig;
pub use engine::{EngineState, HandleOutcome, StrategyEngine};
pub use error::{ConfigError, EngineError, Result};
pub use window::{PriceWindow, WindowSide};
