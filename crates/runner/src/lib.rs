//! Trailstop Runner - Runtime collaborators for the trailing-stop engine
//!
//! - **Scheduler**: re-delivers the engine's delayed confirmations
//! - **Publisher**: routes engine output to the scheduler and the order sink
//! - **Position Runner**: single owner of the engine, serializes all events
//! - **Price Feed**: scripted or random-walk price observations
//! - **Backtest**: deterministic virtual-time replay of a price history
//! - **Simulation**: full orchestration of one position
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────┐
//!                    │   Price Feed    │
//!                    └────────┬────────┘
//!                             │ prices
//!                             ▼
//!                   ┌──────────────────┐        Schedule(delay, event)
//!  confirmations ──►│  PositionRunner  │───────────────┐
//!        ▲          │ (StrategyEngine) │               ▼
//!        │          └────────┬─────────┘   ┌───────────────────────┐
//!        │                   │ Sell        │ DelayedMessageScheduler│
//!        │                   ▼             └───────────┬───────────┘
//!        │            ┌────────────┐                   │
//!        │            │ Order Sink │                   │
//!        │            └────────────┘                   │
//!        └─────────────────────────────────────────────┘
//! ```

pub mod backtest;
pub mod config;
pub mod error;
pub mod event_feed;
pub mod position;
pub mod publisher;
pub mod scheduler;
pub mod simulation;

// Re-export main types
pub use backtest::{Backtest, BacktestReport, PriceTick};
pub use config::SimulationConfig;
pub use error::{Result, RunnerError};
pub use event_feed::{PriceFeed, PriceFeedConfig};
pub use position::{PositionRunner, RunSummary};
pub use publisher::ChannelPublisher;
pub use scheduler::DelayedMessageScheduler;
pub use simulation::{SimulationResults, TrailingStopSimulation};
