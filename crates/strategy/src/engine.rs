//! Trailing-Stop Engine
//!
//! Single-position exit logic driven by price observations and the engine's
//! own delayed confirmations:
//! - Every price update enters both windows and schedules an up-confirmation
//!   and a (sooner) down-confirmation for the same price
//! - An up-confirmation ratchets the sell threshold to `min(up window) - offset`
//!   when that is higher than the current threshold
//! - A down-confirmation sells when `max(down window)` falls below the threshold
//!
//! Once the sell is emitted the engine is `Done` and ignores everything.

use crate::config::TrailingStopConfig;
use crate::error::{EngineError, Result};
use crate::window::{PriceWindow, WindowSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trailstop_core::{OutboundMessage, Price, StrategyEvent};
use trailstop_ports::Publisher;
use uuid::Uuid;

/// Lifecycle of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Handling events
    Active,
    /// Sell emitted; absorbing
    Done,
}

/// What a single handled event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Engine is done; nothing changed
    Ignored,
    /// Windows and/or threshold updated without a notable transition
    Applied,
    /// Up-confirmation raised the threshold
    ThresholdRaised { from: Price, to: Price },
    /// Down-confirmation crossed the threshold; sell emitted
    Sold { stable_down_price: Price, threshold: Price },
}

/// The trailing-stop state machine for one position
pub struct StrategyEngine<P: Publisher> {
    /// Identifier used in logs
    position_id: Uuid,
    config: TrailingStopConfig,
    up_window: PriceWindow,
    down_window: PriceWindow,
    sell_threshold: Price,
    state: EngineState,
    publisher: P,
}

impl<P: Publisher> StrategyEngine<P> {
    /// Create an engine with the default parameters
    pub fn new(publisher: P) -> Self {
        Self::with_config(TrailingStopConfig::default(), publisher)
    }

    /// Create an engine with explicit parameters
    pub fn with_config(config: TrailingStopConfig, publisher: P) -> Self {
        Self {
            position_id: Uuid::new_v4(),
            config,
            up_window: PriceWindow::new(),
            down_window: PriceWindow::new(),
            sell_threshold: Decimal::ZERO,
            state: EngineState::Active,
            publisher,
        }
    }

    /// Override the generated position id
    pub fn with_position_id(mut self, position_id: Uuid) -> Self {
        self.position_id = position_id;
        self
    }

    /// Handle one inbound event
    ///
    /// This is the only place the terminal state is checked: every handler
    /// goes through here, and in `Done` nothing is mutated or published.
    pub fn handle(&mut self, event: StrategyEvent) -> Result<HandleOutcome> {
        if self.state == EngineState::Done {
            log::trace!("[{}] Ignoring {:?}, position closed", self.position_id, event);
            return Ok(HandleOutcome::Ignored);
        }

        log::debug!("[{}] Handling {:?}", self.position_id, event);

        match event {
            StrategyEvent::PositionAcquired { price } => Ok(self.on_position_acquired(price)),
            StrategyEvent::PriceUpdated { price } => Ok(self.on_price_updated(price)),
            StrategyEvent::DelayedPriceUp { price } => self.on_delayed_price_up(price),
            StrategyEvent::DelayedPriceDown { price } => self.on_delayed_price_down(price),
        }
    }

    pub fn handle_position_acquired(&mut self, price: Price) -> Result<HandleOutcome> {
        self.handle(StrategyEvent::position_acquired(price))
    }

    pub fn handle_price_updated(&mut self, price: Price) -> Result<HandleOutcome> {
        self.handle(StrategyEvent::price_updated(price))
    }

    pub fn handle_delayed_price_up(&mut self, price: Price) -> Result<HandleOutcome> {
        self.handle(StrategyEvent::delayed_price_up(price))
    }

    pub fn handle_delayed_price_down(&mut self, price: Price) -> Result<HandleOutcome> {
        self.handle(StrategyEvent::delayed_price_down(price))
    }

    fn on_position_acquired(&mut self, price: Price) -> HandleOutcome {
        // Overwrite, not ratchet: this opens the stop for the position
        self.sell_threshold = price - self.config.stop_offset;
        log::info!(
            "[{}] Position acquired at {}, sell threshold {}",
            self.position_id,
            price,
            self.sell_threshold
        );
        HandleOutcome::Applied
    }

    fn on_price_updated(&mut self, price: Price) -> HandleOutcome {
        self.up_window.add(price);
        self.down_window.add(price);

        self.publisher.publish(OutboundMessage::schedule(
            self.config.up_delay(),
            StrategyEvent::delayed_price_up(price),
        ));
        self.publisher.publish(OutboundMessage::schedule(
            self.config.down_delay(),
            StrategyEvent::delayed_price_down(price),
        ));
        HandleOutcome::Applied
    }

    fn on_delayed_price_up(&mut self, price: Price) -> Result<HandleOutcome> {
        if !self.up_window.remove_one(price) {
            log::debug!("[{}] {} not in up window", self.position_id, price);
        }

        let stable_up_price = self.stable_price(WindowSide::Up, price)?;
        let candidate = stable_up_price - self.config.stop_offset;
        if candidate <= self.sell_threshold {
            return Ok(HandleOutcome::Applied);
        }

        let from = self.sell_threshold;
        self.sell_threshold = candidate;
        log::info!(
            "[{}] Sell threshold raised {} -> {} (stable up price {})",
            self.position_id,
            from,
            candidate,
            stable_up_price
        );
        Ok(HandleOutcome::ThresholdRaised {
            from,
            to: candidate,
        })
    }

    fn on_delayed_price_down(&mut self, price: Price) -> Result<HandleOutcome> {
        if !self.down_window.remove_one(price) {
            log::debug!("[{}] {} not in down window", self.position_id, price);
        }

        // Read-only on the threshold: the down path only decides the sell
        let stable_down_price = self.stable_price(WindowSide::Down, price)?;
        if stable_down_price >= self.sell_threshold {
            return Ok(HandleOutcome::Applied);
        }

        self.publisher.publish(OutboundMessage::sell());
        self.state = EngineState::Done;
        log::info!(
            "[{}] SELL: stable down price {} below threshold {}",
            self.position_id,
            stable_down_price,
            self.sell_threshold
        );
        Ok(HandleOutcome::Sold {
            stable_down_price,
            threshold: self.sell_threshold,
        })
    }

    /// Extreme of a window right after confirming `confirmed`
    ///
    /// An empty window here means a confirmation outlived every observation
    /// it could refer to; that is a sequencing bug upstream, not a default.
    fn stable_price(&self, window: WindowSide, confirmed: Price) -> Result<Price> {
        let stable = match window {
            WindowSide::Up => self.up_window.min(),
            WindowSide::Down => self.down_window.max(),
        };

        stable.map_err(|_| {
            log::error!(
                "[{}] {} window empty after confirming {}",
                self.position_id,
                window,
                confirmed
            );
            EngineError::InvariantViolation {
                window,
                price: confirmed,
            }
        })
    }

    /// Minimum of the up window
    pub fn stable_up_price(&self) -> Result<Price> {
        self.up_window.min()
    }

    /// Maximum of the down window
    pub fn stable_down_price(&self) -> Result<Price> {
        self.down_window.max()
    }

    pub fn up_window(&self) -> &PriceWindow {
        &self.up_window
    }

    pub fn down_window(&self) -> &PriceWindow {
        &self.down_window
    }

    pub fn sell_threshold(&self) -> Price {
        self.sell_threshold
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_runnable(&self) -> bool {
        self.state == EngineState::Active
    }

    pub fn position_id(&self) -> Uuid {
        self.position_id
    }

    pub fn config(&self) -> &TrailingStopConfig {
        &self.config
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}
