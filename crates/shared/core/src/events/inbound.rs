use crate::values::Price;
use serde::{Deserialize, Serialize};

/// Events consumed by the strategy engine
///
/// `PositionAcquired` and `PriceUpdated` come from the outside world;
/// `DelayedPriceUp` and `DelayedPriceDown` are the engine's own confirmations
/// coming back after their scheduling delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyEvent {
    /// A position was opened at this price
    PositionAcquired { price: Price },
    /// A new price observation
    PriceUpdated { price: Price },
    /// Up-window confirmation for an earlier observation
    DelayedPriceUp { price: Price },
    /// Down-window confirmation for an earlier observation
    DelayedPriceDown { price: Price },
}

impl StrategyEvent {
    pub fn position_acquired(price: Price) -> Self {
        StrategyEvent::PositionAcquired { price }
    }

    pub fn price_updated(price: Price) -> Self {
        StrategyEvent::PriceUpdated { price }
    }

    pub fn delayed_price_up(price: Price) -> Self {
        StrategyEvent::DelayedPriceUp { price }
    }

    pub fn delayed_price_down(price: Price) -> Self {
        StrategyEvent::DelayedPriceDown { price }
    }

    /// Get the price carried by this event
    pub fn price(&self) -> Price {
        match self {
            StrategyEvent::PositionAcquired { price }
            | StrategyEvent::PriceUpdated { price }
            | StrategyEvent::DelayedPriceUp { price }
            | StrategyEvent::DelayedPriceDown { price } => *price,
        }
    }

    /// Whether this event is a self-scheduled confirmation
    pub fn is_confirmation(&self) -> bool {
        matches!(
            self,
            StrategyEvent::DelayedPriceUp { .. } | StrategyEvent::DelayedPriceDown { .. }
        )
    }

    /// Short event name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            StrategyEvent::PositionAcquired { .. } => "PositionAcquired",
            StrategyEvent::PriceUpdated { .. } => "PriceUpdated",
            StrategyEvent::DelayedPriceUp { .. } => "DelayedPriceUp",
            StrategyEvent::DelayedPriceDown { .. } => "DelayedPriceDown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_accessor() {
        assert_eq!(StrategyEvent::position_acquired(dec!(10)).price(), dec!(10));
        assert_eq!(StrategyEvent::price_updated(dec!(123.0)).price(), dec!(123.0));
        assert_eq!(StrategyEvent::delayed_price_up(dec!(1.5)).price(), dec!(1.5));
        assert_eq!(StrategyEvent::delayed_price_down(dec!(7)).price(), dec!(7));
    }

    #[test]
    fn test_confirmation_kinds() {
        assert!(!StrategyEvent::price_updated(dec!(1)).is_confirmation());
        assert!(!StrategyEvent::position_acquired(dec!(1)).is_confirmation());
        assert!(StrategyEvent::delayed_price_up(dec!(1)).is_confirmation());
        assert!(StrategyEvent::delayed_price_down(dec!(1)).is_confirmation());
        assert_eq!(StrategyEvent::delayed_price_down(dec!(1)).kind(), "DelayedPriceDown");
    }

    #[test]
    fn test_decimal_scale_does_not_split_events() {
        // 123 and 123.0 are the same price
        assert_eq!(
            StrategyEvent::price_updated(dec!(123)),
            StrategyEvent::price_updated(dec!(123.0))
        );
    }
}
