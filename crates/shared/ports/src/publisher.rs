use std::sync::Arc;
use trailstop_core::OutboundMessage;

/// Port for everything the strategy engine emits
///
/// The engine stays synchronous: publishing is fire-and-forget and must not
/// block. Implementations decide what delivery means:
/// - Scheduling delayed confirmations back into the engine
/// - Forwarding the sell order to an order sink
/// - Recording messages for assertions in tests
pub trait Publisher: Send {
    /// Hand one message to the outside world
    fn publish(&self, message: OutboundMessage);

    /// Publisher name for logging
    fn name(&self) -> &str {
        "Publisher"
    }
}

impl<P: Publisher + Sync + ?Sized> Publisher for Arc<P> {
    fn publish(&self, message: OutboundMessage) {
        (**self).publish(message)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
