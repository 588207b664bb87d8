use crate::Publisher;
use std::sync::{Arc, Mutex, MutexGuard};
use trailstop_core::{OutboundMessage, ScheduledMessage};

/// Publisher that records every message in arrival order
///
/// Clones share the same record, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    messages: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self) -> MutexGuard<'_, Vec<OutboundMessage>> {
        // A panicking test thread must not hide what was already recorded
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of all recorded messages
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.record().clone()
    }

    /// Messages recorded at or after position `from`
    pub fn messages_since(&self, from: usize) -> Vec<OutboundMessage> {
        self.record().iter().skip(from).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.record().len()
    }

    pub fn is_empty(&self) -> bool {
        self.record().is_empty()
    }

    /// Last recorded message, if any
    pub fn last(&self) -> Option<OutboundMessage> {
        self.record().last().copied()
    }

    /// Number of sell orders recorded
    pub fn sell_count(&self) -> usize {
        self.record().iter().filter(|m| m.is_sell()).count()
    }

    /// All scheduling requests, in order
    pub fn scheduled(&self) -> Vec<ScheduledMessage> {
        self.record()
            .iter()
            .filter_map(|m| m.as_scheduled().copied())
            .collect()
    }

    pub fn clear(&self) {
        self.record().clear();
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, message: OutboundMessage) {
        self.record().push(message);
    }

    fn name(&self) -> &str {
        "RecordingPublisher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use trailstop_core::StrategyEvent;

    #[test]
    fn test_records_in_arrival_order() {
        let publisher = RecordingPublisher::new();
        publisher.publish(OutboundMessage::schedule(
            Duration::from_secs(10),
            StrategyEvent::delayed_price_up(dec!(1)),
        ));
        publisher.publish(OutboundMessage::sell());

        assert_eq!(publisher.len(), 2);
        assert!(publisher.last().unwrap().is_sell());
        assert_eq!(publisher.sell_count(), 1);
        assert_eq!(publisher.scheduled().len(), 1);
    }

    #[test]
    fn test_clones_share_record() {
        let publisher = RecordingPublisher::new();
        let handle = publisher.clone();

        publisher.publish(OutboundMessage::sell());

        assert_eq!(handle.len(), 1);
        assert_eq!(handle.messages_since(1), Vec::new());
        assert_eq!(handle.messages_since(0), vec![OutboundMessage::sell()]);
    }

    #[test]
    fn test_arc_publisher_forwards() {
        let publisher = Arc::new(RecordingPublisher::new());
        let shared: Arc<RecordingPublisher> = Arc::clone(&publisher);

        shared.publish(OutboundMessage::sell());

        assert_eq!(publisher.len(), 1);
        assert_eq!(shared.name(), "RecordingPublisher");
    }
}
