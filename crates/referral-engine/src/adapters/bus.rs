//! Event sink adapters bridging the engine's commit paths to the bus.

use crate::ports::outbound::ReferralEventSink;
use referral_bus::{InMemoryEventBus, ReferralEvent};
use std::sync::Arc;

/// Sink publishing to a shared `InMemoryEventBus`.
pub struct BusEventSink {
    bus: Arc<InMemoryEventBus>,
}

impl BusEventSink {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }
}

impl ReferralEventSink for BusEventSink {
    fn emit(&self, event: ReferralEvent) {
        // Fire-and-forget: subscriber count is the bus's concern.
        self.bus.publish_now(event);
    }
}

/// Sink that drops every event; for hosts without a notification
/// collaborator and for tests that don't observe events.
#[derive(Default)]
pub struct NullEventSink;

impl ReferralEventSink for NullEventSink {
    fn emit(&self, _event: ReferralEvent) {}
}
