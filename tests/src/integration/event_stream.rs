//! # Event Stream Flows
//!
//! Verifies that engine commits surface on the event bus with the right
//! topics, so a notification collaborator can subscribe selectively.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use referral_bus::{EventFilter, EventTopic, InMemoryEventBus, ReferralEvent};
    use referral_engine::adapters::{BusEventSink, InMemoryLedger, MockTimeSource, RandomCodeGenerator};
    use referral_engine::{EngineConfig, ReferralService};
    use referral_types::{MemberId, PromotionTable, Role, RoleThreshold};

    fn engine(
        bus: &Arc<InMemoryEventBus>,
        seed: u64,
    ) -> ReferralService<InMemoryLedger, RandomCodeGenerator, MockTimeSource, BusEventSink> {
        ReferralService::new(
            InMemoryLedger::new(),
            RandomCodeGenerator::with_seed(seed),
            MockTimeSource::at(1_700_000_000),
            BusEventSink::new(bus.clone()),
            EngineConfig::default(),
        )
    }

    async fn next_event(sub: &mut referral_bus::Subscription) -> ReferralEvent {
        timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout waiting for event")
            .expect("bus closed")
    }

    #[tokio::test]
    async fn test_commits_publish_in_order() {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut sub = bus.subscribe(EventFilter::all());
        let mut engine = engine(&bus, 200);

        let referrer = MemberId::generate();
        let referee = MemberId::generate();
        let code = engine.allocate_code(referrer).unwrap();
        engine.register_member(referee).unwrap();
        engine.apply_code(referee, &code).unwrap();

        let first = next_event(&mut sub).await;
        assert!(matches!(
            &first,
            ReferralEvent::CodeAllocated { member, code: c, .. }
                if *member == referrer && *c == code
        ));

        let second = next_event(&mut sub).await;
        assert!(matches!(
            &second,
            ReferralEvent::ReferralLinked { referrer: a, referee: b, .. }
                if *a == referrer && *b == referee
        ));
    }

    #[tokio::test]
    async fn test_topic_filter_narrows_the_stream() {
        let bus = Arc::new(InMemoryEventBus::new());
        // Subscriber that only cares about completed links.
        let mut links_only = bus.subscribe(EventFilter::topics(vec![EventTopic::Linking]));
        let mut engine = engine(&bus, 201);

        let referrer = MemberId::generate();
        let referee = MemberId::generate();
        let code = engine.allocate_code(referrer).unwrap();
        engine.register_member(referee).unwrap();
        engine.apply_code(referee, &code).unwrap();

        // The allocation event is skipped; the link comes through first.
        let event = next_event(&mut links_only).await;
        assert!(matches!(event, ReferralEvent::ReferralLinked { .. }));
    }

    #[tokio::test]
    async fn test_promotion_reaches_subscribers() {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut promotions = bus.subscribe(EventFilter::topics(vec![EventTopic::Promotion]));

        let table = PromotionTable::new(vec![
            RoleThreshold {
                role: Role::Member,
                min_direct: 0,
                min_team: 0,
            },
            RoleThreshold {
                role: Role::Activist,
                min_direct: 1,
                min_team: 1,
            },
        ]);
        let mut engine = engine(&bus, 202).with_promotion_table(table);

        let referrer = MemberId::generate();
        let referee = MemberId::generate();
        let code = engine.allocate_code(referrer).unwrap();
        engine.register_member(referee).unwrap();
        engine.apply_code(referee, &code).unwrap();

        let event = next_event(&mut promotions).await;
        assert!(matches!(
            event,
            ReferralEvent::RolePromoted { member, from: Role::Member, to: Role::Activist, .. }
                if member == referrer
        ));
    }
}
