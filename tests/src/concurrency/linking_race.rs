//! # Linking Races
//!
//! Concurrent joins against shared referrers: counters must add up
//! exactly, and a referee racing two codes gets exactly one parent.

#[cfg(test)]
mod tests {
    use std::thread;

    use referral_engine::adapters::{
        NullEventSink, RandomCodeGenerator, SharedLedger, SystemTimeSource,
    };
    use referral_engine::{EngineConfig, ReferralError, ReferralService};
    use referral_types::MemberId;

    type Engine = ReferralService<SharedLedger, RandomCodeGenerator, SystemTimeSource, NullEventSink>;

    fn engine(ledger: SharedLedger, seed: u64) -> Engine {
        // Heavier contention than production sees; widen the retry budget
        // so no worker gives up before the race resolves.
        let config = EngineConfig {
            max_txn_retries: 64,
            ..EngineConfig::default()
        };
        ReferralService::new(
            ledger,
            RandomCodeGenerator::with_seed(seed),
            SystemTimeSource,
            NullEventSink,
            config,
        )
    }

    #[test]
    fn test_concurrent_joins_sum_exactly() {
        let ledger = SharedLedger::new();
        let referrer = MemberId::generate();
        let code = engine(ledger.clone(), 300).allocate_code(referrer).unwrap();

        thread::scope(|scope| {
            for worker in 0..4u64 {
                let ledger = ledger.clone();
                let code = code.clone();
                scope.spawn(move || {
                    let mut engine = engine(ledger, 301 + worker);
                    for _ in 0..4 {
                        let referee = MemberId::generate();
                        engine.register_member(referee).unwrap();
                        assert_eq!(engine.apply_code(referee, &code).unwrap(), referrer);
                    }
                });
            }
        });

        let engine = engine(ledger, 310);
        let stats = engine.get_stats(referrer, referrer).unwrap();
        assert_eq!(stats.direct_count, 16, "lost or double-counted a join");
        assert_eq!(stats.team_size, 16);
        assert_eq!(stats.recent_referrals.len(), 16);
    }

    #[test]
    fn test_referee_racing_two_codes_gets_one_parent() {
        let ledger = SharedLedger::new();
        let referrer_a = MemberId::generate();
        let referrer_b = MemberId::generate();
        let referee = MemberId::generate();

        let mut setup = engine(ledger.clone(), 320);
        let code_a = setup.allocate_code(referrer_a).unwrap();
        let code_b = setup.allocate_code(referrer_b).unwrap();
        setup.register_member(referee).unwrap();

        let mut outcomes = Vec::new();
        thread::scope(|scope| {
            let mut handles = Vec::new();
            for (seed, code) in [(321u64, code_a.clone()), (322, code_b.clone())] {
                let ledger = ledger.clone();
                handles.push(scope.spawn(move || {
                    let mut engine = engine(ledger, seed);
                    engine.apply_code(referee, &code)
                }));
            }
            for handle in handles {
                outcomes.push(handle.join().unwrap());
            }
        });

        let wins = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "expected exactly one code to win the race");
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(ReferralError::AlreadyReferred { .. }))));

        // Counters follow the single committed edge.
        let engine = engine(ledger, 330);
        let a = engine.get_stats(referrer_a, referrer_a).unwrap();
        let b = engine.get_stats(referrer_b, referrer_b).unwrap();
        assert_eq!(a.direct_count + b.direct_count, 1);
        assert_eq!(a.team_size + b.team_size, 1);
    }

    #[test]
    fn test_concurrent_leaf_joins_converge_up_the_chain() {
        let ledger = SharedLedger::new();
        let grandparent = MemberId::generate();
        let parent = MemberId::generate();

        let mut setup = engine(ledger.clone(), 340);
        let top_code = setup.allocate_code(grandparent).unwrap();
        setup.register_member(parent).unwrap();
        setup.apply_code(parent, &top_code).unwrap();
        let parent_code = setup.allocate_code(parent).unwrap();

        // Eight leaves join the parent from four workers; every join must
        // also reach the grandparent exactly once.
        thread::scope(|scope| {
            for worker in 0..4u64 {
                let ledger = ledger.clone();
                let parent_code = parent_code.clone();
                scope.spawn(move || {
                    let mut engine = engine(ledger, 341 + worker);
                    for _ in 0..2 {
                        let leaf = MemberId::generate();
                        engine.register_member(leaf).unwrap();
                        engine.apply_code(leaf, &parent_code).unwrap();
                    }
                });
            }
        });

        let engine = engine(ledger, 350);
        let parent_stats = engine.get_stats(parent, parent).unwrap();
        assert_eq!(parent_stats.direct_count, 8);
        assert_eq!(parent_stats.team_size, 8);

        let top_stats = engine.get_stats(grandparent, grandparent).unwrap();
        assert_eq!(top_stats.direct_count, 1);
        assert_eq!(top_stats.team_size, 9);
    }
}
