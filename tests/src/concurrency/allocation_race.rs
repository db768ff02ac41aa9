//! # Allocation Races
//!
//! Concurrent code allocation over one shared ledger: uniqueness must
//! hold with no coordination beyond the ledger's conditional create.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use referral_engine::adapters::{
        NullEventSink, RandomCodeGenerator, SharedLedger, SystemTimeSource,
    };
    use referral_engine::test_utils::ScriptedCodeGenerator;
    use referral_engine::{code, CodeGenerator, EngineConfig, ReferralService};
    use referral_types::MemberId;

    fn engine<G: CodeGenerator>(
        ledger: SharedLedger,
        codegen: G,
    ) -> ReferralService<SharedLedger, G, SystemTimeSource, NullEventSink> {
        ReferralService::new(
            ledger,
            codegen,
            SystemTimeSource,
            NullEventSink,
            EngineConfig::default(),
        )
    }

    #[test]
    fn test_concurrent_allocations_are_unique() {
        let ledger = SharedLedger::new();
        let mut codes: Vec<String> = Vec::new();

        thread::scope(|scope| {
            let mut handles = Vec::new();
            for worker in 0..8u64 {
                let ledger = ledger.clone();
                handles.push(scope.spawn(move || {
                    let mut engine = engine(ledger, RandomCodeGenerator::with_seed(worker));
                    (0..4)
                        .map(|_| engine.allocate_code(MemberId::generate()).unwrap())
                        .collect::<Vec<_>>()
                }));
            }
            for handle in handles {
                codes.extend(handle.join().unwrap());
            }
        });

        assert_eq!(codes.len(), 32);
        for c in &codes {
            assert!(code::validate(c).is_ok(), "bad code: {}", c);
        }
        let distinct: HashSet<_> = codes.iter().collect();
        assert_eq!(distinct.len(), 32, "duplicate code allocated under race");
    }

    #[test]
    fn test_same_candidate_has_exactly_one_winner() {
        let ledger = SharedLedger::new();
        let mut codes = Vec::new();

        // Both workers draw the identical first candidate; the loser's
        // conditional create conflicts and it falls back to its second.
        thread::scope(|scope| {
            let mut handles = Vec::new();
            for fallback in ["TALBBBBBB", "TALCCCCCC"] {
                let ledger = ledger.clone();
                handles.push(scope.spawn(move || {
                    let mut engine = engine(
                        ledger,
                        ScriptedCodeGenerator::new(&["TALAAAAAA", fallback]),
                    );
                    engine.allocate_code(MemberId::generate()).unwrap()
                }));
            }
            for handle in handles {
                codes.push(handle.join().unwrap());
            }
        });

        let winners = codes.iter().filter(|c| *c == "TALAAAAAA").count();
        assert_eq!(winners, 1);
        assert_ne!(codes[0], codes[1]);
    }

    #[test]
    fn test_concurrent_allocation_for_one_member_converges() {
        let ledger = SharedLedger::new();
        let member = MemberId::generate();
        let mut codes = Vec::new();

        thread::scope(|scope| {
            let mut handles = Vec::new();
            for worker in 0..4u64 {
                let ledger = ledger.clone();
                handles.push(scope.spawn(move || {
                    let mut engine = engine(ledger, RandomCodeGenerator::with_seed(worker));
                    engine.allocate_code(member).unwrap()
                }));
            }
            for handle in handles {
                codes.push(handle.join().unwrap());
            }
        });

        // Whoever won, every caller observes the single reserved code.
        assert!(codes.windows(2).all(|w| w[0] == w[1]));
    }
}
