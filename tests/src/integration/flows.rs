//! # Integration Flows
//!
//! End-to-end referral journeys through a fully wired engine:
//!
//! 1. **Allocate → Share → Join → Stats**: the primary member journey
//! 2. **Root fallback**: joins attributed to the root code
//! 3. **Branching trees**: team sizes across multi-branch networks

#[cfg(test)]
mod tests {
    use referral_engine::adapters::{
        InMemoryLedger, MockTimeSource, NullEventSink, RandomCodeGenerator,
    };
    use referral_engine::{code, EngineConfig, ReferralError, ReferralService};
    use referral_types::{MemberId, Role};

    type Engine =
        ReferralService<InMemoryLedger, RandomCodeGenerator, MockTimeSource, NullEventSink>;

    fn engine(seed: u64) -> Engine {
        ReferralService::new(
            InMemoryLedger::new(),
            RandomCodeGenerator::with_seed(seed),
            MockTimeSource::at(1_700_000_000),
            NullEventSink,
            EngineConfig::default(),
        )
    }

    #[test]
    fn test_allocate_share_join_stats_journey() {
        let mut engine = engine(100);
        let organizer = MemberId::generate();
        let newcomer = MemberId::generate();

        // Organizer gets a shareable code.
        let shared = engine.allocate_code(organizer).unwrap();
        assert!(code::validate(&shared).is_ok());

        // Newcomer registers and presents the code as it would arrive
        // from a deep link, untrimmed and lowercased.
        engine.register_member(newcomer).unwrap();
        let referrer = engine
            .apply_code(newcomer, &format!(" {} ", shared.to_lowercase()))
            .unwrap();
        assert_eq!(referrer, organizer);

        // Organizer sees the join reflected immediately.
        let stats = engine.get_stats(organizer, organizer).unwrap();
        assert_eq!(stats.direct_count, 1);
        assert_eq!(stats.team_size, 1);
        assert_eq!(stats.recent_referrals.len(), 1);
        assert_eq!(stats.recent_referrals[0].referee_id, newcomer);

        // Newcomer's own stats show no downline yet.
        let stats = engine.get_stats(newcomer, newcomer).unwrap();
        assert_eq!(stats.direct_count, 0);
        assert_eq!(stats.team_size, 0);
        assert_eq!(stats.role, Role::Member);
    }

    #[test]
    fn test_joins_without_code_fall_back_to_root() {
        let mut engine = engine(101);
        let root = MemberId::generate();
        engine.install_root_code(root).unwrap();

        for _ in 0..3 {
            let member = MemberId::generate();
            engine.register_member(member).unwrap();
            assert_eq!(engine.apply_code(member, "TALROOT").unwrap(), root);
        }

        let stats = engine.get_stats(root, root).unwrap();
        assert_eq!(stats.direct_count, 3);
        assert_eq!(stats.team_size, 3);
    }

    #[test]
    fn test_branching_tree_team_sizes() {
        // root
        // ├── left  ── ll
        // │         └─ lr
        // └── right ── rl
        let mut engine = engine(102);
        let root = MemberId::generate();
        let left = MemberId::generate();
        let right = MemberId::generate();
        let leaves = [MemberId::generate(), MemberId::generate(), MemberId::generate()];

        let root_code = engine.allocate_code(root).unwrap();
        for branch in [left, right] {
            engine.register_member(branch).unwrap();
            engine.apply_code(branch, &root_code).unwrap();
        }

        let left_code = engine.allocate_code(left).unwrap();
        let right_code = engine.allocate_code(right).unwrap();
        for (leaf, parent_code) in leaves
            .iter()
            .zip([&left_code, &left_code, &right_code])
        {
            engine.register_member(*leaf).unwrap();
            engine.apply_code(*leaf, parent_code).unwrap();
        }

        let root_stats = engine.get_stats(root, root).unwrap();
        assert_eq!(root_stats.direct_count, 2);
        assert_eq!(root_stats.team_size, 5);

        let left_stats = engine.get_stats(left, left).unwrap();
        assert_eq!(left_stats.direct_count, 2);
        assert_eq!(left_stats.team_size, 2);

        let right_stats = engine.get_stats(right, right).unwrap();
        assert_eq!(right_stats.direct_count, 1);
        assert_eq!(right_stats.team_size, 1);
    }

    #[test]
    fn test_cross_branch_second_code_is_rejected() {
        let mut engine = engine(103);
        let a = MemberId::generate();
        let b = MemberId::generate();
        let member = MemberId::generate();

        let code_a = engine.allocate_code(a).unwrap();
        let code_b = engine.allocate_code(b).unwrap();
        engine.register_member(member).unwrap();

        engine.apply_code(member, &code_a).unwrap();
        let err = engine.apply_code(member, &code_b).unwrap_err();
        assert!(matches!(err, ReferralError::AlreadyReferred { .. }));

        // The member's network position is unchanged.
        assert_eq!(engine.get_stats(a, a).unwrap().direct_count, 1);
        assert_eq!(engine.get_stats(b, b).unwrap().direct_count, 0);
    }
}
