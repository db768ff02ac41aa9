//! Stats reads: counters, role and the recent-referral window.

use crate::domain::config::KeyPrefix;
use crate::domain::entities::{RecentReferral, ReferralStats};
use crate::domain::errors::ReferralError;
use crate::ports::outbound::{CodeGenerator, LedgerStore, ReferralEventSink, TimeSource};
use crate::service::{decode, ReferralService};
use referral_types::MemberId;

impl<L, G, T, S> ReferralService<L, G, T, S>
where
    L: LedgerStore,
    G: CodeGenerator,
    T: TimeSource,
    S: ReferralEventSink,
{
    /// Read the member's referral stats. Members may only read their own
    /// stats; any other requester is `Unauthorized`.
    pub fn get_stats(
        &self,
        requester: MemberId,
        member: MemberId,
    ) -> Result<ReferralStats, ReferralError> {
        if requester != member {
            return Err(ReferralError::Unauthorized { requester, member });
        }

        let (profile, _snapshot) = self.require_profile(member)?;

        let prefix = KeyPrefix::recent_index_prefix(&member);
        let mut entries = self.ledger.prefix_scan(&prefix)?;
        // Big-endian timestamps make key order chronological, so a
        // descending sort yields newest first.
        entries.sort_by(|a, b| b.0.cmp(&a.0));

        let recent_referrals = entries
            .into_iter()
            .take(self.config.recent_referrals_limit)
            .map(|(_, value)| decode::<RecentReferral>(&value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReferralStats {
            member_id: member,
            own_code: profile.own_code,
            direct_count: profile.direct_count,
            team_size: profile.team_size,
            role: profile.role,
            recent_referrals,
        })
    }
}
