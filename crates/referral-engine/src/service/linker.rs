//! Chain linking: resolve a code to its owner and commit the referral
//! edge write-once.

use crate::domain::code;
use crate::domain::config::KeyPrefix;
use crate::domain::entities::{RecentReferral, ReferralEdge};
use crate::domain::errors::{LedgerError, ReferralError};
use crate::domain::retry::{Attempt, RetryPolicy};
use crate::ports::outbound::{
    BatchOperation, CodeGenerator, Guard, LedgerStore, ReferralEventSink, TimeSource,
};
use crate::service::{encode, ReferralService};
use referral_bus::ReferralEvent;
use referral_types::{EdgeId, MemberId};
use tracing::{info, warn};

impl<L, G, T, S> ReferralService<L, G, T, S>
where
    L: LedgerStore,
    G: CodeGenerator,
    T: TimeSource,
    S: ReferralEventSink,
{
    /// Link `member` under the owner of `raw_code` and return the
    /// referrer's id.
    ///
    /// The child's parent fields, the referral edge, the recent-referral
    /// index entry and the referrer's direct counter commit as one guarded
    /// transaction (INVARIANT-4). Replaying the same code is a no-op
    /// success; presenting a different code once linked is
    /// `AlreadyReferred` (INVARIANT-2).
    pub fn apply_code(&mut self, member: MemberId, raw_code: &str) -> Result<MemberId, ReferralError> {
        let code = code::normalize(raw_code);
        // The root code is compared in normalized form, matching how the
        // bootstrap reserves it.
        if code != code::normalize(&self.config.root_code) {
            code::validate(&code)?;
        }

        let policy = RetryPolicy::new(self.config.max_txn_retries);
        let exhausted = ReferralError::TransientStore {
            message: "link retry budget exhausted under contention".to_string(),
        };
        let (referrer, newly_linked) =
            policy.run(|_attempt| self.try_link(member, &code), exhausted)?;

        if newly_linked {
            // Team counters are at-least-once: a failure here leaves the
            // committed edge behind, and a later `propagate(referee)` run
            // picks it up without double counting.
            if let Err(e) = self.propagate(member) {
                warn!(member = %member, error = %e, "Propagation deferred after link commit");
            }
        }

        Ok(referrer)
    }

    /// One optimistic link attempt. The boolean in `Done` reports whether
    /// this attempt created the edge (as opposed to replaying an existing
    /// link).
    fn try_link(
        &mut self,
        member: MemberId,
        code: &str,
    ) -> Attempt<(MemberId, bool), ReferralError> {
        let (profile, snapshot) = match self.read_profile(member) {
            Ok(Some(found)) => found,
            Ok(None) => return Attempt::Fail(ReferralError::MemberNotFound { member }),
            Err(e) => return Attempt::Fail(e),
        };

        let record = match self.read_code_record(code) {
            Ok(Some(r)) if r.active => r,
            Ok(_) => {
                return Attempt::Fail(ReferralError::CodeNotFound {
                    code: code.to_string(),
                })
            }
            Err(e) => return Attempt::Fail(e),
        };

        if record.owner == member {
            return Attempt::Fail(ReferralError::SelfReferralBlocked { member });
        }

        if let Some(existing) = profile.parent_id {
            if profile.parent_code.as_deref() == Some(code) {
                return Attempt::Done((existing, false));
            }
            return Attempt::Fail(ReferralError::AlreadyReferred {
                member,
                existing_referrer: existing,
            });
        }

        let (referrer_profile, referrer_snapshot) = match self.read_profile(record.owner) {
            Ok(Some(found)) => found,
            Ok(None) => {
                return Attempt::Fail(ReferralError::MemberNotFound {
                    member: record.owner,
                })
            }
            Err(e) => return Attempt::Fail(e),
        };

        let now = self.time_source.now();
        let edge_id = EdgeId::generate();
        let edge = ReferralEdge {
            edge_id,
            referrer_id: record.owner,
            referee_id: member,
            code_used: code.to_string(),
            created_at: now,
        };

        let mut child = profile;
        child.parent_id = Some(record.owner);
        child.parent_code = Some(code.to_string());

        // Folding the direct counter into the edge commit makes a
        // referrer's own count read-after-write consistent; only the
        // ancestor team counters beyond the parent lag behind.
        let mut parent = referrer_profile;
        parent.direct_count += 1;

        let recent = RecentReferral {
            referee_id: member,
            code_used: code.to_string(),
            joined_at: now,
        };

        let profile_key = KeyPrefix::profile_key(&member);
        let referrer_key = KeyPrefix::profile_key(&record.owner);
        let edge_key = KeyPrefix::edge_key(&member);
        let index_key = KeyPrefix::recent_index_key(&record.owner, now, &member);

        let child_bytes = match encode(&child) {
            Ok(bytes) => bytes,
            Err(e) => return Attempt::Fail(e),
        };
        let parent_bytes = match encode(&parent) {
            Ok(bytes) => bytes,
            Err(e) => return Attempt::Fail(e),
        };
        let edge_bytes = match encode(&edge) {
            Ok(bytes) => bytes,
            Err(e) => return Attempt::Fail(e),
        };
        let recent_bytes = match encode(&recent) {
            Ok(bytes) => bytes,
            Err(e) => return Attempt::Fail(e),
        };

        let result = self.ledger.transact(
            vec![
                Guard::matches(profile_key.clone(), snapshot),
                Guard::absent(edge_key.clone()),
                Guard::matches(referrer_key.clone(), referrer_snapshot),
            ],
            vec![
                BatchOperation::put(profile_key, child_bytes),
                BatchOperation::put(edge_key, edge_bytes),
                BatchOperation::put(index_key, recent_bytes),
                BatchOperation::put(referrer_key, parent_bytes),
            ],
        );

        match result {
            Ok(()) => {
                info!(
                    referee = %member,
                    referrer = %record.owner,
                    code = %code,
                    "Referral edge committed"
                );
                self.events.emit(ReferralEvent::ReferralLinked {
                    edge_id,
                    referrer: record.owner,
                    referee: member,
                    code_used: code.to_string(),
                    at: now,
                });
                Attempt::Done((record.owner, true))
            }
            // Lost a race: the member got linked concurrently or the
            // referrer's profile moved under us. Re-read on the next
            // attempt and resolve from fresh state.
            Err(LedgerError::Conflict { .. }) => Attempt::Retry,
            Err(e) => Attempt::Fail(e.into()),
        }
    }
}
