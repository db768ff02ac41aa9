//! Code allocation: registration profiles, candidate reservation and the
//! root code bootstrap.

use crate::domain::code;
use crate::domain::config::KeyPrefix;
use crate::domain::entities::{CodeRecord, MemberProfile};
use crate::domain::errors::{LedgerError, ReferralError};
use crate::domain::retry::{Attempt, RetryPolicy};
use crate::ports::outbound::{
    BatchOperation, CodeGenerator, Guard, LedgerStore, ReferralEventSink, TimeSource,
};
use crate::service::{encode, ReferralService};
use referral_bus::ReferralEvent;
use referral_types::MemberId;
use tracing::{debug, info};

impl<L, G, T, S> ReferralService<L, G, T, S>
where
    L: LedgerStore,
    G: CodeGenerator,
    T: TimeSource,
    S: ReferralEventSink,
{
    /// Create the member's referral profile if it does not exist yet.
    ///
    /// Idempotent; a concurrent registration for the same member is
    /// indistinguishable from a replay.
    pub fn register_member(&mut self, member: MemberId) -> Result<(), ReferralError> {
        let key = KeyPrefix::profile_key(&member);
        if self.ledger.exists(&key)? {
            return Ok(());
        }

        let profile = MemberProfile::new(member, self.time_source.now());
        let value = encode(&profile)?;
        match self
            .ledger
            .transact(
                vec![Guard::absent(key.clone())],
                vec![BatchOperation::put(key, value)],
            ) {
            Ok(()) => {
                debug!(member = %member, "Referral profile created");
                Ok(())
            }
            // Concurrent registration for the same member already won.
            Err(LedgerError::Conflict { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Mint and atomically reserve a unique referral code for the member.
    ///
    /// The code reservation and the `own_code` write on the profile are a
    /// single transaction (INVARIANT-1, INVARIANT-4): there is no window
    /// where a code is reserved but unattributed. Colliding candidates are
    /// retried under a bounded policy; exhaustion is `CapacityExhausted`.
    pub fn allocate_code(&mut self, member: MemberId) -> Result<String, ReferralError> {
        self.register_member(member)?;

        let profile_key = KeyPrefix::profile_key(&member);
        let (mut profile, mut snapshot) = self.require_profile(member)?;
        if let Some(existing) = profile.own_code.clone() {
            debug!(member = %member, code = %existing, "Allocation replay, returning existing code");
            return Ok(existing);
        }

        let policy = RetryPolicy::new(self.config.max_allocation_attempts);
        let exhausted = ReferralError::CapacityExhausted {
            attempts: policy.max_attempts(),
        };

        policy.run(
            |attempt| {
                let candidate = self.codegen.next_candidate();
                debug_assert!(code::validate(&candidate).is_ok());

                let now = self.time_source.now();
                let record = CodeRecord {
                    code: candidate.clone(),
                    owner: member,
                    reserved_at: now,
                    active: true,
                };
                let mut updated = profile.clone();
                updated.own_code = Some(candidate.clone());

                let record_bytes = match encode(&record) {
                    Ok(bytes) => bytes,
                    Err(e) => return Attempt::Fail(e),
                };
                let profile_bytes = match encode(&updated) {
                    Ok(bytes) => bytes,
                    Err(e) => return Attempt::Fail(e),
                };

                let code_key = KeyPrefix::code_key(&candidate);
                let result = self.ledger.transact(
                    vec![
                        Guard::absent(code_key.clone()),
                        Guard::matches(profile_key.clone(), snapshot.clone()),
                    ],
                    vec![
                        BatchOperation::put(code_key, record_bytes),
                        BatchOperation::put(profile_key.clone(), profile_bytes),
                    ],
                );

                match result {
                    Ok(()) => {
                        info!(member = %member, code = %candidate, attempt, "Referral code reserved");
                        self.events.emit(ReferralEvent::CodeAllocated {
                            member,
                            code: candidate.clone(),
                            at: now,
                        });
                        Attempt::Done(candidate)
                    }
                    Err(LedgerError::Conflict { .. }) => {
                        // Candidate collided, or our profile snapshot went
                        // stale. Re-read to tell the two apart.
                        match self.read_profile(member) {
                            Ok(Some((fresh, raw))) => {
                                if let Some(won) = fresh.own_code.clone() {
                                    // A concurrent allocation for this
                                    // member committed first.
                                    return Attempt::Done(won);
                                }
                                debug!(member = %member, candidate = %candidate, attempt, "Candidate collided, drawing a new one");
                                profile = fresh;
                                snapshot = raw;
                                Attempt::Retry
                            }
                            Ok(None) => Attempt::Fail(ReferralError::MemberNotFound { member }),
                            Err(e) => Attempt::Fail(e),
                        }
                    }
                    Err(e) => Attempt::Fail(e.into()),
                }
            },
            exhausted,
        )
    }

    /// Reserve the designated root/admin code for `root_member` at
    /// bootstrap. Idempotent.
    ///
    /// The root code is exempt from the generated format contract and is
    /// the deep-link resolver's fallback target, so it must resolve for
    /// the lifetime of the deployment.
    pub fn install_root_code(&mut self, root_member: MemberId) -> Result<(), ReferralError> {
        self.register_member(root_member)?;

        let root_code = code::normalize(&self.config.root_code);
        let foreign_owner = || ReferralError::TransientStore {
            message: format!("root code '{}' is reserved by another member", root_code),
        };

        if let Some(record) = self.read_code_record(&root_code)? {
            if record.owner == root_member {
                return Ok(());
            }
            return Err(foreign_owner());
        }

        let record = CodeRecord {
            code: root_code.clone(),
            owner: root_member,
            reserved_at: self.time_source.now(),
            active: true,
        };
        let key = KeyPrefix::code_key(&root_code);
        let value = encode(&record)?;

        match self.ledger.transact(
            vec![Guard::absent(key)],
            vec![BatchOperation::put(KeyPrefix::code_key(&root_code), value)],
        ) {
            Ok(()) => {
                info!(member = %root_member, code = %root_code, "Root code installed");
                Ok(())
            }
            Err(LedgerError::Conflict { .. }) => {
                // Raced another bootstrap; accept only the same owner.
                match self.read_code_record(&root_code)? {
                    Some(existing) if existing.owner == root_member => Ok(()),
                    _ => Err(foreign_owner()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}
