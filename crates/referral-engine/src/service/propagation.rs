//! Propagation: walk the ancestor chain of a committed edge and apply
//! team counters exactly once per (edge, ancestor) pair.

use crate::domain::config::KeyPrefix;
use crate::domain::entities::ReferralEdge;
use crate::domain::errors::{LedgerError, ReferralError};
use crate::domain::retry::{Attempt, RetryPolicy};
use crate::ports::inbound::PropagationReport;
use crate::ports::outbound::{
    BatchOperation, CodeGenerator, Guard, LedgerStore, ReferralEventSink, TimeSource,
};
use crate::service::{decode, encode, ReferralService};
use referral_bus::ReferralEvent;
use referral_types::{MemberId, Role};
use tracing::{debug, info, warn};

/// Result of one per-ancestor increment attempt. Both arms carry the
/// ancestor's own parent so the walk can continue upward.
enum IncrementOutcome {
    Applied {
        parent: Option<MemberId>,
        promotion: Option<(Role, Role)>,
    },
    AlreadyApplied {
        parent: Option<MemberId>,
    },
}

impl<L, G, T, S> ReferralService<L, G, T, S>
where
    L: LedgerStore,
    G: CodeGenerator,
    T: TimeSource,
    S: ReferralEventSink,
{
    /// Apply the team-size effects of the referee's committed edge to
    /// every ancestor, idempotently.
    ///
    /// Ancestors already marked for this edge are skipped (INVARIANT-5),
    /// so the whole run is safely re-runnable after a partial failure.
    /// The walk is capped at `max_chain_depth` hops (INVARIANT-6).
    pub fn propagate(&mut self, referee: MemberId) -> Result<PropagationReport, ReferralError> {
        let edge_key = KeyPrefix::edge_key(&referee);
        let edge: ReferralEdge = match self.ledger.get(&edge_key)? {
            Some(raw) => decode(&raw)?,
            None => return Err(ReferralError::EdgeNotFound { referee }),
        };

        let mut report = PropagationReport {
            edge_id: edge.edge_id,
            ancestors_updated: 0,
            ancestors_skipped: 0,
            promotions: Vec::new(),
            truncated: false,
        };

        let mut current = Some(edge.referrer_id);
        let mut depth = 0u32;
        while let Some(ancestor) = current {
            if depth >= self.config.max_chain_depth {
                // Write-once parents rule out genuine cycles; reaching
                // the cap means the chain data is corrupted upstream.
                warn!(edge = %edge.edge_id, depth, "Ancestor walk truncated at depth cap");
                report.truncated = true;
                break;
            }

            match self.apply_team_increment(&edge, ancestor)? {
                IncrementOutcome::Applied { parent, promotion } => {
                    report.ancestors_updated += 1;
                    if let Some((_, to)) = promotion {
                        report.promotions.push((ancestor, to));
                    }
                    current = parent;
                }
                IncrementOutcome::AlreadyApplied { parent } => {
                    report.ancestors_skipped += 1;
                    current = parent;
                }
            }
            depth += 1;
        }

        debug!(
            edge = %edge.edge_id,
            updated = report.ancestors_updated,
            skipped = report.ancestors_skipped,
            truncated = report.truncated,
            "Propagation run finished"
        );
        Ok(report)
    }

    /// Increment one ancestor's team counter under a dedup mark.
    ///
    /// The counter write and the mark commit together, so a crash between
    /// them is impossible and a replay observes the mark and skips.
    fn apply_team_increment(
        &mut self,
        edge: &ReferralEdge,
        ancestor: MemberId,
    ) -> Result<IncrementOutcome, ReferralError> {
        let mark_key = KeyPrefix::propagation_mark_key(&edge.edge_id, &ancestor);
        let profile_key = KeyPrefix::profile_key(&ancestor);

        let policy = RetryPolicy::new(self.config.max_txn_retries);
        let exhausted = ReferralError::TransientStore {
            message: format!("team counter contention on ancestor {}", ancestor),
        };

        policy.run(
            |_attempt| {
                let (profile, snapshot) = match self.read_profile(ancestor) {
                    Ok(Some(found)) => found,
                    Ok(None) => {
                        return Attempt::Fail(ReferralError::MemberNotFound { member: ancestor })
                    }
                    Err(e) => return Attempt::Fail(e),
                };

                match self.ledger.exists(&mark_key) {
                    Ok(true) => {
                        return Attempt::Done(IncrementOutcome::AlreadyApplied {
                            parent: profile.parent_id,
                        })
                    }
                    Ok(false) => {}
                    Err(e) => return Attempt::Fail(e.into()),
                }

                let mut updated = profile;
                updated.team_size += 1;

                let held = updated.role;
                let promotion = self.promotion_table.promotion_for(
                    held,
                    updated.direct_count,
                    updated.team_size,
                );
                if let Some(to) = promotion {
                    updated.role = to;
                }

                let now = self.time_source.now();
                let profile_bytes = match encode(&updated) {
                    Ok(bytes) => bytes,
                    Err(e) => return Attempt::Fail(e),
                };

                let result = self.ledger.transact(
                    vec![
                        Guard::matches(profile_key.clone(), snapshot),
                        Guard::absent(mark_key.clone()),
                    ],
                    vec![
                        BatchOperation::put(profile_key.clone(), profile_bytes),
                        BatchOperation::put(mark_key.clone(), now.to_be_bytes().to_vec()),
                    ],
                );

                match result {
                    Ok(()) => {
                        if let Some(to) = promotion {
                            info!(member = %ancestor, from = %held, to = %to, "Role promotion");
                            self.events.emit(ReferralEvent::RolePromoted {
                                member: ancestor,
                                from: held,
                                to,
                                at: now,
                            });
                        }
                        Attempt::Done(IncrementOutcome::Applied {
                            parent: updated.parent_id,
                            promotion: promotion.map(|to| (held, to)),
                        })
                    }
                    // Another branch's propagation touched this ancestor
                    // concurrently; re-read and retry.
                    Err(LedgerError::Conflict { .. }) => Attempt::Retry,
                    Err(e) => Attempt::Fail(e.into()),
                }
            },
            exhausted,
        )
    }
}
