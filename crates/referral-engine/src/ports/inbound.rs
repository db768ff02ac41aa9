//! # Inbound Ports (Driving Ports)
//!
//! The API the engine offers to the registration flow, the deep-link
//! resolver and the dashboard collaborator. All operations are safe to
//! retry: allocation and application are idempotent, stats are read-only.

use crate::domain::entities::ReferralStats;
use crate::domain::errors::ReferralError;
use referral_types::{EdgeId, MemberId, Role};

/// The referral engine API.
///
/// Callers in the registration flow treat allocation/application failures
/// as warnings, never as fatal errors: a typo'd or expired code degrades
/// to "no referrer" rather than blocking account creation.
pub trait ReferralApi {
    /// Create the member's referral profile if it does not exist yet.
    /// Idempotent.
    fn register_member(&mut self, member: MemberId) -> Result<(), ReferralError>;

    /// Mint and atomically reserve a unique referral code for the member.
    ///
    /// Idempotent: if the member already owns a code it is returned
    /// unchanged and no second code is ever allocated.
    fn allocate_code(&mut self, member: MemberId) -> Result<String, ReferralError>;

    /// Link the member to the owner of `code` exactly once.
    ///
    /// Returns the referrer's id. Re-applying the same code is a no-op
    /// success; applying a different code after a link exists fails with
    /// `AlreadyReferred` without changing any state.
    fn apply_code(&mut self, member: MemberId, code: &str) -> Result<MemberId, ReferralError>;

    /// Read-only stats projection. A member can only request their own
    /// stats; anything else fails with `Unauthorized`.
    fn get_stats(
        &self,
        requester: MemberId,
        member: MemberId,
    ) -> Result<ReferralStats, ReferralError>;
}

/// The propagation worker entry point.
///
/// Invoked synchronously after a successful link commit, and again by
/// retry machinery whenever a previous run may have stopped partway.
/// At-least-once semantics; per-ancestor dedup markers keep re-runs from
/// double-counting (INVARIANT-5).
pub trait PropagationApi {
    /// Propagate the committed edge of `referee` up the ancestor chain.
    fn propagate(&mut self, referee: MemberId) -> Result<PropagationReport, ReferralError>;
}

/// What a propagation run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationReport {
    /// The edge that was propagated.
    pub edge_id: EdgeId,
    /// Ancestors whose team size was incremented by this run.
    pub ancestors_updated: u32,
    /// Ancestors skipped because a previous run already counted them.
    pub ancestors_skipped: u32,
    /// Promotions applied by this run.
    pub promotions: Vec<(MemberId, Role)>,
    /// Whether the walk stopped at the depth cap instead of the root.
    pub truncated: bool,
}
