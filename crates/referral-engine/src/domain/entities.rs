//! # Domain Entities
//!
//! Durable records owned exclusively by the identity ledger, plus the
//! read-only stats projection. No other component writes these fields
//! directly; all mutation goes through the engine's commit paths.

use referral_types::{EdgeId, MemberId, Role, Timestamp};
use serde::{Deserialize, Serialize};

/// A reserved referral code.
///
/// Globally unique while `active` (INVARIANT-1). Once reserved, a code is
/// never reassigned, even if later deactivated; there is no deletion path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    /// The code in normalized (uppercase) form.
    pub code: String,
    /// The member this code attributes joins to.
    pub owner: MemberId,
    /// Reservation time.
    pub reserved_at: Timestamp,
    /// Soft-deactivation flag. Inactive codes fail lookup but keep their
    /// reservation.
    pub active: bool,
}

/// Per-member referral profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub member_id: MemberId,
    /// The code this member owns; set at most once by the allocator.
    pub own_code: Option<String>,
    /// The member who referred them. Write-once (INVARIANT-2); never equal
    /// to `member_id` (INVARIANT-3).
    pub parent_id: Option<MemberId>,
    /// The code value used at join time, kept for audit.
    pub parent_code: Option<String>,
    /// Members whose `parent_id` points directly here. Mutated only by the
    /// chain linker's commit.
    pub direct_count: u64,
    /// All descendants, direct and indirect. Mutated only by the
    /// propagation worker.
    pub team_size: u64,
    /// Current role tier; moves upward only (INVARIANT-7).
    pub role: Role,
    pub created_at: Timestamp,
}

impl MemberProfile {
    /// A fresh profile: no code, no parent, zero counters, base role.
    pub fn new(member_id: MemberId, created_at: Timestamp) -> Self {
        Self {
            member_id,
            own_code: None,
            parent_id: None,
            parent_code: None,
            direct_count: 0,
            team_size: 0,
            role: Role::default(),
            created_at,
        }
    }
}

/// A committed referral edge: at most one per referee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralEdge {
    /// Stable id; keys the propagation dedup markers.
    pub edge_id: EdgeId,
    pub referrer_id: MemberId,
    pub referee_id: MemberId,
    /// The code value used at join time.
    pub code_used: String,
    pub created_at: Timestamp,
}

/// One row of the recent-joins listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentReferral {
    pub referee_id: MemberId,
    pub code_used: String,
    pub joined_at: Timestamp,
}

/// Read-only stats projection served to the member themselves.
///
/// Aggregates may lag briefly behind concurrent propagation; only the
/// linker's commit itself is strongly consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralStats {
    pub member_id: MemberId,
    pub own_code: Option<String>,
    pub direct_count: u64,
    pub team_size: u64,
    pub role: Role,
    /// Most recent direct referrals, newest first, bounded by
    /// `EngineConfig::recent_referrals_limit`.
    pub recent_referrals: Vec<RecentReferral>,
}
