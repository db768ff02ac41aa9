//! Engine configuration and ledger key construction.

use referral_types::{EdgeId, MemberId, Timestamp};

/// Configuration for the referral engine.
///
/// All values have sensible defaults for production use.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How many colliding candidates the allocator tries before failing
    /// with `CapacityExhausted` (default: 10).
    pub max_allocation_attempts: u32,

    /// Optimistic-commit retry bound per transaction under contention
    /// (default: 16). Exhaustion surfaces `TransientStore`, which callers
    /// may retry with backoff.
    pub max_txn_retries: u32,

    /// Defensive cap on the ancestor walk (default: 1000). The write-once
    /// parent invariant means cycles cannot form; the cap guards against
    /// runaway loops from corrupted data.
    pub max_chain_depth: u32,

    /// Maximum rows in the recent-referrals listing (default: 20).
    pub recent_referrals_limit: usize,

    /// The designated root/admin code. Exempt from the generated-length
    /// rule and always a valid fallback target for deep-link resolution.
    pub root_code: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_allocation_attempts: 10,
            max_txn_retries: 16,
            max_chain_depth: 1000,
            recent_referrals_limit: 20,
            root_code: "TALROOT".to_string(),
        }
    }
}

/// Key prefixes for the ledger key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// Member profile: `m:{member}` -> MemberProfile
    Profile,
    /// Code record: `c:{code}` -> CodeRecord
    Code,
    /// Referral edge: `e:{referee}` -> ReferralEdge
    Edge,
    /// Recent-joins index: `x:{referrer}:{ts_be}:{referee}` -> RecentReferral
    RecentIndex,
    /// Propagation dedup marker: `p:{edge}:{ancestor}` -> Timestamp
    PropagationMark,
}

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Profile => b"m:",
            KeyPrefix::Code => b"c:",
            KeyPrefix::Edge => b"e:",
            KeyPrefix::RecentIndex => b"x:",
            KeyPrefix::PropagationMark => b"p:",
        }
    }

    /// Build a full key with the given suffix.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    /// Build a profile key from a member id.
    pub fn profile_key(member: &MemberId) -> Vec<u8> {
        KeyPrefix::Profile.key(member.as_bytes())
    }

    /// Build a code key from a normalized code.
    pub fn code_key(code: &str) -> Vec<u8> {
        KeyPrefix::Code.key(code.as_bytes())
    }

    /// Build an edge key from the referee id. One edge per referee.
    pub fn edge_key(referee: &MemberId) -> Vec<u8> {
        KeyPrefix::Edge.key(referee.as_bytes())
    }

    /// Build a recent-joins index key. The big-endian timestamp makes
    /// lexicographic key order chronological within a referrer's prefix.
    pub fn recent_index_key(referrer: &MemberId, at: Timestamp, referee: &MemberId) -> Vec<u8> {
        let mut suffix = Vec::with_capacity(16 + 1 + 8 + 1 + 16);
        suffix.extend_from_slice(referrer.as_bytes());
        suffix.push(b':');
        suffix.extend_from_slice(&at.to_be_bytes());
        suffix.push(b':');
        suffix.extend_from_slice(referee.as_bytes());
        KeyPrefix::RecentIndex.key(&suffix)
    }

    /// Prefix covering all recent-joins entries of one referrer.
    pub fn recent_index_prefix(referrer: &MemberId) -> Vec<u8> {
        let mut suffix = Vec::with_capacity(16 + 1);
        suffix.extend_from_slice(referrer.as_bytes());
        suffix.push(b':');
        KeyPrefix::RecentIndex.key(&suffix)
    }

    /// Build a propagation marker key for (edge, ancestor).
    pub fn propagation_mark_key(edge: &EdgeId, ancestor: &MemberId) -> Vec<u8> {
        let mut suffix = Vec::with_capacity(16 + 1 + 16);
        suffix.extend_from_slice(edge.as_bytes());
        suffix.push(b':');
        suffix.extend_from_slice(ancestor.as_bytes());
        KeyPrefix::PropagationMark.key(&suffix)
    }
}
