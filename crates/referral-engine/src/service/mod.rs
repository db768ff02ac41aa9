//! # Referral Service
//!
//! The application service implementing the referral API.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `ReferralApi` (allocation, linking, stats)
//! 2. Implements `PropagationApi` (ancestor-chain counter propagation)
//! 3. Enforces all 7 domain invariants
//! 4. Uses dependency injection for all external dependencies
//!
//! The ledger is the sole synchronization point: every multi-record
//! update is one guarded transaction, and guard conflicts are resolved by
//! bounded re-read-and-retry, never by in-process locking across requests.

mod allocator;
mod linker;
mod propagation;
mod stats;


use crate::domain::config::{EngineConfig, KeyPrefix};
use crate::domain::entities::{CodeRecord, MemberProfile, ReferralStats};
use crate::domain::errors::ReferralError;
use crate::ports::inbound::{PropagationApi, PropagationReport, ReferralApi};
use crate::ports::outbound::{CodeGenerator, LedgerStore, ReferralEventSink, TimeSource};
use referral_types::{MemberId, PromotionTable};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode a record for storage.
///
/// bincode is deterministic for a given value, which the snapshot guards
/// rely on.
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ReferralError> {
    bincode::serialize(value).map_err(|e| ReferralError::Serialization {
        message: e.to_string(),
    })
}

/// Decode a stored record.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ReferralError> {
    bincode::deserialize(bytes).map_err(|e| ReferralError::Serialization {
        message: e.to_string(),
    })
}

/// The Referral Service.
///
/// Implements both `ReferralApi` and `PropagationApi`.
pub struct ReferralService<L, G, T, S>
where
    L: LedgerStore,
    G: CodeGenerator,
    T: TimeSource,
    S: ReferralEventSink,
{
    /// Durable identity ledger.
    ledger: L,
    /// Candidate code source.
    codegen: G,
    /// Time source for timestamps.
    time_source: T,
    /// Event sink for the notification collaborator.
    events: S,
    /// Service configuration.
    config: EngineConfig,
    /// Ordered role thresholds.
    promotion_table: PromotionTable,
}

impl<L, G, T, S> ReferralService<L, G, T, S>
where
    L: LedgerStore,
    G: CodeGenerator,
    T: TimeSource,
    S: ReferralEventSink,
{
    /// Create a new Referral Service with the given dependencies and the
    /// default promotion table.
    pub fn new(ledger: L, codegen: G, time_source: T, events: S, config: EngineConfig) -> Self {
        Self {
            ledger,
            codegen,
            time_source,
            events,
            config,
            promotion_table: PromotionTable::default(),
        }
    }

    /// Replace the promotion table.
    pub fn with_promotion_table(mut self, table: PromotionTable) -> Self {
        self.promotion_table = table;
        self
    }

    /// Read access to the ledger, for host wiring and tests.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Read a profile together with its raw snapshot for guard building.
    fn read_profile(
        &self,
        member: MemberId,
    ) -> Result<Option<(MemberProfile, Vec<u8>)>, ReferralError> {
        let key = KeyPrefix::profile_key(&member);
        match self.ledger.get(&key)? {
            Some(raw) => {
                let profile = decode(&raw)?;
                Ok(Some((profile, raw)))
            }
            None => Ok(None),
        }
    }

    /// Read a profile, failing with `MemberNotFound` when missing.
    fn require_profile(
        &self,
        member: MemberId,
    ) -> Result<(MemberProfile, Vec<u8>), ReferralError> {
        self.read_profile(member)?
            .ok_or(ReferralError::MemberNotFound { member })
    }

    /// Look up a code record by normalized code value.
    fn read_code_record(&self, code: &str) -> Result<Option<CodeRecord>, ReferralError> {
        let key = KeyPrefix::code_key(code);
        match self.ledger.get(&key)? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }
}

impl<L, G, T, S> ReferralApi for ReferralService<L, G, T, S>
where
    L: LedgerStore,
    G: CodeGenerator,
    T: TimeSource,
    S: ReferralEventSink,
{
    fn register_member(&mut self, member: MemberId) -> Result<(), ReferralError> {
        ReferralService::register_member(self, member)
    }

    fn allocate_code(&mut self, member: MemberId) -> Result<String, ReferralError> {
        ReferralService::allocate_code(self, member)
    }

    fn apply_code(&mut self, member: MemberId, code: &str) -> Result<MemberId, ReferralError> {
        ReferralService::apply_code(self, member, code)
    }

    fn get_stats(
        &self,
        requester: MemberId,
        member: MemberId,
    ) -> Result<ReferralStats, ReferralError> {
        ReferralService::get_stats(self, requester, member)
    }
}

impl<L, G, T, S> PropagationApi for ReferralService<L, G, T, S>
where
    L: LedgerStore,
    G: CodeGenerator,
    T: TimeSource,
    S: ReferralEventSink,
{
    fn propagate(&mut self, referee: MemberId) -> Result<PropagationReport, ReferralError> {
        ReferralService::propagate(self, referee)
    }
}
