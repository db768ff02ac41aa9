//! # Referral Engine
//!
//! The referral identity and network propagation engine: mints short
//! collision-free referral codes under concurrent demand, links each new
//! member to a referrer exactly once, and propagates membership-count
//! changes up the ancestor chain so every ancestor's team size and role
//! stay consistent.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Code Uniqueness | No two active codes are equal; a reserved code is never reassigned |
//! | 2 | Write-Once Parent | `parent_id` is set at most once and never changes afterwards |
//! | 3 | No Self-Referral | A member can never be linked to their own code |
//! | 4 | Atomic Link Commit | Parent link, edge record and direct counter commit together or not at all |
//! | 5 | Idempotent Propagation | Re-running propagation for an edge never double-counts an ancestor |
//! | 6 | Bounded Walks | Allocation retries and the ancestor walk terminate under a configured cap |
//! | 7 | Monotonic Roles | Promotion only ever moves a role upward |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure domain logic (entities, code format, errors, retry policy)
//! - `ports/` - Port traits (inbound API, outbound SPI)
//! - `adapters/` - In-memory ledger, code generator, time source, bus sink
//! - `service/` - Application service implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use referral_engine::adapters::{InMemoryLedger, RandomCodeGenerator, SystemTimeSource};
//! use referral_engine::adapters::NullEventSink;
//! use referral_engine::{EngineConfig, ReferralService};
//!
//! let mut service = ReferralService::new(
//!     InMemoryLedger::new(),
//!     RandomCodeGenerator::new(),
//!     SystemTimeSource,
//!     NullEventSink,
//!     EngineConfig::default(),
//! );
//!
//! let code = service.allocate_code(member_a)?;
//! let referrer = service.apply_code(member_b, &code)?;
//! let stats = service.get_stats(member_a, member_a)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod test_utils;

// Re-export key types for convenience
pub use domain::code;
pub use domain::config::EngineConfig;
pub use domain::entities::{
    CodeRecord, MemberProfile, RecentReferral, ReferralEdge, ReferralStats,
};
pub use domain::errors::{LedgerError, ReferralError};
pub use domain::retry::{Attempt, RetryPolicy};
pub use ports::inbound::{PropagationApi, PropagationReport, ReferralApi};
pub use ports::outbound::{
    BatchOperation, CodeGenerator, Guard, LedgerStore, ReferralEventSink, TimeSource,
};
pub use service::ReferralService;
