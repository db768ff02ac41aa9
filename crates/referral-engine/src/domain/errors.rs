//! # Domain Errors
//!
//! Error types for the referral engine.
//!
//! ## Design Principles
//!
//! - Each error maps to a specific precondition or invariant violation
//! - Errors are typed results, never panics, on the happy path
//! - Callers downgrade referral-specific errors to warnings; only
//!   `TransientStore` is worth retrying

use referral_types::MemberId;
use std::fmt;
use thiserror::Error;

/// Errors surfaced by the engine's operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferralError {
    /// Code fails the tag/alphabet/length contract.
    InvalidFormat { code: String },

    /// Code does not exist or is no longer active.
    CodeNotFound { code: String },

    /// The code belongs to the applying member (INVARIANT-3).
    SelfReferralBlocked { member: MemberId },

    /// A different code was already applied; `parent_id` is write-once
    /// (INVARIANT-2).
    AlreadyReferred {
        member: MemberId,
        existing_referrer: MemberId,
    },

    /// Allocator retry budget exceeded (INVARIANT-6).
    CapacityExhausted { attempts: u32 },

    /// Stats requested for a member other than the requester.
    Unauthorized {
        requester: MemberId,
        member: MemberId,
    },

    /// No profile exists for this member.
    MemberNotFound { member: MemberId },

    /// No committed edge exists for this referee; nothing to propagate.
    EdgeNotFound { referee: MemberId },

    /// Retryable infrastructure failure in the backing store.
    TransientStore { message: String },

    /// Record encoding/decoding failure.
    Serialization { message: String },
}

impl ReferralError {
    /// Whether the caller should retry with backoff. All other kinds are
    /// terminal for the attempt: retrying `SelfReferralBlocked` cannot
    /// succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReferralError::TransientStore { .. })
    }
}

impl fmt::Display for ReferralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferralError::InvalidFormat { code } => {
                write!(f, "Code '{}' does not match the referral code format", code)
            }
            ReferralError::CodeNotFound { code } => {
                write!(f, "Code '{}' does not exist or is inactive", code)
            }
            ReferralError::SelfReferralBlocked { member } => {
                write!(
                    f,
                    "Member {} cannot apply their own code (INVARIANT-3)",
                    member
                )
            }
            ReferralError::AlreadyReferred {
                member,
                existing_referrer,
            } => {
                write!(
                    f,
                    "Member {} is already referred by {} (INVARIANT-2)",
                    member, existing_referrer
                )
            }
            ReferralError::CapacityExhausted { attempts } => {
                write!(
                    f,
                    "Code allocation gave up after {} colliding candidates (INVARIANT-6)",
                    attempts
                )
            }
            ReferralError::Unauthorized { requester, member } => {
                write!(f, "Member {} may not read stats of {}", requester, member)
            }
            ReferralError::MemberNotFound { member } => {
                write!(f, "No referral profile for member {}", member)
            }
            ReferralError::EdgeNotFound { referee } => {
                write!(f, "No committed referral edge for referee {}", referee)
            }
            ReferralError::TransientStore { message } => {
                write!(f, "Transient store failure: {}", message)
            }
            ReferralError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ReferralError {}

/// Errors from the ledger store port.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A transaction guard did not hold at commit time. Commit paths
    /// handle this explicitly (re-read and retry, or resolve); it only
    /// degrades to `TransientStore` when the retry budget runs out.
    #[error("guard failed for key {key:02x?}")]
    Conflict { key: Vec<u8> },

    /// I/O failure in the backing store.
    #[error("ledger I/O error: {message}")]
    Io { message: String },

    /// Data corruption in the backing store.
    #[error("ledger corruption: {message}")]
    Corruption { message: String },
}

impl From<LedgerError> for ReferralError {
    fn from(err: LedgerError) -> Self {
        ReferralError::TransientStore {
            message: err.to_string(),
        }
    }
}
