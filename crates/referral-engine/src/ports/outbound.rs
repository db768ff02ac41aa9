//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the engine requires from the host application. The ledger
//! store is the sole shared mutable resource and the sole synchronization
//! point: every multi-field update goes through one guarded transaction,
//! never a read-compute-write split across transaction boundaries.

use crate::domain::errors::LedgerError;
use referral_bus::ReferralEvent;
use referral_types::Timestamp;

/// A precondition checked atomically with the operations of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// The key must not exist (conditional create).
    Absent { key: Vec<u8> },
    /// The key must hold exactly these bytes (optimistic check-then-set).
    Matches { key: Vec<u8>, expected: Vec<u8> },
}

impl Guard {
    /// Create an Absent guard.
    pub fn absent(key: impl Into<Vec<u8>>) -> Self {
        Guard::Absent { key: key.into() }
    }

    /// Create a Matches guard against a previously read snapshot.
    pub fn matches(key: impl Into<Vec<u8>>, expected: impl Into<Vec<u8>>) -> Self {
        Guard::Matches {
            key: key.into(),
            expected: expected.into(),
        }
    }
}

/// Write operation inside a transaction.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Abstract interface for the durable identity ledger.
///
/// Production backs this with a transactional document/KV store; tests use
/// the in-memory adapters.
pub trait LedgerStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, LedgerError>;

    /// Iterate over keys with a prefix.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LedgerError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), LedgerError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), LedgerError>;

    /// Guarded atomic commit (INVARIANT-4).
    ///
    /// Either every guard holds and ALL operations are applied, or a guard
    /// fails and NONE are applied, reported as `LedgerError::Conflict` with
    /// the failing key. Exactly one of two concurrent transactions racing
    /// on the same guard can commit.
    fn transact(&mut self, guards: Vec<Guard>, ops: Vec<BatchOperation>)
        -> Result<(), LedgerError>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

/// Source of candidate referral codes.
///
/// Candidates are full normalized codes (tag included). Different members'
/// allocations may race for the same candidate; the ledger's conditional
/// create picks exactly one winner and the loser draws a new candidate.
pub trait CodeGenerator: Send + Sync {
    /// Produce the next candidate code.
    fn next_candidate(&mut self) -> String;
}

/// Sink for engine-emitted events.
///
/// Emission is fire-and-forget from the engine's point of view; delivery
/// and retry belong to the notification collaborator.
pub trait ReferralEventSink: Send + Sync {
    /// Emit an event.
    fn emit(&self, event: ReferralEvent);
}
