//! Test doubles shared by the unit tests and the integration test crate.

use crate::domain::errors::LedgerError;
use crate::ports::outbound::{BatchOperation, CodeGenerator, Guard, LedgerStore, ReferralEventSink};
use parking_lot::Mutex;
use referral_bus::ReferralEvent;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Event sink that records every emitted event for later assertions.
#[derive(Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<ReferralEvent>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order.
    pub fn events(&self) -> Vec<ReferralEvent> {
        self.events.lock().clone()
    }
}

impl ReferralEventSink for RecordingEventSink {
    fn emit(&self, event: ReferralEvent) {
        self.events.lock().push(event);
    }
}

/// Code generator that replays a fixed script of candidates.
///
/// Lets a test force candidate collisions and then observe the retry
/// behavior. Panics when the script runs dry, which is itself a useful
/// assertion that an operation drew no more candidates than expected.
pub struct ScriptedCodeGenerator {
    script: VecDeque<String>,
}

impl ScriptedCodeGenerator {
    pub fn new(candidates: &[&str]) -> Self {
        Self {
            script: candidates.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl CodeGenerator for ScriptedCodeGenerator {
    fn next_candidate(&mut self) -> String {
        self.script
            .pop_front()
            .unwrap_or_else(|| panic!("scripted candidates exhausted"))
    }
}

/// Ledger wrapper that fails one `transact` call before it applies
/// anything, then recovers.
///
/// Used to prove that a commit either lands whole or not at all, and that
/// a re-run after the fault picks up cleanly.
pub struct FaultInjectingLedger<L: LedgerStore> {
    inner: L,
    // Counts down per transact call; the fault fires exactly when it
    // reaches zero and never again.
    fuse: AtomicI64,
}

impl<L: LedgerStore> FaultInjectingLedger<L> {
    /// Fail the `(succeed_first + 1)`-th transact call.
    pub fn new(inner: L, succeed_first: u32) -> Self {
        Self {
            inner,
            fuse: AtomicI64::new(i64::from(succeed_first)),
        }
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: LedgerStore> LedgerStore for FaultInjectingLedger<L> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LedgerError> {
        self.inner.get(key)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, LedgerError> {
        self.inner.exists(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LedgerError> {
        self.inner.prefix_scan(prefix)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), LedgerError> {
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), LedgerError> {
        self.inner.delete(key)
    }

    fn transact(
        &mut self,
        guards: Vec<Guard>,
        ops: Vec<BatchOperation>,
    ) -> Result<(), LedgerError> {
        if self.fuse.fetch_sub(1, Ordering::SeqCst) == 0 {
            return Err(LedgerError::Io {
                message: "injected fault".to_string(),
            });
        }
        self.inner.transact(guards, ops)
    }
}
