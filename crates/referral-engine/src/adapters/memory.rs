//! In-memory ledger adapters.

use crate::domain::errors::LedgerError;
use crate::ports::outbound::{BatchOperation, Guard, LedgerStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory ledger for unit tests and single-owner use.
///
/// Guarded transactions are trivially atomic here; production uses a store
/// with true conditional transactions.
#[derive(Default)]
pub struct InMemoryLedger {
    data: HashMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_guard(&self, guard: &Guard) -> Result<(), LedgerError> {
        match guard {
            Guard::Absent { key } => {
                if self.data.contains_key(key) {
                    return Err(LedgerError::Conflict { key: key.clone() });
                }
            }
            Guard::Matches { key, expected } => {
                if self.data.get(key).map(|v| v.as_slice()) != Some(expected.as_slice()) {
                    return Err(LedgerError::Conflict { key: key.clone() });
                }
            }
        }
        Ok(())
    }
}

impl LedgerStore for InMemoryLedger {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.data.get(key).cloned())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, LedgerError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LedgerError> {
        let results: Vec<_> = self
            .data
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(results)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), LedgerError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), LedgerError> {
        self.data.remove(key);
        Ok(())
    }

    fn transact(
        &mut self,
        guards: Vec<Guard>,
        ops: Vec<BatchOperation>,
    ) -> Result<(), LedgerError> {
        // All guards are checked before any operation is applied, so a
        // failed guard leaves the ledger untouched.
        for guard in &guards {
            self.check_guard(guard)?;
        }
        for op in ops {
            match op {
                BatchOperation::Put { key, value } => {
                    self.data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    self.data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// Thread-safe handle over a single `InMemoryLedger`.
///
/// Clones share the same underlying data; each port call takes the lock
/// for its full duration, so `transact` keeps its guard-check-then-apply
/// atomicity across concurrently running services.
#[derive(Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<InMemoryLedger>>,
}

impl SharedLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for SharedLedger {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LedgerError> {
        self.inner.lock().get(key)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, LedgerError> {
        self.inner.lock().exists(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LedgerError> {
        self.inner.lock().prefix_scan(prefix)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), LedgerError> {
        self.inner.lock().put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), LedgerError> {
        self.inner.lock().delete(key)
    }

    fn transact(
        &mut self,
        guards: Vec<Guard>,
        ops: Vec<BatchOperation>,
    ) -> Result<(), LedgerError> {
        self.inner.lock().transact(guards, ops)
    }
}
