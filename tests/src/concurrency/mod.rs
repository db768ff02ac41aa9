//! Multi-threaded races over a shared ledger.
//!
//! Each thread owns its own service instance; clones of `SharedLedger`
//! are the only shared state, mirroring how concurrent request handlers
//! contend on the real store.

pub mod allocation_race;
pub mod linking_race;
