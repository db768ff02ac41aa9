//! Pure domain logic: entities, the code format contract, errors, the
//! engine configuration and the bounded retry policy.

pub mod code;
pub mod config;
pub mod entities;
pub mod errors;
pub mod retry;
