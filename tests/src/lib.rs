//! # Talowa Referral Engine Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/      # Full-wiring flows through the event bus
//! │   ├── flows.rs
//! │   └── event_stream.rs
//! │
//! └── concurrency/      # Multi-threaded races over a shared ledger
//!     ├── allocation_race.rs
//!     └── linking_race.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p referral-tests
//!
//! # By category
//! cargo test -p referral-tests integration::
//! cargo test -p referral-tests concurrency::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod concurrency;
pub mod integration;
