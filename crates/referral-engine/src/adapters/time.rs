//! Time source adapters.

use crate::ports::outbound::TimeSource;
use referral_types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default time source using system time.
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Controllable time source for unit tests.
#[derive(Default)]
pub struct MockTimeSource {
    now: AtomicU64,
}

impl MockTimeSource {
    /// Start the clock at `now`.
    pub fn at(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_time_advances() {
        let time = MockTimeSource::at(1000);
        assert_eq!(time.now(), 1000);
        time.advance(30);
        assert_eq!(time.now(), 1030);
    }

    #[test]
    fn test_system_time_is_past_2023() {
        let time = SystemTimeSource;
        assert!(time.now() > 1_672_531_200);
    }
}
