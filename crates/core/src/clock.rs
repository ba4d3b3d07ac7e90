// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Injectable clock so session/workspace timestamps are testable without
//! sleeping real wall-clock time.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now", injected into managers instead of called directly.
pub trait Clock: Send + Sync {
    /// Current time as unix seconds.
    fn now_secs(&self) -> u64;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// A clock that only advances when told to, for deterministic tests of the
/// idle-detection and hook-timeout logic.
#[derive(Debug, Clone)]
pub struct FakeClock {
    now: Arc<Mutex<u64>>,
}

impl FakeClock {
    pub fn new(start_secs: u64) -> Self {
        Self {
            now: Arc::new(Mutex::new(start_secs)),
        }
    }

    pub fn advance(&self, secs: u64) {
        *self.now.lock() += secs;
    }

    pub fn set(&self, secs: u64) {
        *self.now.lock() = secs;
    }
}

impl Clock for FakeClock {
    fn now_secs(&self) -> u64 {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_advances_monotonically() {
        let clock = FakeClock::new(100);
        assert_eq!(clock.now_secs(), 100);
        clock.advance(5);
        assert_eq!(clock.now_secs(), 105);
    }

    #[test]
    fn system_clock_is_nonzero() {
        assert!(SystemClock.now_secs() > 0);
    }
}
