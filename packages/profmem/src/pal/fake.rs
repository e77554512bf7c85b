//! Fake platform implementation for testing.

#![cfg_attr(coverage_nightly, coverage(off))]

use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::ERR_POISONED_LOCK;
use crate::pal::Platform;

#[derive(Debug)]
struct FakePlatformState {
    // `None` simulates a platform that cannot report peak memory.
    peak_resident_bytes: Option<u64>,
    now: Instant,
}

/// Fake implementation of the platform abstraction for testing.
///
/// Clones share the same state, so a test can keep one clone to move the clock forward or
/// change the memory reading while the code under test holds another.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakePlatform {
    /// Creates a fake platform with zero peak memory and a frozen clock.
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakePlatformState {
                peak_resident_bytes: Some(0),
                now: Instant::now(),
            })),
        }
    }

    pub(crate) fn set_peak_resident_bytes(&self, bytes: u64) {
        self.state.lock().expect(ERR_POISONED_LOCK).peak_resident_bytes = Some(bytes);
    }

    pub(crate) fn make_memory_unavailable(&self) {
        self.state.lock().expect(ERR_POISONED_LOCK).peak_resident_bytes = None;
    }

    /// Moves the fake clock forward.
    pub(crate) fn advance(&self, duration: Duration) {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);
        state.now = state
            .now
            .checked_add(duration)
            .expect("test advanced the fake clock unrealistically far");
    }
}

impl Platform for FakePlatform {
    fn peak_resident_bytes(&self) -> io::Result<u64> {
        self.state
            .lock()
            .expect(ERR_POISONED_LOCK)
            .peak_resident_bytes
            .ok_or_else(|| io::Error::from(io::ErrorKind::Unsupported))
    }

    fn now(&self) -> Instant {
        self.state.lock().expect(ERR_POISONED_LOCK).now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializes_with_zero_memory_and_frozen_clock() {
        let platform = FakePlatform::new();

        assert_eq!(platform.peak_resident_bytes().unwrap(), 0);
        assert_eq!(platform.now(), platform.now());
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();
        let start = platform2.now();

        platform1.set_peak_resident_bytes(123);
        platform1.advance(Duration::from_secs(2));

        assert_eq!(platform2.peak_resident_bytes().unwrap(), 123);
        assert_eq!(platform2.now().duration_since(start), Duration::from_secs(2));
    }

    #[test]
    fn unavailable_memory_is_an_error() {
        let platform = FakePlatform::new();
        platform.make_memory_unavailable();

        let error = platform.peak_resident_bytes().unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::Unsupported);
    }
}
