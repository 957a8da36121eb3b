use crate::ports::outbound::TimeSource;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use shared_types::Timestamp;

/// Default time source using system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Deterministic clock that advances by a fixed step on every reading.
///
/// Used where creation order must be observable through timestamps.
#[derive(Debug)]
pub struct ManualTimeSource {
    current: Mutex<Timestamp>,
    step: Duration,
}

impl ManualTimeSource {
    /// Start at `start`, advancing one second per reading.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self::with_step(start, Duration::seconds(1))
    }

    #[must_use]
    pub fn with_step(start: Timestamp, step: Duration) -> Self {
        Self {
            current: Mutex::new(start),
            step,
        }
    }

    /// Jump forward without producing a reading.
    pub fn advance(&self, by: Duration) {
        *self.current.lock() += by;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        let mut current = self.current.lock();
        let now = *current;
        *current += self.step;
        now
    }
}
