//! Wall-clock sources for the deadline tracker.

use nyaya_core::Timestamp;

/// Source of the current UTC instant.
pub trait Clock: Send + Sync + 'static {
    /// The current instant, seconds precision.
    fn now(&self) -> Timestamp;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that starts at a fixed instant and advances with the tokio
/// clock. Under a paused runtime it moves only when tokio time does.
#[derive(Debug, Clone, Copy)]
pub struct AnchoredClock {
    anchor: Timestamp,
    started: tokio::time::Instant,
}

impl AnchoredClock {
    /// Anchor at `anchor`, now. Must be called inside a tokio runtime.
    pub fn new(anchor: Timestamp) -> Self {
        Self {
            anchor,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for AnchoredClock {
    fn now(&self) -> Timestamp {
        i64::try_from(self.started.elapsed().as_secs())
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|elapsed| self.anchor.checked_add(elapsed))
            .unwrap_or(self.anchor)
    }
}
