use std::time::Duration;
use tokio::time::Instant;

/// Process-wide pacing state for one API client
///
/// Tracks when the last request left the process so every dispatch can be
/// held back until the minimum interval has passed. Nothing is persisted;
/// a new process starts with an open gate.
#[derive(Debug, Clone)]
pub struct PacingGate {
    /// Minimum time between two dispatches
    pub min_interval: Duration,

    /// Timestamp of the last dispatch
    pub last_dispatch: Option<Instant>,

    /// Number of requests dispatched through this gate
    pub dispatch_count: u64,
}

impl PacingGate {
    /// Creates an open gate enforcing `min_interval` between dispatches
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: None,
            dispatch_count: 0,
        }
    }

    /// Checks if a request may be dispatched at `now`
    pub fn can_dispatch(&self, now: Instant) -> bool {
        self.time_until_next_dispatch(now).is_none()
    }

    /// Calculates the time until the next dispatch is allowed
    ///
    /// Returns None if a request can be dispatched now, or the duration to
    /// wait otherwise.
    pub fn time_until_next_dispatch(&self, now: Instant) -> Option<Duration> {
        let last = self.last_dispatch?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.min_interval {
            Some(self.min_interval - elapsed)
        } else {
            None
        }
    }

    /// Records that a request was dispatched at `now`
    pub fn record_dispatch(&mut self, now: Instant) {
        self.dispatch_count += 1;
        self.last_dispatch = Some(now);
    }

    /// Suspends until the gate is clear, then records the dispatch
    ///
    /// Returns the dispatch instant.
    pub async fn wait_turn(&mut self) -> Instant {
        if let Some(wait) = self.time_until_next_dispatch(Instant::now()) {
            tracing::trace!("Pacing gate closed, sleeping {:?}", wait);
            tokio::time::sleep(wait).await;
        }

        let now = Instant::now();
        self.record_dispatch(now);
        now
    }
}
