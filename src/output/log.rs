use crate::output::traits::ProgressObserver;

/// Progress observer that emits tracing events
///
/// Useful when stdout is not a terminal. Logs every `every`-th report and
/// the last report before `finish`.
pub struct LogObserver {
    label: &'static str,
    every: u64,
    reports: u64,
    last: Option<(u64, u64, u64)>,
}

impl LogObserver {
    pub fn new(label: &'static str, every: u64) -> Self {
        Self {
            label,
            every: every.max(1),
            reports: 0,
            last: None,
        }
    }
}

impl ProgressObserver for LogObserver {
    fn report(&mut self, processed: u64, produced: u64, remaining: u64) {
        self.reports += 1;
        self.last = Some((processed, produced, remaining));

        if self.reports % self.every == 0 {
            tracing::info!(
                "{} progress: {} processed, {} produced, {} remaining",
                self.label,
                processed,
                produced,
                remaining
            );
        }
    }

    fn finish(&mut self) {
        if let Some((processed, produced, remaining)) = self.last {
            tracing::info!(
                "{} finished: {} processed, {} produced, {} remaining",
                self.label,
                processed,
                produced,
                remaining
            );
        }
    }
}
