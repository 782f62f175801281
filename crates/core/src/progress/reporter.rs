use std::time::Duration;

use tokio::time::Instant;

use super::ProgressConfig;

/// Aggregated progress of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub segment_count: usize,
    pub segments_translated: usize,
}

/// Throttles progress notifications for one job.
///
/// Runs on the caller's task; it never spawns or sleeps.
#[derive(Debug)]
pub struct ProgressReporter {
    min_interval: Duration,
    segment_count: usize,
    segments_translated: usize,
    last_emitted: Instant,
    /// Count carried by the last update handed out.
    last_reported: Option<usize>,
}

impl ProgressReporter {
    pub fn new(config: &ProgressConfig, segment_count: usize) -> Self {
        Self {
            min_interval: config.min_interval(),
            segment_count,
            segments_translated: 0,
            last_emitted: Instant::now(),
            last_reported: None,
        }
    }

    /// Record `count` newly translated segments.
    ///
    /// Returns an update when the minimum interval has passed since the last
    /// one.
    pub fn record(&mut self, count: usize) -> Option<ProgressUpdate> {
        self.segments_translated += count;

        let now = Instant::now();
        if now.duration_since(self.last_emitted) < self.min_interval {
            return None;
        }
        self.last_emitted = now;
        self.last_reported = Some(self.segments_translated);
        Some(self.current())
    }

    /// Final update at job end.
    ///
    /// `None` only when the last throttled update already carried the final
    /// count, so the final count is observed exactly once.
    pub fn finish(&mut self) -> Option<ProgressUpdate> {
        if self.last_reported == Some(self.segments_translated) {
            return None;
        }
        self.last_emitted = Instant::now();
        self.last_reported = Some(self.segments_translated);
        Some(self.current())
    }

    pub fn segments_translated(&self) -> usize {
        self.segments_translated
    }

    fn current(&self) -> ProgressUpdate {
        ProgressUpdate {
            segment_count: self.segment_count,
            segments_translated: self.segments_translated,
        }
    }
}
