//! Shared progress tracking across concurrent workers
//!
//! The tracker is the only mutable state shared between pool tasks. All
//! mutation funnels through one mutex; it is passed by `Arc`, never held
//! as a global.

use lectern_domain::UnitStatus;
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;
use std::time::Instant;
use tracing::debug;

/// Which pool stage a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Chunk analysis
    Chunk,
    /// Interval summarization
    Interval,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Chunk => f.write_str("chunk"),
            StageKind::Interval => f.write_str("interval"),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    chunk_total: usize,
    chunk_succeeded: usize,
    chunk_failed: usize,
    interval_total: usize,
    interval_succeeded: usize,
    interval_failed: usize,
}

/// Point-in-time view of run progress, read by the reporter on a polling
/// cadence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// Chunks not yet terminal
    pub chunks_pending: usize,
    /// Chunks analyzed successfully
    pub chunks_succeeded: usize,
    /// Chunks whose analysis failed
    pub chunks_failed: usize,
    /// Intervals not yet terminal
    pub intervals_pending: usize,
    /// Intervals summarized successfully
    pub intervals_succeeded: usize,
    /// Intervals whose summarization failed
    pub intervals_failed: usize,
    /// Milliseconds since the tracker was created
    pub elapsed_ms: u64,
}

impl ProgressSnapshot {
    /// Total failed units across both stages.
    pub fn total_failed(&self) -> usize {
        self.chunks_failed + self.intervals_failed
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chunks {}/{} done ({} failed) | intervals {}/{} done ({} failed) | {:.1}s elapsed",
            self.chunks_succeeded + self.chunks_failed,
            self.chunks_succeeded + self.chunks_failed + self.chunks_pending,
            self.chunks_failed,
            self.intervals_succeeded + self.intervals_failed,
            self.intervals_succeeded + self.intervals_failed + self.intervals_pending,
            self.intervals_failed,
            self.elapsed_ms as f64 / 1000.0,
        )
    }
}

/// Aggregates worker completions behind a single synchronization point.
#[derive(Debug)]
pub struct ProgressTracker {
    counters: Mutex<Counters>,
    started: Instant,
}

impl ProgressTracker {
    /// Create a tracker; elapsed time counts from this moment.
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(Counters::default()),
            started: Instant::now(),
        }
    }

    /// Declare how many units a stage will process. Called once per stage,
    /// before its pool dispatches.
    pub fn begin_stage(&self, kind: StageKind, total: usize) {
        let mut counters = self.counters.lock().unwrap();
        match kind {
            StageKind::Chunk => counters.chunk_total = total,
            StageKind::Interval => counters.interval_total = total,
        }
    }

    /// Record one unit reaching a terminal status. Called by workers as
    /// they complete, in any order.
    pub fn record_completion(&self, kind: StageKind, index: usize, status: &UnitStatus) {
        debug!("{} {} completed: {:?}", kind, index, status);
        let mut counters = self.counters.lock().unwrap();
        match (kind, status.is_failed()) {
            (StageKind::Chunk, false) => counters.chunk_succeeded += 1,
            (StageKind::Chunk, true) => counters.chunk_failed += 1,
            (StageKind::Interval, false) => counters.interval_succeeded += 1,
            (StageKind::Interval, true) => counters.interval_failed += 1,
        }
    }

    /// Current counts and elapsed time.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let counters = self.counters.lock().unwrap();
        ProgressSnapshot {
            chunks_pending: counters
                .chunk_total
                .saturating_sub(counters.chunk_succeeded + counters.chunk_failed),
            chunks_succeeded: counters.chunk_succeeded,
            chunks_failed: counters.chunk_failed,
            intervals_pending: counters
                .interval_total
                .saturating_sub(counters.interval_succeeded + counters.interval_failed),
            intervals_succeeded: counters.interval_succeeded,
            intervals_failed: counters.interval_failed,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_initial_snapshot_is_empty() {
        let tracker = ProgressTracker::new();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.chunks_pending, 0);
        assert_eq!(snapshot.chunks_succeeded, 0);
        assert_eq!(snapshot.total_failed(), 0);
    }

    #[test]
    fn test_stage_accounting() {
        let tracker = ProgressTracker::new();
        tracker.begin_stage(StageKind::Chunk, 3);

        tracker.record_completion(StageKind::Chunk, 0, &UnitStatus::Succeeded);
        tracker.record_completion(StageKind::Chunk, 2, &UnitStatus::Failed("boom".to_string()));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.chunks_pending, 1);
        assert_eq!(snapshot.chunks_succeeded, 1);
        assert_eq!(snapshot.chunks_failed, 1);
    }

    #[test]
    fn test_stages_are_independent() {
        let tracker = ProgressTracker::new();
        tracker.begin_stage(StageKind::Chunk, 2);
        tracker.begin_stage(StageKind::Interval, 1);

        tracker.record_completion(StageKind::Interval, 0, &UnitStatus::Succeeded);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.chunks_pending, 2);
        assert_eq!(snapshot.intervals_pending, 0);
        assert_eq!(snapshot.intervals_succeeded, 1);
    }

    #[test]
    fn test_no_lost_updates_under_concurrency() {
        let tracker = Arc::new(ProgressTracker::new());
        tracker.begin_stage(StageKind::Chunk, 64);

        let mut handles = Vec::new();
        for i in 0..64 {
            let t = Arc::clone(&tracker);
            handles.push(std::thread::spawn(move || {
                t.record_completion(StageKind::Chunk, i, &UnitStatus::Succeeded);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.chunks_succeeded, 64);
        assert_eq!(snapshot.chunks_pending, 0);
    }

    #[test]
    fn test_display_format() {
        let tracker = ProgressTracker::new();
        tracker.begin_stage(StageKind::Chunk, 2);
        tracker.record_completion(StageKind::Chunk, 0, &UnitStatus::Succeeded);

        let line = tracker.snapshot().to_string();
        assert!(line.contains("chunks 1/2 done"));
        assert!(line.contains("intervals 0/0"));
    }
}
