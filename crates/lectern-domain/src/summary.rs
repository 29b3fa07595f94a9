//! Interval and meta summaries

use crate::status::UnitStatus;
use serde::{Deserialize, Serialize};

/// Summary of one contiguous group of chunks.
///
/// Intervals partition the chunk sequence: they are contiguous,
/// non-overlapping, 0-based, and cover chunk indices in document order. The
/// final interval may cover fewer chunks than the configured group size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSummary {
    /// Position in the ordered interval sequence (0-based)
    pub interval_index: usize,

    /// First chunk index covered by this interval
    pub chunk_start: usize,

    /// Last chunk index covered by this interval (inclusive)
    pub chunk_end: usize,

    /// Markdown summary content; empty when the unit failed
    pub content: String,

    /// Terminal outcome of the summarization call
    pub status: UnitStatus,

    /// Member chunks whose analysis failed; their absence is noted in the
    /// oracle request rather than silently omitted
    pub degraded_chunks: Vec<usize>,
}

impl IntervalSummary {
    /// Number of chunks this interval covers.
    pub fn member_count(&self) -> usize {
        self.chunk_end - self.chunk_start + 1
    }
}

/// The single top-level summary of the whole document.
///
/// Depends on the full ordered interval-summary list and the table of
/// contents; created once, after every interval has reached a terminal
/// status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaSummary {
    /// Markdown content of the meta-summary
    pub content: String,
}
