//! Knowledge point - the structured extraction result for one chunk

use crate::status::UnitStatus;
use serde::{Deserialize, Serialize};

/// The analysis result for one chunk.
///
/// Exactly one knowledge point exists per chunk, created when the chunk's
/// oracle call reaches a terminal state and never mutated afterward.
/// `has_content` is false for boilerplate windows the oracle chose to skip
/// (front matter, indexes, copyright pages); such a unit still counts as
/// `Succeeded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgePoint {
    /// Index of the chunk this result belongs to
    pub chunk_index: usize,

    /// Whether the chunk contained extractable content
    pub has_content: bool,

    /// Extracted knowledge points, in source order; empty when
    /// `has_content` is false or the unit failed
    pub points: Vec<String>,

    /// Terminal outcome of the analysis call
    pub status: UnitStatus,

    /// Wall-clock time the oracle call took
    pub elapsed_ms: u64,
}

impl KnowledgePoint {
    /// Build a succeeded result.
    pub fn succeeded(
        chunk_index: usize,
        has_content: bool,
        points: Vec<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            chunk_index,
            has_content,
            points,
            status: UnitStatus::Succeeded,
            elapsed_ms,
        }
    }

    /// Build a failed result. Failed units carry no content.
    pub fn failed(chunk_index: usize, reason: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            chunk_index,
            has_content: false,
            points: Vec::new(),
            status: UnitStatus::Failed(reason.into()),
            elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_constructor() {
        let kp = KnowledgePoint::succeeded(3, true, vec!["a point".to_string()], 120);
        assert_eq!(kp.chunk_index, 3);
        assert!(kp.status.is_succeeded());
        assert_eq!(kp.points.len(), 1);
    }

    #[test]
    fn test_failed_constructor_has_no_content() {
        let kp = KnowledgePoint::failed(7, "timeout", 30_000);
        assert!(kp.status.is_failed());
        assert!(!kp.has_content);
        assert!(kp.points.is_empty());
        assert_eq!(kp.status.failure_reason(), Some("timeout"));
    }
}
