//! Per-unit completion status

use serde::{Deserialize, Serialize};

/// Outcome of one unit of work (a chunk analysis or an interval summary).
///
/// `Succeeded` and `Failed` are terminal: once a worker records either, the
/// unit is never mutated again. A failed unit degrades its portion of the
/// final report to an explicit gap; it is never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    /// Work has not reached a terminal state yet
    Pending,
    /// The oracle call completed and produced usable content
    Succeeded,
    /// The oracle call failed; the reason is kept for the audit trail
    Failed(String),
}

impl UnitStatus {
    /// True for `Succeeded` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UnitStatus::Pending)
    }

    /// True only for `Succeeded`.
    pub fn is_succeeded(&self) -> bool {
        matches!(self, UnitStatus::Succeeded)
    }

    /// True only for `Failed`.
    pub fn is_failed(&self) -> bool {
        matches!(self, UnitStatus::Failed(_))
    }

    /// The failure reason, if this unit failed.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            UnitStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!UnitStatus::Pending.is_terminal());
        assert!(UnitStatus::Succeeded.is_terminal());
        assert!(UnitStatus::Failed("timeout".to_string()).is_terminal());
    }

    #[test]
    fn test_failure_reason() {
        assert_eq!(UnitStatus::Pending.failure_reason(), None);
        assert_eq!(UnitStatus::Succeeded.failure_reason(), None);
        assert_eq!(
            UnitStatus::Failed("connection refused".to_string()).failure_reason(),
            Some("connection refused")
        );
    }
}
