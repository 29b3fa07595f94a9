//! Error types for the pipeline

use thiserror::Error;

/// Errors that can occur while running the pipeline.
///
/// Per-unit oracle failures never surface here; they are caught at the task
/// boundary and recorded as `UnitStatus::Failed` so sibling units keep
/// making progress. These variants cover the fatal paths: bad
/// configuration, the meta-summary call, and internal invariants.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Bad chunk/overlap/interval/parallelism values; fails before any
    /// work starts
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A fatal oracle failure (meta-summary has no fallback)
    #[error("Oracle failure: {0}")]
    Oracle(String),

    /// A fatal oracle call exceeded its timeout
    #[error("Oracle call timed out")]
    Timeout,

    /// Internal invariant breached: a stage consumed results before the
    /// prior stage drained
    #[error("Barrier violation: {0}")]
    BarrierViolation(String),

    /// Malformed oracle response where a structured reply was required
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// Artifact persistence error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
