//! Error types for TOC extraction and report integration

use lectern_pipeline::PipelineError;
use thiserror::Error;

/// Errors that can occur producing the table of contents or the final
/// report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Oracle failure; fatal for the step that hit it
    #[error("Oracle failure: {0}")]
    Oracle(String),

    /// Oracle call exceeded its timeout
    #[error("Oracle call timed out")]
    Timeout,

    /// Integration requested before a meta-summary was persisted
    #[error("No meta-summary found; the pipeline must complete before integration")]
    MissingMetaSummary,

    /// Artifact store error
    #[error(transparent)]
    Artifacts(#[from] PipelineError),
}
