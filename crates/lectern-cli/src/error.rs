//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced to the user by the CLI.
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file or merged settings problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input file has an unsupported extension
    #[error("Unsupported file format '{found}' (supported: {supported})")]
    UnsupportedFormat {
        /// The extension that was found
        found: String,
        /// Comma-separated list of supported extensions
        supported: String,
    },

    /// Document could not be read or converted to text
    #[error("Failed to load document: {0}")]
    Load(String),

    /// Pipeline error (configuration, persistence, or the fatal meta step)
    #[error(transparent)]
    Pipeline(#[from] lectern_pipeline::PipelineError),

    /// TOC extraction or report integration error
    #[error(transparent)]
    Report(#[from] lectern_report::ReportError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
