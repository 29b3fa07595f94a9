//! Document loading.
//!
//! Markdown and plain text are read directly; PDF input is converted to
//! text with `pdf-extract` before the pipeline sees it.

use crate::error::{CliError, Result};
use lectern_domain::{Document, DocumentFormat};
use std::fs;
use std::path::Path;
use tracing::info;

/// A document together with its loaded text.
#[derive(Debug)]
pub struct LoadedDocument {
    /// Source description
    pub document: Document,
    /// Full text content
    pub text: String,
}

/// Load the document at `path`, converting PDF to text when needed.
pub fn load(path: &Path) -> Result<LoadedDocument> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }

    let document = Document::describe(path).ok_or_else(|| CliError::UnsupportedFormat {
        found: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
        supported: DocumentFormat::supported_extensions().join(", "),
    })?;

    let text = match document.format {
        DocumentFormat::Markdown | DocumentFormat::PlainText => fs::read_to_string(path)?,
        DocumentFormat::Pdf => {
            let bytes = fs::read(path)?;
            pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| CliError::Load(format!("PDF conversion failed: {}", e)))?
        }
    };

    info!(
        "Loaded {} ({} chars, {:?})",
        document.file_name,
        text.chars().count(),
        document.format
    );

    Ok(LoadedDocument { document, text })
}
