//! Source document description

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input formats Lectern can digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Markdown (`.md`)
    Markdown,
    /// Plain text (`.txt`)
    PlainText,
    /// PDF, converted to text by the loader before the pipeline sees it
    Pdf,
}

impl DocumentFormat {
    /// Detect the format from a file extension (without the dot),
    /// case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(DocumentFormat::Markdown),
            "txt" => Some(DocumentFormat::PlainText),
            "pdf" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }

    /// Extensions accepted by [`DocumentFormat::from_extension`], for error
    /// messages.
    pub fn supported_extensions() -> &'static [&'static str] {
        &["md", "markdown", "txt", "pdf"]
    }
}

/// A source document, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Where the document was loaded from
    pub source_path: PathBuf,

    /// File name component of the source path
    pub file_name: String,

    /// Detected input format
    pub format: DocumentFormat,
}

impl Document {
    /// Describe a document at `path`, detecting the format from its
    /// extension. Returns `None` for unsupported extensions.
    pub fn describe(path: &Path) -> Option<Self> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(DocumentFormat::from_extension)?;
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        Some(Document {
            source_path: path.to_path_buf(),
            file_name,
            format,
        })
    }

    /// File stem used to name derived artifacts.
    pub fn stem(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            DocumentFormat::from_extension("md"),
            Some(DocumentFormat::Markdown)
        );
        assert_eq!(
            DocumentFormat::from_extension("PDF"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_extension("txt"),
            Some(DocumentFormat::PlainText)
        );
        assert_eq!(DocumentFormat::from_extension("docx"), None);
    }

    #[test]
    fn test_describe() {
        let doc = Document::describe(Path::new("/books/deep_work.md")).unwrap();
        assert_eq!(doc.file_name, "deep_work.md");
        assert_eq!(doc.format, DocumentFormat::Markdown);
        assert_eq!(doc.stem(), "deep_work");
    }

    #[test]
    fn test_describe_rejects_unknown_extension() {
        assert!(Document::describe(Path::new("/books/archive.zip")).is_none());
        assert!(Document::describe(Path::new("/books/no_extension")).is_none());
    }
}
