//! Table-of-contents extraction
//!
//! Scans the document for a TOC indicator word, sends a bounded window
//! around it to the oracle, and parses the returned markdown into
//! structured entries. Runs once, before chunking begins.

use crate::error::ReportError;
use lectern_domain::traits::LanguageModel;
use lectern_domain::TableOfContents;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Default size of the text window handed to the extraction oracle
/// (characters).
pub const DEFAULT_WINDOW_SIZE: usize = 10_000;

/// Characters to back up before a found indicator, so the indicator's own
/// heading line is captured in full.
const BACKTRACK_CHARS: usize = 50;

/// Words that usually mark where a table of contents starts.
const TOC_INDICATORS: &[&str] = &[
    "table of contents",
    "contents",
    "chapters",
    "outline",
    "index",
    "目录",
    "章节",
    "大纲",
    "索引",
];

/// Extracts the table of contents via a single oracle call.
pub struct TocExtractor<L>
where
    L: LanguageModel,
{
    model: Arc<L>,
    window_size: usize,
    oracle_timeout: Duration,
}

impl<L> TocExtractor<L>
where
    L: LanguageModel,
    L::Error: std::fmt::Display,
{
    /// Create an extractor with the default window size and a two-minute
    /// oracle timeout.
    pub fn new(model: Arc<L>) -> Self {
        Self {
            model,
            window_size: DEFAULT_WINDOW_SIZE,
            oracle_timeout: Duration::from_secs(120),
        }
    }

    /// Replace the extraction window size (characters).
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Replace the oracle timeout.
    pub fn with_timeout(mut self, oracle_timeout: Duration) -> Self {
        self.oracle_timeout = oracle_timeout;
        self
    }

    /// Extract the table of contents from `text`.
    ///
    /// If no indicator word is found the window is taken from the document
    /// head instead. Oracle failure is fatal for this step.
    pub async fn extract(&self, text: &str) -> Result<TableOfContents, ReportError> {
        let start = match find_toc_position(text) {
            Some(pos) => {
                info!("Found TOC indicator at byte {}", pos);
                back_up_chars(text, pos, BACKTRACK_CHARS)
            }
            None => {
                warn!("No TOC indicator found; extracting from the document head");
                0
            }
        };

        let window = take_chars(&text[start..], self.window_size);
        let prompt = format!("{}\n\nInput text:\n\n{}\n\nExtracted table of contents:", TOC_EXTRACTION_INSTRUCTIONS, window);

        let raw = match timeout(self.oracle_timeout, self.model.generate(&prompt)).await {
            Err(_) => return Err(ReportError::Timeout),
            Ok(Err(e)) => return Err(ReportError::Oracle(e.to_string())),
            Ok(Ok(response)) => response,
        };

        let mut toc = TableOfContents::parse_markdown(raw.trim());
        toc.locate_in(text);
        info!("Extracted {} TOC entries", toc.entries.len());
        Ok(toc)
    }
}

/// Byte offset of the earliest TOC indicator in `text`, matching ASCII
/// case-insensitively.
pub fn find_toc_position(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    TOC_INDICATORS
        .iter()
        .filter_map(|indicator| {
            let needle = indicator.as_bytes();
            // An ASCII-case-insensitive byte match cannot start inside a
            // multi-byte character, so the offset is a valid boundary.
            bytes
                .windows(needle.len())
                .position(|window| window.eq_ignore_ascii_case(needle))
        })
        .min()
}

/// Walk back up to `count` characters from byte offset `pos`.
fn back_up_chars(text: &str, pos: usize, count: usize) -> usize {
    text[..pos]
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map(|(byte, _)| byte)
        .unwrap_or(pos)
}

/// The first `count` characters of `text`.
fn take_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

const TOC_EXTRACTION_INSTRUCTIONS: &str = r#"You are a precise table-of-contents extraction expert. Extract the complete table of contents from the following text. Extract only the table of contents, never body text.

Rules:
1. If there is an explicit "Contents" style heading, start extraction there
2. Include every chapter and section title with its numbering
3. Preserve the original nesting as markdown list indentation
4. Fix obviously broken numbering or indentation
5. Do not add any explanation or commentary; return only the extracted
   table of contents as a markdown list"#;
