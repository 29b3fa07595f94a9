//! Table of contents extracted from the source document

use serde::{Deserialize, Serialize};

/// One entry in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Entry title as it appears in the document
    pub title: String,

    /// Nesting level, 1 for top-level entries
    pub level: usize,

    /// Approximate character offset of the entry's section in the source
    /// text, when it could be located
    pub position: Option<usize>,
}

/// The table of contents, produced once before chunking and read-only
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOfContents {
    /// Markdown as returned by the extraction oracle
    pub raw: String,

    /// Parsed entries in document order
    pub entries: Vec<TocEntry>,
}

impl TableOfContents {
    /// Parse the oracle's markdown rendition into structured entries.
    ///
    /// Headings (`#`, `##`, ...) map level to the heading depth; list items
    /// (`-`, `*`, `1.`) map level to one plus half their indentation. Lines
    /// that are neither are ignored.
    pub fn parse_markdown(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut entries = Vec::new();

        for line in raw.lines() {
            let indent = line.len() - line.trim_start().len();
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(rest) = strip_heading(trimmed) {
                let level = trimmed.len() - trimmed.trim_start_matches('#').len();
                push_entry(&mut entries, rest, level);
            } else if let Some(rest) = strip_list_marker(trimmed) {
                push_entry(&mut entries, rest, indent / 2 + 1);
            }
        }

        TableOfContents { raw, entries }
    }

    /// Fill in approximate positions by locating each title's first
    /// occurrence in the source text (character offset).
    pub fn locate_in(&mut self, text: &str) {
        for entry in &mut self.entries {
            if entry.title.is_empty() {
                continue;
            }
            entry.position = text
                .find(&entry.title)
                .map(|byte_pos| text[..byte_pos].chars().count());
        }
    }
}

fn push_entry(entries: &mut Vec<TocEntry>, title: &str, level: usize) {
    let title = title.trim();
    if !title.is_empty() {
        entries.push(TocEntry {
            title: title.to_string(),
            level,
            position: None,
        });
    }
}

fn strip_heading(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches('#');
    if rest.len() < line.len() && rest.starts_with(' ') {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn strip_list_marker(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some(rest);
    }
    // Numbered entries: "1. Title", "12. Title"
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        line[digits..].strip_prefix(". ")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headings() {
        let toc = TableOfContents::parse_markdown("# Part One\n## Chapter 1\n## Chapter 2\n");
        assert_eq!(toc.entries.len(), 3);
        assert_eq!(toc.entries[0].title, "Part One");
        assert_eq!(toc.entries[0].level, 1);
        assert_eq!(toc.entries[1].title, "Chapter 1");
        assert_eq!(toc.entries[1].level, 2);
    }

    #[test]
    fn test_parse_list_items_with_indent() {
        let toc = TableOfContents::parse_markdown("- Introduction\n  - Motivation\n- Conclusion\n");
        assert_eq!(toc.entries.len(), 3);
        assert_eq!(toc.entries[0].level, 1);
        assert_eq!(toc.entries[1].title, "Motivation");
        assert_eq!(toc.entries[1].level, 2);
    }

    #[test]
    fn test_parse_numbered_entries() {
        let toc = TableOfContents::parse_markdown("1. First Steps\n2. Second Wind\n");
        assert_eq!(toc.entries.len(), 2);
        assert_eq!(toc.entries[1].title, "Second Wind");
    }

    #[test]
    fn test_ignores_plain_prose_lines() {
        let toc = TableOfContents::parse_markdown("Contents\n\n- Chapter 1\nsome stray prose\n");
        assert_eq!(toc.entries.len(), 1);
        assert_eq!(toc.entries[0].title, "Chapter 1");
    }

    #[test]
    fn test_hashes_without_space_are_not_headings() {
        let toc = TableOfContents::parse_markdown("#hashtag\n# Real Heading\n");
        assert_eq!(toc.entries.len(), 1);
        assert_eq!(toc.entries[0].title, "Real Heading");
    }

    #[test]
    fn test_locate_in_sets_char_positions() {
        let text = "préface\n\nChapter 1\n\nbody text";
        let mut toc = TableOfContents::parse_markdown("- Chapter 1\n- Missing Chapter\n");
        toc.locate_in(text);
        assert_eq!(toc.entries[0].position, Some(9));
        assert_eq!(toc.entries[1].position, None);
    }
}
