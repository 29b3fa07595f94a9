//! Chunk module - the unit of parallel analysis
//!
//! A chunk is a window of the source text. Consecutive chunks overlap by a
//! configured number of characters so that no information is lost at window
//! boundaries. Offsets are counted in characters, not bytes.

use serde::{Deserialize, Serialize};

/// An overlapping window of the source text.
///
/// Chunks are totally ordered by `index`. For consecutive chunks the
/// following invariants hold:
///
/// - `char_start` of chunk *i+1* is at most `char_end` of chunk *i*
///   (overlap), and
/// - `char_start` of chunk *i+1* is strictly greater than `char_start` of
///   chunk *i* (progress - no chunk is a subset of another).
///
/// Concatenating chunk 0 in full with each later chunk's text after its
/// `overlap_with_previous` characters reconstructs the source exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the ordered chunk sequence (0-based)
    pub index: usize,

    /// Window text
    pub text: String,

    /// Character offset of the window start in the source text
    pub char_start: usize,

    /// Character offset one past the window end in the source text
    pub char_end: usize,

    /// Number of leading characters shared with the previous chunk
    /// (0 for chunk 0)
    pub overlap_with_previous: usize,
}

impl Chunk {
    /// Window length in characters.
    pub fn char_len(&self) -> usize {
        self.char_end - self.char_start
    }

    /// The portion of this chunk not already covered by the previous chunk.
    ///
    /// For chunk 0 this is the whole text. Used to reassemble the original
    /// document from a chunk sequence.
    pub fn novel_text(&self) -> &str {
        match self.text.char_indices().nth(self.overlap_with_previous) {
            Some((byte_offset, _)) => &self.text[byte_offset..],
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, text: &str, start: usize, overlap: usize) -> Chunk {
        Chunk {
            index,
            text: text.to_string(),
            char_start: start,
            char_end: start + text.chars().count(),
            overlap_with_previous: overlap,
        }
    }

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        let c = chunk(0, "héllo", 0, 0);
        assert_eq!(c.char_len(), 5);
        assert_eq!(c.text.len(), 6); // bytes
    }

    #[test]
    fn test_novel_text_skips_overlap() {
        let c = chunk(1, "abcdef", 4, 2);
        assert_eq!(c.novel_text(), "cdef");
    }

    #[test]
    fn test_novel_text_full_for_first_chunk() {
        let c = chunk(0, "abcdef", 0, 0);
        assert_eq!(c.novel_text(), "abcdef");
    }

    #[test]
    fn test_novel_text_multibyte_overlap() {
        let c = chunk(1, "日本語text", 10, 3);
        assert_eq!(c.novel_text(), "text");
    }

    #[test]
    fn test_novel_text_empty_when_overlap_covers_all() {
        let c = chunk(1, "ab", 4, 2);
        assert_eq!(c.novel_text(), "");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the novel portion is exactly the text minus the
        /// declared overlap, measured in characters.
        #[test]
        fn test_novel_text_length(text in ".{0,64}", overlap in 0usize..64) {
            let total = text.chars().count();
            let overlap = overlap.min(total);
            let c = Chunk {
                index: 1,
                text: text.clone(),
                char_start: 100,
                char_end: 100 + total,
                overlap_with_previous: overlap,
            };
            prop_assert_eq!(c.novel_text().chars().count(), total - overlap);
        }

        /// Property: prepending the overlapped prefix to the novel portion
        /// reproduces the chunk text.
        #[test]
        fn test_overlap_plus_novel_is_whole(text in ".{0,64}", overlap in 0usize..64) {
            let total = text.chars().count();
            let overlap = overlap.min(total);
            let c = Chunk {
                index: 1,
                text: text.clone(),
                char_start: 0,
                char_end: total,
                overlap_with_previous: overlap,
            };
            let prefix: String = text.chars().take(overlap).collect();
            prop_assert_eq!(format!("{}{}", prefix, c.novel_text()), text);
        }
    }
}
