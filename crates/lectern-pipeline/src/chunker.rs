//! Overlapping-window text chunker
//!
//! Splits the source text into fixed-size windows that overlap by a
//! configured number of characters, so analysis of one window keeps enough
//! boundary context from its neighbor. Offsets are character offsets;
//! slicing is UTF-8 safe.

use crate::error::PipelineError;
use lectern_domain::Chunk;

/// Split `text` into overlapping windows of `chunk_size` characters,
/// stepping by `chunk_size - overlap` each iteration.
///
/// The last window is truncated to the remaining text. Empty input yields
/// an empty sequence. Requires `0 <= overlap < chunk_size`.
///
/// # Guarantees
///
/// - Chunk indices are contiguous: `0, 1, ..., n-1`.
/// - Consecutive chunks overlap by exactly `overlap` characters, and no
///   chunk is a subset of another.
/// - Chunk 0 in full, followed by every later chunk's post-overlap suffix,
///   reconstructs `text` exactly.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>, PipelineError> {
    if chunk_size == 0 {
        return Err(PipelineError::InvalidConfiguration(
            "chunk_size must be greater than 0".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(PipelineError::InvalidConfiguration(format!(
            "overlap {} must be smaller than chunk_size {}",
            overlap, chunk_size
        )));
    }
    if text.is_empty() {
        return Ok(Vec::new());
    }

    // Byte offset of every character, with a sentinel at the end, so char
    // offsets map to valid slice boundaries.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = boundaries.len() - 1;
    let step = chunk_size - overlap;

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let index = chunks.len();
        let end = (start + chunk_size).min(total_chars);
        chunks.push(Chunk {
            index,
            text: text[boundaries[start]..boundaries[end]].to_string(),
            char_start: start,
            char_end: end,
            overlap_with_previous: if index == 0 { 0 } else { overlap },
        });
        if end == total_chars {
            break;
        }
        start += step;
    }

    Ok(chunks)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: reconstruction from the overlapping windows is exact
        /// for arbitrary text and any valid (chunk_size, overlap) pair.
        #[test]
        fn test_split_reconstructs_exactly(
            text in ".{0,400}",
            chunk_size in 1usize..64,
            overlap_seed in 0usize..64,
        ) {
            let overlap = overlap_seed % chunk_size;
            let chunks = split(&text, chunk_size, overlap).unwrap();

            let mut reassembled = String::new();
            for chunk in &chunks {
                if chunk.index == 0 {
                    reassembled.push_str(&chunk.text);
                } else {
                    reassembled.push_str(chunk.novel_text());
                }
            }
            prop_assert_eq!(reassembled, text);
        }

        /// Property: indices are contiguous and offsets strictly advance.
        #[test]
        fn test_split_offsets_advance(
            text in ".{1,400}",
            chunk_size in 1usize..64,
            overlap_seed in 0usize..64,
        ) {
            let overlap = overlap_seed % chunk_size;
            let chunks = split(&text, chunk_size, overlap).unwrap();

            prop_assert!(!chunks.is_empty());
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.index, i);
                prop_assert!(chunk.char_start < chunk.char_end);
            }
            for pair in chunks.windows(2) {
                prop_assert!(pair[1].char_start <= pair[0].char_end);
                prop_assert!(pair[1].char_start > pair[0].char_start);
                prop_assert!(pair[1].char_end > pair[0].char_end);
            }
        }
    }
}
