//! Fixed-width text chunking.
//!
//! Splits extracted text into consecutive segments of at most `max_len` characters so each
//! one fits through the summarization model in a single call. Boundaries are purely
//! positional: whitespace is kept as-is and a boundary may land inside a word.

use std::num::NonZeroUsize;

/// Default chunk width in characters.
pub const DEFAULT_CHUNK_CHARS: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(n) => n,
    None => panic!("chunk width must be non-zero"),
};

/// A contiguous slice of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position of this chunk in the sequence
    pub index: usize,
    /// Offset of the first character, counted in characters
    pub start: usize,
    /// The chunk content, borrowed from the source text
    pub text: &'a str,
}

impl Chunk<'_> {
    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Partition `text` into chunks of exactly `max_len` characters, except the last which holds
/// the remainder. Empty input yields no chunks.
pub fn chunk(text: &str, max_len: NonZeroUsize) -> Vec<Chunk<'_>> {
    let max_len = max_len.get();
    let mut chunks = Vec::new();
    let mut byte_start = 0;
    let mut char_start = 0;
    let mut chars_in_chunk = 0;

    for (byte_idx, _) in text.char_indices() {
        if chars_in_chunk == max_len {
            chunks.push(Chunk {
                index: chunks.len(),
                start: char_start,
                text: &text[byte_start..byte_idx],
            });
            byte_start = byte_idx;
            char_start += max_len;
            chars_in_chunk = 0;
        }
        chars_in_chunk += 1;
    }

    if chars_in_chunk > 0 {
        chunks.push(Chunk {
            index: chunks.len(),
            start: char_start,
            text: &text[byte_start..],
        });
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: usize) -> NonZeroUsize {
        NonZeroUsize::new(v).unwrap()
    }

    fn lengths(chunks: &[Chunk<'_>]) -> Vec<usize> {
        chunks.iter().map(Chunk::len).collect()
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk("", n(1024)).is_empty());
    }

    #[test]
    fn two_thousand_chars_split_into_full_and_remainder() {
        let text = "a".repeat(2000);
        let chunks = chunk(&text, DEFAULT_CHUNK_CHARS);
        assert_eq!(lengths(&chunks), vec![1024, 976]);
        assert_eq!(chunks[1].start, 1024);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let text = "x".repeat(30);
        let chunks = chunk(&text, n(10));
        assert_eq!(lengths(&chunks), vec![10, 10, 10]);
    }

    #[test]
    fn text_shorter_than_width_is_one_chunk() {
        let chunks = chunk("short", n(1024));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short");
        assert_eq!(chunks[0].start, 0);
    }

    #[test]
    fn concatenation_reproduces_input() {
        let samples = [
            "The quick brown fox jumps over the lazy dog.",
            "  leading and trailing whitespace is preserved \n\n",
            "mixed ünïcödé — text with 日本語 and emoji 🦀🦀🦀",
            "a",
        ];
        for text in samples {
            for width in 1..=12 {
                let chunks = chunk(text, n(width));
                let joined: String = chunks.iter().map(|c| c.text).collect();
                assert_eq!(joined, text, "width {width}");

                let (last, rest) = chunks.split_last().unwrap();
                assert!(rest.iter().all(|c| c.len() == width));
                assert!((1..=width).contains(&last.len()));
            }
        }
    }

    #[test]
    fn multibyte_characters_count_as_one() {
        let chunks = chunk("ééééé", n(2));
        assert_eq!(
            chunks.iter().map(|c| c.text).collect::<Vec<_>>(),
            vec!["éé", "éé", "é"]
        );
        assert_eq!(
            chunks.iter().map(|c| c.start).collect::<Vec<_>>(),
            vec![0, 2, 4]
        );
    }

    #[test]
    fn boundaries_may_split_words() {
        let chunks = chunk("hello world", n(4));
        assert_eq!(
            chunks.iter().map(|c| c.text).collect::<Vec<_>>(),
            vec!["hell", "o wo", "rld"]
        );
        assert!(chunks.iter().enumerate().all(|(i, c)| c.index == i));
    }
}
