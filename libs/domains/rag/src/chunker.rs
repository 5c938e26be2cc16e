//! Overlapping fixed-size windows over text, measured in Unicode scalar values.
//!
//! ```
//! use domain_rag::Chunker;
//!
//! let chunker = Chunker::new(4, 1).unwrap();
//! let chunks: Vec<&str> = chunker.chunks("abcdefghij").collect();
//! assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
//! ```

use uuid::Uuid;

use crate::error::{RagError, RagResult};
use crate::models::DocumentChunk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Chunker {
    /// `size` must be positive; an overlap that would stall the window is clamped to `size - 1`.
    pub fn new(size: usize, overlap: usize) -> RagResult<Self> {
        if size == 0 {
            return Err(RagError::Validation(
                "chunk size must be greater than zero".to_string(),
            ));
        }

        let overlap = if overlap >= size {
            tracing::warn!(size, overlap, clamped = size - 1, "Chunk overlap clamped");
            size - 1
        } else {
            overlap
        };

        Ok(Self { size, overlap })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Lazily split `text`. The returned iterator is `Clone`, so it can be restarted.
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            start: 0,
            size: self.size,
            step: self.size - self.overlap,
            finished: text.is_empty(),
        }
    }

    pub fn chunk_document(
        &self,
        source: &str,
        text: &str,
        owner_id: Uuid,
        project_ids: &[Uuid],
    ) -> Vec<DocumentChunk> {
        self.chunks(text)
            .enumerate()
            .map(|(index, slice)| DocumentChunk {
                source: source.to_string(),
                index,
                text: slice.to_string(),
                owner_id,
                project_ids: project_ids.to_vec(),
            })
            .collect()
    }
}

/// Iterator returned by [`Chunker::chunks`]
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    /// Byte offset of the next window
    start: usize,
    size: usize,
    step: usize,
    finished: bool,
}

impl Chunks<'_> {
    /// Byte offset `chars` scalar values after `from`, saturating at the end of the text
    fn advance(&self, from: usize, chars: usize) -> usize {
        self.text[from..]
            .char_indices()
            .nth(chars)
            .map_or(self.text.len(), |(offset, _)| from + offset)
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let end = self.advance(self.start, self.size);
        let chunk = &self.text[self.start..end];

        if end == self.text.len() {
            self.finished = true;
        } else {
            self.start = self.advance(self.start, self.step);
        }

        Some(chunk)
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}
