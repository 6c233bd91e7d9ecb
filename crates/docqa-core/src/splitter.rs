//! Overlapping fixed-size chunking that prefers natural boundaries.
//!
//! Chunks are contiguous char ranges of the source text. Each chunk after the
//! first starts exactly `chunk_overlap` chars before the previous one ends, so
//! dropping the first `chunk_overlap` chars of every later chunk and
//! concatenating reconstructs the document.

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// Break candidates, strongest first: paragraph, line, sentence, word.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "? ", "! ", " "];

/// A `[start, end)` range of char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Split("chunk size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::Split(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for doc in documents {
            let offsets = char_offsets(&doc.raw_text);
            for (chunk_index, span) in self.spans(&doc.raw_text, &offsets).into_iter().enumerate() {
                chunks.push(Chunk {
                    text: doc.raw_text[offsets[span.start]..offsets[span.end]].to_string(),
                    source_id: doc.source_id.clone(),
                    position: doc.position,
                    chunk_index,
                    start: span.start,
                    end: span.end,
                });
            }
        }
        tracing::debug!(documents = documents.len(), chunks = chunks.len(), "split documents");
        chunks
    }

    /// Char spans for `text`. Empty text yields no spans; text no longer than
    /// the chunk size yields one span covering all of it.
    pub fn split_text(&self, text: &str) -> Vec<TextSpan> {
        self.spans(text, &char_offsets(text))
    }

    fn spans(&self, text: &str, offsets: &[usize]) -> Vec<TextSpan> {
        let len = offsets.len() - 1;
        let mut spans = Vec::new();
        if len == 0 {
            return spans;
        }
        let mut start = 0;
        loop {
            if len - start <= self.chunk_size {
                spans.push(TextSpan { start, end: len });
                return spans;
            }
            let hard_end = start + self.chunk_size;
            // end > start + overlap guarantees the next start moves forward
            let min_end = start + (self.chunk_overlap + 1).max(self.chunk_size / 2);
            let end = natural_break(text, offsets, start, min_end, hard_end).unwrap_or(hard_end);
            spans.push(TextSpan { start, end });
            start = end - self.chunk_overlap;
        }
    }
}

/// Byte offset of every char plus a trailing `text.len()`.
fn char_offsets(text: &str) -> Vec<usize> {
    text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect()
}

/// Latest char position in `[min_end, hard_end]` that directly follows the
/// strongest separator present in the window.
fn natural_break(text: &str, offsets: &[usize], start: usize, min_end: usize, hard_end: usize) -> Option<usize> {
    let window_start = offsets[start];
    let window = &text[window_start..offsets[hard_end]];
    SEPARATORS.iter().find_map(|sep| {
        let at = window.rfind(sep)?;
        let end = offsets.binary_search(&(window_start + at + sep.len())).ok()?;
        (end >= min_end).then_some(end)
    })
}
