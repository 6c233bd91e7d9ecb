//! Domain types flowing through load → split → embed → index → answer.

use serde::{Deserialize, Serialize};

/// A raw unit of text produced by the loader.
///
/// - `source_id`: identity of the file it came from (its path)
/// - `position`: zero-based page number for paged sources, `0` otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub raw_text: String,
    pub source_id: String,
    pub position: usize,
}

impl Document {
    pub fn new(raw_text: impl Into<String>, source_id: impl Into<String>, position: usize) -> Self {
        Self { raw_text: raw_text.into(), source_id: source_id.into(), position }
    }
}

/// A contiguous slice of one document's text; the unit of retrieval.
///
/// `chunk_index` counts chunks within the parent document. `start`/`end` are
/// char offsets into the parent's `raw_text`, so provenance survives splitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_id: String,
    pub position: usize,
    pub chunk_index: usize,
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    /// Short provenance label, e.g. `papers/attention.pdf p.3 #1`.
    pub fn provenance(&self) -> String {
        format!("{} p.{} #{}", self.source_id, self.position + 1, self.chunk_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A retrieved chunk and its similarity to the query. Higher is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Retrieved chunks in descending score order, never longer than the requested k.
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    pub hits: Vec<ScoredChunk>,
}

impl RetrievalResult {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.hits.iter().map(|h| &h.chunk)
    }
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub supporting_chunks: Vec<Chunk>,
}
