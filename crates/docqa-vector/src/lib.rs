#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! docqa-vector
//!
//! In-memory flat vector index. Built once from a snapshot of chunks and
//! read-only afterwards; a rebuild produces a new index that replaces the old
//! one wholesale.

pub mod similarity;

use std::cmp::Ordering;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docqa_core::config::Similarity;
use docqa_core::traits::Embedder;
use docqa_core::types::{Chunk, RetrievalResult, ScoredChunk};
use docqa_core::{Error, Result};

struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dim: usize,
    similarity: Similarity,
    embedder: Arc<dyn Embedder>,
}

impl VectorIndex {
    /// Embed every chunk and store `(chunk, vector)` pairs in input order.
    ///
    /// Atomic: any embedding failure or dimension mismatch fails the whole
    /// build and no index is returned.
    pub fn build(chunks: Vec<Chunk>, embedder: Arc<dyn Embedder>, batch_size: usize, similarity: Similarity) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::Index("cannot build an index from zero chunks".to_string()));
        }
        let dim = embedder.dim();
        let batch_size = batch_size.max(1);
        info!(chunks = chunks.len(), dim, batch_size, "building vector index");

        let pb = ProgressBar::new(chunks.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embedded = embedder.embed_batch(&texts).map_err(|e| {
                pb.abandon_with_message("embedding failed");
                Error::embedding(&e)
            })?;
            if embedded.len() != batch.len() {
                pb.abandon();
                return Err(Error::Embedding(format!("expected {} vectors, provider returned {}", batch.len(), embedded.len())));
            }
            if let Some(bad) = embedded.iter().find(|v| v.len() != dim) {
                pb.abandon();
                return Err(Error::Embedding(format!("expected dimension {dim}, provider returned {}", bad.len())));
            }
            vectors.extend(embedded);
            pb.inc(batch.len() as u64);
        }
        pb.finish_with_message("index ready");

        let entries = chunks.into_iter().zip(vectors).map(|(chunk, vector)| IndexEntry { chunk, vector }).collect();
        Ok(Self { entries, dim, similarity, embedder })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Stored chunks in index order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Embed `query_text` and return the `k` most similar chunks.
    pub fn retrieve(&self, query_text: &str, k: usize) -> Result<RetrievalResult> {
        let query_vec = self.embedder.embed_one(query_text).map_err(|e| Error::embedding(&e))?;
        self.search_vec(&query_vec, k)
    }

    /// Top-`k` entries by descending score; equal scores keep index order.
    /// `k` larger than the index returns every entry.
    pub fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<RetrievalResult> {
        if query_vec.len() != self.dim {
            return Err(Error::Embedding(format!("query dimension {} does not match index dimension {}", query_vec.len(), self.dim)));
        }
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, similarity::score(self.similarity, query_vec, &e.vector)))
            .collect();
        scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        scored.truncate(k);
        debug!(k, returned = scored.len(), best = scored.first().map(|s| s.1), "vector search");

        let hits = scored
            .into_iter()
            .map(|(i, score)| ScoredChunk { chunk: self.entries[i].chunk.clone(), score })
            .collect();
        Ok(RetrievalResult { hits })
    }
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("len", &self.entries.len())
            .field("dim", &self.dim)
            .field("similarity", &self.similarity)
            .finish()
    }
}
