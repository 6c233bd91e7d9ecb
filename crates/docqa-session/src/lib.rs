//! docqa-session
//!
//! The two pipeline chains and the interactive session that owns the index
//! between questions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use docqa_core::config::Settings;
use docqa_core::loader::{DocumentLoader, LoaderOptions};
use docqa_core::splitter::TextSplitter;
use docqa_core::traits::Embedder;
use docqa_core::types::{Answer, Query, RetrievalResult};
use docqa_core::{Error, ErrorKind, Result};
use docqa_generate::AnswerGenerator;
use docqa_vector::VectorIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    IndexReady,
    Querying,
}

/// Counts from the last successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub documents: usize,
    pub chunks: usize,
    pub dim: usize,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub answer: Answer,
    pub retrieved: RetrievalResult,
    /// Wall time of retrieval plus generation.
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    BuildIndex,
    Ask(String),
}

#[derive(Debug, Clone)]
pub enum Event {
    IndexBuilt(BuildReport),
    Answered(Response),
    Failed { kind: ErrorKind, message: String },
}

/// Load, split and index the configured directory.
pub fn build_index(settings: &Settings, embedder: Arc<dyn Embedder>) -> Result<(VectorIndex, BuildReport)> {
    let splitter = TextSplitter::new(settings.splitter.chunk_size, settings.splitter.chunk_overlap)?;
    let loader = DocumentLoader::new(LoaderOptions {
        recursive: settings.data.recursive,
        limit: settings.data.document_limit(),
    });
    let documents = loader.load(&settings.data.dir_path())?;
    let chunks = splitter.split_documents(&documents);
    let index = VectorIndex::build(chunks, embedder, settings.embedding.batch_size, settings.retrieval.similarity)?;
    let report = BuildReport { documents: documents.len(), chunks: index.len(), dim: index.dim() };
    Ok((index, report))
}

/// Retrieve the top `k` chunks for `question` and generate an answer from them.
pub fn answer_query(index: &VectorIndex, answerer: &AnswerGenerator, question: &str, k: usize) -> Result<Response> {
    let start = Instant::now();
    let query = Query::new(question);
    let retrieved = index.retrieve(&query.text, k)?;
    let answer = answerer.answer(&query, &retrieved)?;
    Ok(Response { answer, retrieved, elapsed: start.elapsed() })
}

pub struct Session {
    settings: Settings,
    embedder: Arc<dyn Embedder>,
    answerer: AnswerGenerator,
    index: Option<VectorIndex>,
    report: Option<BuildReport>,
    state: SessionState,
}

impl Session {
    pub fn new(settings: Settings, embedder: Arc<dyn Embedder>, answerer: AnswerGenerator) -> Self {
        Self { settings, embedder, answerer, index: None, report: None, state: SessionState::Uninitialized }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn report(&self) -> Option<&BuildReport> {
        self.report.as_ref()
    }

    pub fn model_id(&self) -> &str {
        self.answerer.model_id()
    }

    /// Build a fresh index and swap it in. On failure the previous index, if
    /// any, stays in place.
    pub fn build_index(&mut self) -> Result<BuildReport> {
        let start = Instant::now();
        match build_index(&self.settings, self.embedder.clone()) {
            Ok((index, report)) => {
                info!(
                    documents = report.documents,
                    chunks = report.chunks,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "index ready"
                );
                self.index = Some(index);
                self.report = Some(report.clone());
                self.state = SessionState::IndexReady;
                Ok(report)
            }
            Err(e) => {
                warn!(kind = e.kind().label(), error = %e, "index build failed");
                Err(e)
            }
        }
    }

    pub fn ask(&mut self, question: &str) -> Result<Response> {
        let Some(index) = self.index.as_ref() else {
            return Err(Error::Usage("No index yet. Build the document index before asking questions.".to_string()));
        };
        if question.trim().is_empty() {
            return Err(Error::Usage("Enter a question.".to_string()));
        }
        self.state = SessionState::Querying;
        let result = answer_query(index, &self.answerer, question, self.settings.retrieval.top_k);
        self.state = SessionState::IndexReady;
        if let Err(e) = &result {
            warn!(kind = e.kind().label(), error = %e, "query failed");
        }
        result
    }

    /// Run one user action to completion; errors become `Event::Failed`.
    pub fn handle(&mut self, action: Action) -> Event {
        let outcome = match action {
            Action::BuildIndex => self.build_index().map(Event::IndexBuilt),
            Action::Ask(question) => self.ask(&question).map(Event::Answered),
        };
        outcome.unwrap_or_else(|e| Event::Failed { kind: e.kind(), message: e.to_string() })
    }
}
