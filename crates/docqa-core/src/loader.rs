use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::Document;

const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    pub recursive: bool,
    /// Keep only the first `limit` documents, in load order.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub documents: Vec<Document>,
    pub files_read: usize,
    /// Files never opened because the limit was already reached.
    pub files_skipped: usize,
    /// Documents read from the last file but cut by the limit.
    pub documents_dropped: usize,
}

/// Reads every supported file under a directory into `Document`s.
///
/// PDFs yield one document per page; text and markdown files yield a single
/// document at position 0. Files are visited in sorted path order so repeated
/// loads of an unchanged directory produce the same sequence.
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    options: LoaderOptions,
}

impl DocumentLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn load(&self, dir: &Path) -> Result<Vec<Document>> {
        self.load_summary(dir).map(|summary| summary.documents)
    }

    /// Like [`load`](Self::load), also reporting what the document limit cut.
    pub fn load_summary(&self, dir: &Path) -> Result<LoadSummary> {
        if !dir.is_dir() {
            return Err(Error::Load(format!("directory {} does not exist", dir.display())));
        }
        let files = self.list_supported_files(dir);
        if files.is_empty() {
            return Err(Error::Load(format!(
                "no supported files ({}) found under {}",
                SUPPORTED_EXTENSIONS.join(", "),
                dir.display()
            )));
        }

        let mut documents = Vec::new();
        let mut files_read = 0;
        for (file_index, path) in files.iter().enumerate() {
            debug!(file = %path.display(), n = file_index + 1, of = files.len(), "loading file");
            documents.extend(self.read_file(path)?);
            files_read += 1;
            if self.options.limit.is_some_and(|limit| documents.len() >= limit) {
                break;
            }
        }

        let mut documents_dropped = 0;
        if let Some(limit) = self.options.limit {
            documents_dropped = documents.len().saturating_sub(limit);
            documents.truncate(limit);
        }
        let files_skipped = files.len() - files_read;
        if documents_dropped > 0 || files_skipped > 0 {
            warn!(
                limit = self.options.limit,
                documents_dropped,
                files_skipped,
                "document limit reached, dropping the rest"
            );
        }
        info!(files = files_read, documents = documents.len(), dir = %dir.display(), "documents loaded");
        Ok(LoadSummary { documents, files_read, files_skipped, documents_dropped })
    }

    fn read_file(&self, path: &Path) -> Result<Vec<Document>> {
        let source_id = path.to_string_lossy().to_string();
        let pages = match extension_of(path).as_deref() {
            Some("pdf") => read_pdf_pages(path)?,
            _ => vec![read_text_lossy(path)?],
        };

        let mut documents = Vec::with_capacity(pages.len());
        for (position, text) in pages.into_iter().enumerate() {
            if text.trim().is_empty() {
                debug!(source = %source_id, position, "skipping blank page");
                continue;
            }
            documents.push(Document::new(text, source_id.clone(), position));
        }
        Ok(documents)
    }

    fn list_supported_files(&self, root: &Path) -> Vec<PathBuf> {
        let max_depth = if self.options.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| extension_of(p).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str())))
            .collect();
        files.sort();
        files
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase)
}

/// Text of each PDF page. The extractor panics on some malformed fonts, so a
/// panic is reported as an unreadable file like any other extraction failure.
fn read_pdf_pages(path: &Path) -> Result<Vec<String>> {
    let unreadable = |reason: String| Error::Load(format!("unreadable PDF {}: {}", path.display(), reason));
    match std::panic::catch_unwind(|| pdf_extract::extract_text_by_pages(path)) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(unreadable(e.to_string())),
        Err(_) => Err(unreadable("extractor panicked".to_string())),
    }
}

fn read_text_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::Load(format!("unreadable file {}: {}", path.display(), e)))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}
