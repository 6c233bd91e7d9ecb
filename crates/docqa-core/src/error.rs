use thiserror::Error;

/// Failure taxonomy shared by every pipeline stage.
///
/// Each variant names the stage that owns the failure. The session boundary
/// turns any of them into a user-visible message and keeps running.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not load documents: {0}")]
    Load(String),

    #[error("Invalid splitter configuration: {0}")]
    Split(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("{0}")]
    Usage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    Split,
    Embedding,
    Index,
    Generation,
    Usage,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Load => "LoadError",
            ErrorKind::Split => "SplitError",
            ErrorKind::Embedding => "EmbeddingError",
            ErrorKind::Index => "IndexError",
            ErrorKind::Generation => "GenerationError",
            ErrorKind::Usage => "UsageError",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Load(_) => ErrorKind::Load,
            Error::Split(_) => ErrorKind::Split,
            Error::Embedding(_) => ErrorKind::Embedding,
            Error::Index(_) => ErrorKind::Index,
            Error::Generation(_) => ErrorKind::Generation,
            Error::Usage(_) => ErrorKind::Usage,
        }
    }

    /// Wrap an external-provider failure, keeping its whole cause chain.
    pub fn embedding(err: &anyhow::Error) -> Self {
        Error::Embedding(format!("{err:#}"))
    }

    pub fn generation(err: &anyhow::Error) -> Self {
        Error::Generation(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
