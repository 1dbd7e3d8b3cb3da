use thiserror::Error;

/// Failures surfaced by the retrieval pipeline.
///
/// None of these are fatal: after any error the engine keeps serving the
/// generation that was live before the failing call.
#[derive(Debug, Error)]
pub enum Error {
    #[error("document produced no chunks; upload a document with extractable text")]
    EmptyCorpus,

    #[error("no document has been indexed yet; upload a document first")]
    NoIndex,

    #[error("question cannot be empty")]
    EmptyQuery,

    #[error("embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap any embedder-side failure.
    pub fn embedding<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Embedding(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
