//! Error types for the dataset indexer ingest.

use dataset_indexer_repository::SearchIndexError;
use thiserror::Error;

/// Errors that abort an indexing run.
///
/// Problems with a single record are not errors; they are skipped by the
/// processors and only counted.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Error from the loader component.
    #[error("Loader error: {0}")]
    LoaderError(String),

    /// The dataset resource could not be read.
    #[error("Source error: {0}")]
    SourceError(#[from] std::io::Error),

    /// Error parsing or decoding a whole dataset resource.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error from the indexing client.
    #[error("Search index error: {0}")]
    SearchIndexError(#[from] SearchIndexError),
}

impl IngestError {
    /// Create a loader error.
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::LoaderError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
