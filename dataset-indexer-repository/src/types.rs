//! Response types for search index operations.

use crate::errors::SearchIndexError;

/// Result of a batch operation for a single document.
///
/// Indicates whether indexing one document of a bulk request succeeded and
/// includes error details if it failed.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The document's identifier.
    pub document_id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// This allows callers to handle partial failures of a bulk request without
/// treating the whole request as failed.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of documents in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each document.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Build a summary from individual results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Build a summary where every document succeeded.
    pub fn all_succeeded<'a>(document_ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self::from_results(
            document_ids
                .into_iter()
                .map(|id| BatchOperationResult {
                    document_id: id.to_string(),
                    success: true,
                    error: None,
                })
                .collect(),
        )
    }

    /// First recorded error, if any operation failed.
    pub fn first_error(&self) -> Option<&SearchIndexError> {
        self.results.iter().find_map(|r| r.error.as_ref())
    }
}
