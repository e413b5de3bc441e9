//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;
use dataset_indexer_shared::IndexDocument;

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are injected into `ConcurrentUpdateService`, which owns the
/// queueing and worker concurrency; a provider only performs single requests.
/// Every operation names the target collection explicitly.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling across
/// different backend implementations.
///
/// # Visibility
///
/// Documents indexed or deleted through a provider are not guaranteed to be visible
/// to searches until `commit` has been called for the collection.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure the collection exists, creating it with its mappings if necessary.
    ///
    /// # Arguments
    ///
    /// * `collection` - Name of the target collection
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the collection is ready for use
    /// * `Err(SearchIndexError)` - If initialization fails
    async fn ensure_index_exists(&self, collection: &str) -> Result<(), SearchIndexError>;

    /// Delete every document in the collection.
    ///
    /// A collection that does not exist has nothing to delete and is not an error.
    ///
    /// # Arguments
    ///
    /// * `collection` - Name of the target collection
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If all documents were deleted
    /// * `Err(SearchIndexError)` - If the deletion fails
    async fn delete_all(&self, collection: &str) -> Result<(), SearchIndexError>;

    /// Index multiple documents in one request, replacing documents with the same id.
    ///
    /// # Arguments
    ///
    /// * `collection` - Name of the target collection
    /// * `documents` - Documents to index
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Contains aggregate statistics and individual results
    /// * `Err(SearchIndexError)` - If the bulk request fails entirely
    async fn bulk_index(
        &self,
        collection: &str,
        documents: &[IndexDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Make all previous adds and deletes visible to subsequent searches.
    ///
    /// # Arguments
    ///
    /// * `collection` - Name of the target collection
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the commit succeeded
    /// * `Err(SearchIndexError)` - If the commit fails
    async fn commit(&self, collection: &str) -> Result<(), SearchIndexError>;
}
