//! Loader module for the dataset indexer.
//!
//! Binds the concurrent update service to the target collection.

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, instrument};

use crate::errors::IngestError;
use dataset_indexer_repository::ConcurrentUpdateService;
use dataset_indexer_shared::IndexDocument;

/// Loader that hands documents to the update service.
///
/// The loader is responsible for:
/// - Routing every document to the configured collection
/// - Turning update service failures into ingest errors
pub struct SearchLoader {
    service: ConcurrentUpdateService,
    collection: String,
    loaded: AtomicUsize,
}

impl SearchLoader {
    /// Create a new loader that writes to `collection`.
    pub fn new(service: ConcurrentUpdateService, collection: impl Into<String>) -> Self {
        Self {
            service,
            collection: collection.into(),
            loaded: AtomicUsize::new(0),
        }
    }

    /// Target collection.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Number of documents handed to the update service so far.
    pub fn loaded_count(&self) -> usize {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Queue one document for indexing.
    ///
    /// Waits only while the update queue is full.
    pub async fn load(&self, document: IndexDocument) -> Result<(), IngestError> {
        self.service
            .add(&self.collection, document)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to queue document");
                IngestError::loader(format!("Failed to queue document: {}", e))
            })?;
        self.loaded.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Delete every document in the collection.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn clear(&self) -> Result<(), IngestError> {
        self.service.clear(&self.collection).await?;
        info!("Cleared collection");
        Ok(())
    }

    /// Wait for queued documents, then make all changes visible.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn commit(&self) -> Result<(), IngestError> {
        self.service.commit(&self.collection).await?;
        debug!("Committed collection");
        Ok(())
    }

    /// Wait until every queued document has been sent.
    pub async fn drain(&self) -> Result<(), IngestError> {
        self.service.drain().await.map_err(|e| {
            error!(error = %e, "Some documents were not indexed");
            IngestError::from(e)
        })
    }

    /// Shut the update service down.
    pub async fn close(self) -> Result<(), IngestError> {
        let loaded = self.loaded_count();
        self.service.close().await?;
        info!(
            collection = %self.collection,
            loaded = loaded,
            "Loader closed"
        );
        Ok(())
    }
}
