//! Dependency initialization and wiring for the dataset indexer.

use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::loader::SearchLoader;
use crate::orchestrator::Orchestrator;
use crate::processor::DatasetProcessor;
use crate::IndexingError;
use dataset_indexer_repository::opensearch::IndexConfig;
use dataset_indexer_repository::{ConcurrentUpdateService, OpenSearchProvider, SearchIndexProvider};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Connect to the search service named in `settings` and wire the
    /// components for the selected dataset.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the provider cannot be created or the
    ///   collection cannot be prepared
    pub async fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            search_base_url = %settings.search_base_url,
            collection = %settings.collection,
            "Initializing dependencies"
        );

        let provider = OpenSearchProvider::new(&settings.search_base_url, IndexConfig::default())
            .await
            .map_err(|e| {
                IndexingError::config(format!("Failed to create OpenSearch provider: {}", e))
            })?;

        Self::with_provider(settings, Arc::new(provider)).await
    }

    /// Wire the components around an existing provider.
    pub async fn with_provider(
        settings: &Settings,
        provider: Arc<dyn SearchIndexProvider>,
    ) -> Result<Self, IndexingError> {
        // The collection must exist before it can be cleared
        provider
            .ensure_index_exists(&settings.collection)
            .await
            .map_err(|e| IndexingError::config(format!("Failed to ensure index exists: {}", e)))?;

        let service = ConcurrentUpdateService::new(provider, settings.update_service_config())
            .map_err(|e| {
                IndexingError::config(format!("Failed to start update service: {}", e))
            })?;

        let loader = SearchLoader::new(service, settings.collection.clone());
        let processor = DatasetProcessor::for_dataset(settings.dataset, settings.verbose);
        let orchestrator = Orchestrator::new(processor, loader, settings.resource_path());

        info!(dataset = %settings.dataset, "Dependencies initialized");

        Ok(Self { orchestrator })
    }
}
