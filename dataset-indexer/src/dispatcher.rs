//! Dispatcher: runs the pipeline of the configured dataset once.

use std::sync::Arc;
use tracing::info;

use crate::config::{Dependencies, Settings};
use crate::IndexingError;
use dataset_indexer_repository::SearchIndexProvider;
use dataset_indexer_shared::RunSummary;

/// Connect to the configured search service and index the selected dataset.
pub async fn dispatch(settings: &Settings) -> Result<RunSummary, IndexingError> {
    let deps = Dependencies::new(settings).await?;
    run(settings, deps).await
}

/// Index the selected dataset into `provider`.
pub async fn dispatch_with_provider(
    settings: &Settings,
    provider: Arc<dyn SearchIndexProvider>,
) -> Result<RunSummary, IndexingError> {
    let deps = Dependencies::with_provider(settings, provider).await?;
    run(settings, deps).await
}

async fn run(settings: &Settings, deps: Dependencies) -> Result<RunSummary, IndexingError> {
    info!(
        dataset = %settings.dataset,
        collection = %settings.collection,
        "Dispatching indexing run"
    );
    Ok(deps.orchestrator.run().await?)
}
