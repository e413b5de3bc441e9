//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesRefreshParts},
    BulkParts, DeleteByQueryParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::{get_index_settings, IndexConfig};
use crate::types::{BatchOperationResult, BatchOperationSummary};
use dataset_indexer_shared::IndexDocument;

/// OpenSearch provider implementation.
///
/// Each collection maps to one OpenSearch index of the same name.
///
/// # Example
///
/// ```ignore
/// use dataset_indexer_repository::opensearch::IndexConfig;
/// let provider = OpenSearchProvider::new("http://localhost:9200/", IndexConfig::default()).await?;
///
/// provider.ensure_index_exists("ufo").await?;
/// provider.delete_all("ufo").await?;
/// provider.commit("ufo").await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200/")
    /// * `index_config` - Settings applied to collections created by this provider
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            shards = index_config.number_of_shards,
            replicas = index_config.number_of_replicas,
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Build the NDJSON body of a bulk request: one `index` action line
    /// followed by the document source for every document.
    fn bulk_body(documents: &[IndexDocument]) -> Result<Vec<JsonBody<Value>>, SearchIndexError> {
        let mut body = Vec::with_capacity(documents.len() * 2);
        for doc in documents {
            let source = serde_json::to_value(doc)
                .map_err(|e| SearchIndexError::serialization(e.to_string()))?;
            body.push(JsonBody::new(json!({ "index": { "_id": doc.id } })));
            body.push(JsonBody::new(source));
        }
        Ok(body)
    }

    /// Fold a `_bulk` response into a summary.
    ///
    /// Items are matched to documents by position, which is the order
    /// OpenSearch reports them in.
    fn parse_bulk_response(
        response: &Value,
        documents: &[IndexDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let items = response["items"]
            .as_array()
            .ok_or_else(|| SearchIndexError::parse("bulk response has no items array"))?;

        if items.len() != documents.len() {
            return Err(SearchIndexError::parse(format!(
                "bulk response has {} items for {} documents",
                items.len(),
                documents.len()
            )));
        }

        let results = items
            .iter()
            .zip(documents)
            .map(|(item, doc)| {
                let outcome = &item["index"];
                let status = outcome["status"].as_u64().unwrap_or(0);
                let failed = !outcome["error"].is_null() || !(200..300).contains(&status);
                BatchOperationResult {
                    document_id: doc.id.clone(),
                    success: !failed,
                    error: failed.then(|| {
                        SearchIndexError::index(format!(
                            "status {}: {}",
                            status, outcome["error"]
                        ))
                    }),
                }
            })
            .collect();

        Ok(BatchOperationSummary::from_results(results))
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    /// Create the index with dynamic-template mappings if it does not exist.
    async fn ensure_index_exists(&self, collection: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[collection]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if response.status_code().is_success() {
            debug!(collection = %collection, "Index already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(collection))
            .body(get_index_settings(&self.index_config))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::index_creation(format!(
                "Create index {} failed with status {}: {}",
                collection, status, error_body
            )));
        }

        info!(collection = %collection, "Created index");
        Ok(())
    }

    /// Delete every document with a `match_all` delete-by-query.
    ///
    /// A 404 means the index is missing, so there is nothing to delete.
    async fn delete_all(&self, collection: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&[collection]))
            .body(json!({
                "query": { "match_all": {} }
            }))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete by query failed");
            return Err(SearchIndexError::delete(format!(
                "Delete all in {} failed with status {}: {}",
                collection, status, error_body
            )));
        }

        debug!(collection = %collection, "Deleted all documents");
        Ok(())
    }

    /// Index documents with a single `_bulk` request.
    ///
    /// Per-item failures are reported in the summary; only a failure of the
    /// request itself is returned as an error.
    async fn bulk_index(
        &self,
        collection: &str,
        documents: &[IndexDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::default());
        }

        let body = Self::bulk_body(documents)?;

        let response = self
            .client
            .bulk(BulkParts::Index(collection))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_index(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let summary = Self::parse_bulk_response(&body, documents)?;
        debug!(
            collection = %collection,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk request completed"
        );
        Ok(summary)
    }

    /// Refresh the index so that previous writes become searchable.
    async fn commit(&self, collection: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[collection]))
            .send()
            .await
            .map_err(|e| SearchIndexError::commit(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Refresh request failed");
            return Err(SearchIndexError::commit(format!(
                "Refresh of {} failed with status {}: {}",
                collection, status, error_body
            )));
        }

        debug!(collection = %collection, "Committed");
        Ok(())
    }
}
