//! Integration tests for the dataset indexer.
//!
//! These tests run the real dispatcher, orchestrator, processors and update
//! service against a mock SearchIndexProvider that models a collection with
//! commit visibility.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dataset_indexer::dispatcher::dispatch_with_provider;
use dataset_indexer::errors::IngestError;
use dataset_indexer::{IndexingError, Settings};
use dataset_indexer_repository::{
    BatchOperationSummary, SearchIndexError, SearchIndexProvider,
};
use dataset_indexer_shared::IndexDocument;

/// Provider calls, in the order they were made.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    EnsureIndex(String),
    DeleteAll(String),
    Bulk(String, usize),
    Commit(String),
}

/// In-memory collection: writes are staged and become visible on commit.
#[derive(Default)]
struct MockSearchProvider {
    calls: Mutex<Vec<Call>>,
    staged: Mutex<BTreeMap<String, IndexDocument>>,
    visible: Mutex<BTreeMap<String, IndexDocument>>,
    fail_bulk: AtomicBool,
}

impl MockSearchProvider {
    /// A provider whose collection already holds documents from an earlier run.
    fn with_residue(ids: &[&str]) -> Self {
        let provider = Self::default();
        {
            let mut staged = provider.staged.lock().unwrap();
            for id in ids {
                staged.insert(id.to_string(), IndexDocument::new(*id));
            }
            *provider.visible.lock().unwrap() = staged.clone();
        }
        provider
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn visible(&self) -> BTreeMap<String, IndexDocument> {
        self.visible.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchIndexProvider for MockSearchProvider {
    async fn ensure_index_exists(&self, collection: &str) -> Result<(), SearchIndexError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::EnsureIndex(collection.to_string()));
        Ok(())
    }

    async fn delete_all(&self, collection: &str) -> Result<(), SearchIndexError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::DeleteAll(collection.to_string()));
        self.staged.lock().unwrap().clear();
        Ok(())
    }

    async fn bulk_index(
        &self,
        collection: &str,
        documents: &[IndexDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Bulk(collection.to_string(), documents.len()));

        if self.fail_bulk.load(Ordering::SeqCst) {
            return Err(SearchIndexError::bulk_index("Mock bulk failure"));
        }

        let mut staged = self.staged.lock().unwrap();
        for doc in documents {
            staged.insert(doc.id.clone(), doc.clone());
        }

        Ok(BatchOperationSummary::all_succeeded(
            documents.iter().map(|d| d.id.as_str()),
        ))
    }

    async fn commit(&self, collection: &str) -> Result<(), SearchIndexError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Commit(collection.to_string()));
        let staged = self.staged.lock().unwrap().clone();
        *self.visible.lock().unwrap() = staged;
        Ok(())
    }
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn settings(dataset: &str, data_dir: PathBuf) -> Settings {
    settings_with(dataset, data_dir, &[])
}

fn settings_with(dataset: &str, data_dir: PathBuf, extra: &[(&str, &str)]) -> Settings {
    let data_dir = data_dir.display().to_string();
    Settings::from_lookup(|key| match key {
        "DATA_SET" => Some(dataset.to_string()),
        "DATA_DIR" => Some(data_dir.clone()),
        "BATCH_SIZE" => Some("2".to_string()),
        "UPDATE_THREADS_NUMBER" => Some("2".to_string()),
        _ => extra
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string()),
    })
    .unwrap()
}

#[tokio::test]
async fn test_sightings_run_reports_sent_and_skipped() {
    let provider = Arc::new(MockSearchProvider::default());

    let summary = dispatch_with_provider(&settings("ufo", fixtures_dir()), provider.clone())
        .await
        .unwrap();

    assert_eq!(
        summary.get("Ufo indexing info"),
        Some("Sent 1 documents (skipped 2)")
    );
    assert!(summary
        .get("Operation took")
        .is_some_and(|v| v.ends_with(" sec")));
    assert_eq!(
        summary.entries().map(|(label, _)| label).collect::<Vec<_>>(),
        vec!["Ufo indexing info", "Operation took"]
    );

    let visible = provider.visible();
    assert_eq!(visible.len(), 1);
    let doc = visible.values().next().unwrap();
    assert!(doc.id.starts_with("19950730/19950801/shelton/wa/light/"));
    assert_eq!(doc.str_field("month_s"), Some("July"));
    assert_eq!(
        doc.str_field("sighting_en"),
        Some("Man and wife witness two lights. Lights were moving fast & silent. They disappeared over the hill.")
    );
}

#[tokio::test]
async fn test_verbose_run_counts_the_same_skips() {
    let provider = Arc::new(MockSearchProvider::default());
    let settings = settings_with("ufo", fixtures_dir(), &[("BE_VERBOSE", "true")]);
    assert!(settings.verbose);

    let summary = dispatch_with_provider(&settings, provider.clone())
        .await
        .unwrap();

    assert_eq!(
        summary.get("Ufo indexing info"),
        Some("Sent 1 documents (skipped 2)")
    );
    assert_eq!(provider.visible().len(), 1);
}

#[tokio::test]
async fn test_collection_is_cleared_before_load() {
    let provider = Arc::new(MockSearchProvider::with_residue(&["old-1", "old-2"]));

    dispatch_with_provider(&settings("movies", fixtures_dir()), provider.clone())
        .await
        .unwrap();

    let visible = provider.visible();
    assert_eq!(visible.len(), 3);
    assert!(!visible.contains_key("old-1"));
    assert!(!visible.contains_key("old-2"));
    assert!(visible.contains_key(&format!(
        "thematrix/1999/{}",
        md5_hex("The Matrix is a 1999 science fiction action film written and directed by the Wachowskis.")
    )));
}

#[tokio::test]
async fn test_provider_call_order() {
    let provider = Arc::new(MockSearchProvider::default());

    dispatch_with_provider(&settings("movies", fixtures_dir()), provider.clone())
        .await
        .unwrap();

    let calls = provider.calls();
    let collection = "movies".to_string();
    assert_eq!(calls[0], Call::EnsureIndex(collection.clone()));
    assert_eq!(calls[1], Call::DeleteAll(collection.clone()));
    assert_eq!(calls[2], Call::Commit(collection.clone()));
    assert_eq!(calls.last(), Some(&Call::Commit(collection.clone())));

    let bulk: Vec<&Call> = calls[3..calls.len() - 1].iter().collect();
    assert!(!bulk.is_empty());
    let sent: usize = bulk
        .iter()
        .map(|call| match call {
            Call::Bulk(c, n) if *c == collection => *n,
            other => panic!("unexpected call between commits: {:?}", other),
        })
        .sum();
    assert_eq!(sent, 3);
}

#[tokio::test]
async fn test_movies_run_is_idempotent() {
    let first = Arc::new(MockSearchProvider::default());
    let second = Arc::new(MockSearchProvider::default());

    let summary = dispatch_with_provider(&settings("movies", fixtures_dir()), first.clone())
        .await
        .unwrap();
    dispatch_with_provider(&settings("movies", fixtures_dir()), second.clone())
        .await
        .unwrap();

    assert_eq!(summary.get("Movies indexing info"), Some("Sent 3 documents"));
    assert_eq!(first.visible(), second.visible());

    for doc in first.visible().values() {
        let rating = doc.field("rating").and_then(|v| v.as_f64()).unwrap();
        assert!((0.0..=9.9).contains(&rating));
    }
}

#[tokio::test]
async fn test_sparse_movie_has_no_extract() {
    let provider = Arc::new(MockSearchProvider::default());

    dispatch_with_provider(&settings("movies", fixtures_dir()), provider.clone())
        .await
        .unwrap();

    let id = format!("afterdarkincentralpark/1900/{}", md5_hex("null"));
    let visible = provider.visible();
    let doc = visible.get(&id).unwrap();
    assert!(doc.field("extract").is_none());
    assert_eq!(doc.str_field("title"), Some("After Dark in Central Park"));
}

#[tokio::test]
async fn test_missing_source_aborts_run() {
    let provider = Arc::new(MockSearchProvider::default());

    let result = dispatch_with_provider(
        &settings("ufo", fixtures_dir().join("missing")),
        provider.clone(),
    )
    .await;

    assert!(matches!(
        result,
        Err(IndexingError::IngestError(IngestError::SourceError(_)))
    ));
    assert!(!provider
        .calls()
        .iter()
        .any(|call| matches!(call, Call::Bulk(..))));
}

#[tokio::test]
async fn test_bulk_failure_aborts_run() {
    let provider = Arc::new(MockSearchProvider::default());
    provider.fail_bulk.store(true, Ordering::SeqCst);

    let result = dispatch_with_provider(&settings("movies", fixtures_dir()), provider.clone()).await;

    assert!(matches!(
        result,
        Err(IndexingError::IngestError(IngestError::SearchIndexError(_)))
    ));
}

fn md5_hex(text: &str) -> String {
    use md5::{Digest, Md5};
    hex::encode(Md5::digest(text.as_bytes()))
}
