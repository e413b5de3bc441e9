//! Concurrent update service implementation.
//!
//! This module provides the indexing client used by the dataset pipelines. Documents
//! are queued with [`ConcurrentUpdateService::add`] and sent to the search index by a
//! fixed pool of worker tasks; callers synchronize with [`ConcurrentUpdateService::drain`]
//! before committing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::UpdateServiceConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use dataset_indexer_shared::IndexDocument;

/// A document waiting in the update queue.
#[derive(Debug)]
struct QueuedDocument {
    collection: String,
    document: IndexDocument,
}

/// Bookkeeping shared between the service and its workers.
///
/// `pending` counts documents that were accepted by `add` and whose bulk
/// request has not completed yet, so it covers both the queue and the
/// batches currently in flight.
#[derive(Default)]
struct InFlight {
    pending: AtomicUsize,
    failed: AtomicUsize,
    first_error: StdMutex<Option<SearchIndexError>>,
    idle: Notify,
}

impl InFlight {
    fn complete(&self, count: usize) {
        if self.pending.fetch_sub(count, Ordering::SeqCst) == count {
            self.idle.notify_waiters();
        }
    }

    fn record_failures(&self, count: usize, error: &SearchIndexError) {
        self.failed.fetch_add(count, Ordering::SeqCst);
        if let Ok(mut first) = self.first_error.lock() {
            first.get_or_insert_with(|| error.clone());
        }
    }

    /// Report and reset failures recorded since the last call.
    fn take_failures(&self) -> Result<(), SearchIndexError> {
        let failed = self.failed.swap(0, Ordering::SeqCst);
        if failed == 0 {
            return Ok(());
        }
        let cause = self
            .first_error
            .lock()
            .ok()
            .and_then(|mut first| first.take())
            .map(|e| e.to_string())
            .unwrap_or_default();
        Err(SearchIndexError::bulk_index(format!(
            "{} documents failed to index: {}",
            failed, cause
        )))
    }
}

/// Indexing client that queues documents and sends them from a pool of workers.
///
/// The service is the only component that talks to the `SearchIndexProvider`
/// during a run. `add` hands a document to a bounded queue and returns as soon
/// as the queue accepts it, waiting only while the queue is full. Workers
/// take documents off the queue, fold already-queued documents into a batch of
/// at most `max_batch_size`, and bulk-index the batch.
///
/// Failures of individual documents do not stop the workers; they are
/// collected and reported by the next `drain` (and therefore by `commit` and
/// `close`).
///
/// Must be created from within a Tokio runtime.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use dataset_indexer_repository::opensearch::{IndexConfig, OpenSearchProvider};
/// use dataset_indexer_repository::{ConcurrentUpdateService, UpdateServiceConfig};
/// use dataset_indexer_shared::IndexDocument;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = OpenSearchProvider::new("http://localhost:9200/", IndexConfig::default()).await?;
/// let service = ConcurrentUpdateService::new(Arc::new(provider), UpdateServiceConfig::new(500, 2))?;
///
/// service.clear("movies").await?;
/// service.commit("movies").await?;
/// service.add("movies", IndexDocument::new("alien/1979/abc")).await?;
/// service.commit("movies").await?;
/// service.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct ConcurrentUpdateService {
    provider: Arc<dyn SearchIndexProvider>,
    sender: mpsc::Sender<QueuedDocument>,
    workers: Vec<JoinHandle<()>>,
    in_flight: Arc<InFlight>,
}

impl ConcurrentUpdateService {
    /// Create the service and start its workers.
    ///
    /// # Arguments
    ///
    /// * `provider` - Backend the workers send documents to
    /// * `config` - Queue size, worker count and batch limit
    ///
    /// # Returns
    ///
    /// * `Ok(ConcurrentUpdateService)` - A running service
    /// * `Err(SearchIndexError::ValidationError)` - If a limit in `config` is zero
    pub fn new(
        provider: Arc<dyn SearchIndexProvider>,
        config: UpdateServiceConfig,
    ) -> Result<Self, SearchIndexError> {
        config.validate()?;

        let (sender, receiver) = mpsc::channel(config.queue_size);
        let receiver = Arc::new(Mutex::new(receiver));
        let in_flight = Arc::new(InFlight::default());

        let workers = (0..config.thread_count)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&provider),
                    Arc::clone(&receiver),
                    Arc::clone(&in_flight),
                    config.max_batch_size,
                ))
            })
            .collect();

        info!(
            queue_size = config.queue_size,
            thread_count = config.thread_count,
            max_batch_size = config.max_batch_size,
            "Started concurrent update service"
        );

        Ok(Self {
            provider,
            sender,
            workers,
            in_flight,
        })
    }

    /// Number of documents queued or in flight.
    pub fn pending_count(&self) -> usize {
        self.in_flight.pending.load(Ordering::SeqCst)
    }

    /// Delete every document in the collection.
    ///
    /// The deletion is sent directly to the provider; it becomes visible after
    /// the next `commit`.
    #[instrument(skip(self))]
    pub async fn clear(&self, collection: &str) -> Result<(), SearchIndexError> {
        self.provider.delete_all(collection).await
    }

    /// Queue a document for indexing.
    ///
    /// Waits only while the queue is full. The document is sent later by a
    /// worker; call `drain` to wait for it.
    pub async fn add(
        &self,
        collection: &str,
        document: IndexDocument,
    ) -> Result<(), SearchIndexError> {
        self.in_flight.pending.fetch_add(1, Ordering::SeqCst);

        let queued = QueuedDocument {
            collection: collection.to_string(),
            document,
        };

        if self.sender.send(queued).await.is_err() {
            self.in_flight.complete(1);
            return Err(SearchIndexError::queue_closed(
                "all update workers have stopped",
            ));
        }
        Ok(())
    }

    /// Wait until the queue is empty and no bulk request is in flight.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every document queued since the last drain was indexed
    /// * `Err(SearchIndexError::BulkIndexError)` - If some documents failed; the
    ///   failure count is reset so the next drain starts clean
    pub async fn drain(&self) -> Result<(), SearchIndexError> {
        loop {
            let notified = self.in_flight.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a completion between the check and
            // the await cannot be missed.
            notified.as_mut().enable();

            if self.in_flight.pending.load(Ordering::SeqCst) == 0 {
                break;
            }
            notified.await;
        }

        self.in_flight.take_failures()
    }

    /// Drain, then make all previous adds and deletes visible.
    #[instrument(skip(self))]
    pub async fn commit(&self, collection: &str) -> Result<(), SearchIndexError> {
        self.drain().await?;
        self.provider.commit(collection).await
    }

    /// Stop accepting documents, let the workers send what is queued, and join them.
    pub async fn close(self) -> Result<(), SearchIndexError> {
        let Self {
            sender,
            workers,
            in_flight,
            ..
        } = self;

        drop(sender);

        for worker in workers {
            worker
                .await
                .map_err(|e| SearchIndexError::unknown(format!("update worker failed: {}", e)))?;
        }

        debug!("Concurrent update service closed");
        in_flight.take_failures()
    }
}

/// Worker loop: take a batch off the queue and bulk-index it until the queue closes.
async fn run_worker(
    worker_id: usize,
    provider: Arc<dyn SearchIndexProvider>,
    receiver: Arc<Mutex<mpsc::Receiver<QueuedDocument>>>,
    in_flight: Arc<InFlight>,
    max_batch_size: usize,
) {
    loop {
        let batch = {
            let mut receiver = receiver.lock().await;
            let Some(first) = receiver.recv().await else {
                break;
            };
            let mut batch = vec![first];
            while batch.len() < max_batch_size {
                match receiver.try_recv() {
                    Ok(queued) => batch.push(queued),
                    Err(_) => break,
                }
            }
            batch
        };

        let count = batch.len();
        send_batch(worker_id, provider.as_ref(), batch, &in_flight).await;
        in_flight.complete(count);
    }

    debug!(worker_id = worker_id, "Update worker stopped");
}

/// Send one batch, one bulk request per collection, recording failures.
async fn send_batch(
    worker_id: usize,
    provider: &dyn SearchIndexProvider,
    batch: Vec<QueuedDocument>,
    in_flight: &InFlight,
) {
    let mut groups: Vec<(String, Vec<IndexDocument>)> = Vec::new();
    for queued in batch {
        match groups.iter_mut().find(|(c, _)| *c == queued.collection) {
            Some((_, docs)) => docs.push(queued.document),
            None => groups.push((queued.collection, vec![queued.document])),
        }
    }

    for (collection, documents) in groups {
        match provider.bulk_index(&collection, &documents).await {
            Ok(summary) => {
                if summary.failed > 0 {
                    warn!(
                        worker_id = worker_id,
                        collection = %collection,
                        succeeded = summary.succeeded,
                        failed = summary.failed,
                        "Bulk index completed with some failures"
                    );
                    for result in summary.results.iter().filter(|r| !r.success) {
                        if let Some(ref err) = result.error {
                            error!(
                                document_id = %result.document_id,
                                error = %err,
                                "Failed to index document"
                            );
                        }
                    }
                    let cause = summary
                        .first_error()
                        .cloned()
                        .unwrap_or_else(|| SearchIndexError::unknown("no error details"));
                    in_flight.record_failures(summary.failed, &cause);
                } else {
                    debug!(
                        worker_id = worker_id,
                        collection = %collection,
                        count = summary.succeeded,
                        "Indexed batch"
                    );
                }
            }
            Err(e) => {
                error!(
                    worker_id = worker_id,
                    collection = %collection,
                    count = documents.len(),
                    error = %e,
                    "Failed to bulk index documents"
                );
                in_flight.record_failures(documents.len(), &e);
            }
        }
    }
}
