//! Configuration types for the ConcurrentUpdateService.

use crate::errors::SearchIndexError;

/// Default capacity of the document queue.
pub const DEFAULT_QUEUE_SIZE: usize = 500;

/// Default number of worker tasks sending documents.
pub const DEFAULT_THREAD_COUNT: usize = 1;

/// Default upper bound on documents sent in one bulk request.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// Configuration for the ConcurrentUpdateService.
///
/// Controls how many documents may wait in the queue before `add` applies
/// backpressure, how many workers drain the queue concurrently, and how many
/// queued documents a worker folds into a single bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateServiceConfig {
    /// Capacity of the bounded document queue.
    pub queue_size: usize,
    /// Number of worker tasks sending documents to the provider.
    pub thread_count: usize,
    /// Maximum number of documents in a single bulk request.
    pub max_batch_size: usize,
}

impl Default for UpdateServiceConfig {
    fn default() -> Self {
        Self {
            queue_size: DEFAULT_QUEUE_SIZE,
            thread_count: DEFAULT_THREAD_COUNT,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl UpdateServiceConfig {
    /// Create a config with the given queue size and worker count.
    ///
    /// The maximum batch size follows the queue size, so a worker never waits
    /// for more documents than the queue can hold.
    ///
    /// # Arguments
    ///
    /// * `queue_size` - Capacity of the document queue
    /// * `thread_count` - Number of worker tasks
    pub fn new(queue_size: usize, thread_count: usize) -> Self {
        Self {
            queue_size,
            thread_count,
            max_batch_size: queue_size,
        }
    }

    /// Override the maximum batch size.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Check that every limit is at least one.
    pub fn validate(&self) -> Result<(), SearchIndexError> {
        if self.queue_size == 0 {
            return Err(SearchIndexError::validation("queue_size must be at least 1"));
        }
        if self.thread_count == 0 {
            return Err(SearchIndexError::validation("thread_count must be at least 1"));
        }
        if self.max_batch_size == 0 {
            return Err(SearchIndexError::validation(
                "max_batch_size must be at least 1",
            ));
        }
        Ok(())
    }
}
