//! Orchestrator module for the dataset indexer.
//!
//! Runs one full indexing pass: clear the collection, load the dataset,
//! commit and drain.

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

use crate::errors::IngestError;
use crate::loader::SearchLoader;
use crate::processor::DatasetProcessor;
use dataset_indexer_shared::RunSummary;

/// Summary label of the elapsed time.
pub const ELAPSED_LABEL: &str = "Operation took";

/// Orchestrator that drives one indexing run.
///
/// The orchestrator:
/// - Makes sure no earlier work is still queued
/// - Clears the target collection and commits the deletion
/// - Lets the processor read the source and load documents
/// - Commits, waits for every send to finish and closes the loader
pub struct Orchestrator {
    processor: DatasetProcessor,
    loader: SearchLoader,
    source: PathBuf,
}

impl Orchestrator {
    /// Create a new orchestrator that loads `source` with `processor`.
    pub fn new(processor: DatasetProcessor, loader: SearchLoader, source: PathBuf) -> Self {
        Self {
            processor,
            loader,
            source,
        }
    }

    /// Run the indexing pass and return the processor's summary with the
    /// elapsed time appended.
    ///
    /// Any failure aborts the run; documents already sent stay in the
    /// collection.
    #[instrument(skip(self), fields(collection = %self.loader.collection()))]
    pub async fn run(self) -> Result<RunSummary, IngestError> {
        let Self {
            processor,
            loader,
            source,
        } = self;

        loader.drain().await?;

        loader.clear().await?;
        loader.commit().await?;

        let started = Instant::now();
        info!(source = %source.display(), "Loading documents");

        let mut summary = processor.add_documents(&source, &loader).await?;

        loader.commit().await?;
        loader.drain().await?;
        loader.close().await?;

        summary.push(ELAPSED_LABEL, format_elapsed(started.elapsed()));

        info!(summary = %summary, "Indexing run completed");
        Ok(summary)
    }
}

/// Seconds rounded to two decimals, e.g. `1.5 sec`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = (elapsed.as_secs_f64() * 100.0).round() / 100.0;
    format!("{:?} sec", secs)
}
