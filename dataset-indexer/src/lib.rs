//! # Dataset Indexer
//!
//! Batch loader that reads a bundled dataset (UFO sighting reports or a movie
//! catalog), turns every record into a search document, and bulk-indexes the
//! documents into a search collection, replacing its previous contents.
//!
//! ## Architecture
//!
//! The indexer follows the Consumer-Processor-Loader pattern:
//!
//! 1. **Consumer**: Reads records from the dataset resource
//! 2. **Processor**: Validates records and transforms them into documents
//! 3. **Loader**: Hands documents to the concurrent update service
//! 4. **Orchestrator**: Clears the collection, runs the processor, commits and drains
//! 5. **Dispatcher**: Selects the dataset and runs the orchestrator once
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`consumer`]: Dataset resource readers
//! - [`processor`]: Sighting and movie record processors
//! - [`loader`]: Binds the update service to the target collection
//! - [`orchestrator`]: Runs one indexing pass
//! - [`dispatcher`]: Resolves and runs the configured dataset
//! - [`errors`]: Error types for the indexer

pub mod config;
pub mod consumer;
pub mod dispatcher;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use config::{Dataset, Dependencies, Settings};
pub use errors::IngestError;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
