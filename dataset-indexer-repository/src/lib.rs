//! # Dataset Indexer Repository
//!
//! This crate provides the indexing client used by the dataset indexer. It
//! includes definitions for errors, the provider interface, a concrete
//! implementation for OpenSearch, and the concurrent update service that
//! queues documents and sends them from a pool of workers.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod service;
pub mod types;

pub use config::UpdateServiceConfig;
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::OpenSearchProvider;
pub use service::ConcurrentUpdateService;
pub use types::{BatchOperationResult, BatchOperationSummary};
