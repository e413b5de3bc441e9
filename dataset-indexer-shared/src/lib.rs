//! # Dataset Indexer Shared
//!
//! This crate defines shared data structures used across the dataset indexer.
//! It includes the document shape handed to the search index and the summary
//! reported at the end of a run.

pub mod types;

pub use types::index_document::IndexDocument;
pub use types::run_summary::RunSummary;
