//! This module defines the core data structures used across the dataset indexer.
//! It re-exports `IndexDocument` and `RunSummary`.

pub mod index_document;
pub mod run_summary;

pub use index_document::IndexDocument;
pub use run_summary::RunSummary;
